//! # Control Script Parser
//!
//! A line-based script that stands in for a user and a GUI toolkit in
//! simulation mode.
//!
//! ## Format
//!
//! Surfaces are named `launcher` or by app name; `host` names the host
//! itself as a message sender.
//!
//! - `focus <surface>` / `blur <surface>` / `close <surface>`: window events
//! - `send <sender> open-launcher | show-about | get-app-details`
//! - `send <sender> open-app <name> [source | local]`
//! - `send <sender> action <name>`: a raw, possibly unknown, action
//! - `key <accelerator>`: a key press, e.g. `key CmdOrCtrl+W`
//! - `menu <item-id>`: a menu selection, e.g. `menu help.about`
//! - `fail-next-create <reason>`: the next surface fails to come up
//! - Comments: `# This is a comment`
//!
//! ## Example
//!
//! ```text
//! # Launch an app from the launcher, then ask for its details
//! send launcher open-app ble
//! send ble get-app-details
//! close ble
//! close launcher
//! ```

use core_types::OFFICIAL_SOURCE;
use ipc::AppLookup;
use std::collections::VecDeque;
use thiserror::Error;

/// Control script error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlScriptError {
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Empty script")]
    EmptyScript,
}

/// A surface (or the host) named in a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptTarget {
    Host,
    Launcher,
    App(String),
}

impl ScriptTarget {
    fn parse(word: &str) -> Self {
        match word {
            "host" => ScriptTarget::Host,
            "launcher" => ScriptTarget::Launcher,
            name => ScriptTarget::App(name.to_string()),
        }
    }
}

/// A control request as written in a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedRequest {
    OpenLauncher,
    OpenApp(AppLookup),
    ShowAbout,
    GetAppDetails,
    /// Any action name, sent with an empty payload
    Raw(String),
}

/// A single scripted action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedAction {
    Focus(ScriptTarget),
    Blur(ScriptTarget),
    Close(ScriptTarget),
    Send {
        from: ScriptTarget,
        request: ScriptedRequest,
    },
    Key(String),
    Menu(String),
    FailNextCreate(String),
}

/// Control script
#[derive(Debug, Clone, Default)]
pub struct ControlScript {
    actions: VecDeque<ScriptedAction>,
}

impl ControlScript {
    /// Creates an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a script from text
    pub fn from_text(text: &str) -> Result<Self, ControlScriptError> {
        let mut actions = VecDeque::new();

        for (line_num, line) in text.lines().enumerate() {
            let line = strip_comment(line).trim();
            if line.is_empty() {
                continue;
            }
            actions.push_back(Self::parse_line(line, line_num + 1)?);
        }

        if actions.is_empty() {
            return Err(ControlScriptError::EmptyScript);
        }
        Ok(Self { actions })
    }

    fn parse_line(line: &str, line_num: usize) -> Result<ScriptedAction, ControlScriptError> {
        let error = |message: String| ControlScriptError::ParseError {
            line: line_num,
            message,
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        let (command, rest) = match words.split_first() {
            Some((command, rest)) => (*command, rest),
            None => return Err(error("empty line".to_string())),
        };

        let surface = |rest: &[&str]| match rest {
            [name] => Ok(ScriptTarget::parse(name)),
            _ => Err(error(format!("{} expects one surface name", command))),
        };

        match command {
            "focus" => surface(rest).map(ScriptedAction::Focus),
            "blur" => surface(rest).map(ScriptedAction::Blur),
            "close" => surface(rest).map(ScriptedAction::Close),
            "key" => match rest {
                [keys] => Ok(ScriptedAction::Key(keys.to_string())),
                _ => Err(error("key expects one accelerator".to_string())),
            },
            "menu" => match rest {
                [id] => Ok(ScriptedAction::Menu(id.to_string())),
                _ => Err(error("menu expects one item id".to_string())),
            },
            "fail-next-create" => Ok(ScriptedAction::FailNextCreate(if rest.is_empty() {
                "scripted failure".to_string()
            } else {
                rest.join(" ")
            })),
            "send" => {
                let (from, request) = rest
                    .split_first()
                    .ok_or_else(|| error("send expects a sender and a request".to_string()))?;
                Ok(ScriptedAction::Send {
                    from: ScriptTarget::parse(from),
                    request: Self::parse_request(request).map_err(error)?,
                })
            }
            other => Err(error(format!("unknown command: {}", other))),
        }
    }

    fn parse_request(words: &[&str]) -> Result<ScriptedRequest, String> {
        match words {
            ["open-launcher"] => Ok(ScriptedRequest::OpenLauncher),
            ["show-about"] => Ok(ScriptedRequest::ShowAbout),
            ["get-app-details"] => Ok(ScriptedRequest::GetAppDetails),
            ["open-app", name] => {
                Ok(ScriptedRequest::OpenApp(AppLookup::new(*name, OFFICIAL_SOURCE)))
            }
            ["open-app", name, source] => {
                Ok(ScriptedRequest::OpenApp(AppLookup::new(*name, *source)))
            }
            ["action", name] => Ok(ScriptedRequest::Raw(name.to_string())),
            [] => Err("missing request".to_string()),
            other => Err(format!("unknown request: {}", other.join(" "))),
        }
    }

    /// Takes the next action
    pub fn next_action(&mut self) -> Option<ScriptedAction> {
        self.actions.pop_front()
    }

    pub fn has_more(&self) -> bool {
        !self.actions.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.actions.len()
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}
