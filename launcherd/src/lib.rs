//! # Launcher Host Runtime
//!
//! This crate provides the host process of the launcher shell.
//!
//! ## Philosophy
//!
//! - **One surface per app identity**: Opening twice focuses
//! - **The toolkit is a trait**: [`HostShell`] hides the GUI library
//! - **Deterministic mode is first-class**: [`SimShell`] plays a script
//!
//! ## Responsibilities
//!
//! The host runtime:
//! - Parses the command line into a [`core_types::CoreConfig`]
//! - Installs the application menu and optional developer tooling
//! - Opens the launcher, or a single app named on the command line
//! - Routes toolkit events, control messages and menu actions
//! - Quits when the last surface closes
//!
//! ## Non-Responsibilities
//!
//! The host does NOT:
//! - Install, update or remove apps
//! - Render app content
//! - Persist window geometry

pub mod args;
pub mod control_script;
pub mod runtime;
pub mod shell;
pub mod sim;

pub use args::{parse_args, print_usage, LaunchOptions};
pub use control_script::{
    ControlScript, ControlScriptError, ScriptTarget, ScriptedAction, ScriptedRequest,
};
pub use runtime::{
    HostExit, HostRuntime, HostRuntimeConfig, HostRuntimeError, STARTUP_ERROR_MESSAGE,
    STARTUP_ERROR_TITLE,
};
pub use shell::{HostShell, ShellEvent};
pub use sim::SimShell;
