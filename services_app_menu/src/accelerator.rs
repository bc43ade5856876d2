//! Keyboard accelerators in `CmdOrCtrl+Shift+X` notation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A key combination bound to a menu item
///
/// `CmdOrCtrl` matches both `Cmd` and `Ctrl`, so one menu serves every
/// platform. Comparison ignores case and modifier order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accelerator(String);

impl Accelerator {
    pub fn new(keys: impl Into<String>) -> Self {
        Self(keys.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks whether a pressed key combination triggers this accelerator
    pub fn matches(&self, keys: &str) -> bool {
        normalize(&self.0) == normalize(keys)
    }
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sorted modifiers followed by the key, all lowercase
fn normalize(keys: &str) -> Vec<String> {
    let mut parts: Vec<String> = keys
        .split('+')
        .map(|part| part.trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .map(|part| match part.as_str() {
            "cmd" | "command" | "ctrl" | "control" | "cmdorctrl" | "commandorcontrol" => {
                "cmdorctrl".to_string()
            }
            "option" => "alt".to_string(),
            _ => part,
        })
        .collect();

    let Some(key) = parts.pop() else {
        return parts;
    };
    parts.sort();
    parts.dedup();
    parts.push(key);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_or_ctrl_matches_both() {
        let accelerator = Accelerator::new("CmdOrCtrl+W");
        assert!(accelerator.matches("Ctrl+W"));
        assert!(accelerator.matches("Cmd+w"));
        assert!(!accelerator.matches("W"));
        assert!(!accelerator.matches("Alt+W"));
    }

    #[test]
    fn test_modifier_order_is_ignored() {
        let accelerator = Accelerator::new("CmdOrCtrl+Shift+I");
        assert!(accelerator.matches("Shift+Ctrl+I"));
        assert!(!accelerator.matches("Ctrl+I"));
    }

    #[test]
    fn test_plain_key() {
        assert!(Accelerator::new("F11").matches("f11"));
        assert!(!Accelerator::new("F11").matches(""));
    }
}
