//! # App Menu Service
//!
//! The host's application menu as plain data.
//!
//! ## Philosophy
//!
//! - **Declarative**: the menu is a tree of values with no state of its own
//! - **Same vocabulary as surfaces**: entries that open or describe apps carry
//!   the same [`ControlRequest`] a surface would send
//! - **Testable**: key bindings are looked up in the tree, not in a toolkit
//!
//! ## Example
//!
//! ```
//! use services_app_menu::{build_app_menu, HostAction, MenuAction};
//!
//! let menu = build_app_menu();
//! let quit = menu.find_by_accelerator("Ctrl+Q").unwrap();
//! assert_eq!(quit.action, MenuAction::Host(HostAction::Quit));
//! ```

pub mod accelerator;

pub use accelerator::Accelerator;

use ipc::ControlRequest;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a menu item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MenuItemId(String);

impl MenuItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MenuItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something only the host process can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostAction {
    Quit,
    /// Reload the focused surface
    Reload,
    ToggleFullScreen,
    ToggleDevTools,
    Minimize,
    /// Close the focused surface
    CloseSurface,
}

/// Standard editing behaviour provided by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditRole {
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
}

/// What selecting a menu item does
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuAction {
    /// Routed like a request from a surface
    Control(ControlRequest),
    Host(HostAction),
    Role(EditRole),
}

/// A leaf entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerator: Option<Accelerator>,
    pub action: MenuAction,
    pub enabled: bool,
}

impl MenuItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            id: MenuItemId::new(id),
            label: label.into(),
            accelerator: None,
            action,
            enabled: true,
        }
    }

    pub fn with_accelerator(mut self, accelerator: &str) -> Self {
        self.accelerator = Some(Accelerator::new(accelerator));
        self
    }

    /// Disables the item
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// One entry of a menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuEntry {
    Item(MenuItem),
    Separator,
    Submenu(Menu),
}

/// A labelled list of entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub label: String,
    pub entries: Vec<MenuEntry>,
}

impl Menu {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            entries: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: MenuItem) -> Self {
        self.entries.push(MenuEntry::Item(item));
        self
    }

    pub fn with_separator(mut self) -> Self {
        self.entries.push(MenuEntry::Separator);
        self
    }

    pub fn with_submenu(mut self, menu: Menu) -> Self {
        self.entries.push(MenuEntry::Submenu(menu));
        self
    }

    /// Every item in the tree, depth first
    pub fn actions(&self) -> Vec<&MenuItem> {
        let mut items = Vec::new();
        self.collect(&mut items);
        items
    }

    fn collect<'a>(&'a self, items: &mut Vec<&'a MenuItem>) {
        for entry in &self.entries {
            match entry {
                MenuEntry::Item(item) => items.push(item),
                MenuEntry::Separator => {}
                MenuEntry::Submenu(menu) => menu.collect(items),
            }
        }
    }

    /// Finds the enabled item bound to a key combination
    pub fn find_by_accelerator(&self, keys: &str) -> Option<&MenuItem> {
        self.actions().into_iter().find(|item| {
            item.enabled
                && item
                    .accelerator
                    .as_ref()
                    .map(|accelerator| accelerator.matches(keys))
                    .unwrap_or(false)
        })
    }

    pub fn find(&self, id: &str) -> Option<&MenuItem> {
        self.actions().into_iter().find(|item| item.id.as_str() == id)
    }

    pub fn submenu(&self, label: &str) -> Option<&Menu> {
        self.entries.iter().find_map(|entry| match entry {
            MenuEntry::Submenu(menu) if menu.label == label => Some(menu),
            _ => None,
        })
    }
}

/// Builds the host's application menu
pub fn build_app_menu() -> Menu {
    let file = Menu::new("&File")
        .with_item(
            MenuItem::new(
                "file.launch-other-app",
                "Launch other app…",
                MenuAction::Control(ControlRequest::OpenLauncher),
            )
            .with_accelerator("CmdOrCtrl+L"),
        )
        .with_separator()
        .with_item(
            MenuItem::new("file.quit", "&Quit", MenuAction::Host(HostAction::Quit))
                .with_accelerator("CmdOrCtrl+Q"),
        );

    let edit = [
        ("edit.undo", "Undo", EditRole::Undo, "CmdOrCtrl+Z"),
        ("edit.redo", "Redo", EditRole::Redo, "CmdOrCtrl+Shift+Z"),
        ("edit.cut", "Cut", EditRole::Cut, "CmdOrCtrl+X"),
        ("edit.copy", "Copy", EditRole::Copy, "CmdOrCtrl+C"),
        ("edit.paste", "Paste", EditRole::Paste, "CmdOrCtrl+V"),
        ("edit.select-all", "Select All", EditRole::SelectAll, "CmdOrCtrl+A"),
    ]
    .into_iter()
    .fold(Menu::new("&Edit"), |menu, (id, label, role, keys)| {
        let menu = if role == EditRole::Cut {
            menu.with_separator()
        } else {
            menu
        };
        menu.with_item(MenuItem::new(id, label, MenuAction::Role(role)).with_accelerator(keys))
    });

    let view = Menu::new("&View")
        .with_item(
            MenuItem::new("view.reload", "&Reload", MenuAction::Host(HostAction::Reload))
                .with_accelerator("CmdOrCtrl+R"),
        )
        .with_item(
            MenuItem::new(
                "view.fullscreen",
                "Toggle &Full Screen",
                MenuAction::Host(HostAction::ToggleFullScreen),
            )
            .with_accelerator("F11"),
        )
        .with_item(
            MenuItem::new(
                "view.devtools",
                "Toggle &Developer Tools",
                MenuAction::Host(HostAction::ToggleDevTools),
            )
            .with_accelerator("CmdOrCtrl+Shift+I"),
        );

    let window = Menu::new("&Window")
        .with_item(
            MenuItem::new("window.minimize", "Minimize", MenuAction::Host(HostAction::Minimize))
                .with_accelerator("CmdOrCtrl+M"),
        )
        .with_item(
            MenuItem::new("window.close", "Close", MenuAction::Host(HostAction::CloseSurface))
                .with_accelerator("CmdOrCtrl+W"),
        );

    let help = Menu::new("&Help").with_item(MenuItem::new(
        "help.about",
        "&About",
        MenuAction::Control(ControlRequest::ShowAboutInfo),
    ));

    Menu::new("")
        .with_submenu(file)
        .with_submenu(edit)
        .with_submenu(view)
        .with_submenu(window)
        .with_submenu(help)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_menus() {
        let menu = build_app_menu();
        let labels: Vec<&str> = menu
            .entries
            .iter()
            .filter_map(|entry| match entry {
                MenuEntry::Submenu(menu) => Some(menu.label.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["&File", "&Edit", "&View", "&Window", "&Help"]);
    }

    #[test]
    fn test_launch_other_app_opens_launcher() {
        let menu = build_app_menu();
        let item = menu.find("file.launch-other-app").unwrap();
        assert_eq!(item.action, MenuAction::Control(ControlRequest::OpenLauncher));
        assert_eq!(
            menu.find_by_accelerator("Ctrl+L").map(|item| &item.id),
            Some(&item.id)
        );
    }

    #[test]
    fn test_about_is_a_control_request() {
        let menu = build_app_menu();
        let help = menu.submenu("&Help").unwrap();
        assert_eq!(
            help.actions()[0].action,
            MenuAction::Control(ControlRequest::ShowAboutInfo)
        );
    }

    #[test]
    fn test_edit_roles() {
        let menu = build_app_menu();
        let edit = menu.submenu("&Edit").unwrap();
        let roles: Vec<&MenuAction> = edit.actions().into_iter().map(|item| &item.action).collect();
        assert_eq!(roles.len(), 6);
        assert!(roles
            .iter()
            .all(|action| matches!(action, MenuAction::Role(_))));
        assert!(edit.entries.contains(&MenuEntry::Separator));
    }

    #[test]
    fn test_accelerators_are_unique() {
        let menu = build_app_menu();
        let bound: Vec<&MenuItem> = menu
            .actions()
            .into_iter()
            .filter(|item| item.accelerator.is_some())
            .collect();
        for item in &bound {
            let keys = item.accelerator.as_ref().unwrap().as_str();
            assert_eq!(menu.find_by_accelerator(keys).map(|found| &found.id), Some(&item.id));
        }
    }

    #[test]
    fn test_disabled_items_do_not_match() {
        let menu = Menu::new("test").with_item(
            MenuItem::new("x", "X", MenuAction::Host(HostAction::Quit))
                .with_accelerator("CmdOrCtrl+X")
                .disabled(),
        );
        assert!(menu.find_by_accelerator("Ctrl+X").is_none());
        assert!(menu.find("x").is_some());
    }

    #[test]
    fn test_menu_serializes() {
        let menu = build_app_menu();
        let json = serde_json::to_string(&menu).unwrap();
        let back: Menu = serde_json::from_str(&json).unwrap();
        assert_eq!(back, menu);
    }
}
