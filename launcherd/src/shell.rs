//! The host's view of the GUI toolkit.

use ipc::MessageEnvelope;
use services_app_menu::{Menu, MenuAction, MenuItemId};
use services_window_manager::{DialogHost, SurfaceEvent, SurfaceFactory, SurfaceRef};

/// Something the toolkit reports to the host
#[derive(Debug, Clone)]
pub enum ShellEvent {
    /// A surface changed state
    Surface(SurfaceEvent),
    /// A surface sent a control message
    Message(MessageEnvelope),
    /// A key combination was pressed
    Accelerator(String),
    /// A menu item was selected
    MenuSelected(MenuItemId),
}

/// Everything the host runtime needs from a GUI toolkit
pub trait HostShell: SurfaceFactory + DialogHost {
    /// Installs the application menu
    fn set_menu(&mut self, menu: &Menu);

    /// Installs developer tooling, returning the names of what was added
    fn install_dev_tools(&mut self) -> Result<Vec<String>, String>;

    /// Removes developer tooling, returning how many were removed
    fn remove_dev_tools(&mut self) -> Result<usize, String>;

    /// Applies a menu action that acts on one surface (reload, minimize,
    /// edit roles and so on)
    fn surface_action(&mut self, surface: &SurfaceRef, action: &MenuAction);

    /// Returns the next event, or `None` when there will be no more
    fn next_event(&mut self) -> Option<ShellEvent>;
}
