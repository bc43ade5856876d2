//! Platform adapter traits for the window manager
//!
//! The window manager never touches a GUI toolkit. It asks a
//! [`SurfaceFactory`] to create, focus, close and message surfaces, and it
//! learns what happened to them from [`SurfaceEvent`]s the host feeds back
//! through [`crate::WindowManager::handle_event`].
//!
//! ## Philosophy
//!
//! - **Explicit, not implicit**: every platform interaction goes through a trait
//! - **Events, not callbacks**: surfaces report readiness, focus, blur and close
//!   as values; nothing is wired into the platform
//! - **Deterministic**: implementations must be testable without a display

pub mod fake;

pub use fake::FakePlatform;

use crate::handle::SurfaceRef;
use core_types::{SurfaceId, SurfaceKey};
use ipc::MessageEnvelope;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What the platform needs to create a surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSpec {
    pub key: SurfaceKey,
    /// Window title
    pub title: String,
    pub icon_path: Option<PathBuf>,
    /// Directory of the hosted app, `None` for the launcher
    pub app_path: Option<PathBuf>,
}

impl SurfaceSpec {
    pub fn launcher() -> Self {
        Self {
            key: SurfaceKey::Launcher,
            title: "Launcher".to_string(),
            icon_path: None,
            app_path: None,
        }
    }
}

/// Something that happened to a surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    /// The surface finished loading and can be shown
    Ready(SurfaceId),
    /// The surface could not be brought up
    CreationFailed { surface_id: SurfaceId, reason: String },
    /// The surface is gone; fired exactly once per surface
    Closed(SurfaceId),
    Focused(SurfaceId),
    Blurred(SurfaceId),
}

impl SurfaceEvent {
    pub fn surface_id(&self) -> SurfaceId {
        match self {
            SurfaceEvent::Ready(id)
            | SurfaceEvent::Closed(id)
            | SurfaceEvent::Focused(id)
            | SurfaceEvent::Blurred(id) => *id,
            SurfaceEvent::CreationFailed { surface_id, .. } => *surface_id,
        }
    }
}

/// Creates and drives presentation surfaces
pub trait SurfaceFactory {
    /// Starts creating a surface
    ///
    /// Returns as soon as the surface exists; the platform reports
    /// [`SurfaceEvent::Ready`] (or `CreationFailed`) later. An `Err` means
    /// nothing was created.
    fn create(&mut self, spec: &SurfaceSpec) -> Result<SurfaceRef, String>;

    /// Brings a surface to the front
    fn focus(&mut self, surface: &SurfaceRef);

    /// Asks a surface to close; it reports [`SurfaceEvent::Closed`] when done
    fn close(&mut self, surface: &SurfaceRef);

    /// Delivers a message to the content of a surface
    fn send(&mut self, surface: &SurfaceRef, message: &MessageEnvelope);
}

/// Severity of a message dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogKind {
    Info,
    Error,
}

/// A modal message box with a single OK button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDialog {
    pub kind: DialogKind,
    pub title: String,
    pub message: String,
    pub detail: String,
    pub icon_path: Option<PathBuf>,
    /// Surface the dialog is modal to; `None` for an application-wide dialog
    pub parent: Option<SurfaceId>,
}

impl MessageDialog {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DialogKind::Info, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DialogKind::Error, title, message)
    }

    fn new(kind: DialogKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            detail: String::new(),
            icon_path: None,
            parent: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn with_icon(mut self, icon_path: impl Into<PathBuf>) -> Self {
        self.icon_path = Some(icon_path.into());
        self
    }

    pub fn with_parent(mut self, parent: SurfaceId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Shows message dialogs
pub trait DialogHost {
    /// Shows a dialog and returns once the user dismissed it
    fn show_message(&mut self, dialog: &MessageDialog);
}
