//! # Window Manager Service
//!
//! This crate maps application identities to live presentation surfaces for
//! the launcher host.
//!
//! ## Philosophy
//!
//! - **One surface per application**: opening an app that is already open
//!   brings it forward instead of creating a second surface
//! - **Events are the only mutation path**: once a surface exists, the
//!   registry changes only when the platform reports ready, focus, blur or
//!   close for it
//! - **Removal happens once**: a handle leaves the registry on its close
//!   event and nowhere else
//! - **No ambient authority, no global state**: the host owns one
//!   [`WindowManager`] and lends it to whoever needs it
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A compositor (no geometry, no stacking order)
//! - A renderer
//! - A package manager (apps are resolved through [`AppDiscovery`])

pub mod handle;
pub mod platform;
pub mod registry;

pub use handle::{SurfaceHandle, SurfaceRef};
pub use platform::{
    DialogHost, DialogKind, FakePlatform, MessageDialog, SurfaceEvent, SurfaceFactory, SurfaceSpec,
};
pub use registry::{RegistryError, SurfaceRegistry};

use app_catalog::{AppDiscovery, CatalogError};
use core_types::{AppDescriptor, AppMetadata, SurfaceId, SurfaceKey};
use ipc::MessageEnvelope;
use lifecycle::{deferred, Completer, Pending};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Result of an open request, settled once the surface is ready
pub type OpenResult = Pending<SurfaceId, WindowError>;

/// Window manager errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("App not found: {name} (source: {source_name})")]
    AppNotFound { name: String, source_name: String },

    #[error("App {name} is corrupted: {reason}")]
    AppCorrupted { name: String, reason: String },

    #[error("App {name} could not be read: {reason}")]
    AppUnreadable { name: String, reason: String },

    #[error("Surface creation failed: {reason}")]
    SurfaceCreationFailed { reason: String },

    #[error("A surface for {0} is already registered")]
    DuplicateIdentity(SurfaceKey),

    #[error("Surface not found: {0}")]
    SurfaceNotFound(SurfaceId),
}

impl WindowError {
    /// Converts a discovery failure for the app `name` was asked for
    pub fn from_catalog(name: &str, err: CatalogError) -> Self {
        match err {
            CatalogError::AppNotFound { name, source_name } => {
                WindowError::AppNotFound { name, source_name }
            }
            CatalogError::AppCorrupted { name, reason } => {
                WindowError::AppCorrupted { name, reason }
            }
            CatalogError::Io { path, message } => WindowError::AppUnreadable {
                name: name.to_string(),
                reason: format!("{}: {}", path.display(), message),
            },
        }
    }
}

impl From<RegistryError> for WindowError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::DuplicateIdentity(key) => WindowError::DuplicateIdentity(key),
            RegistryError::SurfaceNotFound(id) => WindowError::SurfaceNotFound(id),
        }
    }
}

/// Window lifecycle event for the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowEvent {
    /// The platform was asked for a new surface
    CreationStarted {
        surface_id: SurfaceId,
        key: SurfaceKey,
        timestamp_ns: u64,
    },
    /// An open request joined a creation already in flight
    CreationJoined {
        surface_id: SurfaceId,
        timestamp_ns: u64,
    },
    /// The surface could not be created
    CreationFailed {
        key: SurfaceKey,
        reason: String,
        timestamp_ns: u64,
    },
    /// A ready surface entered the registry
    Registered {
        surface_id: SurfaceId,
        key: SurfaceKey,
        timestamp_ns: u64,
    },
    /// An open request found the surface already open and focused it
    Refocused {
        surface_id: SurfaceId,
        timestamp_ns: u64,
    },
    Focused {
        surface_id: SurfaceId,
        timestamp_ns: u64,
    },
    Blurred {
        surface_id: SurfaceId,
        timestamp_ns: u64,
    },
    /// The surface closed and its handle was dropped
    Closed {
        surface_id: SurfaceId,
        key: SurfaceKey,
        timestamp_ns: u64,
    },
}

/// A surface the platform is still bringing up
struct CreatingSurface {
    surface: SurfaceRef,
    key: SurfaceKey,
    metadata: Option<AppMetadata>,
    completer: Completer<SurfaceId, WindowError>,
    pending: OpenResult,
    close_requested: bool,
}

/// Window Manager
///
/// Creates, focuses and closes surfaces, and owns the registry that records
/// them. Generic over the platform so tests and the simulated host can drive
/// it without a display.
pub struct WindowManager<P> {
    platform: P,
    discovery: Box<dyn AppDiscovery>,
    registry: SurfaceRegistry,
    /// Creations in flight, keyed by what they will host
    creating: HashMap<SurfaceKey, CreatingSurface>,
    audit_trail: Vec<WindowEvent>,
    next_timestamp: u64,
}

impl<P: SurfaceFactory> WindowManager<P> {
    /// Creates a window manager with no open surfaces
    pub fn new(platform: P, discovery: Box<dyn AppDiscovery>) -> Self {
        Self {
            platform,
            discovery,
            registry: SurfaceRegistry::new(),
            creating: HashMap::new(),
            audit_trail: Vec::new(),
            next_timestamp: 0,
        }
    }

    /// Opens the launcher, or focuses it if it is already open
    pub fn open_launcher(&mut self) -> OpenResult {
        self.open_surface(SurfaceSpec::launcher(), None)
    }

    /// Resolves an app from a named source and opens it
    pub fn open_official_app(&mut self, name: &str, source: &str) -> OpenResult {
        match self.discovery.resolve_official_app(name, source) {
            Ok(descriptor) => self.open_app(descriptor),
            Err(err) => self.reject_discovery(name, err),
        }
    }

    /// Resolves an app from the local apps directory and opens it
    pub fn open_local_app(&mut self, name: &str) -> OpenResult {
        match self.discovery.resolve_local_app(name) {
            Ok(descriptor) => self.open_app(descriptor),
            Err(err) => self.reject_discovery(name, err),
        }
    }

    /// Opens an already-resolved app, or focuses its surface if it is open
    pub fn open_app(&mut self, descriptor: AppDescriptor) -> OpenResult {
        let spec = SurfaceSpec {
            key: descriptor.surface_key(),
            title: descriptor.metadata.label().to_string(),
            icon_path: descriptor.metadata.icon_path.clone(),
            app_path: Some(descriptor.metadata.path.clone()),
        };
        self.open_surface(spec, Some(descriptor.metadata))
    }

    fn reject_discovery(&mut self, name: &str, err: CatalogError) -> OpenResult {
        warn!(app = %name, error = %err, "app discovery failed");
        Pending::rejected(WindowError::from_catalog(name, err))
    }

    /// Focus-if-open, join-if-creating, else create
    fn open_surface(&mut self, spec: SurfaceSpec, metadata: Option<AppMetadata>) -> OpenResult {
        if let Some(surface_id) = self.registry.find_by_key(&spec.key).map(SurfaceHandle::id) {
            return self.refocus(surface_id);
        }

        if let Some(creating) = self.creating.get(&spec.key) {
            let surface_id = creating.surface.id();
            let pending = creating.pending.clone();
            debug!(surface = %surface_id, key = %spec.key, "joining pending creation");
            let timestamp = self.next_timestamp();
            self.audit_trail.push(WindowEvent::CreationJoined {
                surface_id,
                timestamp_ns: timestamp,
            });
            return pending;
        }

        let surface = match self.platform.create(&spec) {
            Ok(surface) => surface,
            Err(reason) => {
                error!(key = %spec.key, %reason, "surface creation failed");
                let timestamp = self.next_timestamp();
                self.audit_trail.push(WindowEvent::CreationFailed {
                    key: spec.key,
                    reason: reason.clone(),
                    timestamp_ns: timestamp,
                });
                return Pending::rejected(WindowError::SurfaceCreationFailed { reason });
            }
        };

        let surface_id = surface.id();
        info!(surface = %surface_id, key = %spec.key, "creating surface");
        let timestamp = self.next_timestamp();
        self.audit_trail.push(WindowEvent::CreationStarted {
            surface_id,
            key: spec.key.clone(),
            timestamp_ns: timestamp,
        });

        let (completer, pending) = deferred();
        self.creating.insert(
            spec.key.clone(),
            CreatingSurface {
                surface,
                key: spec.key,
                metadata,
                completer,
                pending: pending.clone(),
                close_requested: false,
            },
        );
        pending
    }

    fn refocus(&mut self, surface_id: SurfaceId) -> OpenResult {
        if let Err(err) = self.registry.set_focused(surface_id) {
            return Pending::rejected(err.into());
        }
        if let Some(handle) = self.registry.get(surface_id) {
            self.platform.focus(handle.surface());
        }
        debug!(surface = %surface_id, "surface already open, focusing");
        let timestamp = self.next_timestamp();
        self.audit_trail.push(WindowEvent::Refocused {
            surface_id,
            timestamp_ns: timestamp,
        });
        Pending::resolved(surface_id)
    }

    /// Asks the platform to close a surface
    ///
    /// The handle stays registered until the platform reports the close. A
    /// surface still being created is closed as soon as it is registered.
    pub fn close_surface(&mut self, surface_id: SurfaceId) -> Result<(), WindowError> {
        if let Some(creating) = self
            .creating
            .values_mut()
            .find(|creating| creating.surface.id() == surface_id)
        {
            debug!(surface = %surface_id, "close queued until surface is ready");
            creating.close_requested = true;
            return Ok(());
        }

        let handle = self
            .registry
            .get(surface_id)
            .ok_or(WindowError::SurfaceNotFound(surface_id))?;
        self.platform.close(handle.surface());
        Ok(())
    }

    /// Applies a surface event to the registry
    ///
    /// This is the only way the registry changes after a surface has been
    /// requested. Events for unknown surfaces are logged and ignored. An
    /// `Err` means the registry invariants were violated and the host should
    /// not continue.
    pub fn handle_event(&mut self, event: SurfaceEvent) -> Result<(), WindowError> {
        match event {
            SurfaceEvent::Ready(surface_id) => self.on_ready(surface_id),
            SurfaceEvent::CreationFailed { surface_id, reason } => {
                self.on_creation_failed(surface_id, reason);
                Ok(())
            }
            SurfaceEvent::Closed(surface_id) => {
                self.on_closed(surface_id);
                Ok(())
            }
            SurfaceEvent::Focused(surface_id) => {
                self.on_focused(surface_id);
                Ok(())
            }
            SurfaceEvent::Blurred(surface_id) => {
                if self.registry.blur(surface_id) {
                    let timestamp = self.next_timestamp();
                    self.audit_trail.push(WindowEvent::Blurred {
                        surface_id,
                        timestamp_ns: timestamp,
                    });
                }
                Ok(())
            }
        }
    }

    fn take_creating(&mut self, surface_id: SurfaceId) -> Option<CreatingSurface> {
        let key = self
            .creating
            .iter()
            .find(|(_, creating)| creating.surface.id() == surface_id)
            .map(|(key, _)| key.clone())?;
        self.creating.remove(&key)
    }

    fn on_ready(&mut self, surface_id: SurfaceId) -> Result<(), WindowError> {
        let Some(creating) = self.take_creating(surface_id) else {
            if self.registry.get(surface_id).is_none() {
                warn!(surface = %surface_id, "ready event for unknown surface");
            }
            return Ok(());
        };

        let CreatingSurface {
            surface,
            key,
            metadata,
            completer,
            close_requested,
            ..
        } = creating;

        let handle = SurfaceHandle::new(surface, key.clone(), metadata);
        if let Err(err) = self.registry.register(handle) {
            error!(surface = %surface_id, key = %key, error = %err, "registry invariant violated");
            let err = WindowError::from(err);
            completer.reject(err.clone());
            return Err(err);
        }

        info!(surface = %surface_id, key = %key, "surface opened");
        let timestamp = self.next_timestamp();
        self.audit_trail.push(WindowEvent::Registered {
            surface_id,
            key,
            timestamp_ns: timestamp,
        });
        self.on_focused(surface_id);
        completer.resolve(surface_id);

        if close_requested {
            if let Some(handle) = self.registry.get(surface_id) {
                debug!(surface = %surface_id, "applying queued close");
                self.platform.close(handle.surface());
            }
        }
        Ok(())
    }

    fn on_creation_failed(&mut self, surface_id: SurfaceId, reason: String) {
        let Some(creating) = self.take_creating(surface_id) else {
            warn!(surface = %surface_id, "creation failure for unknown surface");
            return;
        };
        error!(surface = %surface_id, key = %creating.key, %reason, "surface creation failed");
        let timestamp = self.next_timestamp();
        self.audit_trail.push(WindowEvent::CreationFailed {
            key: creating.key,
            reason: reason.clone(),
            timestamp_ns: timestamp,
        });
        creating
            .completer
            .reject(WindowError::SurfaceCreationFailed { reason });
    }

    fn on_closed(&mut self, surface_id: SurfaceId) {
        if self
            .creating
            .values()
            .any(|creating| creating.surface.id() == surface_id)
        {
            self.on_creation_failed(surface_id, "surface closed before it was ready".to_string());
            return;
        }

        match self.registry.remove(surface_id) {
            Some(handle) => {
                info!(surface = %surface_id, key = %handle.key(), "surface closed");
                let timestamp = self.next_timestamp();
                self.audit_trail.push(WindowEvent::Closed {
                    surface_id,
                    key: handle.key().clone(),
                    timestamp_ns: timestamp,
                });
            }
            None => warn!(surface = %surface_id, "close event for unknown surface"),
        }
    }

    fn on_focused(&mut self, surface_id: SurfaceId) {
        match self.registry.set_focused(surface_id) {
            Ok(true) => {
                let timestamp = self.next_timestamp();
                self.audit_trail.push(WindowEvent::Focused {
                    surface_id,
                    timestamp_ns: timestamp,
                });
            }
            Ok(false) => {}
            Err(err) => warn!(surface = %surface_id, error = %err, "ignoring focus event"),
        }
    }

    /// Returns the focused surface if it hosts an app
    ///
    /// The launcher has nothing to describe, so it never counts.
    pub fn get_focused_app(&self) -> Option<&SurfaceHandle> {
        self.registry
            .find_focused()
            .filter(|handle| !handle.is_launcher())
    }

    /// Returns the focused surface, launcher included
    pub fn focused_surface(&self) -> Option<&SurfaceHandle> {
        self.registry.find_focused()
    }

    /// Runs `f` with the platform and the focused surface, if there is one
    pub fn with_focused_surface<R>(
        &mut self,
        f: impl FnOnce(&mut P, &SurfaceRef) -> R,
    ) -> Option<R> {
        let handle = self.registry.find_focused()?;
        Some(f(&mut self.platform, handle.surface()))
    }

    /// Sends a message to the content of an open surface
    pub fn send_to(
        &mut self,
        surface_id: SurfaceId,
        message: &MessageEnvelope,
    ) -> Result<(), WindowError> {
        let handle = self
            .registry
            .get(surface_id)
            .ok_or(WindowError::SurfaceNotFound(surface_id))?;
        self.platform.send(handle.surface(), message);
        Ok(())
    }

    pub fn registry(&self) -> &SurfaceRegistry {
        &self.registry
    }

    /// Number of surfaces still being created
    pub fn pending_count(&self) -> usize {
        self.creating.len()
    }

    /// True when nothing is open and nothing is being created
    pub fn is_idle(&self) -> bool {
        self.registry.is_empty() && self.creating.is_empty()
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Returns the audit trail
    pub fn audit_trail(&self) -> &[WindowEvent] {
        &self.audit_trail
    }

    fn next_timestamp(&mut self) -> u64 {
        let ts = self.next_timestamp;
        self.next_timestamp += 1;
        ts
    }
}
