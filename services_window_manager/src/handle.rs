//! Surface handles.

use core_types::{AppIdentity, AppMetadata, SurfaceId, SurfaceKey};
use std::fmt;

/// Exclusive reference to a live presentation surface
///
/// Handed out by the platform when a surface is created. It is deliberately
/// not `Clone`: whoever holds it owns the surface, and the registry is the
/// only long-term holder.
#[derive(PartialEq, Eq)]
pub struct SurfaceRef {
    id: SurfaceId,
}

impl SurfaceRef {
    pub fn new(id: SurfaceId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }
}

impl fmt::Debug for SurfaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceRef({})", self.id)
    }
}

/// One open presentation surface and what it hosts
///
/// Handles are built only by the window manager's open path and dropped only
/// when the surface reports that it closed. Whether a handle is focused is
/// answered by the registry, not stored here.
#[derive(Debug)]
pub struct SurfaceHandle {
    surface: SurfaceRef,
    key: SurfaceKey,
    metadata: Option<AppMetadata>,
}

impl SurfaceHandle {
    pub(crate) fn new(surface: SurfaceRef, key: SurfaceKey, metadata: Option<AppMetadata>) -> Self {
        Self {
            surface,
            key,
            metadata,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.surface.id()
    }

    pub fn surface(&self) -> &SurfaceRef {
        &self.surface
    }

    pub fn key(&self) -> &SurfaceKey {
        &self.key
    }

    /// Returns the hosted application, `None` for the launcher
    pub fn identity(&self) -> Option<&AppIdentity> {
        self.key.identity()
    }

    /// Returns the metadata cached when the surface was opened
    pub fn metadata(&self) -> Option<&AppMetadata> {
        self.metadata.as_ref()
    }

    pub fn is_launcher(&self) -> bool {
        self.key.is_launcher()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::AppSource;

    #[test]
    fn test_launcher_handle_has_no_identity() {
        let handle =
            SurfaceHandle::new(SurfaceRef::new(SurfaceId::new()), SurfaceKey::Launcher, None);
        assert!(handle.is_launcher());
        assert!(handle.identity().is_none());
        assert!(handle.metadata().is_none());
    }

    #[test]
    fn test_app_handle() {
        let id = SurfaceId::new();
        let identity = AppIdentity::new("ble", AppSource::official("official"), "1.0.0");
        let metadata = AppMetadata::new("ble", "1.0.0", true, "/apps/ble");
        let handle = SurfaceHandle::new(
            SurfaceRef::new(id),
            SurfaceKey::App(identity.clone()),
            Some(metadata),
        );

        assert_eq!(handle.id(), id);
        assert_eq!(handle.surface().id(), id);
        assert_eq!(handle.identity(), Some(&identity));
        assert_eq!(handle.metadata().map(|m| m.name.as_str()), Some("ble"));
    }
}
