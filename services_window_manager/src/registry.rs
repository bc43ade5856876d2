//! Surface registry.
//!
//! The single source of truth for which surfaces are open and which one has
//! focus. Registration and removal are crate-private: the window manager is
//! the only caller, from its open path and its close-event path.

use crate::handle::SurfaceHandle;
use core_types::{AppIdentity, SurfaceId, SurfaceKey};
use services_focus_manager::{FocusEvent, FocusManager};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Surface registry errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("A surface for {0} is already registered")]
    DuplicateIdentity(SurfaceKey),

    #[error("Surface not found: {0}")]
    SurfaceNotFound(SurfaceId),
}

/// Table of open surfaces keyed by what they host
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    handles: HashMap<SurfaceId, SurfaceHandle>,
    focus: FocusManager,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a handle
    ///
    /// Fails if a handle with the same key is already present; the registry
    /// never holds two surfaces for one application.
    pub(crate) fn register(
        &mut self,
        handle: SurfaceHandle,
    ) -> Result<&SurfaceHandle, RegistryError> {
        if self.find_by_key(handle.key()).is_some() {
            return Err(RegistryError::DuplicateIdentity(handle.key().clone()));
        }
        let id = handle.id();
        debug!(surface = %id, key = %handle.key(), "surface registered");
        Ok(self.handles.entry(id).or_insert(handle))
    }

    /// Removes a handle, releasing focus if it had it
    pub(crate) fn remove(&mut self, surface_id: SurfaceId) -> Option<SurfaceHandle> {
        let handle = self.handles.remove(&surface_id)?;
        self.focus.release(surface_id);
        debug!(surface = %surface_id, "surface removed");
        Some(handle)
    }

    pub fn get(&self, surface_id: SurfaceId) -> Option<&SurfaceHandle> {
        self.handles.get(&surface_id)
    }

    pub fn find_by_key(&self, key: &SurfaceKey) -> Option<&SurfaceHandle> {
        self.handles.values().find(|handle| handle.key() == key)
    }

    pub fn find_by_identity(&self, identity: &AppIdentity) -> Option<&SurfaceHandle> {
        self.handles
            .values()
            .find(|handle| handle.identity() == Some(identity))
    }

    pub fn find_launcher(&self) -> Option<&SurfaceHandle> {
        self.find_by_key(&SurfaceKey::Launcher)
    }

    /// Returns the single focused handle, if any
    pub fn find_focused(&self) -> Option<&SurfaceHandle> {
        self.focus
            .current_focus()
            .and_then(|id| self.handles.get(&id))
    }

    pub fn is_focused(&self, surface_id: SurfaceId) -> bool {
        self.focus.has_focus(surface_id)
    }

    /// Marks a surface focused, clearing the previous one
    ///
    /// Returns `Ok(false)` if it already had focus.
    pub fn set_focused(&mut self, surface_id: SurfaceId) -> Result<bool, RegistryError> {
        if !self.handles.contains_key(&surface_id) {
            return Err(RegistryError::SurfaceNotFound(surface_id));
        }
        Ok(self.focus.grant(surface_id))
    }

    /// Clears focus if `surface_id` is the focused surface
    pub fn blur(&mut self, surface_id: SurfaceId) -> bool {
        self.focus.blur(surface_id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SurfaceHandle> {
        self.handles.values()
    }

    /// Returns the focus audit trail
    pub fn focus_trail(&self) -> &[FocusEvent] {
        self.focus.audit_trail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::SurfaceRef;
    use core_types::{AppMetadata, AppSource};

    fn app_key(name: &str) -> SurfaceKey {
        SurfaceKey::App(AppIdentity::new(name, AppSource::official("official"), "1.0.0"))
    }

    fn handle(key: SurfaceKey) -> SurfaceHandle {
        let metadata = key
            .identity()
            .map(|identity| AppMetadata::new(identity.name.clone(), "1.0.0", true, "/apps"));
        SurfaceHandle::new(SurfaceRef::new(SurfaceId::new()), key, metadata)
    }

    #[test]
    fn test_register_and_find() {
        let mut registry = SurfaceRegistry::new();
        let id = registry.register(handle(app_key("ble"))).unwrap().id();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(id).map(SurfaceHandle::id), Some(id));
        assert_eq!(registry.find_by_key(&app_key("ble")).map(SurfaceHandle::id), Some(id));
        let identity = app_key("ble").identity().cloned().unwrap();
        assert_eq!(registry.find_by_identity(&identity).map(SurfaceHandle::id), Some(id));
        assert!(registry.find_launcher().is_none());
    }

    #[test]
    fn test_register_duplicate_identity() {
        let mut registry = SurfaceRegistry::new();
        registry.register(handle(app_key("ble"))).unwrap();

        let result = registry.register(handle(app_key("ble")));
        assert_eq!(result.err(), Some(RegistryError::DuplicateIdentity(app_key("ble"))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_same_name_different_version_is_distinct() {
        let mut registry = SurfaceRegistry::new();
        registry.register(handle(app_key("ble"))).unwrap();
        let newer =
            SurfaceKey::App(AppIdentity::new("ble", AppSource::official("official"), "2.0.0"));
        assert!(registry.register(handle(newer)).is_ok());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_launcher_is_singleton() {
        let mut registry = SurfaceRegistry::new();
        registry.register(handle(SurfaceKey::Launcher)).unwrap();
        assert!(registry.register(handle(SurfaceKey::Launcher)).is_err());
        assert!(registry.find_launcher().is_some());
    }

    #[test]
    fn test_set_focused_moves_focus() {
        let mut registry = SurfaceRegistry::new();
        let a = registry.register(handle(app_key("a"))).unwrap().id();
        let b = registry.register(handle(app_key("b"))).unwrap().id();

        assert_eq!(registry.set_focused(a), Ok(true));
        assert_eq!(registry.set_focused(b), Ok(true));
        assert!(!registry.is_focused(a));
        assert_eq!(registry.find_focused().map(SurfaceHandle::id), Some(b));

        // idempotent
        assert_eq!(registry.set_focused(b), Ok(false));
        assert_eq!(registry.focus_trail().len(), 2);
    }

    #[test]
    fn test_set_focused_unknown_surface() {
        let mut registry = SurfaceRegistry::new();
        let id = SurfaceId::new();
        assert_eq!(registry.set_focused(id), Err(RegistryError::SurfaceNotFound(id)));
        assert!(registry.find_focused().is_none());
    }

    #[test]
    fn test_blur_only_clears_focused_surface() {
        let mut registry = SurfaceRegistry::new();
        let a = registry.register(handle(app_key("a"))).unwrap().id();
        let b = registry.register(handle(app_key("b"))).unwrap().id();
        registry.set_focused(a).unwrap();

        assert!(!registry.blur(b));
        assert!(registry.is_focused(a));
        assert!(registry.blur(a));
        assert!(registry.find_focused().is_none());
    }

    #[test]
    fn test_remove_focused_surface() {
        let mut registry = SurfaceRegistry::new();
        let a = registry.register(handle(app_key("a"))).unwrap().id();
        registry.set_focused(a).unwrap();

        let removed = registry.remove(a).unwrap();
        assert_eq!(removed.id(), a);
        assert!(registry.is_empty());
        assert!(registry.find_focused().is_none());
        assert!(registry.get(a).is_none());

        // a second removal finds nothing
        assert!(registry.remove(a).is_none());
    }
}
