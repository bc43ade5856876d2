//! In-memory app index.

use crate::{AppDiscovery, CatalogError};
use core_types::{AppDescriptor, AppSource};

/// An in-memory set of installed apps
///
/// Used by tests and by hosts that discover apps some other way and only
/// need the lookup.
#[derive(Debug, Clone, Default)]
pub struct AppCatalog {
    apps: Vec<AppDescriptor>,
}

impl AppCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an app, replacing any entry with the same name and source
    pub fn add(&mut self, descriptor: AppDescriptor) {
        self.apps.retain(|existing| {
            existing.identity.name != descriptor.identity.name
                || existing.identity.source != descriptor.identity.source
        });
        self.apps.push(descriptor);
    }

    /// Removes an app, returning whether it was present
    pub fn remove(&mut self, name: &str, source: &AppSource) -> bool {
        let before = self.apps.len();
        self.apps.retain(|existing| {
            existing.identity.name != name || existing.identity.source != *source
        });
        self.apps.len() != before
    }

    pub fn list(&self) -> &[AppDescriptor] {
        &self.apps
    }

    fn find(&self, name: &str, source: &AppSource) -> Option<&AppDescriptor> {
        self.apps
            .iter()
            .find(|app| app.identity.name == name && app.identity.source == *source)
    }
}

impl AppDiscovery for AppCatalog {
    fn resolve_official_app(
        &self,
        name: &str,
        source: &str,
    ) -> Result<AppDescriptor, CatalogError> {
        self.find(name, &AppSource::official(source))
            .cloned()
            .ok_or_else(|| CatalogError::AppNotFound {
                name: name.to_string(),
                source_name: source.to_string(),
            })
    }

    fn resolve_local_app(&self, name: &str) -> Result<AppDescriptor, CatalogError> {
        self.find(name, &AppSource::Local)
            .cloned()
            .ok_or_else(|| CatalogError::AppNotFound {
                name: name.to_string(),
                source_name: AppSource::Local.to_string(),
            })
    }
}
