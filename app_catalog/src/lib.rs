//! App discovery for the launcher host.
//!
//! The host never looks at app packages itself; it asks an [`AppDiscovery`]
//! implementation to turn a name (and source) into an [`AppDescriptor`].
//! Two implementations live here: [`AppCatalog`], an in-memory index, and
//! [`DirectoryCatalog`], which reads installed apps from disk.

pub mod catalog;
pub mod directory;
pub mod manifest;

pub use catalog::AppCatalog;
pub use directory::{init_apps_directory, DirectoryCatalog};
pub use manifest::AppManifest;

use core_types::AppDescriptor;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("App not found: {name} (source: {source_name})")]
    AppNotFound { name: String, source_name: String },

    #[error("App {name} is corrupted: {reason}")]
    AppCorrupted { name: String, reason: String },

    #[error("I/O error at {path}: {message}")]
    Io { path: PathBuf, message: String },
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        CatalogError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Resolves app names into identities plus metadata
pub trait AppDiscovery {
    /// Resolves an app published through the named source
    fn resolve_official_app(&self, name: &str, source: &str)
        -> Result<AppDescriptor, CatalogError>;

    /// Resolves an app from the local apps directory
    fn resolve_local_app(&self, name: &str) -> Result<AppDescriptor, CatalogError>;
}
