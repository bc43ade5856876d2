//! App package manifests (`package.json`).

use crate::CatalogError;
use core_types::{AppDescriptor, AppIdentity, AppMetadata, AppSource};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Manifest file inside every app directory
pub const MANIFEST_FILE: &str = "package.json";

/// Icon shipped by an app, relative to its directory
pub const ICON_FILE: &str = "resources/icon.png";

/// Engine range an app declares
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineRequirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launcher: Option<String>,
}

/// The subset of `package.json` the host reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppManifest {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default)]
    pub engines: EngineRequirements,
}

impl AppManifest {
    /// Parses and validates a manifest
    ///
    /// `expected_name` is the name the app was requested under; a manifest
    /// that disagrees is treated as corrupted.
    pub fn parse(expected_name: &str, json: &str) -> Result<Self, CatalogError> {
        let corrupted = |reason: String| CatalogError::AppCorrupted {
            name: expected_name.to_string(),
            reason,
        };

        let manifest: AppManifest = serde_json::from_str(json)
            .map_err(|err| corrupted(format!("invalid manifest: {}", err)))?;

        if manifest.name != expected_name {
            return Err(corrupted(format!(
                "manifest names a different app: {}",
                manifest.name
            )));
        }
        if manifest.version.trim().is_empty() {
            return Err(corrupted("manifest has no version".to_string()));
        }
        Ok(manifest)
    }

    /// Turns the manifest into a descriptor for an app installed at `app_dir`
    pub fn into_descriptor(self, source: AppSource, app_dir: &Path) -> AppDescriptor {
        let identity = AppIdentity::new(self.name.clone(), source.clone(), self.version.clone());

        let mut metadata = AppMetadata::new(self.name, self.version, source.is_official(), app_dir)
            .with_description(self.description);
        if let Some(display_name) = self.display_name {
            metadata = metadata.with_display_name(display_name);
        }
        if let Some(homepage) = self.homepage {
            metadata = metadata.with_homepage(homepage);
        }
        if let Some(engine) = self.engines.launcher {
            metadata = metadata.with_engine_version(engine);
        }
        let icon = app_dir.join(ICON_FILE);
        if icon.is_file() {
            metadata = metadata.with_icon_path(icon);
        }

        AppDescriptor::new(identity, metadata)
    }
}
