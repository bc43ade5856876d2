//! Apps installed on disk.
//!
//! Layout under the apps root:
//!
//! ```text
//! <apps_root>/node_modules/<name>/package.json          official source
//! <apps_root>/sources/<source>/node_modules/<name>/...  any other source
//! <apps_root>/apps.json                                  latest versions (optional)
//! <apps_local>/<name>/package.json                       local apps
//! ```

use crate::manifest::{AppManifest, MANIFEST_FILE};
use crate::{AppDiscovery, CatalogError};
use core_types::{AppDescriptor, AppSource, CoreConfig, OFFICIAL_SOURCE};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const MODULES_DIR: &str = "node_modules";
const SOURCES_DIR: &str = "sources";
const LATEST_INDEX_FILE: &str = "apps.json";

/// Creates the apps directories if they are missing
pub fn init_apps_directory(config: &CoreConfig) -> Result<(), CatalogError> {
    let catalog = DirectoryCatalog::from_config(config);
    let dirs = [
        catalog.source_root(OFFICIAL_SOURCE).join(MODULES_DIR),
        catalog.apps_local_dir.clone(),
    ];
    for dir in dirs {
        if !dir.is_dir() {
            info!(path = %dir.display(), "creating apps directory");
            fs::create_dir_all(&dir).map_err(|err| CatalogError::io(&dir, err))?;
        }
    }
    Ok(())
}

/// Reads installed apps from the apps directories on every lookup
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    apps_root_dir: PathBuf,
    apps_local_dir: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(apps_root_dir: impl Into<PathBuf>, apps_local_dir: impl Into<PathBuf>) -> Self {
        Self {
            apps_root_dir: apps_root_dir.into(),
            apps_local_dir: apps_local_dir.into(),
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.apps_root_dir(), config.apps_local_dir())
    }

    /// Directory holding the index and `node_modules` of a source
    pub fn source_root(&self, source: &str) -> PathBuf {
        if source == OFFICIAL_SOURCE {
            self.apps_root_dir.clone()
        } else {
            self.apps_root_dir.join(SOURCES_DIR).join(source)
        }
    }

    /// Lists the apps installed from a source, skipping unreadable entries
    pub fn list_official(&self, source: &str) -> Vec<AppDescriptor> {
        let modules = self.source_root(source).join(MODULES_DIR);
        self.list_dir(&modules, |catalog, name| {
            catalog.resolve_official_app(name, source)
        })
    }

    /// Lists the local apps, skipping unreadable entries
    pub fn list_local(&self) -> Vec<AppDescriptor> {
        self.list_dir(&self.apps_local_dir, |catalog, name| {
            catalog.resolve_local_app(name)
        })
    }

    fn list_dir(
        &self,
        dir: &Path,
        resolve: impl Fn(&Self, &str) -> Result<AppDescriptor, CatalogError>,
    ) -> Vec<AppDescriptor> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(path = %dir.display(), error = %err, "apps directory not readable");
                return Vec::new();
            }
        };

        let mut apps: Vec<AppDescriptor> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter_map(|name| match resolve(self, &name) {
                Ok(app) => Some(app),
                Err(err) => {
                    warn!(app = %name, error = %err, "skipping app");
                    None
                }
            })
            .collect();
        apps.sort_by(|a, b| a.identity.name.cmp(&b.identity.name));
        apps
    }

    fn load(
        &self,
        name: &str,
        app_dir: &Path,
        source: AppSource,
    ) -> Result<AppDescriptor, CatalogError> {
        let manifest_path = app_dir.join(MANIFEST_FILE);
        if !app_dir.is_dir() {
            return Err(CatalogError::AppNotFound {
                name: name.to_string(),
                source_name: source_label(&source),
            });
        }
        if !manifest_path.is_file() {
            return Err(CatalogError::AppCorrupted {
                name: name.to_string(),
                reason: format!("missing {}", MANIFEST_FILE),
            });
        }

        let json = fs::read_to_string(&manifest_path)
            .map_err(|err| CatalogError::io(&manifest_path, err))?;
        let manifest = AppManifest::parse(name, &json)?;
        Ok(manifest.into_descriptor(source, app_dir))
    }

    /// Reads the optional latest-version index of a source
    fn latest_versions(&self, source: &str) -> HashMap<String, String> {
        let path = self.source_root(source).join(LATEST_INDEX_FILE);
        let Ok(json) = fs::read_to_string(&path) else {
            return HashMap::new();
        };
        serde_json::from_str(&json).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "ignoring unreadable app index");
            HashMap::new()
        })
    }
}

fn source_label(source: &AppSource) -> String {
    match source {
        AppSource::Official { source } => source.clone(),
        AppSource::Local => AppSource::Local.to_string(),
    }
}

impl AppDiscovery for DirectoryCatalog {
    fn resolve_official_app(
        &self,
        name: &str,
        source: &str,
    ) -> Result<AppDescriptor, CatalogError> {
        let app_dir = self.source_root(source).join(MODULES_DIR).join(name);
        let mut descriptor = self.load(name, &app_dir, AppSource::official(source))?;
        if let Some(latest) = self.latest_versions(source).remove(name) {
            descriptor.metadata = descriptor.metadata.with_latest_version(latest);
        }
        Ok(descriptor)
    }

    fn resolve_local_app(&self, name: &str) -> Result<AppDescriptor, CatalogError> {
        let app_dir = self.apps_local_dir.join(name);
        self.load(name, &app_dir, AppSource::Local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_app(dir: &Path, name: &str, version: &str) {
        let app_dir = dir.join(name);
        fs::create_dir_all(&app_dir).unwrap();
        fs::write(
            app_dir.join(MANIFEST_FILE),
            format!(r#"{{ "name": "{}", "version": "{}" }}"#, name, version),
        )
        .unwrap();
    }

    fn setup() -> (TempDir, CoreConfig, DirectoryCatalog) {
        let home = TempDir::new().unwrap();
        let config = CoreConfig::new(home.path(), "2.0.0");
        init_apps_directory(&config).unwrap();
        let catalog = DirectoryCatalog::from_config(&config);
        (home, config, catalog)
    }

    #[test]
    fn test_init_creates_directories() {
        let (_home, config, _catalog) = setup();
        assert!(config.apps_root_dir().join(MODULES_DIR).is_dir());
        assert!(config.apps_local_dir().is_dir());

        // running again is harmless
        init_apps_directory(&config).unwrap();
    }

    #[test]
    fn test_resolve_official_app() {
        let (_home, config, catalog) = setup();
        write_app(&config.apps_root_dir().join(MODULES_DIR), "ble", "1.0.0");

        let app = catalog.resolve_official_app("ble", OFFICIAL_SOURCE).unwrap();
        assert_eq!(app.identity.source, AppSource::official(OFFICIAL_SOURCE));
        assert_eq!(app.identity.version, "1.0.0");
        assert!(app.metadata.is_official);
        assert!(app.metadata.latest_version.is_none());
    }

    #[test]
    fn test_resolve_from_named_source() {
        let (_home, _config, catalog) = setup();
        let modules = catalog.source_root("beta").join(MODULES_DIR);
        write_app(&modules, "ble", "2.0.0-beta");

        let app = catalog.resolve_official_app("ble", "beta").unwrap();
        assert_eq!(app.identity.source, AppSource::official("beta"));
        assert!(catalog.resolve_official_app("ble", OFFICIAL_SOURCE).is_err());
    }

    #[test]
    fn test_latest_version_index() {
        let (_home, config, catalog) = setup();
        write_app(&config.apps_root_dir().join(MODULES_DIR), "ble", "1.0.0");
        fs::write(
            config.apps_root_dir().join(LATEST_INDEX_FILE),
            r#"{ "ble": "1.2.0" }"#,
        )
        .unwrap();

        let app = catalog.resolve_official_app("ble", OFFICIAL_SOURCE).unwrap();
        assert_eq!(app.metadata.latest_version.as_deref(), Some("1.2.0"));
        assert!(app.metadata.upgrade_available());
    }

    #[test]
    fn test_missing_app_is_not_found() {
        let (_home, _config, catalog) = setup();
        let result = catalog.resolve_official_app("x", OFFICIAL_SOURCE);
        assert!(matches!(result, Err(CatalogError::AppNotFound { .. })));
    }

    #[test]
    fn test_missing_manifest_is_corrupted() {
        let (_home, config, catalog) = setup();
        fs::create_dir_all(config.apps_local_dir().join("broken")).unwrap();

        let result = catalog.resolve_local_app("broken");
        assert!(matches!(result, Err(CatalogError::AppCorrupted { .. })));
    }

    #[test]
    fn test_icon_is_picked_up() {
        let (_home, config, catalog) = setup();
        write_app(config.apps_local_dir(), "dev", "0.1.0");
        let resources = config.apps_local_dir().join("dev").join("resources");
        fs::create_dir_all(&resources).unwrap();
        fs::write(resources.join("icon.png"), b"png").unwrap();

        let app = catalog.resolve_local_app("dev").unwrap();
        assert_eq!(app.metadata.icon_path, Some(resources.join("icon.png")));
    }

    #[test]
    fn test_listing_skips_broken_apps() {
        let (_home, config, catalog) = setup();
        write_app(config.apps_local_dir(), "b-app", "0.1.0");
        write_app(config.apps_local_dir(), "a-app", "0.2.0");
        fs::create_dir_all(config.apps_local_dir().join("broken")).unwrap();

        let names: Vec<String> = catalog
            .list_local()
            .into_iter()
            .map(|app| app.identity.name)
            .collect();
        assert_eq!(names, vec!["a-app".to_string(), "b-app".to_string()]);
    }

    #[test]
    fn test_listing_official() {
        let (_home, config, catalog) = setup();
        write_app(&config.apps_root_dir().join(MODULES_DIR), "ble", "1.0.0");

        let apps = catalog.list_official(OFFICIAL_SOURCE);
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].identity.name, "ble");
    }
}
