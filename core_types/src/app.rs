//! Application identity and metadata

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Name of the default source of official applications
pub const OFFICIAL_SOURCE: &str = "official";

/// Where an installable application comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AppSource {
    /// Published through a named app source
    Official { source: String },
    /// Installed by hand into the local apps directory
    Local,
}

impl AppSource {
    /// Creates an official source with the given name
    pub fn official(source: impl Into<String>) -> Self {
        AppSource::Official {
            source: source.into(),
        }
    }

    /// Returns true for official sources
    pub fn is_official(&self) -> bool {
        matches!(self, AppSource::Official { .. })
    }
}

impl fmt::Display for AppSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppSource::Official { source } => write!(f, "official:{}", source),
            AppSource::Local => write!(f, "local"),
        }
    }
}

/// Unique key for an installable application
///
/// Immutable once an open request has been issued for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppIdentity {
    pub name: String,
    pub source: AppSource,
    pub version: String,
}

impl AppIdentity {
    /// Creates a new application identity
    pub fn new(name: impl Into<String>, source: AppSource, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source,
            version: version.into(),
        }
    }
}

impl fmt::Display for AppIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.name, self.version, self.source)
    }
}

/// What a surface hosts
///
/// The launcher has no application identity but is still a singleton, so the
/// registry keys surfaces by this rather than by `Option<AppIdentity>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceKey {
    Launcher,
    App(AppIdentity),
}

impl SurfaceKey {
    /// Returns the hosted application identity, if any
    pub fn identity(&self) -> Option<&AppIdentity> {
        match self {
            SurfaceKey::Launcher => None,
            SurfaceKey::App(identity) => Some(identity),
        }
    }

    /// Returns true for the launcher surface
    pub fn is_launcher(&self) -> bool {
        matches!(self, SurfaceKey::Launcher)
    }
}

impl fmt::Display for SurfaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceKey::Launcher => write!(f, "launcher"),
            SurfaceKey::App(identity) => write!(f, "{}", identity),
        }
    }
}

/// Display metadata for an application
///
/// Sourced from app discovery when a surface is opened and cached for the
/// surface's lifetime. Field names follow the camelCase form apps expect in
/// the `app-details` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: String,
    pub current_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    /// Engine version range the app declares support for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    pub is_official: bool,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
}

impl AppMetadata {
    /// Creates metadata with only the required fields set
    pub fn new(
        name: impl Into<String>,
        current_version: impl Into<String>,
        is_official: bool,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            description: String::new(),
            current_version: current_version.into(),
            latest_version: None,
            engine_version: None,
            is_official,
            path: path.into(),
            icon_path: None,
            homepage: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_latest_version(mut self, latest_version: impl Into<String>) -> Self {
        self.latest_version = Some(latest_version.into());
        self
    }

    pub fn with_engine_version(mut self, engine_version: impl Into<String>) -> Self {
        self.engine_version = Some(engine_version.into());
        self
    }

    pub fn with_icon_path(mut self, icon_path: impl Into<PathBuf>) -> Self {
        self.icon_path = Some(icon_path.into());
        self
    }

    pub fn with_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = Some(homepage.into());
        self
    }

    /// Returns the name to show to users
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Checks whether a newer version than the installed one is known
    pub fn upgrade_available(&self) -> bool {
        self.latest_version
            .as_deref()
            .map(|latest| latest != self.current_version)
            .unwrap_or(false)
    }
}

/// A resolved application: its identity plus display metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDescriptor {
    pub identity: AppIdentity,
    pub metadata: AppMetadata,
}

impl AppDescriptor {
    pub fn new(identity: AppIdentity, metadata: AppMetadata) -> Self {
        Self { identity, metadata }
    }

    /// Returns the registry key for a surface hosting this app
    pub fn surface_key(&self) -> SurfaceKey {
        SurfaceKey::App(self.identity.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ble() -> AppIdentity {
        AppIdentity::new("ble", AppSource::official(OFFICIAL_SOURCE), "1.0.0")
    }

    #[test]
    fn test_identity_equality_includes_version() {
        let a = ble();
        let b = AppIdentity::new("ble", AppSource::official(OFFICIAL_SOURCE), "1.1.0");
        assert_ne!(a, b);
        assert_eq!(a, ble());
    }

    #[test]
    fn test_identity_equality_includes_source() {
        let official = ble();
        let local = AppIdentity::new("ble", AppSource::Local, "1.0.0");
        assert_ne!(official, local);
    }

    #[test]
    fn test_identity_display() {
        assert_eq!(format!("{}", ble()), "ble@1.0.0 (official:official)");
        let local = AppIdentity::new("dev", AppSource::Local, "0.1.0");
        assert_eq!(format!("{}", local), "dev@0.1.0 (local)");
    }

    #[test]
    fn test_surface_key() {
        assert!(SurfaceKey::Launcher.is_launcher());
        assert!(SurfaceKey::Launcher.identity().is_none());

        let key = SurfaceKey::App(ble());
        assert!(!key.is_launcher());
        assert_eq!(key.identity(), Some(&ble()));
    }

    #[test]
    fn test_metadata_label_prefers_display_name() {
        let meta = AppMetadata::new("ble", "1.0.0", true, "/apps/ble");
        assert_eq!(meta.label(), "ble");

        let meta = meta.with_display_name("Bluetooth Low Energy");
        assert_eq!(meta.label(), "Bluetooth Low Energy");
    }

    #[test]
    fn test_metadata_upgrade_available() {
        let meta = AppMetadata::new("ble", "1.0.0", true, "/apps/ble");
        assert!(!meta.upgrade_available());
        assert!(!meta.clone().with_latest_version("1.0.0").upgrade_available());
        assert!(meta.with_latest_version("1.2.0").upgrade_available());
    }

    #[test]
    fn test_metadata_wire_names_are_camel_case() {
        let meta = AppMetadata::new("ble", "1.0.0", true, "/apps/ble")
            .with_display_name("BLE")
            .with_icon_path("/apps/ble/icon.png");
        let json = serde_json::to_value(&meta).unwrap();

        assert_eq!(json["displayName"], "BLE");
        assert_eq!(json["currentVersion"], "1.0.0");
        assert_eq!(json["isOfficial"], true);
        assert_eq!(json["iconPath"], "/apps/ble/icon.png");
        assert!(json.get("latestVersion").is_none());
    }

    #[test]
    fn test_source_serialization() {
        let json = serde_json::to_string(&AppSource::official("beta")).unwrap();
        assert_eq!(json, r#"{"kind":"official","source":"beta"}"#);

        let local: AppSource = serde_json::from_str(r#"{"kind":"local"}"#).unwrap();
        assert_eq!(local, AppSource::Local);
    }
}
