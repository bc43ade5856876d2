//! Startup configuration accessors
//!
//! The configuration is computed once, before any surface exists, and is
//! read-only afterwards. Parsing command-line arguments is the host binary's
//! job; this module only holds the result.

use crate::app::OFFICIAL_SOURCE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory under the home directory holding everything the launcher owns
const APPS_DIR_NAME: &str = ".launcher-apps";

/// What the host opens once it is ready
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartupTarget {
    /// Open an official app directly, skipping the launcher
    OfficialApp { name: String, source: String },
    /// Open a locally installed app directly
    LocalApp { name: String },
    /// Open the launcher (default)
    Launcher,
}

/// Parsed startup configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    home_dir: PathBuf,
    user_data_dir: PathBuf,
    apps_root_dir: PathBuf,
    apps_local_dir: PathBuf,
    tmp_dir: PathBuf,
    core_path: PathBuf,
    version: String,
    official_app_name: Option<String>,
    local_app_name: Option<String>,
    source_name: String,
    install_dev_tools: bool,
    remove_dev_tools: bool,
}

impl CoreConfig {
    /// Creates a configuration rooted at `home_dir`
    ///
    /// All launcher directories are derived from the home directory until
    /// overridden.
    pub fn new(home_dir: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        let home_dir = home_dir.into();
        let apps_root_dir = home_dir.join(APPS_DIR_NAME);
        Self {
            user_data_dir: apps_root_dir.join("user-data"),
            apps_local_dir: apps_root_dir.join("local"),
            apps_root_dir,
            tmp_dir: std::env::temp_dir(),
            core_path: PathBuf::from("."),
            home_dir,
            version: version.into(),
            official_app_name: None,
            local_app_name: None,
            source_name: OFFICIAL_SOURCE.to_string(),
            install_dev_tools: false,
            remove_dev_tools: false,
        }
    }

    pub fn with_user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = dir.into();
        self
    }

    /// Overrides the apps root; the local apps directory moves with it
    pub fn with_apps_root_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.apps_root_dir = dir.into();
        self.apps_local_dir = self.apps_root_dir.join("local");
        self
    }

    pub fn with_tmp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tmp_dir = dir.into();
        self
    }

    pub fn with_core_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.core_path = path.into();
        self
    }

    pub fn with_official_app(mut self, name: impl Into<String>) -> Self {
        self.official_app_name = Some(name.into());
        self
    }

    pub fn with_local_app(mut self, name: impl Into<String>) -> Self {
        self.local_app_name = Some(name.into());
        self
    }

    pub fn with_source_name(mut self, source: impl Into<String>) -> Self {
        self.source_name = source.into();
        self
    }

    pub fn with_dev_tools(mut self, install: bool, remove: bool) -> Self {
        self.install_dev_tools = install;
        self.remove_dev_tools = remove;
        self
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn user_data_dir(&self) -> &Path {
        &self.user_data_dir
    }

    pub fn apps_root_dir(&self) -> &Path {
        &self.apps_root_dir
    }

    pub fn apps_local_dir(&self) -> &Path {
        &self.apps_local_dir
    }

    pub fn tmp_dir(&self) -> &Path {
        &self.tmp_dir
    }

    /// Directory the host itself runs from (bundled resources live here)
    pub fn core_path(&self) -> &Path {
        &self.core_path
    }

    /// Version of the host (the "engine" apps declare support for)
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn official_app_name(&self) -> Option<&str> {
        self.official_app_name.as_deref()
    }

    pub fn local_app_name(&self) -> Option<&str> {
        self.local_app_name.as_deref()
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn install_dev_tools(&self) -> bool {
        self.install_dev_tools
    }

    pub fn remove_dev_tools(&self) -> bool {
        self.remove_dev_tools
    }

    /// Returns the single surface to open at startup
    ///
    /// An official app name wins over a local one; with neither set the
    /// launcher opens.
    pub fn startup_target(&self) -> StartupTarget {
        if let Some(name) = &self.official_app_name {
            return StartupTarget::OfficialApp {
                name: name.clone(),
                source: self.source_name.clone(),
            };
        }
        if let Some(name) = &self.local_app_name {
            return StartupTarget::LocalApp { name: name.clone() };
        }
        StartupTarget::Launcher
    }
}
