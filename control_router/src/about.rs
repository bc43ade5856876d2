//! About dialog for the focused app.

use core_types::{AppMetadata, CoreConfig};
use services_window_manager::MessageDialog;
use std::path::PathBuf;

/// Icon shown when an app ships none, relative to the core path
pub const DEFAULT_ICON: &str = "resources/icon.png";

/// Builds the about dialog for `app`
pub fn about_dialog(config: &CoreConfig, app: &AppMetadata) -> MessageDialog {
    let detail = format!(
        "{}\n\nVersion: {}\nOfficial: {}\nSupported engines: {}\n\
         Current engine: {}\nApp directory: {}",
        app.description,
        app.current_version,
        app.is_official,
        app.engine_version.as_deref().unwrap_or("unspecified"),
        config.version(),
        app.path.display(),
    );
    let icon = app
        .icon_path
        .clone()
        .unwrap_or_else(|| default_icon(config));

    MessageDialog::info("About", app.label())
        .with_detail(detail)
        .with_icon(icon)
}

fn default_icon(config: &CoreConfig) -> PathBuf {
    config.core_path().join(DEFAULT_ICON)
}
