//! Typed control requests exchanged between surfaces and the host.
//!
//! On the wire a control request is an envelope whose action is one of the
//! names below. Decoding turns it into a [`ControlRequest`]; from there on,
//! dispatch is an exhaustive `match`.

use crate::{MessageEnvelope, MessageId, MessagePayload, SchemaVersion};
use core_types::{AppMetadata, AppSource, CoreConfig, OFFICIAL_SOURCE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Control message schema version (v1.0).
pub const CONTROL_SCHEMA_VERSION: SchemaVersion = SchemaVersion::new(1, 0);

/// Ask the host to open (or bring forward) the launcher.
pub const OPEN_LAUNCHER_ACTION: &str = "open-app-launcher";

/// Ask the host to open (or bring forward) an app.
pub const OPEN_APP_ACTION: &str = "open-app";

/// Ask the host to show the about dialog for the focused app.
pub const SHOW_ABOUT_ACTION: &str = "show-about-dialog";

/// Ask the host for details about the focused app.
pub const GET_APP_DETAILS_ACTION: &str = "get-app-details";

/// Reply to [`GET_APP_DETAILS_ACTION`].
pub const APP_DETAILS_ACTION: &str = "app-details";

/// `source` value naming the local apps directory
pub const LOCAL_SOURCE: &str = "local";

/// Errors decoding an envelope into a control request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unknown control action: {0}")]
    UnknownAction(String),

    #[error("Incompatible schema for {action}: received {received}, expected {expected}")]
    IncompatibleSchema {
        action: String,
        received: SchemaVersion,
        expected: SchemaVersion,
    },

    #[error("Malformed payload for {action}: {message}")]
    Payload { action: String, message: String },
}

/// Payload of `open-app`: which app to open, by name
///
/// The host resolves it through app discovery; surfaces never supply
/// metadata or paths. `source` is a source name, or `"local"`, and defaults
/// to the official source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppLookup {
    pub name: String,
    #[serde(default = "official_source")]
    pub source: String,
}

fn official_source() -> String {
    OFFICIAL_SOURCE.to_string()
}

impl AppLookup {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn local(name: impl Into<String>) -> Self {
        Self::new(name, LOCAL_SOURCE)
    }

    pub fn is_local(&self) -> bool {
        self.source == LOCAL_SOURCE
    }

    /// Where discovery should look for the app
    pub fn app_source(&self) -> AppSource {
        if self.is_local() {
            AppSource::Local
        } else {
            AppSource::official(self.source.clone())
        }
    }
}

/// A control request understood by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlRequest {
    /// Open or focus the launcher
    OpenLauncher,
    /// Resolve an app and open or focus it
    OpenApp(AppLookup),
    /// Show the about dialog for the focused app
    ShowAboutInfo,
    /// Reply to the requester with details about the focused app
    GetAppDetails,
}

impl ControlRequest {
    /// Returns the wire action name
    pub fn action(&self) -> &'static str {
        match self {
            ControlRequest::OpenLauncher => OPEN_LAUNCHER_ACTION,
            ControlRequest::OpenApp(_) => OPEN_APP_ACTION,
            ControlRequest::ShowAboutInfo => SHOW_ABOUT_ACTION,
            ControlRequest::GetAppDetails => GET_APP_DETAILS_ACTION,
        }
    }

    /// Checks whether the requester expects a reply message
    pub fn expects_reply(&self) -> bool {
        matches!(self, ControlRequest::GetAppDetails)
    }

    /// Wraps this request in an envelope
    pub fn into_envelope(self) -> Result<MessageEnvelope, serde_json::Error> {
        let action = self.action();
        let payload = match &self {
            ControlRequest::OpenApp(lookup) => MessagePayload::new(lookup)?,
            ControlRequest::OpenLauncher
            | ControlRequest::ShowAboutInfo
            | ControlRequest::GetAppDetails => MessagePayload::empty(),
        };
        Ok(MessageEnvelope::new(action, CONTROL_SCHEMA_VERSION, payload))
    }

    /// Decodes an envelope into a control request
    pub fn from_envelope(envelope: &MessageEnvelope) -> Result<Self, DecodeError> {
        let request = match envelope.action.as_str() {
            OPEN_LAUNCHER_ACTION => ControlRequest::OpenLauncher,
            OPEN_APP_ACTION => match envelope.payload.deserialize() {
                Ok(lookup) => ControlRequest::OpenApp(lookup),
                Err(err) => {
                    return Err(DecodeError::Payload {
                        action: envelope.action.clone(),
                        message: err.to_string(),
                    })
                }
            },
            SHOW_ABOUT_ACTION => ControlRequest::ShowAboutInfo,
            GET_APP_DETAILS_ACTION => ControlRequest::GetAppDetails,
            other => return Err(DecodeError::UnknownAction(other.to_string())),
        };

        if !envelope.schema_version.is_compatible_with(&CONTROL_SCHEMA_VERSION) {
            return Err(DecodeError::IncompatibleSchema {
                action: envelope.action.clone(),
                received: envelope.schema_version,
                expected: CONTROL_SCHEMA_VERSION,
            });
        }

        Ok(request)
    }
}

/// Payload of the `app-details` reply
///
/// Host facts merged with the focused app's metadata into one flat object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDetails {
    pub core_version: String,
    pub core_path: PathBuf,
    pub home_dir: PathBuf,
    pub tmp_dir: PathBuf,
    #[serde(flatten)]
    pub app: AppMetadata,
}

impl AppDetails {
    /// Builds the details for `app` under the given host configuration
    pub fn new(config: &CoreConfig, app: &AppMetadata) -> Self {
        Self {
            core_version: config.version().to_string(),
            core_path: config.core_path().to_path_buf(),
            home_dir: config.home_dir().to_path_buf(),
            tmp_dir: config.tmp_dir().to_path_buf(),
            app: app.clone(),
        }
    }

    /// Wraps the details in a reply correlated to the request
    pub fn into_envelope(
        self,
        correlation: MessageId,
    ) -> Result<MessageEnvelope, serde_json::Error> {
        let payload = MessagePayload::new(&self)?;
        let reply = MessageEnvelope::new(APP_DETAILS_ACTION, CONTROL_SCHEMA_VERSION, payload);
        Ok(reply.with_correlation(correlation))
    }
}
