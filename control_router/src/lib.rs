//! # Control Router
//!
//! This crate dispatches control requests sent by surfaces (or by the host
//! itself) to the window manager.
//!
//! ## Philosophy
//!
//! Unlike a string-keyed handler table, requests are:
//! - Decoded once into a closed [`ControlRequest`] enum
//! - Dispatched through an exhaustive match
//! - Answered to the surface that asked, never broadcast
//!
//! Unknown actions are logged and ignored. Requests about "the focused app"
//! do nothing when no app has focus.

pub mod about;

pub use about::about_dialog;

use core_types::{CoreConfig, SurfaceId};
use ipc::{AppDetails, ControlRequest, DecodeError, MessageEnvelope, MessageId};
use serde::{Deserialize, Serialize};
use services_window_manager::{
    DialogHost, MessageDialog, OpenResult, SurfaceFactory, WindowError, WindowManager,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Message of the dialog reporting a failed interactive open
pub const OPEN_FAILED_MESSAGE: &str = "Unable to open app";

/// Router errors
///
/// None of these are fatal; the host logs them and carries on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("Failed to encode reply: {0}")]
    Encode(String),

    #[error("Failed to deliver reply: {0}")]
    Reply(#[from] WindowError),
}

impl From<serde_json::Error> for RouterError {
    fn from(err: serde_json::Error) -> Self {
        RouterError::Encode(err.to_string())
    }
}

/// Where a request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOrigin {
    /// Requesting surface, `None` for the host (menu, startup)
    pub source: Option<SurfaceId>,
    /// Message replies are correlated to
    pub message_id: MessageId,
}

impl RequestOrigin {
    pub fn host() -> Self {
        Self {
            source: None,
            message_id: MessageId::new(),
        }
    }

    pub fn of(envelope: &MessageEnvelope) -> Self {
        Self {
            source: envelope.source,
            message_id: envelope.id,
        }
    }
}

/// What a dispatch did
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// An open was started (or an open surface focused)
    Opening(OpenResult),
    /// The about dialog was shown for this surface
    AboutShown(SurfaceId),
    /// Details were sent back to the requester
    DetailsSent(SurfaceId),
    /// The request concerns the focused app and none has focus
    NothingFocused,
    /// Details were requested by the host itself; there is nobody to answer
    NoRequester,
    /// The envelope did not decode
    Ignored(DecodeError),
}

/// Record of a routed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutedRequest {
    pub action: String,
    pub source: Option<SurfaceId>,
    pub handled: bool,
    pub timestamp_ns: u64,
}

/// Control-message router
pub struct ControlRouter {
    config: CoreConfig,
    /// Interactive opens whose failure has not been reported yet
    in_flight: Vec<OpenResult>,
    history: Vec<RoutedRequest>,
    next_timestamp: u64,
}

impl ControlRouter {
    /// Creates a router answering with facts from `config`
    pub fn new(config: CoreConfig) -> Self {
        Self {
            config,
            in_flight: Vec::new(),
            history: Vec::new(),
            next_timestamp: 0,
        }
    }

    /// Decodes and handles a message from a surface
    pub fn dispatch<P>(
        &mut self,
        windows: &mut WindowManager<P>,
        envelope: &MessageEnvelope,
    ) -> Result<DispatchOutcome, RouterError>
    where
        P: SurfaceFactory + DialogHost,
    {
        match ControlRequest::from_envelope(envelope) {
            Ok(request) => self.handle(windows, request, RequestOrigin::of(envelope)),
            Err(err) => {
                warn!(action = %envelope.action, error = %err, "ignoring control message");
                self.record(&envelope.action, envelope.source, false);
                Ok(DispatchOutcome::Ignored(err))
            }
        }
    }

    /// Handles an already-decoded request
    pub fn handle<P>(
        &mut self,
        windows: &mut WindowManager<P>,
        request: ControlRequest,
        origin: RequestOrigin,
    ) -> Result<DispatchOutcome, RouterError>
    where
        P: SurfaceFactory + DialogHost,
    {
        let action = request.action();
        debug!(action, source = ?origin.source, "routing control request");

        let outcome = match request {
            ControlRequest::OpenLauncher => {
                let pending = windows.open_launcher();
                self.track(pending.clone());
                DispatchOutcome::Opening(pending)
            }
            ControlRequest::OpenApp(lookup) => {
                info!(app = %lookup.name, source = %lookup.source, "open requested");
                let pending = if lookup.is_local() {
                    windows.open_local_app(&lookup.name)
                } else {
                    windows.open_official_app(&lookup.name, &lookup.source)
                };
                self.track(pending.clone());
                DispatchOutcome::Opening(pending)
            }
            ControlRequest::ShowAboutInfo => match windows.get_focused_app() {
                Some(handle) => {
                    let surface_id = handle.id();
                    let dialog = handle
                        .metadata()
                        .map(|app| about_dialog(&self.config, app).with_parent(surface_id));
                    match dialog {
                        Some(dialog) => {
                            windows.platform_mut().show_message(&dialog);
                            DispatchOutcome::AboutShown(surface_id)
                        }
                        None => DispatchOutcome::NothingFocused,
                    }
                }
                None => DispatchOutcome::NothingFocused,
            },
            ControlRequest::GetAppDetails => self.send_details(windows, origin)?,
        };

        let handled = !matches!(
            outcome,
            DispatchOutcome::NothingFocused | DispatchOutcome::NoRequester
        );
        self.record(action, origin.source, handled);
        self.reap_failures(windows);
        Ok(outcome)
    }

    fn send_details<P: SurfaceFactory>(
        &self,
        windows: &mut WindowManager<P>,
        origin: RequestOrigin,
    ) -> Result<DispatchOutcome, RouterError> {
        let Some(details) = windows
            .get_focused_app()
            .and_then(|handle| handle.metadata())
            .map(|app| AppDetails::new(&self.config, app))
        else {
            debug!("no focused app, not replying");
            return Ok(DispatchOutcome::NothingFocused);
        };

        let Some(requester) = origin.source else {
            warn!("app details requested without a requesting surface");
            return Ok(DispatchOutcome::NoRequester);
        };

        let reply = details.into_envelope(origin.message_id)?;
        windows.send_to(requester, &reply)?;
        Ok(DispatchOutcome::DetailsSent(requester))
    }

    fn track(&mut self, pending: OpenResult) {
        if !pending.is_settled() || pending.error().is_some() {
            self.in_flight.push(pending);
        }
    }

    /// Reports interactive opens that have failed since the last call
    ///
    /// Each failure is shown once as an error dialog; the host keeps running.
    /// Returns how many were reported.
    pub fn reap_failures<P: SurfaceFactory + DialogHost>(
        &mut self,
        windows: &mut WindowManager<P>,
    ) -> usize {
        let mut reported = 0;
        self.in_flight.retain(|pending| match pending.outcome() {
            None => true,
            Some(Ok(_)) => false,
            Some(Err(err)) => {
                error!(error = %err, "interactive open failed");
                let dialog = MessageDialog::error("Error", OPEN_FAILED_MESSAGE)
                    .with_detail(err.to_string());
                windows.platform_mut().show_message(&dialog);
                reported += 1;
                false
            }
        });
        reported
    }

    /// Number of opens still waiting on their surface
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Returns every request routed so far
    pub fn history(&self) -> &[RoutedRequest] {
        &self.history
    }

    fn record(&mut self, action: &str, source: Option<SurfaceId>, handled: bool) {
        let timestamp = self.next_timestamp;
        self.next_timestamp += 1;
        self.history.push(RoutedRequest {
            action: action.to_string(),
            source,
            handled,
            timestamp_ns: timestamp,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_catalog::AppCatalog;
    use ipc::{MessagePayload, CONTROL_SCHEMA_VERSION};
    use services_window_manager::FakePlatform;

    fn setup() -> (ControlRouter, WindowManager<FakePlatform>) {
        let config = CoreConfig::new("/home/user", "2.0.0");
        let windows = WindowManager::new(FakePlatform::new(), Box::new(AppCatalog::new()));
        (ControlRouter::new(config), windows)
    }

    #[test]
    fn test_unknown_action_is_ignored() {
        let (mut router, mut windows) = setup();
        let envelope =
            MessageEnvelope::new("reboot", CONTROL_SCHEMA_VERSION, MessagePayload::empty());

        let outcome = router.dispatch(&mut windows, &envelope).unwrap();
        assert!(matches!(
            outcome,
            DispatchOutcome::Ignored(DecodeError::UnknownAction(_))
        ));
        assert_eq!(router.history().len(), 1);
        assert!(!router.history()[0].handled);
        assert!(windows.platform().created().is_empty());
    }

    #[test]
    fn test_open_launcher_from_host() {
        let (mut router, mut windows) = setup();
        let outcome = router
            .handle(&mut windows, ControlRequest::OpenLauncher, RequestOrigin::host())
            .unwrap();

        assert!(matches!(outcome, DispatchOutcome::Opening(_)));
        assert_eq!(windows.platform().created().len(), 1);
        assert_eq!(router.in_flight(), 1);
        assert!(router.history()[0].handled);
    }

    #[test]
    fn test_about_without_focus_is_noop() {
        let (mut router, mut windows) = setup();
        let outcome = router
            .handle(&mut windows, ControlRequest::ShowAboutInfo, RequestOrigin::host())
            .unwrap();

        assert!(matches!(outcome, DispatchOutcome::NothingFocused));
        assert!(windows.platform().dialogs().is_empty());
    }

    #[test]
    fn test_router_error_from_window_error() {
        let id = SurfaceId::new();
        let err: RouterError = WindowError::SurfaceNotFound(id).into();
        assert_eq!(err, RouterError::Reply(WindowError::SurfaceNotFound(id)));
    }
}
