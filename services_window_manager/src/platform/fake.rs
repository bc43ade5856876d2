//! Fake platform implementation for testing
//!
//! Records every request the window manager makes. Nothing happens on its
//! own: tests feed [`SurfaceEvent`](super::SurfaceEvent)s back by hand.

use super::{DialogHost, MessageDialog, SurfaceFactory, SurfaceSpec};
use crate::handle::SurfaceRef;
use core_types::SurfaceId;
use ipc::MessageEnvelope;

/// Fake platform for testing
#[derive(Debug, Default)]
pub struct FakePlatform {
    created: Vec<(SurfaceId, SurfaceSpec)>,
    focused: Vec<SurfaceId>,
    closed: Vec<SurfaceId>,
    sent: Vec<(SurfaceId, MessageEnvelope)>,
    dialogs: Vec<MessageDialog>,
    fail_next_create: Option<String>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `create` call fail with `reason`
    pub fn fail_next_create(&mut self, reason: impl Into<String>) {
        self.fail_next_create = Some(reason.into());
    }

    /// Surfaces created so far, oldest first
    pub fn created(&self) -> &[(SurfaceId, SurfaceSpec)] {
        &self.created
    }

    pub fn last_created(&self) -> Option<SurfaceId> {
        self.created.last().map(|(id, _)| *id)
    }

    /// Surfaces brought to the front, in call order
    pub fn focus_requests(&self) -> &[SurfaceId] {
        &self.focused
    }

    pub fn close_requests(&self) -> &[SurfaceId] {
        &self.closed
    }

    pub fn sent(&self) -> &[(SurfaceId, MessageEnvelope)] {
        &self.sent
    }

    pub fn dialogs(&self) -> &[MessageDialog] {
        &self.dialogs
    }
}

impl SurfaceFactory for FakePlatform {
    fn create(&mut self, spec: &SurfaceSpec) -> Result<SurfaceRef, String> {
        if let Some(reason) = self.fail_next_create.take() {
            return Err(reason);
        }
        let id = SurfaceId::new();
        self.created.push((id, spec.clone()));
        Ok(SurfaceRef::new(id))
    }

    fn focus(&mut self, surface: &SurfaceRef) {
        self.focused.push(surface.id());
    }

    fn close(&mut self, surface: &SurfaceRef) {
        self.closed.push(surface.id());
    }

    fn send(&mut self, surface: &SurfaceRef, message: &MessageEnvelope) {
        self.sent.push((surface.id(), message.clone()));
    }
}

impl DialogHost for FakePlatform {
    fn show_message(&mut self, dialog: &MessageDialog) {
        self.dialogs.push(dialog.clone());
    }
}
