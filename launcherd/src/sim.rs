//! # Simulated Shell
//!
//! A [`HostShell`] with no display. Surfaces come up immediately, focus and
//! close the way a desktop would, and user input comes from a
//! [`ControlScript`].

use crate::control_script::{ControlScript, ScriptTarget, ScriptedAction, ScriptedRequest};
use crate::shell::{HostShell, ShellEvent};
use core_types::{SurfaceId, SurfaceKey};
use ipc::{ControlRequest, MessageEnvelope, MessagePayload, CONTROL_SCHEMA_VERSION};
use services_app_menu::{Menu, MenuAction, MenuItemId};
use services_window_manager::{
    DialogHost, MessageDialog, SurfaceEvent, SurfaceFactory, SurfaceRef, SurfaceSpec,
};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Simulated GUI toolkit driven by a control script
pub struct SimShell {
    script: ControlScript,
    /// Live surfaces, oldest first
    surfaces: Vec<(SurfaceId, SurfaceKey)>,
    focused: Option<SurfaceId>,
    /// Toolkit events waiting to be delivered before the next script line
    queued: VecDeque<ShellEvent>,
    fail_next_create: Option<String>,
    menu: Option<Menu>,
    dev_tools: Vec<String>,
    dialogs: Vec<MessageDialog>,
    sent: Vec<(SurfaceId, MessageEnvelope)>,
    surface_actions: Vec<(SurfaceId, MenuAction)>,
}

impl SimShell {
    pub fn new(script: ControlScript) -> Self {
        Self {
            script,
            surfaces: Vec::new(),
            focused: None,
            queued: VecDeque::new(),
            fail_next_create: None,
            menu: None,
            dev_tools: Vec::new(),
            dialogs: Vec::new(),
            sent: Vec::new(),
            surface_actions: Vec::new(),
        }
    }

    pub fn menu(&self) -> Option<&Menu> {
        self.menu.as_ref()
    }

    pub fn dialogs(&self) -> &[MessageDialog] {
        &self.dialogs
    }

    pub fn sent(&self) -> &[(SurfaceId, MessageEnvelope)] {
        &self.sent
    }

    pub fn dev_tools(&self) -> &[String] {
        &self.dev_tools
    }

    pub fn surface_actions(&self) -> &[(SurfaceId, MenuAction)] {
        &self.surface_actions
    }

    /// Live surfaces, oldest first
    pub fn surfaces(&self) -> &[(SurfaceId, SurfaceKey)] {
        &self.surfaces
    }

    fn resolve(&self, target: &ScriptTarget) -> Option<SurfaceId> {
        self.surfaces
            .iter()
            .find(|(_, key)| match (target, key) {
                (ScriptTarget::Launcher, SurfaceKey::Launcher) => true,
                (ScriptTarget::App(name), SurfaceKey::App(identity)) => identity.name == *name,
                _ => false,
            })
            .map(|(id, _)| *id)
    }

    fn move_focus(&mut self, surface_id: SurfaceId) {
        if self.focused == Some(surface_id) {
            return;
        }
        if let Some(previous) = self.focused.take() {
            self.queued
                .push_back(ShellEvent::Surface(SurfaceEvent::Blurred(previous)));
        }
        self.focused = Some(surface_id);
        self.queued
            .push_back(ShellEvent::Surface(SurfaceEvent::Focused(surface_id)));
    }

    fn close_now(&mut self, surface_id: SurfaceId) {
        self.surfaces.retain(|(id, _)| *id != surface_id);
        if self.focused == Some(surface_id) {
            self.focused = None;
        }
        self.queued
            .push_back(ShellEvent::Surface(SurfaceEvent::Closed(surface_id)));
    }

    /// Turns a script line into toolkit events
    fn play(&mut self, action: ScriptedAction) {
        debug!(?action, "script");
        match action {
            ScriptedAction::Focus(target) => match self.resolve(&target) {
                Some(id) => self.move_focus(id),
                None => warn!(?target, "focus: no such surface"),
            },
            ScriptedAction::Blur(target) => match self.resolve(&target) {
                Some(id) => {
                    if self.focused == Some(id) {
                        self.focused = None;
                    }
                    self.queued
                        .push_back(ShellEvent::Surface(SurfaceEvent::Blurred(id)));
                }
                None => warn!(?target, "blur: no such surface"),
            },
            ScriptedAction::Close(target) => match self.resolve(&target) {
                Some(id) => self.close_now(id),
                None => warn!(?target, "close: no such surface"),
            },
            ScriptedAction::Send { from, request } => {
                if let Some(envelope) = self.envelope(&from, request) {
                    self.queued.push_back(ShellEvent::Message(envelope));
                }
            }
            ScriptedAction::Key(keys) => self.queued.push_back(ShellEvent::Accelerator(keys)),
            ScriptedAction::Menu(id) => self
                .queued
                .push_back(ShellEvent::MenuSelected(MenuItemId::new(id))),
            ScriptedAction::FailNextCreate(reason) => self.fail_next_create = Some(reason),
        }
    }

    fn envelope(&self, from: &ScriptTarget, request: ScriptedRequest) -> Option<MessageEnvelope> {
        let source = match from {
            ScriptTarget::Host => None,
            target => match self.resolve(target) {
                Some(id) => Some(id),
                None => {
                    warn!(?target, "send: no such surface");
                    return None;
                }
            },
        };

        let request = match request {
            ScriptedRequest::OpenLauncher => ControlRequest::OpenLauncher,
            ScriptedRequest::ShowAbout => ControlRequest::ShowAboutInfo,
            ScriptedRequest::GetAppDetails => ControlRequest::GetAppDetails,
            ScriptedRequest::OpenApp(lookup) => ControlRequest::OpenApp(lookup),
            ScriptedRequest::Raw(action) => {
                let envelope =
                    MessageEnvelope::new(action, CONTROL_SCHEMA_VERSION, MessagePayload::empty());
                return Some(with_source(envelope, source));
            }
        };

        match request.into_envelope() {
            Ok(envelope) => Some(with_source(envelope, source)),
            Err(err) => {
                warn!(error = %err, "send: cannot encode request");
                None
            }
        }
    }
}

fn with_source(envelope: MessageEnvelope, source: Option<SurfaceId>) -> MessageEnvelope {
    match source {
        Some(id) => envelope.with_source(id),
        None => envelope,
    }
}

impl SurfaceFactory for SimShell {
    fn create(&mut self, spec: &SurfaceSpec) -> Result<SurfaceRef, String> {
        let id = SurfaceId::new();
        self.surfaces.push((id, spec.key.clone()));
        match self.fail_next_create.take() {
            Some(reason) => {
                self.surfaces.retain(|(existing, _)| *existing != id);
                self.queued.push_back(ShellEvent::Surface(SurfaceEvent::CreationFailed {
                    surface_id: id,
                    reason,
                }));
            }
            None => {
                self.queued
                    .push_back(ShellEvent::Surface(SurfaceEvent::Ready(id)));
                self.move_focus(id);
            }
        }
        info!(surface = %id, title = %spec.title, "surface created");
        Ok(SurfaceRef::new(id))
    }

    fn focus(&mut self, surface: &SurfaceRef) {
        self.move_focus(surface.id());
    }

    fn close(&mut self, surface: &SurfaceRef) {
        if self.surfaces.iter().any(|(id, _)| *id == surface.id()) {
            self.close_now(surface.id());
        }
    }

    fn send(&mut self, surface: &SurfaceRef, message: &MessageEnvelope) {
        info!(surface = %surface.id(), action = %message.action, "message delivered");
        self.sent.push((surface.id(), message.clone()));
    }
}

impl DialogHost for SimShell {
    fn show_message(&mut self, dialog: &MessageDialog) {
        info!(
            title = %dialog.title,
            message = %dialog.message,
            detail = %dialog.detail,
            "dialog"
        );
        self.dialogs.push(dialog.clone());
    }
}

impl HostShell for SimShell {
    fn set_menu(&mut self, menu: &Menu) {
        self.menu = Some(menu.clone());
    }

    fn install_dev_tools(&mut self) -> Result<Vec<String>, String> {
        let added = vec!["react-devtools".to_string(), "redux-devtools".to_string()];
        self.dev_tools.extend(added.iter().cloned());
        Ok(added)
    }

    fn remove_dev_tools(&mut self) -> Result<usize, String> {
        let removed = self.dev_tools.len();
        self.dev_tools.clear();
        Ok(removed)
    }

    fn surface_action(&mut self, surface: &SurfaceRef, action: &MenuAction) {
        self.surface_actions.push((surface.id(), action.clone()));
    }

    fn next_event(&mut self) -> Option<ShellEvent> {
        loop {
            if let Some(event) = self.queued.pop_front() {
                return Some(event);
            }
            let action = self.script.next_action()?;
            self.play(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(script: &str) -> SimShell {
        SimShell::new(ControlScript::from_text(script).unwrap())
    }

    #[test]
    fn test_created_surface_reports_ready_and_focus() {
        let mut shell = SimShell::new(ControlScript::new());
        let surface = shell.create(&SurfaceSpec::launcher()).unwrap();

        assert!(matches!(
            shell.next_event(),
            Some(ShellEvent::Surface(SurfaceEvent::Ready(id))) if id == surface.id()
        ));
        assert!(matches!(
            shell.next_event(),
            Some(ShellEvent::Surface(SurfaceEvent::Focused(id))) if id == surface.id()
        ));
        assert!(shell.next_event().is_none());
    }

    #[test]
    fn test_focus_moves_with_blur() {
        let mut shell = shell("focus launcher");
        let launcher = shell.create(&SurfaceSpec::launcher()).unwrap();
        let mut other_spec = SurfaceSpec::launcher();
        other_spec.key = SurfaceKey::App(core_types::AppIdentity::new(
            "ble",
            core_types::AppSource::Local,
            "1.0",
        ));
        let ble = shell.create(&other_spec).unwrap();

        let events: Vec<ShellEvent> = std::iter::from_fn(|| shell.next_event()).collect();
        let surface_events: Vec<SurfaceEvent> = events
            .into_iter()
            .filter_map(|event| match event {
                ShellEvent::Surface(event) => Some(event),
                _ => None,
            })
            .collect();

        assert_eq!(
            surface_events,
            vec![
                SurfaceEvent::Ready(launcher.id()),
                SurfaceEvent::Focused(launcher.id()),
                SurfaceEvent::Ready(ble.id()),
                SurfaceEvent::Blurred(launcher.id()),
                SurfaceEvent::Focused(ble.id()),
                SurfaceEvent::Blurred(ble.id()),
                SurfaceEvent::Focused(launcher.id()),
            ]
        );
    }

    #[test]
    fn test_scripted_creation_failure() {
        let mut shell = shell("fail-next-create no gpu");
        // the script line is played before anything is created
        assert!(shell.next_event().is_none());

        let surface = shell.create(&SurfaceSpec::launcher()).unwrap();
        assert!(matches!(
            shell.next_event(),
            Some(ShellEvent::Surface(SurfaceEvent::CreationFailed { surface_id, reason }))
                if surface_id == surface.id() && reason == "no gpu"
        ));
        assert!(shell.surfaces().is_empty());
    }

    #[test]
    fn test_send_from_unknown_surface_is_dropped() {
        let mut shell = shell("send ble get-app-details\nkey Ctrl+Q");
        assert!(matches!(
            shell.next_event(),
            Some(ShellEvent::Accelerator(keys)) if keys == "Ctrl+Q"
        ));
    }

    #[test]
    fn test_send_from_host_has_no_source() {
        let mut shell = shell("send host action reboot");
        match shell.next_event() {
            Some(ShellEvent::Message(envelope)) => {
                assert_eq!(envelope.action, "reboot");
                assert!(envelope.source.is_none());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_dev_tools_round_trip() {
        let mut shell = SimShell::new(ControlScript::new());
        assert_eq!(shell.install_dev_tools().unwrap().len(), 2);
        assert_eq!(shell.remove_dev_tools(), Ok(2));
        assert!(shell.dev_tools().is_empty());
    }
}
