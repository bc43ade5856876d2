//! # Host Runtime
//!
//! The event loop that ties the window manager, the router and the menu to
//! a GUI toolkit.

use crate::control_script::ControlScriptError;
use crate::shell::{HostShell, ShellEvent};
use app_catalog::{init_apps_directory, AppDiscovery};
use control_router::{ControlRouter, RequestOrigin};
use core_types::{CoreConfig, StartupTarget};
use services_app_menu::{build_app_menu, HostAction, Menu, MenuAction};
use services_window_manager::{
    MessageDialog, OpenResult, SurfaceEvent, WindowError, WindowManager,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Title of the dialog shown when the startup open fails
pub const STARTUP_ERROR_TITLE: &str = "Initialization error";

/// Message of the dialog shown when the startup open fails
pub const STARTUP_ERROR_MESSAGE: &str = "Error when starting application";

/// Host runtime error types
#[derive(Debug, Error)]
pub enum HostRuntimeError {
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    #[error("Script error: {0}")]
    Script(#[from] ControlScriptError),
}

/// Host runtime configuration
#[derive(Debug, Clone)]
pub struct HostRuntimeConfig {
    /// Parsed startup configuration
    pub core: CoreConfig,
    /// Maximum steps to run (0 = unlimited)
    pub max_steps: usize,
}

impl HostRuntimeConfig {
    pub fn new(core: CoreConfig) -> Self {
        Self { core, max_steps: 0 }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

/// Why the runtime stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostExit {
    /// Quit was requested from the menu
    Quit,
    /// The last surface closed
    AllSurfacesClosed,
    /// The startup open failed; the error dialog has been shown
    StartupFailed(String),
    /// `max_steps` was reached
    StepLimit,
    /// The toolkit has no more events
    EventsExhausted,
}

impl HostExit {
    /// Whether the process should exit with a success status
    pub fn is_success(&self) -> bool {
        !matches!(self, HostExit::StartupFailed(_))
    }
}

/// Host runtime
pub struct HostRuntime<S: HostShell> {
    config: HostRuntimeConfig,
    windows: WindowManager<S>,
    router: ControlRouter,
    menu: Menu,
    /// The startup open, until it settles
    startup: Option<OpenResult>,
    started: bool,
    exit: Option<HostExit>,
    steps: usize,
}

impl<S: HostShell> HostRuntime<S> {
    /// Creates a runtime on top of `shell`
    ///
    /// Nothing is shown until [`HostRuntime::start`] (or [`HostRuntime::run`]).
    pub fn new(config: HostRuntimeConfig, shell: S, discovery: Box<dyn AppDiscovery>) -> Self {
        let router = ControlRouter::new(config.core.clone());
        Self {
            windows: WindowManager::new(shell, discovery),
            router,
            menu: build_app_menu(),
            startup: None,
            started: false,
            exit: None,
            steps: 0,
            config,
        }
    }

    /// Runs the startup sequence
    ///
    /// Developer tooling and the menu are installed, the apps directory is
    /// created, then the single startup surface is opened. A failure of the
    /// directory setup or of the open ends the run with
    /// [`HostExit::StartupFailed`].
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        info!(version = %self.config.core.version(), "host starting");

        if self.config.core.install_dev_tools() {
            match self.windows.platform_mut().install_dev_tools() {
                Ok(added) => info!(?added, "developer tools installed"),
                Err(err) => warn!(error = %err, "failed to install developer tools"),
            }
        }
        if self.config.core.remove_dev_tools() {
            match self.windows.platform_mut().remove_dev_tools() {
                Ok(removed) => info!(removed, "developer tools removed"),
                Err(err) => warn!(error = %err, "failed to remove developer tools"),
            }
        }

        self.windows.platform_mut().set_menu(&self.menu);

        if let Err(err) = init_apps_directory(&self.config.core) {
            self.fail_startup(&err.to_string());
            return;
        }

        let target = self.config.core.startup_target();
        info!(?target, "opening startup surface");
        let pending = match target {
            StartupTarget::OfficialApp { name, source } => {
                self.windows.open_official_app(&name, &source)
            }
            StartupTarget::LocalApp { name } => self.windows.open_local_app(&name),
            StartupTarget::Launcher => self.windows.open_launcher(),
        };
        self.startup = Some(pending);
        self.check_startup();
    }

    /// Runs until the host exits
    pub fn run(&mut self) -> Result<HostExit, HostRuntimeError> {
        self.start();

        loop {
            if let Some(exit) = &self.exit {
                info!(?exit, steps = self.steps, "host stopped");
                return Ok(exit.clone());
            }
            if self.config.max_steps > 0 && self.steps >= self.config.max_steps {
                self.exit = Some(HostExit::StepLimit);
                continue;
            }
            if !self.step()? {
                self.exit = Some(HostExit::EventsExhausted);
            }
        }
    }

    /// Handles one toolkit event
    ///
    /// Returns `false` when the toolkit has nothing left to report.
    pub fn step(&mut self) -> Result<bool, HostRuntimeError> {
        let Some(event) = self.windows.platform_mut().next_event() else {
            return Ok(false);
        };
        self.steps += 1;
        self.handle_shell_event(event)?;
        Ok(true)
    }

    fn handle_shell_event(&mut self, event: ShellEvent) -> Result<(), HostRuntimeError> {
        match event {
            ShellEvent::Surface(event) => {
                let closed = matches!(event, SurfaceEvent::Closed(_));
                if let Err(err) = self.windows.handle_event(event) {
                    error!(error = %err, "surface registry invariant violated");
                    return Err(err.into());
                }
                self.check_startup();
                self.router.reap_failures(&mut self.windows);

                if closed && self.exit.is_none() && self.startup.is_none() && self.windows.is_idle()
                {
                    info!("all surfaces closed");
                    self.exit = Some(HostExit::AllSurfacesClosed);
                }
            }
            ShellEvent::Message(envelope) => {
                if let Err(err) = self.router.dispatch(&mut self.windows, &envelope) {
                    warn!(action = %envelope.action, error = %err, "control request failed");
                }
            }
            ShellEvent::Accelerator(keys) => match self.menu.find_by_accelerator(&keys) {
                Some(item) => {
                    let action = item.action.clone();
                    self.perform(action);
                }
                None => debug!(%keys, "no menu item for accelerator"),
            },
            ShellEvent::MenuSelected(id) => match self.menu.find(id.as_str()) {
                Some(item) if item.enabled => {
                    let action = item.action.clone();
                    self.perform(action);
                }
                Some(_) => debug!(item = %id.as_str(), "menu item disabled"),
                None => warn!(item = %id.as_str(), "unknown menu item"),
            },
        }
        Ok(())
    }

    /// Carries out a menu action
    fn perform(&mut self, action: MenuAction) {
        match action {
            MenuAction::Control(request) => {
                if let Err(err) = self
                    .router
                    .handle(&mut self.windows, request, RequestOrigin::host())
                {
                    warn!(error = %err, "menu request failed");
                }
            }
            MenuAction::Host(HostAction::Quit) => {
                info!("quit requested");
                self.exit = Some(HostExit::Quit);
            }
            MenuAction::Host(HostAction::CloseSurface) => {
                let Some(surface_id) = self.windows.focused_surface().map(|handle| handle.id())
                else {
                    debug!("nothing focused to close");
                    return;
                };
                if let Err(err) = self.windows.close_surface(surface_id) {
                    warn!(surface = %surface_id, error = %err, "close failed");
                }
            }
            other => {
                let applied = self
                    .windows
                    .with_focused_surface(|shell, surface| shell.surface_action(surface, &other));
                if applied.is_none() {
                    debug!(action = ?other, "no focused surface for menu action");
                }
            }
        }
    }

    /// Settles the startup open once its result is known
    fn check_startup(&mut self) {
        let Some(outcome) = self.startup.as_ref().and_then(|pending| pending.outcome()) else {
            return;
        };
        self.startup = None;
        match outcome {
            Ok(surface_id) => info!(surface = %surface_id, "startup surface ready"),
            Err(err) => self.fail_startup(&err.to_string()),
        }
    }

    fn fail_startup(&mut self, detail: &str) {
        error!(error = %detail, "startup failed");
        let dialog =
            MessageDialog::error(STARTUP_ERROR_TITLE, STARTUP_ERROR_MESSAGE).with_detail(detail);
        self.windows.platform_mut().show_message(&dialog);
        self.exit = Some(HostExit::StartupFailed(detail.to_string()));
    }

    pub fn config(&self) -> &HostRuntimeConfig {
        &self.config
    }

    pub fn windows(&self) -> &WindowManager<S> {
        &self.windows
    }

    pub fn router(&self) -> &ControlRouter {
        &self.router
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn shell(&self) -> &S {
        self.windows.platform()
    }

    /// Why the runtime stopped, if it has
    pub fn exit(&self) -> Option<&HostExit> {
        self.exit.as_ref()
    }

    /// Number of toolkit events handled
    pub fn steps(&self) -> usize {
        self.steps
    }
}
