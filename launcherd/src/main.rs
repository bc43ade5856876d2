//! # Launcher Host Daemon
//!
//! Main entry point for the launcher host.

use app_catalog::DirectoryCatalog;
use launcherd::{
    parse_args, print_usage, ControlScript, HostExit, HostRuntime, HostRuntimeConfig,
    HostRuntimeError, LaunchOptions, SimShell,
};
use std::env;
use std::path::PathBuf;
use std::process;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("launcherd");

    let options = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        print_usage(program);
        process::exit(1);
    });
    if options.help {
        print_usage(program);
        return;
    }

    init_logging(options.log_level.as_deref());

    match launch(options) {
        Ok(exit) if exit.is_success() => {}
        Ok(_) => process::exit(1),
        Err(e) => {
            error!(error = %e, "host runtime failed");
            process::exit(1);
        }
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn launch(options: LaunchOptions) -> Result<HostExit, HostRuntimeError> {
    let home = env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let core_path = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let core = options
        .core_config(home, env!("CARGO_PKG_VERSION"))
        .with_core_path(core_path);

    let script = match &options.script {
        Some(text) => ControlScript::from_text(text)?,
        None => ControlScript::new(),
    };
    let discovery = Box::new(DirectoryCatalog::from_config(&core));
    let config = HostRuntimeConfig::new(core).with_max_steps(options.max_steps);

    let mut runtime = HostRuntime::new(config, SimShell::new(script), discovery);
    runtime.run()
}
