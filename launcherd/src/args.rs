//! Command-line parsing

use core_types::CoreConfig;
use std::fs;
use std::path::PathBuf;

/// Options given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    pub home_dir: Option<PathBuf>,
    pub user_data_dir: Option<PathBuf>,
    pub apps_root_dir: Option<PathBuf>,
    pub official_app: Option<String>,
    pub local_app: Option<String>,
    pub source: Option<String>,
    pub install_dev_tools: bool,
    pub remove_dev_tools: bool,
    /// Contents of the `--script` file
    pub script: Option<String>,
    /// Maximum steps to run (0 = unlimited)
    pub max_steps: usize,
    /// Tracing filter directive, e.g. `debug` or `launcherd=trace`
    pub log_level: Option<String>,
    pub help: bool,
}

impl LaunchOptions {
    /// Builds the startup configuration
    ///
    /// `fallback_home` is used when `--home-dir` was not given.
    pub fn core_config(&self, fallback_home: impl Into<PathBuf>, version: &str) -> CoreConfig {
        let home = self
            .home_dir
            .clone()
            .unwrap_or_else(|| fallback_home.into());
        let mut config = CoreConfig::new(home, version)
            .with_dev_tools(self.install_dev_tools, self.remove_dev_tools);

        if let Some(dir) = &self.apps_root_dir {
            config = config.with_apps_root_dir(dir);
        }
        if let Some(dir) = &self.user_data_dir {
            config = config.with_user_data_dir(dir);
        }
        if let Some(name) = &self.official_app {
            config = config.with_official_app(name);
        }
        if let Some(name) = &self.local_app {
            config = config.with_local_app(name);
        }
        if let Some(source) = &self.source {
            config = config.with_source_name(source);
        }
        config
    }
}

/// Parses `args` (program name first)
///
/// The `--script` file is read here so that a missing file is reported as a
/// usage error.
pub fn parse_args(args: &[String]) -> Result<LaunchOptions, String> {
    let mut options = LaunchOptions::default();
    let mut i = 1;

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--home-dir" => options.home_dir = Some(value(args, &mut i, flag)?.into()),
            "--user-data-dir" => options.user_data_dir = Some(value(args, &mut i, flag)?.into()),
            "--apps-root-dir" => options.apps_root_dir = Some(value(args, &mut i, flag)?.into()),
            "--open-official-app" => {
                options.official_app = Some(value(args, &mut i, flag)?.to_string())
            }
            "--open-local-app" => options.local_app = Some(value(args, &mut i, flag)?.to_string()),
            "--source" => options.source = Some(value(args, &mut i, flag)?.to_string()),
            "--install-dev-tools" => options.install_dev_tools = true,
            "--remove-dev-tools" => options.remove_dev_tools = true,
            "--script" | "-s" => {
                let script_path = value(args, &mut i, flag)?;
                let script_text = fs::read_to_string(script_path)
                    .map_err(|e| format!("Failed to read script file: {}", e))?;
                options.script = Some(script_text);
            }
            "--max-steps" => {
                let raw = value(args, &mut i, flag)?;
                options.max_steps = raw
                    .parse()
                    .map_err(|_| format!("Invalid max-steps value: {}", raw))?;
            }
            "--log-level" => options.log_level = Some(value(args, &mut i, flag)?.to_string()),
            "--help" | "-h" => options.help = true,
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    Ok(options)
}

fn value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("Missing value for {}", flag))
}

pub fn print_usage(program: &str) {
    eprintln!("Usage: {} [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --home-dir <DIR>            Home directory (default: $HOME)");
    eprintln!("  --user-data-dir <DIR>       Per-user data directory");
    eprintln!("  --apps-root-dir <DIR>       Directory holding installed apps");
    eprintln!("  --open-official-app <NAME>  Open an official app instead of the launcher");
    eprintln!("  --open-local-app <NAME>     Open a local app instead of the launcher");
    eprintln!("  --source <NAME>             Source of the official app (default: official)");
    eprintln!("  --install-dev-tools         Install developer tools on start");
    eprintln!("  --remove-dev-tools          Remove developer tools on start");
    eprintln!("  -s, --script <FILE>         Control script (simulation mode)");
    eprintln!("  --max-steps <N>             Maximum steps to run (0 = unlimited)");
    eprintln!("  --log-level <FILTER>        Log filter (default: $RUST_LOG or info)");
    eprintln!("  -h, --help                  Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} --script demos/open_app.lcs", program);
    eprintln!("  {} --open-official-app pc-ble-driver --log-level debug", program);
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::StartupTarget;
    use std::path::Path;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("launcherd")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_no_arguments() {
        let options = parse_args(&args(&[])).unwrap();
        assert_eq!(options, LaunchOptions::default());
    }

    #[test]
    fn test_directories_and_apps() {
        let options = parse_args(&args(&[
            "--home-dir",
            "/home/me",
            "--apps-root-dir",
            "/opt/apps",
            "--open-official-app",
            "ble",
            "--source",
            "beta",
        ]))
        .unwrap();

        let config = options.core_config("/unused", "1.2.3");
        assert_eq!(config.home_dir(), Path::new("/home/me"));
        assert_eq!(config.apps_root_dir(), Path::new("/opt/apps"));
        assert_eq!(config.version(), "1.2.3");
        assert_eq!(
            config.startup_target(),
            StartupTarget::OfficialApp {
                name: "ble".to_string(),
                source: "beta".to_string()
            }
        );
    }

    #[test]
    fn test_fallback_home() {
        let options = parse_args(&args(&["--open-local-app", "mine"])).unwrap();
        let config = options.core_config("/home/fallback", "1.0.0");
        assert_eq!(config.home_dir(), Path::new("/home/fallback"));
        assert_eq!(
            config.startup_target(),
            StartupTarget::LocalApp {
                name: "mine".to_string()
            }
        );
    }

    #[test]
    fn test_flags() {
        let options = parse_args(&args(&[
            "--install-dev-tools",
            "--max-steps",
            "50",
            "--log-level",
            "debug",
            "-h",
        ]))
        .unwrap();
        assert!(options.install_dev_tools);
        assert!(!options.remove_dev_tools);
        assert_eq!(options.max_steps, 50);
        assert_eq!(options.log_level.as_deref(), Some("debug"));
        assert!(options.help);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            parse_args(&args(&["--home-dir"])),
            Err("Missing value for --home-dir".to_string())
        );
        assert_eq!(
            parse_args(&args(&["--max-steps", "many"])),
            Err("Invalid max-steps value: many".to_string())
        );
        assert_eq!(
            parse_args(&args(&["--frobnicate"])),
            Err("Unknown option: --frobnicate".to_string())
        );
        assert!(parse_args(&args(&["--script", "/no/such/script.lcs"])).is_err());
    }
}
