//! Command-line definition.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};

/// Inspect and change the dark-mode preference.
#[derive(Debug, Parser)]
#[command(name = "dusk", version, about)]
pub struct Cli {
    /// Explicit default used when nothing is persisted yet.
    #[arg(long, global = true, value_name = "BOOL")]
    pub default: Option<bool>,

    /// JSON file with reconciler options (default, storage_key, media_query,
    /// class_name). `--default` overrides the file's default.
    #[arg(long, global = true, env = "DUSK_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the preference files.
    #[arg(long, global = true, env = "DUSK_STORE_DIR", value_name = "PATH")]
    pub store_dir: Option<PathBuf>,

    /// Origin whose preference to use; each origin gets its own file.
    #[arg(long, global = true, default_value = "default")]
    pub origin: String,

    /// Print state as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Command {
    /// Show the current preference (default).
    Status,
    /// Flip the preference.
    Toggle,
    /// Turn dark mode on.
    Enable,
    /// Turn dark mode off.
    Disable,
    /// Print every change until interrupted.
    Watch {
        /// Polling interval in milliseconds.
        #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(10..))]
        interval_ms: u64,
    },
}

impl Command {
    pub fn interval(&self) -> Option<Duration> {
        match self {
            Self::Watch { interval_ms } => Some(Duration::from_millis(*interval_ms)),
            _ => None,
        }
    }
}

impl Cli {
    pub fn action(&self) -> Command {
        self.command.unwrap_or(Command::Status)
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn status_is_the_default_command() {
        let cli = Cli::try_parse_from(["dusk"]).unwrap();
        assert!(matches!(cli.action(), Command::Status));
        assert_eq!(cli.origin, "default");
        assert_eq!(cli.config, None);
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["dusk", "toggle", "--default", "true", "--json", "-vv"])
            .unwrap();
        assert!(matches!(cli.action(), Command::Toggle));
        assert_eq!(cli.default, Some(true));
        assert!(cli.json);
        assert_eq!(cli.log_filter(), "debug");
    }

    #[test]
    fn config_path() {
        let cli = Cli::try_parse_from(["dusk", "status", "--config", "dusk.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("dusk.json")));
    }

    #[test]
    fn watch_interval() {
        let cli = Cli::try_parse_from(["dusk", "watch", "--interval-ms", "250"]).unwrap();
        assert_eq!(cli.action().interval(), Some(Duration::from_millis(250)));

        assert!(Cli::try_parse_from(["dusk", "watch", "--interval-ms", "1"]).is_err());
    }
}
