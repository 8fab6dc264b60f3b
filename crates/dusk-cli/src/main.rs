//! `dusk`: inspect and change the dark-mode preference from the terminal.
//!
//! ```text
//! dusk                  show the current preference
//! dusk toggle           flip it
//! dusk enable|disable   set it
//! dusk watch            follow OS and store changes
//! ```
//!
//! Preferences live in `<config dir>/dusk/<origin>.json` unless `--store-dir`
//! or `DUSK_STORE_DIR` says otherwise. `--config` loads reconciler options
//! from a JSON file.

mod cli;
mod report;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dusk::{
    DarkMode, DarkModeOptions, FileStore, OsColorScheme, PreferenceStore, UnavailableStore,
};

use cli::{Cli, Command};
use report::Report;

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp(None)
        .init();

    let options = load_options(&cli)?;
    let store = open_store(&cli)?;
    let os = OsColorScheme::new();
    let dark_mode = DarkMode::with_options(options, store, os.clone());
    log::info!(
        "resolved dark mode {} from {}",
        dark_mode.is_dark_mode(),
        dark_mode.seed().source
    );

    match cli.action() {
        Command::Status => {}
        Command::Toggle => dark_mode.toggle(),
        Command::Enable => dark_mode.enable(),
        Command::Disable => dark_mode.disable(),
        command @ Command::Watch { .. } => {
            let interval = command.interval().unwrap_or(OsColorScheme::DEFAULT_POLL_INTERVAL);
            watch(&dark_mode, &os, interval, cli.json);
        }
    }

    println!("{}", Report::new(&dark_mode).render(cli.json));
    Ok(())
}

fn load_options(cli: &Cli) -> Result<DarkModeOptions> {
    let options = match &cli.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => DarkModeOptions::new(),
    };

    Ok(match cli.default {
        Some(value) => options.default_value(value),
        None => options,
    })
}

fn open_store(cli: &Cli) -> Result<Box<dyn PreferenceStore>> {
    let dir = match &cli.store_dir {
        Some(dir) => dir.clone(),
        None => match default_store_dir() {
            Some(dir) => dir,
            None => {
                log::warn!("no config directory available; preference will not be saved");
                return Ok(Box::new(UnavailableStore::new("no config directory")));
            }
        },
    };

    if dir.exists() && !dir.is_dir() {
        anyhow::bail!("store path {} is not a directory", dir.display());
    }
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create store directory {}", dir.display()))?;

    let store = FileStore::new(&dir, &cli.origin);
    log::debug!("using preference file {}", store.path().display());
    Ok(Box::new(store))
}

fn default_store_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push("dusk");
        path
    })
}

/// Print the state on every change. Never returns; stop with Ctrl-C.
fn watch(dark_mode: &DarkMode, os: &OsColorScheme, interval: Duration, json: bool) -> ! {
    println!("{}", Report::new(dark_mode).render(json));

    let class_name = dark_mode.options().class_name.clone();
    let seeded_from = dark_mode.seed().source;
    let _sub = dark_mode.subscribe(move |state| {
        println!("{}", Report::from_parts(*state, &class_name, seeded_from).render(json));
    });
    let _watcher = os.watch(interval);

    loop {
        thread::sleep(interval);
        dark_mode.refresh();
    }
}
