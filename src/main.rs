mod aggregate;
mod gateway;
mod import;
mod models;
mod run;
mod session;
mod settings;
mod store;
mod ui;

use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use settings::{Backend, Settings};

const LOG_ENV: &str = "APBDUI_LOG";

fn main() -> Result<()> {
    let mut args: Vec<String> = std::env::args().collect();
    let explicit_config = take_flag(&mut args, "--config").map(PathBuf::from);

    let proj_dirs = directories::ProjectDirs::from("id", "apbd", "apbdui")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    let settings = Settings::load(Some(proj_dirs.config_dir()), explicit_config.as_deref())?;
    init_logging(data_dir, &settings.log_level)?;

    let store = open_store(&settings, data_dir)?;
    let mut gateway = gateway::Gateway::new(store);
    let auth = session::Authenticator::from_settings(&settings.auth);
    tracing::info!(store = %gateway.describe(), "starting");

    match args.len() {
        1 => run::as_tui(&mut gateway, auth),
        _ => run::as_cli(&args, &mut gateway, &auth),
    }
}

/// Remove `flag value` from `args` and return the value.
fn take_flag(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    if pos + 1 >= args.len() {
        args.remove(pos);
        return None;
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Some(value)
}

/// The TUI owns the terminal, so log lines go to `apbdui.log` in the data directory.
fn init_logging(data_dir: &Path, level: &str) -> Result<()> {
    let log_path = data_dir.join("apbdui.log");
    let file = File::options()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("apbdui={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn open_store(settings: &Settings, data_dir: &Path) -> Result<Box<dyn store::RecordStore>> {
    match settings.backend {
        Backend::Local => {
            let path = settings
                .local
                .path
                .clone()
                .unwrap_or_else(|| data_dir.join("apbdui.db"));
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
            Ok(Box::new(store::SqliteStore::open(&path)?))
        }
        Backend::Remote => Ok(Box::new(
            store::RestStore::new(&settings.remote).context("Invalid remote settings")?,
        )),
    }
}
