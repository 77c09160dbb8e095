//! Command line and RON file configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use review_core::LocateThresholds;
use review_engine::EngineConfig;
use serde::Deserialize;

use super::logging::LogDestination;

const DEFAULT_STATE_FILE: &str = "./workbench_state.ron";

#[derive(Debug, Parser)]
#[command(name = "workbench")]
#[command(about = "Review extracted document fields against the scanned source", long_about = None)]
pub struct Cli {
    /// RON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Extraction backend base URL
    #[arg(long)]
    pub backend: Option<String>,

    /// File holding accept/reject decisions and review timers
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Directory with one `<document stem>.txt` per document, searched by locate
    #[arg(long)]
    pub text: Option<PathBuf>,

    /// Where log output goes
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,

    /// Document to open at startup
    pub document: Option<String>,
}

/// Optional settings read from the `--config` file. Unset fields keep the
/// engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub backend_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub start_timeout_secs: Option<u64>,
    pub max_document_bytes: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub settle_delay_ms: Option<u64>,
    pub stop_polling_on_start_error: Option<bool>,
    pub render_settle_ms: Option<u64>,
    pub disable_below: Option<f64>,
    pub reliable_at: Option<f64>,
    pub state_file: Option<PathBuf>,
    pub download_dir: Option<PathBuf>,
    pub text_dir: Option<PathBuf>,
    pub log: Option<LogDestination>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub thresholds: LocateThresholds,
    pub text_dir: Option<PathBuf>,
    pub document: Option<String>,
    pub log: LogDestination,
}

pub fn load(cli: &Cli) -> anyhow::Result<AppConfig> {
    let file = match &cli.config {
        Some(path) => read_file_config(path)?,
        None => FileConfig::default(),
    };
    Ok(resolve(file, cli))
}

fn read_file_config(path: &Path) -> anyhow::Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    ron::from_str(&content).with_context(|| format!("parsing config file {}", path.display()))
}

/// Applies file values over the defaults, then command line flags over both.
pub fn resolve(file: FileConfig, cli: &Cli) -> AppConfig {
    let mut engine = EngineConfig::default();
    engine.clock = Arc::new(|| Utc::now().timestamp_millis());

    let backend = &mut engine.backend;
    if let Some(url) = cli.backend.clone().or(file.backend_url) {
        backend.base_url = url;
    }
    if let Some(secs) = file.connect_timeout_secs {
        backend.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.request_timeout_secs {
        backend.request_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.start_timeout_secs {
        backend.start_timeout = Some(Duration::from_secs(secs));
    }
    if let Some(bytes) = file.max_document_bytes {
        backend.max_document_bytes = bytes;
    }

    let tracker = &mut engine.tracker;
    if let Some(ms) = file.poll_interval_ms {
        tracker.poll_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = file.settle_delay_ms {
        tracker.settle_delay = Duration::from_millis(ms);
    }
    if let Some(stop) = file.stop_polling_on_start_error {
        tracker.stop_polling_on_start_error = stop;
    }
    if let Some(ms) = file.render_settle_ms {
        engine.locator.render_settle = Duration::from_millis(ms);
    }

    engine.state_file = Some(
        cli.state_file
            .clone()
            .or(file.state_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
    );
    if let Some(dir) = file.download_dir {
        engine.download_dir = dir;
    }

    let mut thresholds = LocateThresholds::default();
    if let Some(value) = file.disable_below {
        thresholds.disable_below = value;
    }
    if let Some(value) = file.reliable_at {
        thresholds.reliable_at = value;
    }

    AppConfig {
        engine,
        thresholds,
        text_dir: cli.text.clone().or(file.text_dir),
        document: cli.document.clone(),
        log: cli.log.or(file.log).unwrap_or_default(),
    }
}
