use std::{path::PathBuf, time::Duration};

use crate::colony::grid::GridLayout;

const DEFAULT_ADDR: &str = "127.0.0.1:9100";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Runtime settings for the server binary.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub addr: String,
    pub balance_path: PathBuf,
    pub save_path: PathBuf,
    pub frame: Duration,
    /// Frames between two broadcast snapshots.
    pub snapshot_every: u32,
    pub log_format: LogFormat,
    pub layout: GridLayout,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            balance_path: PathBuf::from("balance.json"),
            save_path: PathBuf::from("save.json"),
            frame: Duration::from_millis(16),
            snapshot_every: 6,
            log_format: LogFormat::Pretty,
            layout: GridLayout::default(),
        }
    }
}

impl Settings {
    /// The first CLI argument wins over `COLONY_ADDR` for the listen address.
    pub fn from_env() -> Self {
        Self::from_lookup(std::env::args().nth(1), |key| std::env::var(key).ok())
    }

    pub fn from_lookup(arg: Option<String>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let frame_ms = parse_or(&lookup, "COLONY_FRAME_MS", 16u64).max(1);
        let snapshot_every = parse_or(&lookup, "COLONY_SNAPSHOT_EVERY", defaults.snapshot_every).max(1);
        let log_format = match lookup("COLONY_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self {
            addr: arg
                .or_else(|| lookup("COLONY_ADDR"))
                .unwrap_or(defaults.addr),
            balance_path: lookup("COLONY_BALANCE")
                .map(PathBuf::from)
                .unwrap_or(defaults.balance_path),
            save_path: lookup("COLONY_SAVE")
                .map(PathBuf::from)
                .unwrap_or(defaults.save_path),
            frame: Duration::from_millis(frame_ms),
            snapshot_every,
            log_format,
            layout: defaults.layout,
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}", key, raw);
            default
        }),
        None => default,
    }
}
