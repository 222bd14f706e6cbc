// ===============================
// src/config.rs
// ===============================
/*
=============================================================================
Project : channel_budget — multi-channel marketing budget calculator in Rust
Module  : config.rs
Version : 0.1.0
Author  : Kukuh Tripamungkas Wicaksono (Kukuh TW)
Email   : kukuhtw@gmail.com
WhatsApp: https://wa.me/628129893706
LinkedIn: https://id.linkedin.com/in/kukuhtw
License : MIT (see LICENSE)

Summary : Splits a monthly budget across advertising channels, estimates
          clicks / conversions / CPA per channel and in aggregate, warns
          when allocations do not sum to 100%, and exposes the figures as
          a text/JSON report or Prometheus metrics.

(c) 2025 Kukuh TW. All rights reserved where applicable.
=============================================================================
*/
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use thiserror::Error;

use crate::domain::{seed_channels, Channel, ChannelId, DEFAULT_TOTAL_BUDGET};

pub const DEFAULT_METRICS_PORT: u16 = 9899;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read channels file {path:?}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("parse channels file {path:?}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("channel {0} has an empty name")]
    EmptyName(ChannelId),
    #[error("duplicate channel id {0}")]
    DuplicateId(ChannelId),
    #[error("invalid override {0:?}, expected ID=PERCENT")]
    InvalidOverride(String),
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
}

// ===== CLI =====
#[derive(Debug, Parser)]
#[command(name = "channel_budget", about = "Multi-channel marketing budget calculator")]
pub struct Cli {
    /// Total monthly budget (overrides TOTAL_BUDGET)
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub budget: Option<String>,

    /// JSON array of channels (overrides CHANNELS_FILE)
    #[arg(long, global = true)]
    pub channels_file: Option<PathBuf>,

    /// Allocation override, e.g. `--set 2=35` (repeatable)
    #[arg(long = "set", value_name = "ID=PERCENT", global = true)]
    pub overrides: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print per-channel and summary metrics (default)
    Report {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Publish metrics and serve them over HTTP (Prometheus text format)
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Report { format: Format::Text }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

// ===== Env config =====
#[derive(Clone, Debug)]
pub struct Settings {
    pub total_budget: f64,
    pub channels_file: Option<PathBuf>,
    pub metrics_port: u16,
    pub log_level: String,
}

pub fn load() -> Settings {
    // .env opsional
    let _ = dotenv();

    let total_budget = env::var("TOTAL_BUDGET")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_TOTAL_BUDGET);
    let channels_file = env::var("CHANNELS_FILE")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);
    let metrics_port = env::var("METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_METRICS_PORT);
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    Settings { total_budget, channels_file, metrics_port, log_level }
}

impl Settings {
    /// Flag CLI menimpa nilai dari env.
    pub fn merge_cli(mut self, cli: &Cli) -> Result<Self, ConfigError> {
        if let Some(raw) = &cli.budget {
            self.total_budget = parse_amount(raw)?;
        }
        if let Some(path) = &cli.channels_file {
            self.channels_file = Some(path.clone());
        }
        if let Some(Command::Serve { port: Some(port) }) = &cli.command {
            self.metrics_port = *port;
        }
        Ok(self)
    }

    pub fn channels(&self) -> Result<Vec<Channel>, ConfigError> {
        match &self.channels_file {
            Some(path) => load_channels(path),
            None => Ok(seed_channels()),
        }
    }
}

/// Reads and validates a JSON array of channels.
pub fn load_channels(path: &Path) -> Result<Vec<Channel>, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    let channels: Vec<Channel> = serde_json::from_str(&raw)
        .map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })?;
    validate_channels(&channels)?;
    Ok(channels)
}

pub fn validate_channels(channels: &[Channel]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for ch in channels {
        if ch.name.trim().is_empty() {
            return Err(ConfigError::EmptyName(ch.id));
        }
        if !seen.insert(ch.id) {
            return Err(ConfigError::DuplicateId(ch.id));
        }
    }
    Ok(())
}

/// Konversi input mentah seperti field number di form: kosong = 0.
pub fn parse_amount(raw: &str) -> Result<f64, ConfigError> {
    let t = raw.trim();
    if t.is_empty() {
        return Ok(0.0);
    }
    t.parse::<f64>().map_err(|_| ConfigError::InvalidNumber(raw.to_string()))
}

/// `"2=35"` -> `(ChannelId(2), 35.0)`
pub fn parse_override(raw: &str) -> Result<(ChannelId, f64), ConfigError> {
    let (id, value) = raw
        .split_once('=')
        .ok_or_else(|| ConfigError::InvalidOverride(raw.to_string()))?;
    let id: u32 = id
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride(raw.to_string()))?;
    Ok((ChannelId(id), parse_amount(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_blank_is_zero() {
        assert_eq!(parse_amount("").unwrap(), 0.0);
        assert_eq!(parse_amount("   ").unwrap(), 0.0);
        assert_eq!(parse_amount(" 12.5 ").unwrap(), 12.5);
        assert_eq!(parse_amount("-40").unwrap(), -40.0);
        assert!(matches!(parse_amount("abc"), Err(ConfigError::InvalidNumber(_))));
    }

    #[test]
    fn parse_override_ok_and_bad() {
        assert_eq!(parse_override("2=35").unwrap(), (ChannelId(2), 35.0));
        assert_eq!(parse_override(" 3 = ").unwrap(), (ChannelId(3), 0.0));
        assert!(matches!(parse_override("2:35"), Err(ConfigError::InvalidOverride(_))));
        assert!(matches!(parse_override("x=35"), Err(ConfigError::InvalidOverride(_))));
        assert!(matches!(parse_override("2=lots"), Err(ConfigError::InvalidNumber(_))));
    }

    #[test]
    fn validate_rejects_duplicates_and_blank_names() {
        let dup = vec![Channel::new(1, "a", 50.0, 1.0, 1.0), Channel::new(1, "b", 50.0, 1.0, 1.0)];
        assert!(matches!(validate_channels(&dup), Err(ConfigError::DuplicateId(ChannelId(1)))));

        let blank = vec![Channel::new(5, "  ", 50.0, 1.0, 1.0)];
        assert!(matches!(validate_channels(&blank), Err(ConfigError::EmptyName(ChannelId(5)))));

        assert!(validate_channels(&seed_channels()).is_ok());
    }

    #[test]
    fn load_channels_from_file() {
        let dir = env::temp_dir().join(format!("channel_budget_cfg_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let good = dir.join("good.json");
        fs::write(
            &good,
            r#"[{"id":1,"name":"Search","allocation":60,"cpc":1.5,"convRate":3},
                {"id":2,"name":"Social","allocation":40,"cpc":0.9,"convRate":1.1}]"#,
        )
        .unwrap();
        let chans = load_channels(&good).unwrap();
        assert_eq!(chans.len(), 2);
        assert_eq!(chans[1].name, "Social");

        let bad = dir.join("bad.json");
        fs::write(&bad, "not json").unwrap();
        assert!(matches!(load_channels(&bad), Err(ConfigError::Json { .. })));

        let missing = dir.join("missing.json");
        assert!(matches!(load_channels(&missing), Err(ConfigError::Io { .. })));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn cli_overrides_settings() {
        let base = Settings {
            total_budget: 10_000.0,
            channels_file: None,
            metrics_port: DEFAULT_METRICS_PORT,
            log_level: "info".into(),
        };
        let cli = Cli::parse_from([
            "channel_budget",
            "--budget",
            "2500",
            "--set",
            "1=50",
            "serve",
            "--port",
            "9100",
        ]);
        let s = base.merge_cli(&cli).unwrap();
        assert_eq!(s.total_budget, 2500.0);
        assert_eq!(s.metrics_port, 9100);
        assert_eq!(cli.overrides, vec!["1=50".to_string()]);
    }
}
