// ===============================
// src/main.rs
// ===============================
/*
 # laporan default (seed channel, budget 10000)
 cargo run --

 # ubah budget & alokasi, output JSON
 cargo run -- --budget 25000 --set 1=45 --set 4=5 report --format json

 # publish ke Prometheus
 cargo run -- --channels-file channels.json serve --port 9899
 curl -s localhost:9899/metrics | grep '^channel_'
*/
/*
=============================================================================
Project : channel_budget — multi-channel marketing budget calculator in Rust
Module  : main.rs
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
use std::process::ExitCode;

use clap::Parser;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use channel_budget::config::{self, Cli, Command, ConfigError, Settings};
use channel_budget::engine::AllocationEngine;
use channel_budget::{metrics, report};

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("render report: {0}")]
    Render(#[from] serde_json::Error),
    #[error("metrics server: {0}")]
    Serve(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = config::load();

    // ---- Logging (stderr, supaya stdout bersih untuk report) ----
    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "channel_budget failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, settings: Settings) -> Result<(), AppError> {
    let settings = settings.merge_cli(&cli)?;
    let command = cli.command.clone().unwrap_or_default();

    // ---- Engine ----
    let channels = settings.channels()?;
    info!(
        total_budget = settings.total_budget,
        channels = channels.len(),
        channels_file = ?settings.channels_file,
        command = ?command,
        "startup config"
    );
    let mut engine = AllocationEngine::new(settings.total_budget, channels);

    for raw in &cli.overrides {
        let (id, pct) = config::parse_override(raw)?;
        if engine.channel(id).is_none() {
            warn!(%id, "override for unknown channel, ignored");
        }
        engine.set_channel_allocation(id, pct);
    }

    if let Some(total) = engine.allocation_warning() {
        warn!(total_allocation = total, "total allocation must equal 100%");
    }

    match command {
        Command::Report { format } => {
            let out = report::render(&engine.snapshot(), format)?;
            println!("{out}");
        }
        Command::Serve { .. } => {
            metrics::init();
            metrics::publish(&engine.snapshot());
            let _server = metrics::serve_metrics(settings.metrics_port)?;

            // Heartbeat sampai Ctrl-C
            let mut tick = interval(Duration::from_secs(60));
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        info!("shutdown");
                        break;
                    }
                    _ = tick.tick() => {
                        let agg = engine.compute_aggregate_metrics();
                        info!(
                            clicks = agg.total_clicks,
                            conversions = agg.total_conversions,
                            "heartbeat"
                        );
                    }
                }
            }
        }
    }
    Ok(())
}
