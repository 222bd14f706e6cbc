// ===============================
// src/metrics.rs
// ===============================
use once_cell::sync::Lazy;
use prometheus::{Encoder, Gauge, GaugeVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use tracing::{error, info};

use crate::domain::Snapshot;

// Single custom registry (we register everything here)
pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

// -------- Budget state --------
pub static BUDGET_TOTAL: Lazy<Gauge> =
    Lazy::new(|| Gauge::new("budget_total", "total monthly budget").unwrap());

pub static ALLOCATION_TOTAL: Lazy<Gauge> = Lazy::new(|| {
    Gauge::new("allocation_total_pct", "sum of channel allocations (%)").unwrap()
});

pub static ALLOCATION_BALANCED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("allocation_balanced", "1 if allocations sum to 100%, 0 otherwise").unwrap()
});

// -------- Per channel (labels: id, channel) --------
pub static CHANNEL_ALLOCATION: Lazy<GaugeVec> = Lazy::new(|| {
    GaugeVec::new(
        Opts::new("channel_allocation_pct", "allocation per channel (%)"),
        &["id", "channel"],
    )
    .unwrap()
});

pub static CHANNEL_BUDGET: Lazy<GaugeVec> = Lazy::new(|| {
    GaugeVec::new(Opts::new("channel_budget", "budget per channel"), &["id", "channel"]).unwrap()
});

pub static CHANNEL_CLICKS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("channel_clicks", "estimated clicks per channel"),
        &["id", "channel"],
    )
    .unwrap()
});

pub static CHANNEL_CONVERSIONS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("channel_conversions", "estimated conversions per channel"),
        &["id", "channel"],
    )
    .unwrap()
});

pub static CHANNEL_CPA: Lazy<GaugeVec> = Lazy::new(|| {
    GaugeVec::new(
        Opts::new("channel_cpa", "cost per acquisition per channel (0 = not applicable)"),
        &["id", "channel"],
    )
    .unwrap()
});

// -------- Aggregate --------
pub static AGG_CLICKS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("aggregate_clicks_total", "estimated clicks, all channels").unwrap()
});

pub static AGG_CONVERSIONS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("aggregate_conversions_total", "estimated conversions, all channels").unwrap()
});

pub static AGG_AVG_CPA: Lazy<Gauge> = Lazy::new(|| {
    Gauge::new("aggregate_avg_cpa", "total budget / total conversions (0 = not applicable)")
        .unwrap()
});

pub fn init() {
    // Register all metrics to the custom registry (register ulang -> error, diabaikan)
    for m in [
        REGISTRY.register(Box::new(BUDGET_TOTAL.clone())),
        REGISTRY.register(Box::new(ALLOCATION_TOTAL.clone())),
        REGISTRY.register(Box::new(ALLOCATION_BALANCED.clone())),
        REGISTRY.register(Box::new(CHANNEL_ALLOCATION.clone())),
        REGISTRY.register(Box::new(CHANNEL_BUDGET.clone())),
        REGISTRY.register(Box::new(CHANNEL_CLICKS.clone())),
        REGISTRY.register(Box::new(CHANNEL_CONVERSIONS.clone())),
        REGISTRY.register(Box::new(CHANNEL_CPA.clone())),
        REGISTRY.register(Box::new(AGG_CLICKS.clone())),
        REGISTRY.register(Box::new(AGG_CONVERSIONS.clone())),
        REGISTRY.register(Box::new(AGG_AVG_CPA.clone())),
    ] {
        let _ = m;
    }
}

fn to_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

/// Copy a snapshot into the gauges.
pub fn publish(snap: &Snapshot) {
    BUDGET_TOTAL.set(snap.total_budget);
    ALLOCATION_TOTAL.set(snap.total_allocation);
    ALLOCATION_BALANCED.set(snap.balanced as i64);

    for row in &snap.channels {
        // id ikut jadi label: nama channel boleh kembar
        let id = row.channel.id.to_string();
        let label = [id.as_str(), row.channel.name.as_str()];
        let m = &row.metrics;
        CHANNEL_ALLOCATION.with_label_values(&label).set(row.channel.allocation);
        CHANNEL_BUDGET.with_label_values(&label).set(m.budget);
        CHANNEL_CLICKS.with_label_values(&label).set(to_i64(m.clicks));
        CHANNEL_CONVERSIONS.with_label_values(&label).set(to_i64(m.conversions));
        CHANNEL_CPA.with_label_values(&label).set(m.cpa);
    }

    AGG_CLICKS.set(to_i64(snap.aggregate.total_clicks));
    AGG_CONVERSIONS.set(to_i64(snap.aggregate.total_conversions));
    AGG_AVG_CPA.set(snap.aggregate.avg_cpa);
}

// Encode all metrics in Prometheus text format
pub fn encode_metrics() -> Vec<u8> {
    let encoder = TextEncoder::new();
    let families = REGISTRY.gather();
    let mut buf = Vec::new();
    if encoder.encode(&families, &mut buf).is_err() || buf.is_empty() {
        buf.extend_from_slice(b"# no metrics\n");
    }
    buf
}

// Serve one HTTP request (GET / or /metrics) — tiny HTTP 1.1 responder
fn handle_client(mut stream: TcpStream) {
    // Read a bit to consume headers (no full parse)
    let mut _req_buf = [0u8; 1024];
    let _ = stream.read(&mut _req_buf);

    let body = encode_metrics();
    let header = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; version=0.0.4; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );

    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(&body);
    let _ = stream.flush();
}

/// Bind first so the caller sees bind errors, then accept on a dedicated OS thread.
pub fn serve_metrics(port: u16) -> std::io::Result<thread::JoinHandle<()>> {
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)?;
    info!(%addr, "metrics listening on / and /metrics");

    Ok(thread::spawn(move || {
        for conn in listener.incoming() {
            match conn {
                Ok(stream) => handle_client(stream),
                Err(e) => error!(?e, "metrics accept error"),
            }
        }
    }))
}
