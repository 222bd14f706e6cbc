// ===============================
// src/lib.rs
// ===============================
pub mod config;
pub mod domain;
pub mod engine;
pub mod metrics;
pub mod report;

pub use domain::{AggregateMetrics, Channel, ChannelId, DerivedMetrics, Snapshot};
pub use engine::AllocationEngine;
