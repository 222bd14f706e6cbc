// ===============================
// src/domain.rs
// ===============================
use std::fmt;

use serde::{Deserialize, Serialize};

/// Total budget bawaan saat engine dibuat tanpa konfigurasi.
pub const DEFAULT_TOTAL_BUDGET: f64 = 10_000.0;

/// Identifier channel (opaque, stabil antar update)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u32);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One advertising channel. `allocation` and `conv_rate` are percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    pub allocation: f64,
    pub cpc: f64,
    #[serde(alias = "conv_rate")]
    pub conv_rate: f64,
}

impl Channel {
    pub fn new(id: u32, name: impl Into<String>, allocation: f64, cpc: f64, conv_rate: f64) -> Self {
        Self {
            id: ChannelId(id),
            name: name.into(),
            allocation: clamp_allocation(allocation),
            cpc,
            conv_rate,
        }
    }
}

/// Clamp ke [0, 100]. NaN dianggap 0.
pub fn clamp_allocation(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Budget tidak boleh negatif; NaN jadi 0, +inf saturasi ke f64::MAX.
pub fn clamp_budget(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, f64::MAX)
    }
}

/// Per-channel figures derived from the current state. Never stored.
///
/// `cpa == 0.0` is a sentinel for "not applicable" (no conversions), not a
/// zero-cost acquisition. Use [`DerivedMetrics::cpa_value`] when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub budget: f64,
    pub clicks: u64,
    pub conversions: u64,
    pub cpa: f64,
}

impl DerivedMetrics {
    pub fn cpa_value(&self) -> Option<f64> {
        sentinel(self.cpa)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub total_clicks: u64,
    pub total_conversions: u64,
    pub avg_cpa: f64,
}

impl AggregateMetrics {
    pub fn avg_cpa_value(&self) -> Option<f64> {
        sentinel(self.avg_cpa)
    }
}

fn sentinel(v: f64) -> Option<f64> {
    if v > 0.0 { Some(v) } else { None }
}

/// Channel beserta metrik turunannya (urutan sesuai insertion order)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelReport {
    pub channel: Channel,
    pub metrics: DerivedMetrics,
}

/// Everything a presentation layer needs, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub total_budget: f64,
    pub total_allocation: f64,
    pub balanced: bool,
    pub channels: Vec<ChannelReport>,
    pub aggregate: AggregateMetrics,
}

/// Seed channels (nilai ilustratif untuk sesi baru)
pub fn seed_channels() -> Vec<Channel> {
    vec![
        Channel::new(1, "Google Ads", 40.0, 2.5, 2.5),
        Channel::new(2, "LinkedIn Ads", 30.0, 5.5, 1.8),
        Channel::new(3, "Facebook Ads", 20.0, 1.2, 1.5),
        Channel::new(4, "Twitter Ads", 10.0, 2.0, 1.2),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_new_clamps_allocation() {
        assert_eq!(Channel::new(1, "x", 140.0, 1.0, 1.0).allocation, 100.0);
        assert_eq!(Channel::new(1, "x", -3.0, 1.0, 1.0).allocation, 0.0);
        assert_eq!(Channel::new(1, "x", f64::NAN, 1.0, 1.0).allocation, 0.0);
    }

    #[test]
    fn budget_clamp_handles_non_finite() {
        assert_eq!(clamp_budget(-5.0), 0.0);
        assert_eq!(clamp_budget(f64::NAN), 0.0);
        assert_eq!(clamp_budget(f64::INFINITY), f64::MAX);
        assert_eq!(clamp_budget(f64::NEG_INFINITY), 0.0);
        assert_eq!(clamp_budget(250.5), 250.5);
    }

    #[test]
    fn cpa_sentinel_maps_to_none() {
        let m = DerivedMetrics { budget: 10.0, clicks: 3, conversions: 0, cpa: 0.0 };
        assert_eq!(m.cpa_value(), None);
        let m = DerivedMetrics { cpa: 12.5, ..m };
        assert_eq!(m.cpa_value(), Some(12.5));
    }

    #[test]
    fn channel_json_uses_conv_rate_camel_case() {
        let ch: Channel = serde_json::from_str(
            r#"{"id":7,"name":"Bing","allocation":15,"cpc":1.1,"convRate":2.0}"#,
        )
        .unwrap();
        assert_eq!(ch.id, ChannelId(7));
        assert_eq!(ch.conv_rate, 2.0);

        let alias: Channel = serde_json::from_str(
            r#"{"id":8,"name":"Reddit","allocation":5,"cpc":0.8,"conv_rate":0.9}"#,
        )
        .unwrap();
        assert_eq!(alias.conv_rate, 0.9);

        let out = serde_json::to_value(&ch).unwrap();
        assert!(out.get("convRate").is_some());
    }

    #[test]
    fn seed_sums_to_hundred() {
        let total: f64 = seed_channels().iter().map(|c| c.allocation).sum();
        assert_eq!(total, 100.0);
    }
}
