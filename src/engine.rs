// ===============================
// src/engine.rs (allocation + metrics engine)
// ===============================
//
// Engine bersifat total: setiap input (termasuk nilai setengah-ketik dari UI)
// dinormalisasi (clamp / sentinel), tidak pernah ditolak.
//
use tracing::debug;

use crate::domain::{
    clamp_allocation, clamp_budget, seed_channels, AggregateMetrics, Channel, ChannelId,
    ChannelReport, DerivedMetrics, Snapshot, DEFAULT_TOTAL_BUDGET,
};

/// Toleransi perbandingan total alokasi terhadap 100%
const BALANCE_EPSILON: f64 = 1e-9;

/// Owns the budget state for a single session. No internal locking: share one
/// instance per session and serialize access outside.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationEngine {
    total_budget: f64,
    channels: Vec<Channel>,
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_BUDGET, seed_channels())
    }
}

impl AllocationEngine {
    pub fn new(total_budget: f64, channels: Vec<Channel>) -> Self {
        let channels = channels
            .into_iter()
            .map(|c| Channel { allocation: clamp_allocation(c.allocation), ..c })
            .collect();
        Self { total_budget: clamp_budget(total_budget), channels }
    }

    pub fn total_budget(&self) -> f64 {
        self.total_budget
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }

    pub fn set_total_budget(&mut self, value: f64) {
        let stored = clamp_budget(value);
        debug!(requested = value, stored, "total budget set");
        self.total_budget = stored;
    }

    /// Unknown ids are ignored.
    pub fn set_channel_allocation(&mut self, id: ChannelId, value: f64) {
        match self.channels.iter_mut().find(|c| c.id == id) {
            Some(ch) => {
                let stored = clamp_allocation(value);
                debug!(%id, requested = value, stored, "channel allocation set");
                ch.allocation = stored;
            }
            None => debug!(%id, requested = value, "allocation for unknown channel ignored"),
        }
    }

    /// Pure: same `(total_budget, channel)` always gives the same result.
    pub fn compute_channel_metrics(&self, channel: &Channel) -> DerivedMetrics {
        // channel bisa datang dari luar engine, jadi alokasinya di-clamp lagi.
        // Bagi dulu baru kali: hasil <= total_budget, tidak pernah overflow ke inf.
        let budget = self.total_budget * (clamp_allocation(channel.allocation) / 100.0);

        // cpc 0 (atau negatif / NaN) -> tidak ada estimasi klik
        let clicks = if channel.cpc > 0.0 && channel.cpc.is_finite() {
            floor_count(budget / channel.cpc)
        } else {
            0
        };

        let conversions = floor_count(clicks as f64 * (channel.conv_rate / 100.0));
        let cpa = if conversions > 0 { budget / conversions as f64 } else { 0.0 };

        DerivedMetrics { budget, clicks, conversions, cpa }
    }

    pub fn compute_total_allocation(&self) -> f64 {
        self.channels.iter().map(|c| c.allocation).sum()
    }

    pub fn compute_aggregate_metrics(&self) -> AggregateMetrics {
        let (total_clicks, total_conversions) = self
            .channels
            .iter()
            .map(|c| self.compute_channel_metrics(c))
            .fold((0u64, 0u64), |(clk, conv), m| {
                (clk.saturating_add(m.clicks), conv.saturating_add(m.conversions))
            });

        // avg CPA memakai total budget (bukan jumlah budget per channel)
        let avg_cpa = if total_conversions > 0 {
            self.total_budget / total_conversions as f64
        } else {
            0.0
        };

        AggregateMetrics { total_clicks, total_conversions, avg_cpa }
    }

    pub fn allocation_is_balanced(&self) -> bool {
        (self.compute_total_allocation() - 100.0).abs() <= BALANCE_EPSILON
    }

    /// `Some(total)` when the allocations do not add up to 100%.
    ///
    /// Unlike an exact `!= 100` check, sums within `BALANCE_EPSILON` of 100
    /// (e.g. 33.3 + 33.3 + 33.4) count as balanced.
    pub fn allocation_warning(&self) -> Option<f64> {
        if self.allocation_is_balanced() {
            None
        } else {
            Some(self.compute_total_allocation())
        }
    }

    pub fn channel_metrics(&self) -> Vec<ChannelReport> {
        self.channels
            .iter()
            .map(|c| ChannelReport { channel: c.clone(), metrics: self.compute_channel_metrics(c) })
            .collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            total_budget: self.total_budget,
            total_allocation: self.compute_total_allocation(),
            balanced: self.allocation_is_balanced(),
            channels: self.channel_metrics(),
            aggregate: self.compute_aggregate_metrics(),
        }
    }
}

// floor lalu cast; nilai negatif / NaN jadi 0, overflow saturasi ke u64::MAX
fn floor_count(x: f64) -> u64 {
    if x.is_nan() || x <= 0.0 {
        0
    } else {
        x.floor() as u64
    }
}
