//! Statistics and report types (§3, §4.5, §6)
//!
//! Report shape mirrors the external JSON schema in §6. Duration is pinned
//! to an explicit integer-milliseconds field rather than a host-specific
//! nanoseconds encoding, per the "Duration encoding" design note (§9).

pub mod aggregator;
pub mod percentile;

use crate::config::CampaignConfig;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One 10-second bucket of the time series (§4.5 step 7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub rps: f64,
    pub kb: f64,
    pub avg_latency_ms: f64,
}

/// Latency percentiles, monotone non-decreasing by construction (§3, §8).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct Percentiles {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Per-policy size statistics, keyed by policy tag (e.g. `"1K"`) in the
/// report's `file_size_stats` map.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FileSizeStat {
    pub size_bytes: u64,
    pub count: usize,
    pub total_kb: f64,
}

/// Finalized summary (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total_requested: u64,
    pub successful: u64,
    pub failed: u64,
    pub total_kb: f64,
    pub avg_mbps: f64,
    pub peak_mbps: f64,
    pub min_latency_ms: f64,
    pub avg_latency_ms: f64,
    pub max_latency_ms: f64,
    pub percentiles: Percentiles,
    pub error_histogram: HashMap<String, u64>,
    pub time_windows: Vec<TimeWindow>,
}

/// A single time-series sample, taken under the aggregator's mutex so
/// timestamps are monotone by construction (§5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeriesSample {
    pub timestamp: DateTime<Utc>,
    pub cumulative_requests: u64,
    pub cumulative_errors: u64,
    pub cumulative_kb: f64,
    pub avg_latency_ms: f64,
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
    pub rps: f64,
    pub mbps: f64,
}

/// The finalized test report, written to `TestReports/<campaign>_<ts>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub config: CampaignConfig,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
    pub latencies: Vec<f64>,
    pub throughputs: Vec<f64>,
    pub errors: Vec<String>,
    pub time_series: Vec<TimeSeriesSample>,
    pub summary: Summary,
    pub file_size_stats: HashMap<String, FileSizeStat>,
}

impl Report {
    pub fn write_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
