//! Metrics aggregation (§3, §4.5, §5)
//!
//! A single mutex guards all mutable state — no lock-free or atomic
//! counters. Every worker thread calls `record_success`/`record_failure`
//! as its transfers complete; `finalize` consumes the aggregator and
//! produces the `Report`.

use super::percentile::compute_percentiles;
use super::{FileSizeStat, Report, Summary, TimeSeriesSample, TimeWindow};
use crate::config::CampaignConfig;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// One completed transfer, recorded under the aggregator's mutex.
struct Event {
    elapsed: Duration,
    success: bool,
    error_kind: Option<String>,
    data_kb: f64,
    policy_tag: String,
    size_bytes: u64,
    at: DateTime<Utc>,
}

struct Inner {
    events: Vec<Event>,
}

pub struct MetricsAggregator {
    inner: Mutex<Inner>,
    start_wall: DateTime<Utc>,
}

impl MetricsAggregator {
    pub fn new(start_wall: DateTime<Utc>) -> Self {
        Self {
            inner: Mutex::new(Inner { events: Vec::new() }),
            start_wall,
        }
    }

    pub fn record_success(&self, elapsed: Duration, data_kb: f64, policy_tag: String, size_bytes: u64, at: DateTime<Utc>) {
        let mut inner = self.inner.lock().expect("metrics mutex poisoned");
        inner.events.push(Event {
            elapsed,
            success: true,
            error_kind: None,
            data_kb,
            policy_tag,
            size_bytes,
            at,
        });
    }

    /// Empty error kinds are dropped rather than histogrammed (§4.5), but
    /// the transfer still counts toward `failed`.
    pub fn record_failure(&self, elapsed: Duration, error_kind: String, policy_tag: String, size_bytes: u64, at: DateTime<Utc>) {
        let mut inner = self.inner.lock().expect("metrics mutex poisoned");
        let error_kind = if error_kind.is_empty() { None } else { Some(error_kind) };
        inner.events.push(Event {
            elapsed,
            success: false,
            error_kind,
            data_kb: 0.0,
            policy_tag,
            size_bytes,
            at,
        });
    }

    /// Consume the aggregator and build the final report. `total_kb` is
    /// supplied by the caller since its formula differs between UPLOAD
    /// (sum of planned policy sizes) and DOWNLOAD (sum parsed from the
    /// linked remote names) and isn't derivable from recorded events alone.
    pub fn finalize(self, config: CampaignConfig, total_kb: f64, duration: Duration) -> Report {
        let inner = self.inner.into_inner().expect("metrics mutex poisoned");
        let mut events = inner.events;
        events.sort_by_key(|e| e.at);

        let total_requested = events.len() as u64;
        let successful = events.iter().filter(|e| e.success).count() as u64;
        let failed = total_requested - successful;

        let latencies: Vec<f64> = events
            .iter()
            .filter(|e| e.success)
            .map(|e| e.elapsed.as_secs_f64() * 1000.0)
            .collect();
        let throughputs: Vec<f64> = events
            .iter()
            .filter(|e| e.success)
            .map(|e| e.data_kb)
            .collect();
        let errors: Vec<String> = events
            .iter()
            .filter_map(|e| e.error_kind.clone())
            .collect();

        let mut error_histogram: HashMap<String, u64> = HashMap::new();
        for kind in &errors {
            *error_histogram.entry(kind.clone()).or_insert(0) += 1;
        }

        let mut file_size_stats: HashMap<String, FileSizeStat> = HashMap::new();
        for e in events.iter().filter(|e| e.success) {
            let stat = file_size_stats.entry(e.policy_tag.clone()).or_insert(FileSizeStat {
                size_bytes: e.size_bytes,
                count: 0,
                total_kb: 0.0,
            });
            stat.count += 1;
            stat.total_kb += e.data_kb;
        }

        let mut sorted_latencies = latencies.clone();
        sorted_latencies.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let percentiles = compute_percentiles(&sorted_latencies);

        let (min_latency_ms, avg_latency_ms, max_latency_ms) = if latencies.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let sum: f64 = latencies.iter().sum();
            let min = latencies.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = latencies.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            (min, sum / latencies.len() as f64, max)
        };

        let duration_secs = duration.as_secs_f64();
        let avg_mbps = if duration_secs > 0.0 {
            (total_kb / 1024.0) / duration_secs
        } else {
            0.0
        };

        let time_windows = bucket_time_windows(&events, self.start_wall);
        let peak_mbps = time_windows
            .iter()
            .map(|w| (w.kb / 1024.0) / 10.0)
            .fold(0.0_f64, f64::max);

        let time_series = build_time_series(&events);

        let summary = Summary {
            total_requested,
            successful,
            failed,
            total_kb,
            avg_mbps,
            peak_mbps,
            min_latency_ms,
            avg_latency_ms,
            max_latency_ms,
            percentiles,
            error_histogram,
            time_windows,
        };

        Report {
            config,
            timestamp: self.start_wall,
            duration_ms: duration.as_millis() as u64,
            latencies,
            throughputs,
            errors,
            time_series,
            summary,
            file_size_stats,
        }
    }
}

/// Bucket events into fixed 10-second windows starting at `start_wall`
/// (§4.5 step 7). Windows with no events are omitted.
fn bucket_time_windows(events: &[Event], start_wall: DateTime<Utc>) -> Vec<TimeWindow> {
    if events.is_empty() {
        return Vec::new();
    }
    let window_secs = 10i64;
    let mut buckets: HashMap<i64, Vec<&Event>> = HashMap::new();
    for e in events {
        let offset = (e.at - start_wall).num_seconds().max(0);
        let bucket = offset / window_secs;
        buckets.entry(bucket).or_default().push(e);
    }
    let mut keys: Vec<i64> = buckets.keys().cloned().collect();
    keys.sort();

    keys.into_iter()
        .map(|k| {
            let bucket_events = &buckets[&k];
            let start = start_wall + chrono::Duration::seconds(k * window_secs);
            let end = start + chrono::Duration::seconds(window_secs);
            let successes: Vec<&&Event> = bucket_events.iter().filter(|e| e.success).collect();
            let kb: f64 = successes.iter().map(|e| e.data_kb).sum();
            let avg_latency_ms = if successes.is_empty() {
                0.0
            } else {
                successes
                    .iter()
                    .map(|e| e.elapsed.as_secs_f64() * 1000.0)
                    .sum::<f64>()
                    / successes.len() as f64
            };
            TimeWindow {
                start,
                end,
                rps: bucket_events.len() as f64 / window_secs as f64,
                kb,
                avg_latency_ms,
            }
        })
        .collect()
}

/// Per-transfer cumulative time series, in completion order. Distinct
/// from `time_windows`: this is a cumulative running total, the report's
/// `time_series` field used by downstream dashboards (§6).
fn build_time_series(events: &[Event]) -> Vec<TimeSeriesSample> {
    let mut cumulative_requests = 0u64;
    let mut cumulative_errors = 0u64;
    let mut cumulative_kb = 0.0;
    let mut latency_sum = 0.0;
    let mut latency_count = 0u64;
    let mut min_latency_ms = f64::INFINITY;
    let mut max_latency_ms = f64::NEG_INFINITY;
    let mut first_at: Option<DateTime<Utc>> = None;

    let mut samples = Vec::with_capacity(events.len());
    for e in events {
        cumulative_requests += 1;
        if !e.success {
            cumulative_errors += 1;
        } else {
            cumulative_kb += e.data_kb;
            let latency_ms = e.elapsed.as_secs_f64() * 1000.0;
            latency_sum += latency_ms;
            latency_count += 1;
            min_latency_ms = min_latency_ms.min(latency_ms);
            max_latency_ms = max_latency_ms.max(latency_ms);
        }
        if first_at.is_none() {
            first_at = Some(e.at);
        }
        let elapsed_secs = (e.at - first_at.unwrap()).num_milliseconds() as f64 / 1000.0;
        let rps = if elapsed_secs > 0.0 {
            cumulative_requests as f64 / elapsed_secs
        } else {
            0.0
        };
        let mbps = if elapsed_secs > 0.0 {
            (cumulative_kb / 1024.0) / elapsed_secs
        } else {
            0.0
        };

        samples.push(TimeSeriesSample {
            timestamp: e.at,
            cumulative_requests,
            cumulative_errors,
            cumulative_kb,
            avg_latency_ms: if latency_count > 0 { latency_sum / latency_count as f64 } else { 0.0 },
            min_latency_ms: if min_latency_ms.is_finite() { min_latency_ms } else { 0.0 },
            max_latency_ms: if max_latency_ms.is_finite() { max_latency_ms } else { 0.0 },
            rps,
            mbps,
        });
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileSizePolicy, Protocol, SizeUnit, TestType};
    use std::path::PathBuf;

    fn test_config() -> CampaignConfig {
        CampaignConfig {
            name: "t".into(),
            protocol: Protocol::Ftp,
            test_type: TestType::Upload,
            host: "h".into(),
            port: 21,
            username: String::new(),
            password: String::new(),
            remote_path: "/up/".into(),
            local_path: PathBuf::from("."),
            timeout_secs: 5,
            num_workers: 1,
            num_requests: 2,
            policies: vec![FileSizePolicy { size: 1, unit: SizeUnit::K, percent: 100 }],
            upload_test_id: None,
        }
    }

    #[test]
    fn all_failure_run_has_zeroed_latency_and_throughput() {
        let start = Utc::now();
        let agg = MetricsAggregator::new(start);
        agg.record_failure(Duration::from_millis(5), "timeout".into(), "1K".into(), 1024, start);
        agg.record_failure(Duration::from_millis(5), "timeout".into(), "1K".into(), 1024, start);
        let report = agg.finalize(test_config(), 0.0, Duration::from_secs(1));
        assert_eq!(report.summary.successful, 0);
        assert_eq!(report.summary.failed, 2);
        assert_eq!(report.summary.avg_latency_ms, 0.0);
        assert_eq!(report.summary.min_latency_ms, 0.0);
        assert_eq!(report.summary.max_latency_ms, 0.0);
        assert_eq!(report.summary.avg_mbps, 0.0);
    }

    #[test]
    fn success_and_failure_counts_sum_to_total() {
        let start = Utc::now();
        let agg = MetricsAggregator::new(start);
        agg.record_success(Duration::from_millis(10), 1.0, "1K".into(), 1024, start);
        agg.record_failure(Duration::from_millis(5), "operation_timeout".into(), "1K".into(), 1024, start);
        let report = agg.finalize(test_config(), 1.0, Duration::from_secs(1));
        assert_eq!(report.summary.total_requested, 2);
        assert_eq!(report.summary.successful + report.summary.failed, report.summary.total_requested);
        assert_eq!(report.latencies.len(), report.summary.successful as usize);
        assert_eq!(report.errors.len(), report.summary.failed as usize);
    }

    #[test]
    fn error_histogram_counts_by_kind() {
        let start = Utc::now();
        let agg = MetricsAggregator::new(start);
        agg.record_failure(Duration::from_millis(1), "operation_timeout".into(), "1K".into(), 1024, start);
        agg.record_failure(Duration::from_millis(1), "operation_timeout".into(), "1K".into(), 1024, start);
        agg.record_failure(Duration::from_millis(1), "file_not_found".into(), "1K".into(), 1024, start);
        let report = agg.finalize(test_config(), 0.0, Duration::from_secs(1));
        assert_eq!(report.summary.error_histogram["operation_timeout"], 2);
        assert_eq!(report.summary.error_histogram["file_not_found"], 1);
    }

    #[test]
    fn time_series_timestamps_are_monotone() {
        let start = Utc::now();
        let agg = MetricsAggregator::new(start);
        agg.record_success(Duration::from_millis(1), 1.0, "1K".into(), 1024, start);
        agg.record_success(Duration::from_millis(1), 1.0, "1K".into(), 1024, start + chrono::Duration::seconds(1));
        let report = agg.finalize(test_config(), 2.0, Duration::from_secs(2));
        for pair in report.time_series.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
            assert!(pair[0].cumulative_requests <= pair[1].cumulative_requests);
        }
    }
}
