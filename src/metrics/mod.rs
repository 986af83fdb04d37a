use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// Recent durations kept per operation for the p95 estimate.
pub const SAMPLE_WINDOW: usize = 1024;

/// One timed store call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub duration_ns: u64,
    pub row_count: usize,
    pub success: bool,
}

impl MetricEntry {
    pub fn new(
        operation: impl Into<String>,
        elapsed: Duration,
        row_count: usize,
        success: bool,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: operation.into(),
            duration_ns: elapsed.as_nanos() as u64,
            row_count,
            success,
        }
    }
}

/// Running totals for one operation. Only the last `SAMPLE_WINDOW` durations
/// are retained.
#[derive(Debug)]
struct OperationStats {
    sample_count: u64,
    failure_count: u64,
    rows_returned: u64,
    total_ns: u128,
    min_ns: u64,
    max_ns: u64,
    last_recorded_at: DateTime<Utc>,
    recent_ns: VecDeque<u64>,
}

impl OperationStats {
    fn new(first: &MetricEntry) -> Self {
        Self {
            sample_count: 0,
            failure_count: 0,
            rows_returned: 0,
            total_ns: 0,
            min_ns: first.duration_ns,
            max_ns: first.duration_ns,
            last_recorded_at: first.timestamp,
            recent_ns: VecDeque::with_capacity(SAMPLE_WINDOW),
        }
    }

    fn fold(&mut self, entry: &MetricEntry) {
        self.sample_count += 1;
        if !entry.success {
            self.failure_count += 1;
        }
        self.rows_returned += entry.row_count as u64;
        self.total_ns += u128::from(entry.duration_ns);
        self.min_ns = self.min_ns.min(entry.duration_ns);
        self.max_ns = self.max_ns.max(entry.duration_ns);
        self.last_recorded_at = entry.timestamp;

        if self.recent_ns.len() == SAMPLE_WINDOW {
            self.recent_ns.pop_front();
        }
        self.recent_ns.push_back(entry.duration_ns);
    }

    fn p95_ns(&self) -> u64 {
        let mut sorted: Vec<u64> = self.recent_ns.iter().copied().collect();
        sorted.sort_unstable();
        let count = sorted.len();
        sorted
            .get(((count as f64 * 0.95) as usize).min(count.saturating_sub(1)))
            .copied()
            .unwrap_or(0)
    }
}

/// Per-operation timings collected across requests. Memory is bounded by the
/// number of distinct operations, not by request volume.
#[derive(Debug, Default)]
pub struct MetricsStore {
    operations: HashMap<String, OperationStats>,
}

impl MetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: MetricEntry) {
        self.operations
            .entry(entry.operation.clone())
            .or_insert_with(|| OperationStats::new(&entry))
            .fold(&entry);
    }

    /// Aggregate stats per operation, sorted by operation name.
    pub fn aggregated(&self) -> Vec<AggregatedMetric> {
        let mut out: Vec<AggregatedMetric> = self
            .operations
            .iter()
            .map(|(op, stats)| {
                let avg = (stats.total_ns / u128::from(stats.sample_count.max(1))) as u64;
                AggregatedMetric {
                    operation: op.clone(),
                    sample_count: stats.sample_count,
                    failure_count: stats.failure_count,
                    rows_returned: stats.rows_returned,
                    min_ms: to_ms(stats.min_ns),
                    avg_ms: to_ms(avg),
                    max_ms: to_ms(stats.max_ns),
                    p95_ms: to_ms(stats.p95_ns()),
                    last_recorded_at: stats.last_recorded_at,
                }
            })
            .collect();

        out.sort_by(|a, b| a.operation.cmp(&b.operation));
        out
    }
}

fn to_ms(ns: u64) -> f64 {
    ns as f64 / 1_000_000.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedMetric {
    pub operation: String,
    pub sample_count: u64,
    pub failure_count: u64,
    pub rows_returned: u64,
    pub min_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
    /// Over the most recent `SAMPLE_WINDOW` calls.
    pub p95_ms: f64,
    pub last_recorded_at: DateTime<Utc>,
}
