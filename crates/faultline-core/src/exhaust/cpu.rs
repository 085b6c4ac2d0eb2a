//! CPU exhauster
//!
//! One worker thread per logical core, each spinning on a mix of math and
//! string work for a fixed wall-clock duration.

use crate::result::{FaultKind, FaultResult};
use serde::{Deserialize, Serialize};
use std::hint::black_box;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Worker count used when core detection fails
pub const FALLBACK_WORKERS: usize = 4;

/// CPU exhauster tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuConfig {
    /// Wall-clock run time of every worker
    #[serde(default = "default_duration")]
    pub duration_secs: u64,

    /// Iterations between two yields
    #[serde(default = "default_yield_every")]
    pub yield_every: u64,

    /// Length of each yield
    #[serde(default = "default_yield_ms")]
    pub yield_ms: u64,

    /// Worker count override; detected cores when unset
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration(),
            yield_every: default_yield_every(),
            yield_ms: default_yield_ms(),
            workers: None,
        }
    }
}

fn default_duration() -> u64 {
    30
}

fn default_yield_every() -> u64 {
    10_000
}

fn default_yield_ms() -> u64 {
    1
}

impl CpuConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    /// Number of workers to start
    pub fn worker_count(&self) -> usize {
        self.workers
            .filter(|n| *n > 0)
            .unwrap_or_else(detected_cores)
    }
}

/// Logical cores, or [`FALLBACK_WORKERS`] when the platform cannot tell
pub fn detected_cores() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(FALLBACK_WORKERS)
}

/// Per-invocation totals shared by the workers of one run
#[derive(Debug, Default)]
struct Tally {
    completed_workers: AtomicUsize,
    operations: AtomicU64,
}

fn factorial(n: u64) -> u64 {
    (1..=n.min(10)).product()
}

/// One batch of mixed work; returns the number of operations performed
fn churn(batch: u64) -> u64 {
    let mut operations = 0;
    for i in 0..batch {
        let x = i as f64;
        black_box((x * std::f64::consts::PI).sqrt());
        black_box(x.sin() * x.cos());
        black_box(factorial(i % 10));
        black_box(i.to_string().repeat(100));
        black_box(format!("test{}{}", i, "data".repeat(50)));
        operations += 5;
    }
    operations
}

fn work(id: usize, config: &CpuConfig, tally: &Tally) {
    tracing::debug!(worker = id, "CPU worker starting");

    let duration = config.duration();
    let pause = Duration::from_millis(config.yield_ms);
    let started = Instant::now();
    let mut operations = 0u64;

    while started.elapsed() < duration {
        operations += churn(config.yield_every.max(1));
        std::thread::sleep(pause);
    }

    tally.operations.fetch_add(operations, Ordering::Relaxed);
    tally.completed_workers.fetch_add(1, Ordering::Relaxed);
    tracing::debug!(worker = id, operations, "CPU worker completed");
}

/// Run the CPU exhauster; blocks until every worker has finished
pub fn exhaust(config: &CpuConfig) -> FaultResult {
    let workers = config.worker_count();
    tracing::info!(
        workers,
        duration_secs = config.duration_secs,
        "Starting high CPU usage test"
    );

    let tally = Tally::default();
    let started = Instant::now();
    std::thread::scope(|scope| {
        for id in 0..workers {
            let tally = &tally;
            scope.spawn(move || work(id, config, tally));
        }
    });
    let elapsed = started.elapsed();

    let completed = tally.completed_workers.load(Ordering::Relaxed);
    let operations = tally.operations.load(Ordering::Relaxed);
    tracing::info!(
        completed,
        operations,
        elapsed_ms = elapsed.as_millis() as u64,
        "High CPU test completed"
    );

    FaultResult::success(
        FaultKind::HighCpu,
        format!("High CPU test completed with {} threads", workers),
    )
    .with_metric("duration_seconds", config.duration_secs)
    .with_metric("threads_used", workers)
    .with_metric("completed_threads", completed)
    .with_metric("total_operations", operations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::MetricValue;

    #[test]
    fn test_factorial_is_clamped() {
        assert_eq!(factorial(0), 1);
        assert_eq!(factorial(5), 120);
        assert_eq!(factorial(10), 3_628_800);
        assert_eq!(factorial(25), 3_628_800);
    }

    #[test]
    fn test_churn_counts_five_operations_per_iteration() {
        assert_eq!(churn(10), 50);
    }

    #[test]
    fn test_worker_count_defaults_to_detected_cores() {
        let config = CpuConfig::default();
        assert_eq!(config.worker_count(), detected_cores());
        assert!(config.worker_count() >= 1);

        let pinned = CpuConfig {
            workers: Some(3),
            ..Default::default()
        };
        assert_eq!(pinned.worker_count(), 3);

        let zero = CpuConfig {
            workers: Some(0),
            ..Default::default()
        };
        assert_eq!(zero.worker_count(), detected_cores());
    }

    #[test]
    fn test_run_lasts_configured_duration() {
        let config = CpuConfig {
            duration_secs: 1,
            yield_every: 100,
            yield_ms: 1,
            workers: Some(2),
        };

        let started = Instant::now();
        let result = exhaust(&config);
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_secs(3), "took {:?}", elapsed);
        assert_eq!(result.status_code(), 200);
        assert_eq!(result.metric("threads_used"), Some(&MetricValue::Count(2)));
        assert_eq!(result.metric("completed_threads"), Some(&MetricValue::Count(2)));
        assert_eq!(result.metric("duration_seconds"), Some(&MetricValue::Count(1)));
        match result.metric("total_operations") {
            Some(MetricValue::Count(ops)) => assert!(*ops >= 1000),
            other => panic!("unexpected total_operations: {:?}", other),
        }
    }
}
