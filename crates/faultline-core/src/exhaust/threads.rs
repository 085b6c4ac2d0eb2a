//! Thread exhauster
//!
//! Spawns long-sleeping OS threads until creation fails or the safety ceiling
//! is hit. Threads are detached: they never hold up process exit.

use crate::result::{FaultKind, FaultResult};
use serde::{Deserialize, Serialize};
use std::thread::JoinHandle;
use std::time::Duration;

/// Thread exhauster tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadConfig {
    /// Hard upper bound on spawned threads
    #[serde(default = "default_ceiling")]
    pub ceiling: usize,

    /// How long each spawned thread sleeps
    #[serde(default = "default_park_secs")]
    pub park_secs: u64,

    /// Pause between two spawns
    #[serde(default = "default_spawn_pause_ms")]
    pub spawn_pause_ms: u64,

    /// Delay before the active count is sampled
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            ceiling: default_ceiling(),
            park_secs: default_park_secs(),
            spawn_pause_ms: default_spawn_pause_ms(),
            grace_ms: default_grace_ms(),
        }
    }
}

fn default_ceiling() -> usize {
    5000
}

fn default_park_secs() -> u64 {
    300
}

fn default_spawn_pause_ms() -> u64 {
    10
}

fn default_grace_ms() -> u64 {
    1000
}

/// Threads spawned by one invocation. Only used for counting; dropping the
/// registry detaches every thread.
#[derive(Debug, Default)]
pub struct ThreadRegistry {
    handles: Vec<JoinHandle<()>>,
}

impl ThreadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Threads spawned so far
    pub fn spawned(&self) -> usize {
        self.handles.len()
    }

    /// Threads that have not finished yet
    pub fn active(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// Spawn one parked thread
    pub fn spawn_parked(&mut self, park: Duration) -> std::io::Result<()> {
        let id = self.handles.len() + 1;
        let handle = std::thread::Builder::new()
            .name(format!("faultline-park-{}", id))
            .spawn(move || {
                std::thread::sleep(park);
                tracing::trace!(thread = id, "Parked thread finished");
            })?;
        self.handles.push(handle);
        Ok(())
    }
}

/// Why the spawn loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    CeilingReached,
    SystemLimit,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::CeilingReached => "Thread limit reached",
            StopReason::SystemLimit => "System limit encountered",
        }
    }
}

/// Run the thread exhauster. The result always carries a failure-class status.
pub fn exhaust(config: &ThreadConfig) -> FaultResult {
    tracing::info!(ceiling = config.ceiling, "Starting thread exhaustion test");

    let park = Duration::from_secs(config.park_secs);
    let pause = Duration::from_millis(config.spawn_pause_ms);
    let mut registry = ThreadRegistry::new();

    let reason = loop {
        if registry.spawned() >= config.ceiling {
            tracing::info!(threads = registry.spawned(), "Reached safety limit");
            break StopReason::CeilingReached;
        }

        if let Err(e) = registry.spawn_parked(park) {
            tracing::warn!(
                threads = registry.spawned(),
                error = %e,
                "Thread creation failed"
            );
            break StopReason::SystemLimit;
        }

        let spawned = registry.spawned();
        if spawned % 100 == 0 {
            tracing::info!(threads = spawned, "Created threads so far");
        }
        if !pause.is_zero() {
            std::thread::sleep(pause);
        }
    };

    std::thread::sleep(Duration::from_millis(config.grace_ms));

    let created = registry.spawned();
    let active = registry.active();
    tracing::info!(created, active, status = reason.as_str(), "Thread exhaustion test completed");

    FaultResult::signalled(
        FaultKind::Threads,
        format!(
            "Thread exhaustion test completed after creating {} threads",
            created
        ),
    )
    .with_metric("threads_created", created)
    .with_metric("active_threads", active)
    .with_metric("status", reason.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{MetricValue, Outcome};

    fn quick(ceiling: usize) -> ThreadConfig {
        ThreadConfig {
            ceiling,
            park_secs: 2,
            spawn_pause_ms: 0,
            grace_ms: 50,
        }
    }

    #[test]
    fn test_stops_at_ceiling_with_failure_status() {
        let result = exhaust(&quick(16));

        assert_eq!(result.outcome, Outcome::PartialFailure);
        assert_eq!(result.status_code(), 500);
        assert!(!result.is_error());
        assert_eq!(result.metric("threads_created"), Some(&MetricValue::Count(16)));
        assert_eq!(
            result.metric("status"),
            Some(&MetricValue::Text("Thread limit reached".to_string()))
        );
        match result.metric("active_threads") {
            Some(MetricValue::Count(active)) => assert!(*active <= 16),
            other => panic!("unexpected active_threads: {:?}", other),
        }
    }

    #[test]
    fn test_zero_ceiling_spawns_nothing() {
        let result = exhaust(&quick(0));
        assert_eq!(result.metric("threads_created"), Some(&MetricValue::Count(0)));
        assert_eq!(result.status_code(), 500);
    }

    #[test]
    fn test_registry_counts_finished_threads() {
        let mut registry = ThreadRegistry::new();
        registry.spawn_parked(Duration::from_millis(0)).unwrap();
        registry.spawn_parked(Duration::from_secs(5)).unwrap();
        std::thread::sleep(Duration::from_millis(200));

        assert_eq!(registry.spawned(), 2);
        assert_eq!(registry.active(), 1);
    }
}
