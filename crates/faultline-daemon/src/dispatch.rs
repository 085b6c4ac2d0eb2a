//! Fault dispatcher
//!
//! Resolves a fault kind to its routine and runs it behind an isolation
//! boundary. Blocking routines go to the blocking pool, network routines to a
//! spawned task; either way a panic comes back as a `JoinError` and is turned
//! into an internal error result instead of unwinding through the handler.

use crate::config::FaultsConfig;
use faultline_core::exhaust::{cpu, memory, threads};
use faultline_core::simulate::{slow_call, snat, tls};
use faultline_core::{crash, FaultKind, FaultResult};
use std::future::Future;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Run the routine for `kind` to completion.
///
/// `FaultKind::BadWrite` never returns: the process exits inside the call.
pub async fn dispatch(kind: FaultKind, faults: Arc<FaultsConfig>) -> FaultResult {
    let invocation = Uuid::new_v4();
    let span = tracing::info_span!("fault", kind = kind.name(), %invocation);

    async move {
        tracing::info!("Fault triggered");
        let result = run(kind, faults).await;
        tracing::info!(
            status = result.status_code(),
            error_type = result.error_type.map(|t| t.as_str()),
            "Fault finished"
        );
        result
    }
    .instrument(span)
    .await
}

async fn run(kind: FaultKind, faults: Arc<FaultsConfig>) -> FaultResult {
    match kind {
        FaultKind::HighMemory => {
            isolate_blocking(kind, move || memory::exhaust(&faults.memory)).await
        }
        FaultKind::HighCpu => isolate_blocking(kind, move || cpu::exhaust(&faults.cpu)).await,
        FaultKind::Threads => {
            isolate_blocking(kind, move || threads::exhaust(&faults.threads)).await
        }
        FaultKind::Snat => isolate(kind, async move { snat::run(&faults.snat).await }).await,
        FaultKind::BadTls => {
            isolate(kind, async move {
                tls::run(&faults.tls, faults.target_url.as_deref()).await
            })
            .await
        }
        FaultKind::SlowCall => {
            isolate(kind, async move {
                slow_call::run(&faults.slow_call, faults.target_url.as_deref()).await
            })
            .await
        }
        FaultKind::BadWrite => crash::terminate(&faults.crash),
    }
}

/// Run a blocking routine on the blocking pool, converting a panic into an
/// internal error result.
pub async fn isolate_blocking<F>(kind: FaultKind, routine: F) -> FaultResult
where
    F: FnOnce() -> FaultResult + Send + 'static,
{
    let span = tracing::Span::current();
    match tokio::task::spawn_blocking(move || span.in_scope(routine)).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "Fault routine aborted");
            FaultResult::internal(kind, e)
        }
    }
}

/// Run an async routine on its own task, converting a panic into an internal
/// error result.
pub async fn isolate<F>(kind: FaultKind, routine: F) -> FaultResult
where
    F: Future<Output = FaultResult> + Send + 'static,
{
    match tokio::spawn(routine.in_current_span()).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "Fault routine aborted");
            FaultResult::internal(kind, e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultline_core::{ErrorType, MetricValue, Outcome, ThreadConfig};

    #[tokio::test]
    async fn test_blocking_panic_becomes_internal_error() {
        let result = isolate_blocking(FaultKind::HighCpu, || -> FaultResult {
            panic!("worker blew up")
        })
        .await;

        assert_eq!(result.status_code(), 500);
        assert_eq!(result.outcome, Outcome::Fatal);
        assert_eq!(result.error_type, Some(ErrorType::Internal));
        assert_eq!(result.message, "High CPU fault failed");
    }

    #[tokio::test]
    async fn test_async_panic_becomes_internal_error() {
        async fn lose_socket() -> FaultResult {
            panic!("lost the socket")
        }

        let result = isolate(FaultKind::Snat, lose_socket()).await;

        assert_eq!(result.error_type, Some(ErrorType::Internal));
        assert_eq!(result.kind, FaultKind::Snat);
    }

    #[tokio::test]
    async fn test_isolation_passes_results_through() {
        let result = isolate_blocking(FaultKind::Threads, || {
            FaultResult::success(FaultKind::Threads, "done")
        })
        .await;

        assert_eq!(result.status_code(), 200);
        assert_eq!(result.message, "done");
    }

    #[tokio::test]
    async fn test_dispatch_tls_without_target() {
        let result = dispatch(FaultKind::BadTls, Arc::new(FaultsConfig::default())).await;

        assert_eq!(result.status_code(), 500);
        assert_eq!(result.error_type, Some(ErrorType::Configuration));
    }

    #[tokio::test]
    async fn test_dispatch_threads_runs_on_blocking_pool() {
        let faults = FaultsConfig {
            threads: ThreadConfig {
                ceiling: 3,
                park_secs: 1,
                spawn_pause_ms: 0,
                grace_ms: 0,
            },
            ..Default::default()
        };

        let result = dispatch(FaultKind::Threads, Arc::new(faults)).await;

        assert_eq!(result.status_code(), 500);
        assert_eq!(result.metric("threads_created"), Some(&MetricValue::Count(3)));
    }

    #[tokio::test]
    async fn test_repeated_dispatch_keeps_result_shape() {
        let faults = Arc::new(FaultsConfig {
            threads: ThreadConfig {
                ceiling: 2,
                park_secs: 1,
                spawn_pause_ms: 0,
                grace_ms: 0,
            },
            ..Default::default()
        });

        for kind in [FaultKind::Threads, FaultKind::SlowCall] {
            let keys = |result: FaultResult| -> Vec<String> {
                let body = serde_json::to_value(&result).unwrap();
                body.as_object().unwrap().keys().cloned().collect()
            };

            let first = keys(dispatch(kind, faults.clone()).await);
            let second = keys(dispatch(kind, faults.clone()).await);

            assert!(!first.is_empty());
            assert_eq!(first, second, "{} changed shape between runs", kind);
        }
    }
}
