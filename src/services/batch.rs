//! Runs the per-origin fetch for every origin with bounded concurrency
use std::{future::Future, pin::pin};

use futures::{StreamExt, stream};
use tokio::{spawn, time::sleep};
use tracing::{error, info, warn};

use super::{directions_client::FetchError, rate_limiter::CompletionPacer};
use crate::{
    config::BatchSettings,
    model::{coordinate::Coordinate, result_model::OriginResult},
};

#[derive(Debug)]
pub struct FailedOrigin {
    pub origin: Coordinate,
    pub error: String,
}

/// Results in completion order plus the origins that failed
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<OriginResult>,
    pub failures: Vec<FailedOrigin>,
}

#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("{failed} of {total} origins failed, more than the tolerated ratio of {max_ratio}")]
    TooManyFailures {
        failed: usize,
        total: usize,
        max_ratio: f64,
    },
}

/// Spawns `fetch` for every origin, never more than `pool_size` at a time, and collects the
/// outcomes as they finish. Failed origins are reported and only abort the batch once they
/// exceed `max_failure_ratio`.
pub async fn run_batch<F, Fut>(
    origins: &[Coordinate],
    settings: &BatchSettings,
    mut fetch: F,
) -> Result<BatchReport, BatchError>
where
    F: FnMut(Coordinate) -> Fut,
    Fut: Future<Output = Result<OriginResult, FetchError>> + Send + 'static,
{
    let total = origins.len();

    let mut completions = pin!(
        stream::iter(origins.iter().copied())
            .map(|origin| {
                let task = spawn(fetch(origin));
                async move { (origin, task.await) }
            })
            .buffer_unordered(settings.pool_size.max(1))
    );

    let pacer = settings
        .max_completions_per_second
        .map(CompletionPacer::new);
    let mut report = BatchReport::default();
    let mut done = 0;

    while let Some((origin, outcome)) = completions.next().await {
        done += 1;

        match outcome {
            Ok(Ok(result)) => {
                info!("[{done}/{total}] Done: {origin}");
                report.results.push(result);
            }
            Ok(Err(e)) => {
                warn!("[{done}/{total}] Failed: {origin}: {e}");
                report.failures.push(FailedOrigin {
                    origin,
                    error: e.to_string(),
                });
            }
            Err(e) => {
                error!("[{done}/{total}] Task for {origin} died: {e}");
                report.failures.push(FailedOrigin {
                    origin,
                    error: e.to_string(),
                });
            }
        }

        if let Some(pause) = pacer.as_ref().and_then(CompletionPacer::record_completion) {
            sleep(pause).await;
        }
    }

    let failed = report.failures.len();
    if total > 0 && failed as f64 / total as f64 > settings.max_failure_ratio {
        return Err(BatchError::TooManyFailures {
            failed,
            total,
            max_ratio: settings.max_failure_ratio,
        });
    }

    if failed > 0 {
        warn!("{failed} of {total} origins failed and are left out of the results");
    }

    Ok(report)
}
