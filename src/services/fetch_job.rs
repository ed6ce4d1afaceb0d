//! Responsible for producing the result documents
use std::sync::Arc;

use anyhow::{Context, bail};
use itertools::Itertools;
use tracing::{info, warn};

use super::{
    batch::{BatchReport, run_batch},
    directions_client::DirectionsProvider,
    route_fetcher::fetch_origin,
};
use crate::{
    config::{BatchSettings, FetchJob, Settings},
    dal::{load_origins, write_results},
    model::coordinate::Coordinate,
};

/// Loads the origins once and runs every configured job, or only the one named `only`
#[tracing::instrument(err, skip(settings, provider))]
pub async fn run_fetch_jobs<P: DirectionsProvider>(
    settings: &Settings,
    provider: P,
    only: Option<&str>,
) -> anyhow::Result<()> {
    let jobs = match only {
        None => settings.jobs.iter().collect_vec(),
        Some(name) => {
            let jobs = settings.jobs.iter().filter(|j| j.name == name).collect_vec();
            if jobs.is_empty() {
                bail!(
                    "unknown job {name}, expected one of: {}",
                    settings.jobs.iter().map(|j| &j.name).join(", ")
                );
            }
            jobs
        }
    };

    let origins = load_origins(&settings.origins.path, settings.origins.has_headers)?;

    let provider = Arc::new(provider);
    for job in jobs {
        run_fetch_job(provider.clone(), job, &origins, &settings.batch).await?;
    }

    Ok(())
}

/// Fetches every origin for one job and replaces the job's document with the results.
/// Nothing is written when the batch fails.
#[tracing::instrument(err, skip_all, fields(job = %job.name))]
pub async fn run_fetch_job<P: DirectionsProvider>(
    provider: Arc<P>,
    job: &FetchJob,
    origins: &[Coordinate],
    batch: &BatchSettings,
) -> anyhow::Result<BatchReport> {
    info!(
        "Fetching {} origins to {} ({})",
        origins.len(),
        job.target.name,
        job.travel_mode.layer_label()
    );

    let shared_job = Arc::new(job.clone());
    let report = run_batch(origins, batch, |origin| {
        let provider = provider.clone();
        let job = shared_job.clone();
        async move { fetch_origin(provider.as_ref(), &job, origin).await }
    })
    .await
    .with_context(|| format!("job {} failed", job.name))?;

    write_results(&job.output, &report.results)?;

    if !report.failures.is_empty() {
        warn!(
            "Left out of {}: {}",
            job.output.display(),
            report
                .failures
                .iter()
                .map(|f| format!("{} ({})", f.origin, f.error))
                .join("; ")
        );
    }

    Ok(report)
}
