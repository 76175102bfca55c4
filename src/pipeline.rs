//! Pipeline orchestrator.
//!
//! Runs fetch → transform → persist as one linear chain on a single
//! background task and blocks the caller until the chain reaches Done or
//! its first terminal error. The store pool is closed exactly once on
//! either path, and elapsed wall-clock time is reported either way.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info};

use crate::db::Pool;
use crate::fetcher::{FetchSession, QuotaPolicy};
use crate::metrics::IngestMetrics;
use crate::model::{IngestRequest, PipelineReport, Stage};
use crate::persister::{self, PersistSummary};
use crate::timeline::TimelineService;
use crate::transform;

/// Cooperative cancellation flag shared with the pipeline task. Checked at
/// stage boundaries and before each page request.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Terminal error for a run stopped through its [`CancelToken`].
#[derive(Debug, Error)]
#[error("pipeline cancelled at stage {}", .0.as_str())]
pub struct Cancelled(pub Stage);

/// Run the full chain for one request and wait for the result.
pub async fn run(
    pool: Pool,
    client: Arc<dyn TimelineService>,
    request: IngestRequest,
    policy: QuotaPolicy,
    metrics: Arc<IngestMetrics>,
    cancel: CancelToken,
) -> Result<PipelineReport> {
    let started = Instant::now();

    let task_pool = pool.clone();
    let handle = tokio::spawn(async move {
        run_stages(task_pool, client, request, policy, metrics, cancel).await
    });
    let result = handle.await.context("pipeline task panicked")?;

    pool.close().await;
    let elapsed = started.elapsed();

    match result {
        Ok((fetched, transformed, summary)) => {
            info!(
                stage = Stage::Done.as_str(),
                "operation completed in {}",
                format_duration(elapsed)
            );
            Ok(PipelineReport {
                fetched,
                transformed,
                inserted: summary.inserted,
                duplicates: summary.duplicates,
                elapsed,
            })
        }
        Err(err) => {
            error!(
                error = %err,
                "pipeline failed after {}",
                format_duration(elapsed)
            );
            Err(err)
        }
    }
}

async fn run_stages(
    pool: Pool,
    client: Arc<dyn TimelineService>,
    request: IngestRequest,
    policy: QuotaPolicy,
    metrics: Arc<IngestMetrics>,
    cancel: CancelToken,
) -> Result<(usize, usize, PersistSummary)> {
    info!(
        stage = Stage::Start.as_str(),
        username = %request.username,
        count = request.count,
        "pipeline started"
    );

    let mut session = FetchSession::new(&request, policy);
    let statuses = session.run(client.as_ref(), &metrics, &cancel).await?;
    info!(
        stage = Stage::Fetched.as_str(),
        count = statuses.len(),
        "fetch stage complete"
    );

    if cancel.is_cancelled() {
        return Err(Cancelled(Stage::Fetched).into());
    }
    let records = transform::transform_all(&statuses, &metrics);
    info!(
        stage = Stage::Transformed.as_str(),
        count = records.len(),
        "transform stage complete"
    );

    if cancel.is_cancelled() {
        return Err(Cancelled(Stage::Transformed).into());
    }
    let summary = persister::persist_records(&pool, &records, &metrics).await?;
    info!(
        stage = Stage::Persisted.as_str(),
        inserted = summary.inserted,
        duplicates = summary.duplicates,
        "persist stage complete"
    );

    Ok((statuses.len(), records.len(), summary))
}

/// Render an elapsed duration as whole minutes and seconds.
pub fn format_duration(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{}m {}s", total / 60, total % 60)
}
