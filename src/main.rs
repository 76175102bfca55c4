use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use timeline_archiver::config;
use timeline_archiver::db;
use timeline_archiver::fetcher::QuotaPolicy;
use timeline_archiver::metrics::IngestMetrics;
use timeline_archiver::pipeline::{self, CancelToken};
use timeline_archiver::timeline::TimelineClient;

#[derive(Debug, Parser)]
#[command(author, version, about = "Archive a user's timeline into SQLite")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Screen name whose timeline to archive
    #[arg(long)]
    user: String,

    /// Number of statuses to request (capped by ingest.max_count)
    #[arg(long)]
    count: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    // Invocation surface is validated before any network or store activity.
    let request = cfg.ingest_request(&args.user, args.count)?;

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| format!("sqlite://{}/archiver.db?mode=rwc", cfg.app.data_dir));

    let pool = db::init_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    let client = Arc::new(TimelineClient::from_config(&cfg)?);
    let policy = QuotaPolicy {
        quota_retries: cfg.ingest.quota_retries,
    };
    let metrics = Arc::new(IngestMetrics::default());
    let cancel = CancelToken::new();

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; cancelling pipeline");
            interrupt.cancel();
        }
    });

    info!(
        username = %request.username,
        count = request.count,
        database_url = %database_url,
        "starting timeline archive"
    );
    let report = pipeline::run(
        pool,
        client,
        request,
        policy,
        metrics.clone(),
        cancel,
    )
    .await?;

    let snapshot = metrics.snapshot();
    info!(
        fetched = report.fetched,
        inserted = report.inserted,
        duplicates = report.duplicates,
        malformed = snapshot.malformed_items,
        quota_hits = snapshot.quota_hits,
        "archive complete"
    );
    Ok(())
}
