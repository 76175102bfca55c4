use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use timeline_archiver::config;
use timeline_archiver::db;

#[derive(Debug, Parser)]
#[command(author, version, about = "Inspect archived timeline records")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// List records committed for this author display name
    #[arg(long)]
    author: Option<String>,

    /// Look up a single record by its source id
    #[arg(long)]
    source_id: Option<i64>,

    /// List distinct author names present in the store
    #[arg(long)]
    authors: bool,
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

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| format!("sqlite://{}/archiver.db?mode=rwc", cfg.app.data_dir));
    let pool = db::init_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    if let Some(source_id) = args.source_id {
        match db::record_by_source_id(&pool, source_id).await? {
            Some(record) => println!("{}", render(&record)),
            None => println!("no record with source id {source_id}"),
        }
    } else if let Some(author) = args.author.as_deref() {
        for record in db::records_by_author(&pool, author).await? {
            println!("{}", render(&record));
        }
    } else if args.authors {
        for author in db::distinct_authors(&pool).await? {
            println!("{author}");
        }
    } else {
        println!("{} records archived", db::count_records(&pool).await?);
    }

    Ok(())
}

fn render(record: &db::StoredRecord) -> String {
    format!(
        "record_id: {}\nsource_id: {}\ncreated_at: {}\ntext: {}\nauthor: {}\nlanguage: {}\n",
        record.record_id,
        record.source_id,
        record.created_at,
        record.text,
        record.author,
        record.language
    )
}
