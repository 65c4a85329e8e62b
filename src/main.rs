use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

use wellbeing_analytics::csv_source::{self, CsvSource};
use wellbeing_analytics::db::{self, PgSource};
use wellbeing_analytics::models::Sentiment;
use wellbeing_analytics::report::EntryFilter;
use wellbeing_analytics::{logging, report, summarize, AppConfig, Snapshot, SnapshotSource};

#[derive(Parser)]
#[command(name = "wellbeing")]
#[command(about = "Journal and screening-test wellbeing analytics", long_about = None)]
struct Cli {
    /// TOML file with engine tuning and logging settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Read this user's records from Postgres (needs DATABASE_URL)
    #[arg(long, conflicts_with_all = ["entries_csv", "results_csv"])]
    email: Option<String>,
    /// Journal entries CSV
    #[arg(long)]
    entries_csv: Option<PathBuf>,
    /// Screening results CSV
    #[arg(long)]
    results_csv: Option<PathBuf>,
    /// Day to compute streaks and series for (defaults to today, UTC)
    #[arg(long)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a week of demo data
    Seed {
        #[arg(long, default_value = "demo@wellbeing.local")]
        email: String,
    },
    /// Import entries and/or results from CSV files into Postgres
    Import {
        #[arg(long)]
        email: String,
        #[arg(long)]
        entries: Option<PathBuf>,
        #[arg(long)]
        results: Option<PathBuf>,
    },
    /// Print the dashboard summary
    Summary {
        #[command(flatten)]
        source: SourceArgs,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        /// Only list recent entries with this sentiment
        #[arg(long, value_parser = ["Positive", "Neutral", "Negative"])]
        sentiment: Option<String>,
        /// Only list recent entries containing this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,
    },
}

async fn connect() -> anyhow::Result<sqlx::PgPool> {
    let database_url = db::database_url()
        .context("DATABASE_URL must be set to a Postgres instance")?;
    db::connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn load_snapshot(source: &SourceArgs) -> anyhow::Result<Snapshot> {
    if source.entries_csv.is_some() || source.results_csv.is_some() {
        let csv = CsvSource::new(source.entries_csv.clone(), source.results_csv.clone());
        return csv.snapshot().await.context("failed to read CSV snapshot");
    }

    let email = source
        .email
        .as_deref()
        .context("pass --email or at least one of --entries-csv / --results-csv")?;
    let pool = connect().await?;
    PgSource::new(pool, email)
        .snapshot()
        .await
        .context("failed to read snapshot from Postgres")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    logging::init(&config.logging);

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed { email } => {
            let pool = connect().await?;
            db::seed(&pool, &email, Utc::now().date_naive()).await?;
            println!("Seed data inserted for {email}.");
        }
        Commands::Import {
            email,
            entries,
            results,
        } => {
            if entries.is_none() && results.is_none() {
                anyhow::bail!("nothing to import: pass --entries and/or --results");
            }
            let pool = connect().await?;

            if let Some(path) = entries {
                let records = csv_source::read_entries(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let inserted = db::import_entries(&pool, &email, &records).await?;
                println!("Inserted {inserted} entries from {}.", path.display());
            }
            if let Some(path) = results {
                let records = csv_source::read_results(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let inserted = db::import_results(&pool, &email, &records).await?;
                println!("Inserted {inserted} results from {}.", path.display());
            }
        }
        Commands::Summary { source, json } => {
            let snapshot = load_snapshot(&source).await?;
            let today = source.today.unwrap_or_else(|| Utc::now().date_naive());
            let summary = summarize(&snapshot.entries, &snapshot.results, today, &config.engine);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", report::build_overview(&summary));
            }
        }
        Commands::Report {
            source,
            out,
            sentiment,
            search,
        } => {
            let snapshot = load_snapshot(&source).await?;
            let today = source.today.unwrap_or_else(|| Utc::now().date_naive());
            let summary = summarize(&snapshot.entries, &snapshot.results, today, &config.engine);
            let filter = EntryFilter {
                sentiment: sentiment.as_deref().map(Sentiment::from_label),
                search: search.as_deref(),
            };
            let report =
                report::build_report(source.email.as_deref(), &summary, &snapshot.entries, filter);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
