// crates/feedflux-cli/src/main.rs

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use polars::prelude::*;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use feedflux_core::config::PipelineConfig;
use feedflux_core::{ingest, network, outputs, profiling, timeseries, transform};

/// String-encoded boolean columns normalized during `prepare`.
const BOOLEAN_COLUMNS: [&str; 2] = ["isReply", "author_isBlueVerified"];

/// A CLI for the feedflux data-preparation pipeline
#[derive(Parser, Debug)]
#[command(author, version, about = "Feedflux batch data-preparation pipeline", long_about = None)]
struct Cli {
    /// TOML pipeline configuration; overrides the conventional layout
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Project root for the conventional data/parquet layout
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline and materialize all parquet artifacts
    Prepare(PrepareArgs),
    /// Print data-quality reports for a materialized artifact
    Profile(ProfileArgs),
    /// List cached parquet artifacts
    List,
}

#[derive(Args, Debug)]
struct PrepareArgs {
    /// Text timestamp column used for the daily buckets
    #[arg(long, default_value = "created_at")]
    date_col: String,

    /// Numeric column summed into total_engagement
    #[arg(long, default_value = "likeCount")]
    engagement_col: String,

    /// Join key for the registry enrichment
    #[arg(long, default_value = "author_id")]
    join_key: String,

    /// Reply-network source column
    #[arg(long, default_value = "pseudo_author_userName")]
    source_col: String,

    /// Reply-network target column
    #[arg(long, default_value = "pseudo_inReplyToUsername")]
    target_col: String,

    /// Partition the enriched dataset by these columns
    #[arg(long)]
    partition_by: Vec<String>,
}

#[derive(Args, Debug)]
struct ProfileArgs {
    /// Materialized parquet artifact to profile
    artifact: PathBuf,

    /// Columns flagged as keys in the missingness report
    #[arg(long, default_values_t = vec!["id".to_string(), "author_id".to_string()])]
    key_columns: Vec<String>,

    /// Column subset the duplicate check groups on
    #[arg(long, default_values_t = vec!["id".to_string()])]
    duplicate_subset: Vec<String>,

    /// Numeric columns summarized in the engagement report
    #[arg(long, default_values_t = [
        "retweetCount", "replyCount", "likeCount", "quoteCount", "viewCount",
    ].map(String::from).to_vec())]
    engagement_cols: Vec<String>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::Prepare(args) => handle_prepare(args, &config),
        Command::Profile(args) => handle_profile(args),
        Command::List => handle_list(&config),
    }
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config file {}", path.display())),
        None => Ok(PipelineConfig::from_root(&cli.root)),
    }
}

fn handle_prepare(args: PrepareArgs, config: &PipelineConfig) -> Result<()> {
    info!(path = %config.raw_events.display(), "scanning raw events");
    let events = ingest::scan_raw_events(&config.raw_events, None)?
        .collect()
        .context("collecting raw event scan")?;
    info!(rows = events.height(), "raw events loaded");

    let registry = ingest::read_registry(&config.raw_registry)?;
    info!(rows = registry.height(), "author registry loaded");

    let normalized = transform::normalize_boolean_columns(&events, &BOOLEAN_COLUMNS)?;
    let enriched =
        transform::enrich_with_registry(&normalized, &registry, &args.join_key, None)?;

    let series = timeseries::build_time_series(&enriched, &args.date_col, &args.engagement_col)?;
    let edges = network::project_edges(&enriched, &args.source_col, &args.target_col)?;

    let dir = &config.parquet_dir;
    if args.partition_by.is_empty() {
        outputs::materialize_parquet(
            enriched.clone().lazy(),
            &dir.join("events_enriched.parquet"),
            None,
        )?;
    } else {
        let partitions: Vec<&str> = args.partition_by.iter().map(String::as_str).collect();
        outputs::materialize_parquet(
            enriched.clone().lazy(),
            &dir.join("events_enriched"),
            Some(&partitions),
        )?;
    }
    outputs::materialize_parquet(
        series.daily_counts.clone().lazy(),
        &dir.join("daily_counts.parquet"),
        None,
    )?;
    outputs::materialize_parquet(
        series.rolling_metrics.clone().lazy(),
        &dir.join("rolling_metrics.parquet"),
        None,
    )?;
    outputs::materialize_parquet(
        series.anomalies.clone().lazy(),
        &dir.join("anomalies.parquet"),
        None,
    )?;
    outputs::materialize_parquet(edges.clone().lazy(), &dir.join("reply_edges.parquet"), None)?;

    let manifest = json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "rows": {
            "events": events.height(),
            "registry": registry.height(),
            "daily_counts": series.daily_counts.height(),
            "rolling_metrics": series.rolling_metrics.height(),
            "anomalies": series.anomalies.height(),
            "reply_edges": edges.height(),
        },
    });
    std::fs::write(
        dir.join("manifest.json"),
        serde_json::to_vec_pretty(&manifest)?,
    )
    .context("writing run manifest")?;

    println!("--- Prepare Summary ---");
    println!("  events:          {}", events.height());
    println!("  daily buckets:   {}", series.daily_counts.height());
    println!("  anomalous days:  {}", series.anomalies.height());
    println!("  reply edges:     {}", edges.height());
    println!("  artifacts in:    {}", dir.display());
    Ok(())
}

fn handle_profile(args: ProfileArgs) -> Result<()> {
    if !args.artifact.exists() {
        anyhow::bail!("artifact not found: {}", args.artifact.display());
    }
    let df = ParquetReader::new(File::open(&args.artifact)?)
        .finish()
        .with_context(|| format!("reading artifact {}", args.artifact.display()))?;
    info!(rows = df.height(), columns = df.width(), "artifact loaded");

    let keys: Vec<&str> = args.key_columns.iter().map(String::as_str).collect();
    let missing = profiling::missingness_summary(&df, &keys)?;
    print_table("Missingness", &missing);

    let subset: Vec<&str> = args.duplicate_subset.iter().map(String::as_str).collect();
    match profiling::duplicate_check(&df, &subset) {
        Ok(dupes) => print_table("Duplicate groups", &dupes),
        Err(err) => println!("duplicate check skipped: {err}"),
    }

    let engagement: Vec<&str> = args.engagement_cols.iter().map(String::as_str).collect();
    let distribution = profiling::engagement_distribution(&df, &engagement)?;
    print_table("Engagement distribution", &distribution);
    Ok(())
}

fn handle_list(config: &PipelineConfig) -> Result<()> {
    let files = outputs::list_parquet_files(&config.parquet_dir)?;
    if files.is_empty() {
        println!("no parquet artifacts under {}", config.parquet_dir.display());
        return Ok(());
    }
    for file in files {
        println!("{}", file.display());
    }
    Ok(())
}

fn print_table(title: &str, df: &DataFrame) {
    let mut table = Table::new();
    table.set_header(
        df.get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect::<Vec<_>>(),
    );
    for idx in 0..df.height() {
        let row: Vec<String> = df
            .get_columns()
            .iter()
            .map(|column| match column.get(idx) {
                Ok(value) => value.to_string().trim_matches('"').to_string(),
                Err(_) => String::new(),
            })
            .collect();
        table.add_row(row);
    }
    println!("\n{title}");
    println!("{table}");
}
