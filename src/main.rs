//! Review Facet Engine - batch query runner
//!
//! Loads a review CSV once, then answers every query of a queries file
//! concurrently against the shared dataset. Each query is a dashboard
//! request or a drilldown key; each answer is printed in query order.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use review_facet_engine::config::EngineConfig;
use review_facet_engine::engine::load_dataset;
use review_facet_engine::engine::loader::CsvSource;
use review_facet_engine::engine::Dataset;
use review_facet_engine::pipeline::{Pipeline, Query, QueryView};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One JSON document per query
    Json,
    /// Chart and table frames as text tables
    Table,
}

#[derive(Parser, Debug)]
#[command(name = "review_facet_engine")]
#[command(about = "Answer dashboard and drilldown queries over a review dataset")]
struct Args {
    /// Review CSV file
    #[arg(long)]
    data: PathBuf,

    /// JSON object of property overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of queries
    #[arg(long)]
    queries: PathBuf,

    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn render(view: &QueryView<'_>, config: &EngineConfig, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(view)?),
        OutputFormat::Table => match view {
            QueryView::Dashboard(dashboard) => {
                let frames = dashboard.frames()?;
                let mut out = format!(
                    "matched rows: {}\n{}\n{}\n{}\n",
                    dashboard.matched, frames.features, frames.facts, frames.sentiment
                );
                if let Some(comparison) = &frames.comparison {
                    out.push_str(&format!("{}\n", comparison));
                }
                out.push_str(&format!("{}", frames.page));
                Ok(out)
            }
            QueryView::Drilldown(drilldown) => Ok(format!(
                "{} ({} rows matched)\n{}",
                drilldown.key.encode(),
                drilldown.matched,
                drilldown.frame(config)?
            )),
        },
    }
}

fn answer(dataset: &Dataset, config: &EngineConfig, query: &Query, format: OutputFormat) -> Result<String> {
    let view = Pipeline::new(dataset, config).run(query)?;
    render(&view, config, format)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("review_facet_engine={}", args.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Review Facet Engine v{}", env!("CARGO_PKG_VERSION"));

    let config = Arc::new(EngineConfig::load(args.config.as_deref())?);

    let t0 = std::time::Instant::now();
    let dataset = Arc::new(
        load_dataset(&CsvSource::path(&args.data), &config.load_options())
            .with_context(|| format!("loading {}", args.data.display()))?,
    );
    info!("loaded {} rows in {:.2?}", dataset.len(), t0.elapsed());
    match dataset.date_bounds() {
        Some((first, last)) => info!("review dates span {} to {}", first, last),
        None => warn!("no parsable review dates; every date filter will be empty"),
    }

    let text = std::fs::read_to_string(&args.queries)
        .with_context(|| format!("reading {}", args.queries.display()))?;
    let queries: Vec<Query> = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", args.queries.display()))?;
    info!("running {} queries", queries.len());

    let format = args.format;
    let tasks = queries.into_iter().map(|query| {
        let dataset = Arc::clone(&dataset);
        let config = Arc::clone(&config);
        tokio::task::spawn_blocking(move || answer(&dataset, &config, &query, format))
    });

    let mut failed = 0usize;
    for (i, joined) in futures::future::join_all(tasks).await.into_iter().enumerate() {
        match joined.context("query task panicked")? {
            Ok(output) => println!("{}", output),
            Err(e) => {
                failed += 1;
                warn!("query {} failed: {:#}", i + 1, e);
                println!("{}", serde_json::json!({ "query": i + 1, "error": e.to_string() }));
            }
        }
    }

    info!("done in {:.2?} ({} failed)", t0.elapsed(), failed);
    Ok(())
}
