use chrono::Utc;
use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use std::path::PathBuf;

use volume_scanner::config::AppConfig;
use volume_scanner::presentation::csv_export::CsvReport;
use volume_scanner::presentation::sort::{sort_rows, SortColumn, SortDirection};
use volume_scanner::presentation::table::render_table;
use volume_scanner::services::analytics::AnalyticsEngine;
use volume_scanner::services::scanner::{normalize_symbols, parse_request_date, scan};
use volume_scanner::services::yahoo_chart::YahooChartClient;

/// Print a volume/price comparison table for a set of tickers
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Tickers to analyze; benchmarks are always added
    #[arg(required = true)]
    symbols: Vec<String>,

    /// Session to analyze (YYYY-MM-DD); latest when omitted
    #[arg(long)]
    date: Option<String>,

    /// Column to sort by, e.g. volume_ratio, price_change_pct, vs_spy
    #[arg(long)]
    sort: Option<String>,

    /// Sort descending
    #[arg(long)]
    desc: bool,

    /// Also write the report to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,volume_scanner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load environment variables
    dotenv().ok();

    let args = Args::parse();
    let config = AppConfig::from_env()?;

    let symbols = normalize_symbols(&args.symbols)?;
    let date = parse_request_date(args.date.as_deref())?;
    let direction = if args.desc { SortDirection::Desc } else { SortDirection::Asc };
    let engine = AnalyticsEngine::new(config.benchmarks.clone());
    let sort = args
        .sort
        .as_deref()
        .map(|s| s.parse::<SortColumn>()?.check_against(engine.benchmarks()))
        .transpose()?;

    let quotes = YahooChartClient::new(config.quotes.clone())?;

    let outcome = scan(&quotes, &engine, &symbols, date).await?;
    let rows = sort_rows(outcome.metrics, sort.as_ref(), direction, engine.benchmarks());

    println!("{}", render_table(&rows, engine.benchmarks()));

    if !outcome.unavailable.is_empty() {
        println!("Unavailable: {}", outcome.unavailable.join(", "));
    }

    if let Some(path) = args.csv {
        let request_date = date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "latest".to_string());
        let report = CsvReport {
            rows: &rows,
            benchmarks: engine.benchmarks(),
            generated_at: Utc::now(),
            request_date: &request_date,
        };
        std::fs::write(&path, report.to_csv()?)?;
        tracing::info!("Wrote {} rows to {}", rows.len(), path.display());
    }

    Ok(())
}
