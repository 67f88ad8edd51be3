use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use crate::error::ScanError;
use crate::models::analysis::SymbolMetrics;
use crate::models::quote::TimeSeries;
use crate::services::analytics::AnalyticsEngine;
use crate::services::quote_source::QuoteSource;

lazy_static! {
    // Plain tickers plus class shares (BRK.B), indices (^GSPC) and futures/fx (ES=F)
    static ref SYMBOL_REGEX: Regex = Regex::new(r"^[A-Z0-9.\-^=]{1,15}$").unwrap();
}

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub metrics: Vec<SymbolMetrics>,
    pub unavailable: Vec<String>,
}

/// Trim, uppercase and validate requested tickers, dropping duplicates.
pub fn normalize_symbols(raw: &[String]) -> Result<Vec<String>, String> {
    let mut symbols: Vec<String> = Vec::new();

    for entry in raw {
        let symbol = entry.trim().to_uppercase();
        if symbol.is_empty() {
            continue;
        }
        if !SYMBOL_REGEX.is_match(&symbol) {
            return Err(format!("Invalid symbol: '{}'", entry.trim()));
        }
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }

    if symbols.is_empty() {
        return Err("symbols must be a non-empty array of ticker symbols".to_string());
    }

    Ok(symbols)
}

/// `None` for an absent, blank or "latest" date.
pub fn parse_request_date(raw: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("latest") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("Invalid date format: '{}'. Expected YYYY-MM-DD", s)),
    }
}

/// Fetch every symbol concurrently and wait for all of them.
/// Returns the resolved series and the symbols whose fetch failed.
pub async fn fetch_all(
    source: &dyn QuoteSource,
    symbols: &[String],
    date: Option<NaiveDate>,
) -> (HashMap<String, TimeSeries>, Vec<String>) {
    let futures: Vec<_> = symbols
        .iter()
        .map(|symbol| async move {
            let result = source.fetch_series(symbol, date).await;
            (symbol.clone(), result)
        })
        .collect();

    let results = futures_util::future::join_all(futures).await;

    let mut resolved = HashMap::new();
    let mut failed = Vec::new();

    for (symbol, result) in results {
        match result {
            Ok(series) => {
                resolved.insert(symbol, series);
            }
            Err(e) => {
                tracing::warn!("Dropping {}: {}", symbol, e);
                failed.push(symbol);
            }
        }
    }

    (resolved, failed)
}

/// Fetch the requested symbols plus benchmarks and run the analytics pass.
/// Fails only when no symbol at all could be resolved.
pub async fn scan(
    source: &dyn QuoteSource,
    engine: &AnalyticsEngine,
    requested: &[String],
    date: Option<NaiveDate>,
) -> Result<ScanOutcome, ScanError> {
    let symbols = engine.benchmarks().union_with(requested);

    tracing::info!(
        "Scanning {} symbols ({} requested) for {}",
        symbols.len(),
        requested.len(),
        date.map(|d| d.to_string()).unwrap_or_else(|| "latest".to_string())
    );

    let (series, _failed) = fetch_all(source, &symbols, date).await;
    let metrics = engine.analyze(&symbols, &series, date);

    if metrics.is_empty() {
        return Err(ScanError::NoData(symbols.len()));
    }

    let unavailable: Vec<String> = symbols
        .iter()
        .filter(|s| !metrics.iter().any(|m| &m.symbol == *s))
        .cloned()
        .collect();

    tracing::info!(
        "Resolved {}/{} symbols",
        metrics.len(),
        symbols.len()
    );

    Ok(ScanOutcome {
        metrics,
        unavailable,
    })
}
