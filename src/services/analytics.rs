//! Volume and price analytics.
//!
//! Everything here is a pure function of the fetched series: no I/O, no
//! shared state. `AnalyticsEngine` resolves each symbol's target session,
//! derives its volume and price metrics, then runs a second pass comparing
//! every symbol against each benchmark that resolved.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use crate::models::analysis::{ComparisonResult, ComparisonStatus, SymbolMetrics};
use crate::models::benchmark::BenchmarkSet;
use crate::models::quote::{TimeSeries, TimeSeriesPoint};

/// Trailing sessions averaged for the volume baseline, target session included
pub const VOLUME_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeMetrics {
    pub current_volume: u64,
    pub avg_volume: f64,
    pub volume_ratio: f64,
}

/// Index of the session matching `date` (exchange-local day), else the latest session.
/// The latest session is the last one with a close, so a trailing in-progress bar
/// is skipped. `None` only for an empty series.
pub fn resolve_target_index(series: &TimeSeries, date: Option<NaiveDate>) -> Option<usize> {
    let last = series.points.len().checked_sub(1)?;
    let latest = series
        .points
        .iter()
        .rposition(|p| p.close.is_some())
        .unwrap_or(last);

    let Some(date) = date else {
        return Some(latest);
    };

    let matched = series
        .points
        .iter()
        .position(|p| series.local_date(p.timestamp) == Some(date));

    if matched.is_none() {
        tracing::debug!(
            "No {} session on {}, using latest session",
            series.symbol,
            date
        );
    }

    Some(matched.unwrap_or(latest))
}

pub fn volume_metrics(points: &[TimeSeriesPoint], index: usize) -> VolumeMetrics {
    let Some(target) = points.get(index) else {
        return VolumeMetrics {
            current_volume: 0,
            avg_volume: 0.0,
            volume_ratio: 0.0,
        };
    };

    let start = index.saturating_sub(VOLUME_WINDOW - 1);
    let (sum, count) = points[start..=index]
        .iter()
        .filter_map(|p| p.volume)
        .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v as f64, count + 1));

    let avg_volume = if count > 0 { sum / count as f64 } else { 0.0 };
    let current_volume = target.volume.unwrap_or(0);
    let volume_ratio = if avg_volume > 0.0 {
        current_volume as f64 / avg_volume
    } else {
        0.0
    };

    VolumeMetrics {
        current_volume,
        avg_volume,
        volume_ratio,
    }
}

/// Percent change of the target close against the previous session, rounded to 2 places.
/// Counts as unchanged when either close is missing or there is no previous session.
pub fn price_change_pct(points: &[TimeSeriesPoint], index: usize) -> f64 {
    let Some(current_close) = points.get(index).and_then(|p| p.close) else {
        return 0.0;
    };

    let previous_close = index
        .checked_sub(1)
        .and_then(|i| points[i].close)
        .unwrap_or(current_close);

    if previous_close > 0.0 {
        let pct = round2((current_close - previous_close) / previous_close * 100.0);
        if pct.is_finite() { pct } else { 0.0 }
    } else {
        0.0
    }
}

/// Close at `index`, or the most recent earlier close when that session has none
pub fn close_at_or_before(points: &[TimeSeriesPoint], index: usize) -> f64 {
    points
        .get(..=index)
        .and_then(|window| window.iter().rev().find_map(|p| p.close))
        .unwrap_or(0.0)
}

/// Compare two already-rounded percent changes. A flat benchmark yields a neutral 1.
pub fn compare(symbol_pct: f64, benchmark_pct: f64) -> ComparisonResult {
    let ratio = if benchmark_pct != 0.0 {
        round2(symbol_pct / benchmark_pct)
    } else {
        1.0
    };

    ComparisonResult {
        ratio,
        status: ComparisonStatus::classify(ratio),
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Metrics for one symbol without comparisons, reported under `symbol`.
/// `None` for an empty series.
pub fn symbol_metrics(
    symbol: &str,
    series: &TimeSeries,
    date: Option<NaiveDate>,
) -> Option<SymbolMetrics> {
    let index = resolve_target_index(series, date)?;
    let point = &series.points[index];
    let volume = volume_metrics(&series.points, index);

    let target_date = series
        .local_date(point.timestamp)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    Some(SymbolMetrics {
        symbol: symbol.to_uppercase(),
        current_volume: volume.current_volume,
        avg_volume: volume.avg_volume,
        volume_ratio: volume.volume_ratio,
        price: close_at_or_before(&series.points, index),
        price_change_pct: price_change_pct(&series.points, index),
        target_date,
        comparisons: BTreeMap::new(),
    })
}

/// Stateless calculator turning fetched series into the analysis result set
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    benchmarks: BenchmarkSet,
}

impl AnalyticsEngine {
    pub fn new(benchmarks: BenchmarkSet) -> Self {
        Self { benchmarks }
    }

    pub fn benchmarks(&self) -> &BenchmarkSet {
        &self.benchmarks
    }

    /// Analyze `symbols` in order. Symbols without a series, or with an empty
    /// one, are left out. Rows keep the requested symbol even if the source
    /// named its series differently. Benchmarks that did not resolve are
    /// omitted from every symbol's comparisons.
    pub fn analyze(
        &self,
        symbols: &[String],
        series: &HashMap<String, TimeSeries>,
        date: Option<NaiveDate>,
    ) -> Vec<SymbolMetrics> {
        let mut results: Vec<SymbolMetrics> = symbols
            .iter()
            .filter_map(|symbol| symbol_metrics(symbol, series.get(symbol)?, date))
            .collect();

        let benchmark_changes: Vec<(String, f64)> = self
            .benchmarks
            .symbols()
            .iter()
            .filter_map(|b| {
                results
                    .iter()
                    .find(|m| &m.symbol == b)
                    .map(|m| (b.clone(), m.price_change_pct))
            })
            .collect();

        for metrics in &mut results {
            for (benchmark, benchmark_pct) in &benchmark_changes {
                metrics
                    .comparisons
                    .insert(benchmark.clone(), compare(metrics.price_change_pct, *benchmark_pct));
            }
        }

        results
    }
}
