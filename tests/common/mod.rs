use std::sync::Arc;

use axum::Router;
use volume_scanner::{
    build_router,
    models::{
        benchmark::BenchmarkSet,
        quote::{TimeSeries, TimeSeriesPoint},
    },
    services::{analytics::AnalyticsEngine, quote_source::StaticQuoteSource},
    AppState,
};

/// 2024-03-01 14:30 UTC, the New York open
pub const FIRST_SESSION: i64 = 1_709_303_400;
pub const DAY: i64 = 86_400;
pub const NEW_YORK_OFFSET: i32 = -5 * 3600;

/// One session per calendar day starting 2024-03-01
pub fn daily_series(symbol: &str, closes: &[f64], volumes: &[Option<u64>]) -> TimeSeries {
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| TimeSeriesPoint {
            timestamp: FIRST_SESSION + i as i64 * DAY,
            close: Some(close),
            volume: volumes.get(i).copied().flatten(),
        })
        .collect();
    TimeSeries::new(symbol, points).with_utc_offset(NEW_YORK_OFFSET)
}

fn flat_then(last: f64, base: f64) -> Vec<f64> {
    let mut closes = vec![base; 11];
    closes.push(last);
    closes
}

fn constant_volume(n: usize) -> Vec<Option<u64>> {
    vec![Some(1000); n]
}

/// AAPL +10% and MSFT -1% on the latest session; QQQ +2%, SPY flat, IWM +5%.
/// On 2024-03-05 AAPL is +4% and every benchmark is flat.
pub fn market_fixture() -> StaticQuoteSource {
    let mut aapl_volumes = constant_volume(11);
    aapl_volumes.push(Some(3000));

    StaticQuoteSource::new()
        .with_series(daily_series(
            "AAPL",
            &[90.0, 92.0, 95.0, 100.0, 104.0, 101.0, 99.0, 98.0, 97.0, 99.0, 100.0, 110.0],
            &aapl_volumes,
        ))
        .with_series(daily_series("MSFT", &flat_then(198.0, 200.0), &constant_volume(12)))
        .with_series(daily_series("QQQ", &flat_then(102.0, 100.0), &constant_volume(12)))
        .with_series(daily_series("SPY", &flat_then(100.0, 100.0), &constant_volume(12)))
        .with_series(daily_series("IWM", &flat_then(105.0, 100.0), &constant_volume(12)))
}

/// Router wired to an in-memory quote source
pub fn test_router(source: Arc<StaticQuoteSource>) -> Router {
    let state = AppState {
        quotes: source,
        engine: AnalyticsEngine::new(BenchmarkSet::default()),
    };
    build_router(state)
}
