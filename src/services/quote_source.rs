use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::QuoteError;
use crate::models::quote::TimeSeries;

/// A provider of daily time series.
///
/// `date` anchors the fetched window; `None` means the most recent sessions.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_series(
        &self,
        symbol: &str,
        date: Option<NaiveDate>,
    ) -> Result<TimeSeries, QuoteError>;
}

/// In-memory source serving fixed series, used for offline runs and tests
#[derive(Default)]
pub struct StaticQuoteSource {
    series: HashMap<String, TimeSeries>,
    fetches: AtomicUsize,
}

impl StaticQuoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, series: TimeSeries) -> Self {
        self.series.insert(series.symbol.to_uppercase(), series);
        self
    }

    /// Number of fetches served so far, successful or not
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for StaticQuoteSource {
    async fn fetch_series(
        &self,
        symbol: &str,
        _date: Option<NaiveDate>,
    ) -> Result<TimeSeries, QuoteError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| QuoteError::NotFound(symbol.to_string()))
    }
}
