use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// One daily session as reported by the quote source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: i64,         // epoch seconds
    pub close: Option<f64>,
    pub volume: Option<u64>,    // None on non-trading adjustments
}

/// Daily series for one symbol, ascending by timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub symbol: String,
    /// Exchange offset from UTC; defines which calendar day a session belongs to
    pub utc_offset_secs: i32,
    pub points: Vec<TimeSeriesPoint>,
}

impl TimeSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<TimeSeriesPoint>) -> Self {
        Self {
            symbol: symbol.into(),
            utc_offset_secs: 0,
            points,
        }
    }

    pub fn with_utc_offset(mut self, utc_offset_secs: i32) -> Self {
        self.utc_offset_secs = utc_offset_secs;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Exchange-local calendar day of a timestamp
    pub fn local_date(&self, timestamp: i64) -> Option<NaiveDate> {
        let offset = FixedOffset::east_opt(self.utc_offset_secs)?;
        DateTime::from_timestamp(timestamp, 0).map(|dt| dt.with_timezone(&offset).date_naive())
    }
}
