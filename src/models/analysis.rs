use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Relative strength of a symbol against one benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonStatus {
    Stronger,
    Weaker,
    Neutral,
}

impl ComparisonStatus {
    pub fn classify(ratio: f64) -> Self {
        if ratio > 1.0 {
            ComparisonStatus::Stronger
        } else if ratio == 1.0 {
            ComparisonStatus::Neutral
        } else {
            ComparisonStatus::Weaker
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonStatus::Stronger => "stronger",
            ComparisonStatus::Weaker => "weaker",
            ComparisonStatus::Neutral => "neutral",
        }
    }
}

impl fmt::Display for ComparisonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub ratio: f64,
    pub status: ComparisonStatus,
}

/// Per-symbol volume and price metrics for the resolved target session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolMetrics {
    pub symbol: String,
    pub current_volume: u64,
    pub avg_volume: f64,
    pub volume_ratio: f64,
    pub price: f64,
    pub price_change_pct: f64,
    pub target_date: String,                               // YYYY-MM-DD, exchange-local
    pub comparisons: BTreeMap<String, ComparisonResult>,   // benchmark -> comparison
}

/// Body for POST /api/analyze and POST /api/analyze/csv
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub symbols: Vec<String>,
    pub date: Option<String>,   // YYYY-MM-DD, absent means latest session
}

/// Query parameters controlling row order
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeQuery {
    pub sort: Option<String>,        // e.g. "volume_ratio", "vs_spy"
    pub direction: Option<String>,   // "asc" | "desc"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub data: Vec<SymbolMetrics>,
    pub timestamp: DateTime<Utc>,
    pub request_date: String,
    /// Symbols that could not be resolved and were left out of `data`
    pub unavailable: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
