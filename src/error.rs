use thiserror::Error;

/// Errors raised while fetching a symbol's time series
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Quote API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Quote API reported {code}: {description}")]
    Api { code: String, description: String },

    #[error("Malformed quote payload: {0}")]
    Malformed(String),

    #[error("No quote data for {0}")]
    NotFound(String),
}

impl QuoteError {
    /// Transport failures, throttling and upstream 5xx are worth another attempt.
    /// Client errors and bad payloads will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            QuoteError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            QuoteError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("BENCHMARK_SYMBOLS must name at least one symbol")]
    EmptyBenchmarks,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("No data could be retrieved for any of the {0} requested symbols")]
    NoData(usize),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
