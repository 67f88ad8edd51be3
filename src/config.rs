use std::env;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::models::benchmark::BenchmarkSet;

/// Settings for the quote client
#[derive(Debug, Clone)]
pub struct QuoteClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub retry_max: u32,
    pub retry_delay_ms: u64,
    pub cache_ttl_secs: u64,
}

impl Default for QuoteClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout_secs: 10,
            retry_max: 2,
            retry_delay_ms: 500,
            cache_ttl_secs: 300,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub quotes: QuoteClientConfig,
    pub benchmarks: BenchmarkSet,
}

impl AppConfig {
    /// Read configuration from the process environment (call `dotenvy::dotenv()` first)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = QuoteClientConfig::default();

        let quotes = QuoteClientConfig {
            base_url: lookup("QUOTE_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            timeout_secs: parse_or(&lookup, "QUOTE_TIMEOUT_SECS", defaults.timeout_secs)?,
            retry_max: parse_or(&lookup, "QUOTE_RETRY_MAX", defaults.retry_max)?,
            retry_delay_ms: parse_or(&lookup, "QUOTE_RETRY_DELAY_MS", defaults.retry_delay_ms)?,
            cache_ttl_secs: parse_or(&lookup, "QUOTE_CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
        };

        let benchmarks = match lookup("BENCHMARK_SYMBOLS") {
            Some(raw) => {
                let set = BenchmarkSet::new(raw.split(','));
                if set.is_empty() {
                    return Err(ConfigError::EmptyBenchmarks);
                }
                set
            }
            None => BenchmarkSet::default(),
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            quotes,
            benchmarks,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }),
        None => Ok(default),
    }
}
