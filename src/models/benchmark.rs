/// Default reference symbols every analysis is compared against
pub const DEFAULT_BENCHMARKS: [&str; 3] = ["QQQ", "SPY", "IWM"];

/// Ordered set of benchmark symbols.
///
/// The order is significant: it is the fixed order in which benchmark rows are
/// pinned at the top of every sorted table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkSet {
    symbols: Vec<String>,
}

impl BenchmarkSet {
    /// Symbols are uppercased and de-duplicated, keeping first occurrence order.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for symbol in symbols {
            let symbol = symbol.as_ref().trim().to_uppercase();
            if !symbol.is_empty() && !unique.contains(&symbol) {
                unique.push(symbol);
            }
        }
        Self { symbols: unique }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    /// Pin position of a benchmark symbol, `None` for ordinary symbols
    pub fn position(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// Requested symbols followed by any benchmark not already requested
    pub fn union_with(&self, requested: &[String]) -> Vec<String> {
        let mut all: Vec<String> = Vec::with_capacity(requested.len() + self.symbols.len());
        for symbol in requested.iter().chain(self.symbols.iter()) {
            if !all.contains(symbol) {
                all.push(symbol.clone());
            }
        }
        all
    }
}

impl Default for BenchmarkSet {
    fn default() -> Self {
        Self::new(DEFAULT_BENCHMARKS)
    }
}
