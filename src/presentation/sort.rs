use std::cmp::Ordering;
use std::str::FromStr;

use crate::models::analysis::SymbolMetrics;
use crate::models::benchmark::BenchmarkSet;

/// Sortable table column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortColumn {
    Symbol,
    Price,
    PriceChangePct,
    CurrentVolume,
    AvgVolume,
    VolumeRatio,
    TargetDate,
    /// Comparison ratio against the named benchmark
    Versus(String),
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        let column = match key.as_str() {
            "symbol" => SortColumn::Symbol,
            "price" => SortColumn::Price,
            "price_change_pct" | "change" => SortColumn::PriceChangePct,
            "current_volume" | "volume" => SortColumn::CurrentVolume,
            "avg_volume" => SortColumn::AvgVolume,
            "volume_ratio" => SortColumn::VolumeRatio,
            "target_date" | "date" => SortColumn::TargetDate,
            other => match other.strip_prefix("vs_") {
                Some(benchmark) if !benchmark.is_empty() => {
                    SortColumn::Versus(benchmark.to_uppercase())
                }
                _ => return Err(format!("Unknown sort column: '{}'", s.trim())),
            },
        };
        Ok(column)
    }
}

impl SortColumn {
    /// Reject a comparison column for a symbol outside `benchmarks`
    pub fn check_against(self, benchmarks: &BenchmarkSet) -> Result<Self, String> {
        match &self {
            SortColumn::Versus(benchmark) if !benchmarks.contains(benchmark) => Err(format!(
                "Unknown sort column: 'vs_{}'. Benchmarks: {}",
                benchmark.to_lowercase(),
                benchmarks.symbols().join(", ")
            )),
            _ => Ok(self),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(format!("Invalid sort direction: '{}'. Expected asc or desc", s.trim())),
        }
    }
}

enum SortKey<'a> {
    Text(&'a str),
    Number(f64),
}

impl SortKey<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => compare_text(a, b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            _ => Ordering::Equal,
        }
    }
}

// Case-insensitive first so "brk.b" sits next to "BRK.A"
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn sort_key<'a>(row: &'a SymbolMetrics, column: &SortColumn) -> Option<SortKey<'a>> {
    let key = match column {
        SortColumn::Symbol => SortKey::Text(&row.symbol),
        SortColumn::Price => SortKey::Number(row.price),
        SortColumn::PriceChangePct => SortKey::Number(row.price_change_pct),
        SortColumn::CurrentVolume => SortKey::Number(row.current_volume as f64),
        SortColumn::AvgVolume => SortKey::Number(row.avg_volume),
        SortColumn::VolumeRatio => SortKey::Number(row.volume_ratio),
        SortColumn::TargetDate => SortKey::Text(&row.target_date),
        SortColumn::Versus(benchmark) => SortKey::Number(row.comparisons.get(benchmark)?.ratio),
    };
    Some(key)
}

/// Rows lacking the key sort last in either direction
fn compare_rows(
    a: &SymbolMetrics,
    b: &SymbolMetrics,
    column: &SortColumn,
    direction: SortDirection,
) -> Ordering {
    match (sort_key(a, column), sort_key(b, column)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => match direction {
            SortDirection::Asc => x.compare(&y),
            SortDirection::Desc => x.compare(&y).reverse(),
        },
    }
}

/// Order rows for display.
///
/// Benchmark rows always come first, in benchmark-set order, whatever the
/// column. The remaining rows are stable-sorted by `column` (input order kept
/// when `column` is `None` or keys tie).
pub fn sort_rows(
    rows: Vec<SymbolMetrics>,
    column: Option<&SortColumn>,
    direction: SortDirection,
    benchmarks: &BenchmarkSet,
) -> Vec<SymbolMetrics> {
    let (mut pinned, mut others): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .partition(|row| benchmarks.contains(&row.symbol));

    pinned.sort_by_key(|row| benchmarks.position(&row.symbol));

    if let Some(column) = column {
        others.sort_by(|a, b| compare_rows(a, b, column, direction));
    }

    pinned.extend(others);
    pinned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::{ComparisonResult, ComparisonStatus};
    use std::collections::BTreeMap;

    fn row(symbol: &str, price: f64, volume_ratio: f64) -> SymbolMetrics {
        SymbolMetrics {
            symbol: symbol.to_string(),
            current_volume: (price * 10.0) as u64,
            avg_volume: 1000.0,
            volume_ratio,
            price,
            price_change_pct: price / 100.0,
            target_date: "2024-03-05".to_string(),
            comparisons: BTreeMap::new(),
        }
    }

    fn sample_rows() -> Vec<SymbolMetrics> {
        vec![
            row("MSFT", 410.0, 0.8),
            row("IWM", 205.0, 1.1),
            row("AAPL", 170.0, 2.4),
            row("SPY", 510.0, 0.9),
            row("nvda", 880.0, 1.7),
            row("QQQ", 440.0, 1.3),
        ]
    }

    fn symbols(rows: &[SymbolMetrics]) -> Vec<&str> {
        rows.iter().map(|r| r.symbol.as_str()).collect()
    }

    fn all_columns() -> Vec<SortColumn> {
        vec![
            SortColumn::Symbol,
            SortColumn::Price,
            SortColumn::PriceChangePct,
            SortColumn::CurrentVolume,
            SortColumn::AvgVolume,
            SortColumn::VolumeRatio,
            SortColumn::TargetDate,
            SortColumn::Versus("SPY".to_string()),
        ]
    }

    #[test]
    fn test_benchmarks_pinned_for_every_column() {
        let benchmarks = BenchmarkSet::default();
        for column in all_columns() {
            for direction in [SortDirection::Asc, SortDirection::Desc] {
                let sorted = sort_rows(sample_rows(), Some(&column), direction, &benchmarks);
                assert_eq!(&symbols(&sorted)[..3], &["QQQ", "SPY", "IWM"], "{:?} {:?}", column, direction);
            }
        }
    }

    #[test]
    fn test_no_column_keeps_input_order() {
        let sorted = sort_rows(sample_rows(), None, SortDirection::Asc, &BenchmarkSet::default());
        assert_eq!(symbols(&sorted), vec!["QQQ", "SPY", "IWM", "MSFT", "AAPL", "nvda"]);
    }

    #[test]
    fn test_symbol_sort_case_insensitive() {
        let sorted = sort_rows(
            sample_rows(),
            Some(&SortColumn::Symbol),
            SortDirection::Asc,
            &BenchmarkSet::default(),
        );
        assert_eq!(&symbols(&sorted)[3..], &["AAPL", "MSFT", "nvda"]);
    }

    #[test]
    fn test_descending_reverses_ascending() {
        let benchmarks = BenchmarkSet::default();
        let column = SortColumn::VolumeRatio;

        let asc = sort_rows(sample_rows(), Some(&column), SortDirection::Asc, &benchmarks);
        let desc = sort_rows(sample_rows(), Some(&column), SortDirection::Desc, &benchmarks);

        let mut reversed = symbols(&asc)[3..].to_vec();
        reversed.reverse();
        assert_eq!(symbols(&desc)[3..].to_vec(), reversed);
        assert_eq!(&symbols(&asc)[3..], &["MSFT", "nvda", "AAPL"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let rows = vec![row("BBB", 10.0, 1.0), row("AAA", 10.0, 1.0), row("CCC", 10.0, 1.0)];
        let benchmarks = BenchmarkSet::default();
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let sorted = sort_rows(rows.clone(), Some(&SortColumn::Price), direction, &benchmarks);
            assert_eq!(symbols(&sorted), vec!["BBB", "AAA", "CCC"]);
        }
    }

    #[test]
    fn test_missing_comparison_sorts_last() {
        let mut strong = row("AAPL", 1.0, 1.0);
        strong.comparisons.insert(
            "SPY".to_string(),
            ComparisonResult { ratio: 3.0, status: ComparisonStatus::Stronger },
        );
        let mut weak = row("MSFT", 1.0, 1.0);
        weak.comparisons.insert(
            "SPY".to_string(),
            ComparisonResult { ratio: 0.5, status: ComparisonStatus::Weaker },
        );
        let bare = row("NVDA", 1.0, 1.0);

        let rows = vec![bare, strong, weak];
        let column = SortColumn::Versus("SPY".to_string());
        let benchmarks = BenchmarkSet::default();

        let asc = sort_rows(rows.clone(), Some(&column), SortDirection::Asc, &benchmarks);
        assert_eq!(symbols(&asc), vec!["MSFT", "AAPL", "NVDA"]);

        let desc = sort_rows(rows, Some(&column), SortDirection::Desc, &benchmarks);
        assert_eq!(symbols(&desc), vec!["AAPL", "MSFT", "NVDA"]);
    }

    #[test]
    fn test_parse_columns() {
        assert_eq!("volume_ratio".parse::<SortColumn>().unwrap(), SortColumn::VolumeRatio);
        assert_eq!("Symbol".parse::<SortColumn>().unwrap(), SortColumn::Symbol);
        assert_eq!("vs_qqq".parse::<SortColumn>().unwrap(), SortColumn::Versus("QQQ".to_string()));
        assert!("vs_".parse::<SortColumn>().is_err());
        assert!("market_cap".parse::<SortColumn>().is_err());
    }

    #[test]
    fn test_versus_column_must_be_a_benchmark() {
        let benchmarks = BenchmarkSet::default();
        let spy = SortColumn::Versus("SPY".to_string());
        assert_eq!(spy.clone().check_against(&benchmarks), Ok(spy));
        assert_eq!(SortColumn::Price.check_against(&benchmarks), Ok(SortColumn::Price));

        let err = SortColumn::Versus("XYZ".to_string())
            .check_against(&benchmarks)
            .unwrap_err();
        assert!(err.contains("vs_xyz"));
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert!("up".parse::<SortDirection>().is_err());
    }
}
