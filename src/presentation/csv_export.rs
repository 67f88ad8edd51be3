use chrono::{DateTime, Utc};

use crate::error::ExportError;
use crate::models::analysis::SymbolMetrics;
use crate::models::benchmark::BenchmarkSet;
use crate::presentation::table::comparison_cell;

const TITLE: &str = "Volume Scanner Report";

// Title, Generated, Requested Date, blank, header
const ROWS_BEFORE_DATA: usize = 5;

/// Spreadsheet column name for a zero-based index (0 -> A, 26 -> AA)
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Spreadsheet export of one analysis, rows already in display order
pub struct CsvReport<'a> {
    pub rows: &'a [SymbolMetrics],
    pub benchmarks: &'a BenchmarkSet,
    pub generated_at: DateTime<Utc>,
    pub request_date: &'a str,
}

impl CsvReport<'_> {
    pub fn filename(&self) -> String {
        format!(
            "volume_analysis_{}_{}.csv",
            self.request_date,
            self.generated_at.format("%Y%m%d_%H%M%S")
        )
    }

    fn header(&self) -> Vec<String> {
        let mut header = vec![
            "Symbol".to_string(),
            "Price".to_string(),
            "Change %".to_string(),
            "Volume".to_string(),
            "Avg Volume (10d)".to_string(),
            "Volume Ratio".to_string(),
        ];
        for benchmark in self.benchmarks.symbols() {
            header.push(format!("vs {} Ratio", benchmark));
            header.push(format!("vs {} Status", benchmark));
        }
        header.push("Date".to_string());
        header
    }

    fn data_row(&self, row: &SymbolMetrics) -> Vec<String> {
        let mut record = vec![
            row.symbol.clone(),
            format!("{:.2}", row.price),
            format!("{:.2}", row.price_change_pct),
            row.current_volume.to_string(),
            format!("{:.0}", row.avg_volume),
            format!("{:.2}", row.volume_ratio),
        ];
        for benchmark in self.benchmarks.symbols() {
            match row.comparisons.get(benchmark) {
                Some(c) if &row.symbol != benchmark => {
                    record.push(format!("{:.2}", c.ratio));
                    record.push(c.status.to_string());
                }
                _ => {
                    record.push(String::new());
                    record.push(comparison_cell(row, benchmark));
                }
            }
        }
        record.push(row.target_date.clone());
        record
    }

    /// Summary rows with formulas spanning exactly the written data rows
    fn summary_rows(&self, width: usize) -> Vec<Vec<String>> {
        let first = ROWS_BEFORE_DATA + 1;
        let last = ROWS_BEFORE_DATA + self.rows.len();
        let range = |col: usize| {
            let letter = column_letter(col);
            format!("{}{}:{}{}", letter, first, letter, last)
        };

        let mut average = vec![String::new(); width];
        average[0] = "Average".to_string();
        average[2] = format!("=AVERAGE({})", range(2));
        average[5] = format!("=AVERAGE({})", range(5));

        let mut rows = vec![average];
        for (i, benchmark) in self.benchmarks.symbols().iter().enumerate() {
            let status_col = 6 + i * 2 + 1;
            let mut stronger = vec![String::new(); width];
            stronger[0] = format!("Stronger vs {}", benchmark);
            stronger[status_col] = format!("=COUNTIF({},\"stronger\")", range(status_col));
            rows.push(stronger);
        }
        rows
    }

    pub fn to_csv(&self) -> Result<String, ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        let generated = self.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();

        writer.write_record([TITLE])?;
        writer.write_record(["Generated", generated.as_str()])?;
        writer.write_record(["Requested Date", self.request_date])?;
        writer.write_record([""])?;

        let header = self.header();
        let width = header.len();
        writer.write_record(&header)?;

        for row in self.rows {
            writer.write_record(self.data_row(row))?;
        }

        if !self.rows.is_empty() {
            writer.write_record([""])?;
            for summary in self.summary_rows(width) {
                writer.write_record(&summary)?;
            }
        }

        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::{ComparisonResult, ComparisonStatus};
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn metrics(symbol: &str, spy_ratio: f64) -> SymbolMetrics {
        let mut comparisons = BTreeMap::new();
        comparisons.insert(
            "SPY".to_string(),
            ComparisonResult {
                ratio: spy_ratio,
                status: ComparisonStatus::classify(spy_ratio),
            },
        );
        SymbolMetrics {
            symbol: symbol.to_string(),
            current_volume: 3000,
            avg_volume: 2000.0,
            volume_ratio: 1.5,
            price: 110.0,
            price_change_pct: 10.0,
            target_date: "2024-03-05".to_string(),
            comparisons,
        }
    }

    fn report_lines(rows: &[SymbolMetrics]) -> Vec<String> {
        let benchmarks = BenchmarkSet::new(["SPY"]);
        let report = CsvReport {
            rows,
            benchmarks: &benchmarks,
            generated_at: Utc.with_ymd_and_hms(2024, 3, 5, 21, 0, 0).unwrap(),
            request_date: "2024-03-05",
        };
        report.to_csv().unwrap().lines().map(str::to_string).collect()
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(7), "H");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
    }

    #[test]
    fn test_metadata_and_header() {
        let lines = report_lines(&[metrics("SPY", 1.0), metrics("AAPL", 2.0)]);
        assert_eq!(lines[0], "Volume Scanner Report");
        assert_eq!(lines[1], "Generated,2024-03-05 21:00:00 UTC");
        assert_eq!(lines[2], "Requested Date,2024-03-05");
        assert_eq!(
            lines[4],
            "Symbol,Price,Change %,Volume,Avg Volume (10d),Volume Ratio,vs SPY Ratio,vs SPY Status,Date"
        );
    }

    #[test]
    fn test_data_rows_suppress_self_comparison() {
        let lines = report_lines(&[metrics("SPY", 1.0), metrics("AAPL", 2.0)]);
        assert_eq!(lines[5], "SPY,110.00,10.00,3000,2000,1.50,,-,2024-03-05");
        assert_eq!(lines[6], "AAPL,110.00,10.00,3000,2000,1.50,2.00,stronger,2024-03-05");
    }

    #[test]
    fn test_summary_ranges_follow_row_count() {
        let rows: Vec<SymbolMetrics> = (0..4).map(|i| metrics(&format!("S{}", i), 2.0)).collect();
        let lines = report_lines(&rows);

        // Data occupies spreadsheet rows 6..=9
        let average = lines.iter().find(|l| l.starts_with("Average")).unwrap();
        assert!(average.contains("=AVERAGE(C6:C9)"));
        assert!(average.contains("=AVERAGE(F6:F9)"));

        let stronger = lines.iter().find(|l| l.starts_with("Stronger vs SPY")).unwrap();
        assert!(stronger.contains("=COUNTIF(H6:H9,\"\"stronger\"\")"));
    }

    #[test]
    fn test_empty_report_has_no_summary() {
        let lines = report_lines(&[]);
        assert!(!lines.iter().any(|l| l.starts_with("Average")));
    }

    #[test]
    fn test_filename() {
        let benchmarks = BenchmarkSet::default();
        let report = CsvReport {
            rows: &[],
            benchmarks: &benchmarks,
            generated_at: Utc.with_ymd_and_hms(2024, 3, 5, 21, 0, 0).unwrap(),
            request_date: "latest",
        };
        assert_eq!(report.filename(), "volume_analysis_latest_20240305_210000.csv");
    }
}
