use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Table};

use crate::models::analysis::SymbolMetrics;
use crate::models::benchmark::BenchmarkSet;

/// Display text for a symbol's comparison against `benchmark`.
/// A benchmark's comparison with itself is not shown.
pub fn comparison_cell(row: &SymbolMetrics, benchmark: &str) -> String {
    if row.symbol == benchmark {
        return "-".to_string();
    }
    match row.comparisons.get(benchmark) {
        Some(c) => format!("{:.2} ({})", c.ratio, c.status),
        None => "n/a".to_string(),
    }
}

/// 1234567 -> "1,234,567"
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render rows, already in display order, as a text table
pub fn render_table(rows: &[SymbolMetrics], benchmarks: &BenchmarkSet) -> String {
    let mut header = vec![
        "Symbol".to_string(),
        "Price".to_string(),
        "Change %".to_string(),
        "Volume".to_string(),
        "Avg Volume (10d)".to_string(),
        "Volume Ratio".to_string(),
    ];
    header.extend(benchmarks.symbols().iter().map(|b| format!("vs {}", b)));
    header.push("Date".to_string());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(header);

    for row in rows {
        let mut cells = vec![
            Cell::new(&row.symbol),
            Cell::new(format!("{:.2}", row.price)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:+.2}%", row.price_change_pct)).set_alignment(CellAlignment::Right),
            Cell::new(group_thousands(row.current_volume)).set_alignment(CellAlignment::Right),
            Cell::new(group_thousands(row.avg_volume.round() as u64))
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}x", row.volume_ratio)).set_alignment(CellAlignment::Right),
        ];
        cells.extend(
            benchmarks
                .symbols()
                .iter()
                .map(|b| Cell::new(comparison_cell(row, b))),
        );
        cells.push(Cell::new(&row.target_date));
        table.add_row(cells);
    }

    table.to_string()
}
