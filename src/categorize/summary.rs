// src/categorize/summary.rs
use prettytable::{format, Cell, Row, Table};

use super::LabelCounts;
use crate::model::TOTAL_LABEL;

/// Box-drawn `scam_type | count` table, counts right aligned, total last in
/// bold.
pub fn table(counts: &LabelCounts) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(Row::new(vec![
        Cell::new("scam_type").style_spec("bFg"),
        Cell::new("count").style_spec("bFg"),
    ]));
    for row in &counts.rows {
        table.add_row(Row::new(vec![
            Cell::new(&row.scam_type),
            Cell::new(&row.count.to_string()).style_spec("r"),
        ]));
    }
    table.add_row(Row::new(vec![
        Cell::new(TOTAL_LABEL).style_spec("b"),
        Cell::new(&counts.total.to_string()).style_spec("rb"),
    ]));
    table
}

pub fn print(counts: &LabelCounts) {
    println!("=== Scam-type counts ===");
    table(counts).printstd();
    println!("\nTotal labels (incl. multi-label): {}", counts.total);
}
