//! CSV export of the rows currently on screen.
//!
//! Generating the text is all this module does; writing it somewhere is
//! left to the caller.

use super::table::{TableRow, COLUMNS};
use crate::shared::{Interval, Range, Symbol};

/// Quote a cell, doubling embedded quotes.
fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn line<'a>(cells: impl IntoIterator<Item = &'a str>) -> String {
    cells.into_iter().map(quote).collect::<Vec<_>>().join(",")
}

/// Header plus one line per row, joined by `\n`, no trailing newline.
pub fn to_csv(rows: &[TableRow]) -> String {
    std::iter::once(line(COLUMNS))
        .chain(rows.iter().map(|row| line(row.cells())))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `{SYMBOL}_{interval}_{range}.csv`
pub fn csv_file_name(symbol: &Symbol, interval: Interval, range: Range) -> String {
    format!("{}_{}_{}.csv", symbol, interval.as_str(), range.as_str())
}
