//! Rendered result tables.
//!
//! A [`RenderedTable`] is the text content of one HTML table: the header
//! row and every following row as trimmed cell text. It is what the page
//! sessions hand to the parser, independent of how the page was rendered.

use crate::error::{DataError, Result};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

/// CSS class of the fundamentals result table on the source site.
pub const RESULT_TABLE_CLASS: &str = "simple-little-table";

/// Widest column span honoured when expanding merged cells.
const MAX_COLSPAN: usize = 64;

/// Text content of an HTML table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RenderedTable {
    /// Create a table from already extracted text.
    pub const fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// Header cell texts (first row of the table).
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Body rows (every row after the first), as `td` cell texts.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Locate the first element with class `class_name` in `html` and
    /// extract its rows.
    ///
    /// Returns `Ok(None)` when no such element exists. The only error is an
    /// invalid class name.
    pub fn from_html(html: &str, class_name: &str) -> Result<Option<Self>> {
        let table_selector = selector(&format!(".{class_name}"))?;
        let row_selector = selector("tr")?;
        let header_cell_selector = selector("th, td")?;
        let cell_selector = selector("td")?;

        let document = Html::parse_document(html);
        let Some(table) = document.select(&table_selector).next() else {
            return Ok(None);
        };

        let mut rows = table.select(&row_selector);
        let header = rows
            .next()
            .map(|row| cell_texts(row, &header_cell_selector))
            .unwrap_or_default();
        let rows = rows.map(|row| cell_texts(row, &cell_selector)).collect();

        Ok(Some(Self { header, rows }))
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| DataError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// Cell texts of `row`, with a merged cell repeated once per spanned column
/// so later cells keep their column positions.
fn cell_texts(row: ElementRef<'_>, cells: &Selector) -> Vec<String> {
    row.select(cells)
        .flat_map(|cell| {
            let text = collapse_whitespace(&cell.text().collect::<String>());
            std::iter::repeat_n(text, colspan(cell))
        })
        .collect()
}

/// Declared column span of a cell; missing or invalid spans count as one.
fn colspan(cell: ElementRef<'_>) -> usize {
    cell.value()
        .attr("colspan")
        .and_then(|span| span.trim().parse::<usize>().ok())
        .map_or(1, |span| span.clamp(1, MAX_COLSPAN))
}

/// Collapse whitespace runs into a single space and trim, the way a browser
/// renders cell text.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
