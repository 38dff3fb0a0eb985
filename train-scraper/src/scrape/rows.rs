//! Status table row extraction.

/// One table row's raw text, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub raw_name: String,
    pub raw_status: String,
}

impl RawRow {
    pub fn new(raw_name: impl Into<String>, raw_status: impl Into<String>) -> Self {
        Self {
            raw_name: raw_name.into(),
            raw_status: raw_status.into(),
        }
    }
}

/// Read raw (name, status) pairs from a status table's cell text.
///
/// Each item of `rows` is the text of one row's cells, in column order.
/// Blank cells are not extractable; the first two extractable cells are the
/// train name and its status. Rows with fewer than two (header rows, spacer
/// rows) are skipped. Row order is preserved.
///
/// # Examples
///
/// ```
/// use train_scraper::scrape::{RawRow, extract_rows};
///
/// let rows = extract_rows(vec![
///     vec![],
///     vec!["Nozomi 1".to_string(), "Stopped at TOKYO".to_string()],
///     vec!["".to_string(), "orphan".to_string()],
/// ]);
/// assert_eq!(rows, vec![RawRow::new("Nozomi 1", "Stopped at TOKYO")]);
/// ```
pub fn extract_rows<R, C>(rows: R) -> Vec<RawRow>
where
    R: IntoIterator<Item = C>,
    C: IntoIterator<Item = String>,
{
    rows.into_iter()
        .filter_map(|cells| {
            let mut fields = cells.into_iter().filter(|text| !text.trim().is_empty());
            let name = fields.next()?;
            let status = fields.next()?;
            Some(RawRow {
                raw_name: name,
                raw_status: status,
            })
        })
        .collect()
}
