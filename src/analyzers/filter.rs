use crate::analyzers::school_key::school_key;
use crate::parser::RawTable;

/// Normalizes the free-text filter; blank input means no filter.
pub fn normalize_filter(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_lowercase)
}

/// Copies the rows whose school name or school key contains `needle`.
///
/// Matching is case-insensitive plain substring search. `needle` must
/// already be normalized with [`normalize_filter`].
pub fn filter_by_school(table: &RawTable, school_col: usize, needle: &str, key_tokens: usize) -> RawTable {
    table.retain_rows(|row| {
        let name = table.cell(row, school_col).unwrap_or_default();
        name.to_lowercase().contains(needle) || school_key(name, key_tokens).contains(needle)
    })
}
