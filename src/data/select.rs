//! Column allow-list and renaming.

use super::loader::RawTable;
use crate::error::{Result, SurveyError};

/// Source columns kept from the raw extract, in output order.
pub const SOURCE_COLUMNS: [&str; 17] = [
    "id", "wtss", "sex", "educ", "region", "age", "coninc", "prestg10", "mapres10", "papres10",
    "sei10", "satjob", "fechld", "fefam", "fepol", "fepresch", "meovrwrk",
];

/// Source name → analysis name. Columns not listed keep their source name.
pub const RENAMES: [(&str, &str); 12] = [
    ("wtss", "weight"),
    ("educ", "education"),
    ("coninc", "income"),
    ("prestg10", "job_prestige"),
    ("mapres10", "mother_job_prestige"),
    ("papres10", "father_job_prestige"),
    ("sei10", "socioeconomic_index"),
    ("fechld", "relationship"),
    ("fefam", "male_breadwinner"),
    ("fepol", "men_bettersuited"),
    ("fepresch", "child_suffer"),
    ("meovrwrk", "men_overwork"),
];

/// Analysis name for a source column.
pub fn renamed(source: &str) -> &str {
    RENAMES
        .iter()
        .find(|(from, _)| *from == source)
        .map_or(source, |(_, to)| *to)
}

/// Narrow `raw` to [`SOURCE_COLUMNS`] under their analysis names.
///
/// Row order and count are preserved. Every absent source column is reported
/// in a single [`SurveyError::SchemaMismatch`].
pub fn select_columns(raw: &RawTable) -> Result<RawTable> {
    let mut indices = Vec::with_capacity(SOURCE_COLUMNS.len());
    let mut missing = Vec::new();
    for name in SOURCE_COLUMNS {
        match raw.column_index(name) {
            Some(i) => indices.push(i),
            None => missing.push(name.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(SurveyError::SchemaMismatch { missing });
    }

    let headers = SOURCE_COLUMNS
        .iter()
        .map(|name| renamed(name).to_string())
        .collect();
    let rows = raw
        .rows()
        .iter()
        .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
        .collect();

    Ok(RawTable::new(headers, rows))
}
