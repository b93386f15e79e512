//! Error types for survey loading, preparation and view selection.

use thiserror::Error;

/// Everything that can go wrong between fetching the survey and deriving a view.
///
/// The first three variants are load-time failures: the session cannot show
/// any view without the base table. `Coercion` and `OutOfRange` fail the whole
/// preparation pass rather than dropping the offending row.
#[derive(Error, Debug)]
pub enum SurveyError {
    /// The source could not be reached or answered with a non-success status.
    #[error("survey source {source_name} is unreachable: {reason}")]
    UnreachableSource { source_name: String, reason: String },

    /// The payload arrived but is not a usable CSV table.
    #[error("survey payload could not be parsed: {0}")]
    UnparseablePayload(String),

    /// One or more allow-listed source columns are absent.
    #[error("survey schema changed, missing columns: {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    /// A cell could not be converted to its column's type.
    #[error("row {row}, column {column}: cannot interpret {value:?}")]
    Coercion {
        row: usize,
        column: &'static str,
        value: String,
    },

    /// A numeric cell falls outside its documented scale.
    #[error("row {row}, column {column}: {value} is outside {min}..={max}")]
    OutOfRange {
        row: usize,
        column: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A feature, group or page name outside its enumerated set.
    #[error("invalid {kind} selection {value:?}, expected one of: {}", .expected.join(", "))]
    InvalidSelection {
        kind: &'static str,
        value: String,
        expected: Vec<&'static str>,
    },
}

impl SurveyError {
    /// Whether this error prevents the session from rendering any view.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            SurveyError::UnreachableSource { .. }
                | SurveyError::UnparseablePayload(_)
                | SurveyError::SchemaMismatch { .. }
        )
    }
}

impl From<csv::Error> for SurveyError {
    fn from(err: csv::Error) -> Self {
        SurveyError::UnparseablePayload(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SurveyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mismatch_lists_every_missing_column() {
        let err = SurveyError::SchemaMismatch {
            missing: vec!["fefam".into(), "sei10".into()],
        };
        assert_eq!(
            err.to_string(),
            "survey schema changed, missing columns: fefam, sei10"
        );
        assert!(err.is_load_failure());
    }

    #[test]
    fn coercion_error_names_row_and_value() {
        let err = SurveyError::Coercion {
            row: 41,
            column: "age",
            value: "eighty".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("row 41"));
        assert!(msg.contains("\"eighty\""));
        assert!(!err.is_load_failure());
    }
}
