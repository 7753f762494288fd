use thiserror::Error;

/// Failures of the classifier, binning and statistics operations.
///
/// These are always surfaced to the user as a message in the view that
/// triggered them; none of them invalidates the loaded dataset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("column `{0}` does not exist")]
    UnknownColumn(String),

    #[error("column `{0}` is not numeric")]
    NotNumeric(String),

    #[error("cannot categorize `{column}`: {reason}")]
    CannotCategorize { column: String, reason: String },

    #[error("column `{column}` has {found} rows but the dataset has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
}
