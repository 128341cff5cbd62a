use thiserror::Error;

/// Error taxonomy for every operation that can be rejected.
///
/// Validation failures and range failures abort the single operation and
/// leave all core state untouched. Conditions the design treats as silent
/// no-ops (undo on empty history, paste kind mismatch, move onto the same
/// position) are not errors at all; operations report them as `Ok(false)`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("no data found in input")]
    EmptyInput,

    #[error("file size {size} exceeds the {max} byte limit")]
    FileTooLarge { size: usize, max: usize },

    #[error("input has {count} columns, limit is {max}")]
    TooManyColumns { count: usize, max: usize },

    #[error("input has {count} rows, limit is {max}")]
    TooManyRows { count: usize, max: usize },

    #[error("name cannot be empty")]
    EmptyName,

    #[error("duplicate column name: {0}")]
    DuplicateName(String),

    #[error("page size must be at least 1")]
    InvalidPageSize,

    #[error("row or column index out of range")]
    IndexOutOfRange,

    #[error("external failure: {0}")]
    External(String),
}

impl EditError {
    /// True for bad-input rejections (ingestion limits, empty or duplicate
    /// names), as opposed to stale index references or external failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EditError::EmptyInput
                | EditError::FileTooLarge { .. }
                | EditError::TooManyColumns { .. }
                | EditError::TooManyRows { .. }
                | EditError::EmptyName
                | EditError::DuplicateName(_)
                | EditError::InvalidPageSize
        )
    }
}

impl From<std::io::Error> for EditError {
    fn from(e: std::io::Error) -> Self {
        EditError::External(e.to_string())
    }
}
