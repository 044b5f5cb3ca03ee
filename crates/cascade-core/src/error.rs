//! Error types for the Cascade library.
//!
//! Only structural and input problems are errors. Missing data met during a
//! valuation (no price, no transactions, unknown fund) is not an error and
//! never shows up here.

use thiserror::Error;

/// A specialized Result type for Cascade operations.
pub type CascadeResult<T> = Result<T, CascadeError>;

/// The main error type for Cascade operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CascadeError {
    /// An input record is incomplete or malformed.
    #[error("Invalid record {record}: {field} {reason}")]
    Validation {
        /// 1-based position of the record in its input collection.
        record: usize,
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with the field.
        reason: String,
    },

    /// Loading one input collection failed.
    #[error("Failed to load {input}: {source}")]
    Input {
        /// Which collection: `investments`, `quotes` or `transactions`.
        input: &'static str,
        /// The error found in that collection.
        source: Box<CascadeError>,
    },

    /// A fund holds itself, directly or through other funds.
    #[error("Cyclic fund ownership: {}", path.join(" -> "))]
    CyclicOwnership {
        /// Owner ids along the cycle; the first and last entries are equal.
        path: Vec<String>,
    },

    /// A valuation was requested before any snapshot was loaded.
    #[error("No data loaded")]
    NotLoaded,

    /// Decimal arithmetic overflowed.
    #[error("Arithmetic overflow: {reason}")]
    Arithmetic {
        /// Description of the failed operation.
        reason: String,
    },

    /// Invalid date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },
}

impl CascadeError {
    /// Creates a validation error for a missing field.
    #[must_use]
    pub fn missing(record: usize, field: &'static str) -> Self {
        Self::Validation {
            record,
            field,
            reason: "is missing".to_string(),
        }
    }

    /// Creates a validation error for a field that could not be parsed.
    #[must_use]
    pub fn malformed(record: usize, field: &'static str, value: &str) -> Self {
        Self::Validation {
            record,
            field,
            reason: format!("is malformed: '{value}'"),
        }
    }

    /// Creates a cyclic ownership error.
    #[must_use]
    pub fn cyclic(path: Vec<String>) -> Self {
        Self::CyclicOwnership { path }
    }

    /// Creates an arithmetic error.
    #[must_use]
    pub fn arithmetic(reason: impl Into<String>) -> Self {
        Self::Arithmetic {
            reason: reason.into(),
        }
    }

    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Tags the error with the input collection it came from.
    #[must_use]
    pub fn in_input(self, input: &'static str) -> Self {
        Self::Input {
            input,
            source: Box::new(self),
        }
    }

    /// The error without any input tag.
    pub fn root(&self) -> &Self {
        match self {
            Self::Input { source, .. } => source.root(),
            other => other,
        }
    }

    /// Re-attributes a row-level validation error to its row in a larger
    /// collection. Other variants pass through unchanged.
    #[must_use]
    pub(crate) fn at_record(self, record: usize) -> Self {
        match self {
            Self::Validation { field, reason, .. } => Self::Validation {
                record,
                field,
                reason,
            },
            other => other,
        }
    }
}
