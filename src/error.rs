use thiserror::Error;

use crate::rule::Side;

#[derive(Error, Debug)]
pub enum BonusError {
    #[error("Malformed branch: {side} condition {reason}")]
    MalformedBranch { side: Side, reason: String },

    #[error("Invalid comparator: {value:?}")]
    InvalidComparator { value: String },

    #[error("Invalid threshold for {field}: {value}")]
    InvalidThreshold { field: String, value: String },

    #[error("Invalid reliability {value}: must lie in [0, 1]")]
    InvalidReliability { value: f64 },

    #[error("Unexpected rule probability {probability}: expected 0, 1 or {noise}")]
    UnexpectedProbability { probability: f64, noise: f64 },

    #[error("Shape error: expected {expected} {what}, found {found}")]
    Shape {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Missing field: {field}")]
    MissingField { field: String },

    #[error("Table error at line {line}: {message}")]
    Table { line: usize, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BonusError {
    pub fn malformed(side: Side, reason: impl Into<String>) -> Self {
        Self::MalformedBranch {
            side,
            reason: reason.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn shape(what: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::Shape {
            what: what.into(),
            expected,
            found,
        }
    }
}

pub type Result<T> = std::result::Result<T, BonusError>;
