//! Error types for CDM array operations.

use thiserror::Error;

use crate::data_type::DataType;

/// Result type for CDM array operations.
pub type CdmResult<T> = Result<T, CdmError>;

/// Errors raised while assembling or addressing CDM arrays.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CdmError {
    /// Storage length does not match the product of the shape.
    #[error("shape {shape:?} needs {expected} elements, storage holds {actual}")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    /// Index outside the array bounds.
    #[error("index {index:?} out of bounds for shape {shape:?}")]
    IndexOutOfBounds { index: Vec<usize>, shape: Vec<usize> },

    /// Index rank differs from array rank.
    #[error("index rank {actual} does not match array rank {expected}")]
    RankMismatch { expected: usize, actual: usize },

    /// Named structure member does not exist.
    #[error("structure member not found: {0}")]
    MemberNotFound(String),

    /// Operation requires a different element type.
    #[error("expected {expected} data, found {found}")]
    WrongType { expected: String, found: DataType },
}

impl CdmError {
    /// Create a WrongType error.
    pub fn wrong_type(expected: impl Into<String>, found: DataType) -> Self {
        Self::WrongType {
            expected: expected.into(),
            found,
        }
    }
}
