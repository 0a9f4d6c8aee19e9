//! Error types for DAP to CDM conversion.

use cdm_array::CdmError;
use thiserror::Error;

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors that can occur while building, attributing or materializing a tree.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Protocol shape the CDM model cannot express.
    #[error("unsupported DAP construct {kind} for variable '{name}'")]
    Unsupported { kind: String, name: String },

    /// A flattening step found no member with the expected name.
    #[error("member '{segment}' not found at depth {depth}")]
    MemberNotFound { segment: String, depth: usize },

    /// Wire value disagrees with the declared type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A fill wrote past the end of a member buffer.
    #[error("member '{member}' overflowed its capacity of {capacity} elements")]
    CursorOverflow { member: String, capacity: usize },

    /// A fill finished before the member buffer was full.
    #[error("member '{member}' filled {written} of {capacity} elements")]
    IncompleteFill {
        member: String,
        written: usize,
        capacity: usize,
    },

    /// The target variable cannot drive this conversion.
    #[error("invalid target variable: {0}")]
    InvalidVariable(String),

    /// Node or value not present where expected.
    #[error("not found: {0}")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// CDM array assembly error.
    #[error("CDM array error: {0}")]
    Cdm(#[from] CdmError),
}

impl ConvertError {
    /// Create an Unsupported error.
    pub fn unsupported(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Unsupported {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a TypeMismatch error.
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an InvalidVariable error.
    pub fn invalid_variable(msg: impl Into<String>) -> Self {
        Self::InvalidVariable(msg.into())
    }

    /// Create a NotFound error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
