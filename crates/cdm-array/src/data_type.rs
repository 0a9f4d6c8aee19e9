//! CDM element types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Element type of a CDM array or variable.
///
/// Integral types are signed; unsignedness travels as a separate flag.
/// `Char` is a fixed-width 8-bit character block; `String` holds whole
/// strings; `Structure` covers both structures and sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    Structure,
}

impl DataType {
    /// Size in bytes of one element, `None` for variable-size types.
    pub fn size(&self) -> Option<usize> {
        match self {
            DataType::Byte | DataType::Char => Some(1),
            DataType::Short => Some(2),
            DataType::Int | DataType::Float => Some(4),
            DataType::Long | DataType::Double => Some(8),
            DataType::String | DataType::Structure => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Byte
                | DataType::Short
                | DataType::Int
                | DataType::Long
                | DataType::Float
                | DataType::Double
        )
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            DataType::Byte | DataType::Short | DataType::Int | DataType::Long
        )
    }

    pub fn is_string(&self) -> bool {
        matches!(self, DataType::Char | DataType::String)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataType::Byte => "byte",
            DataType::Short => "short",
            DataType::Int => "int",
            DataType::Long => "long",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::Char => "char",
            DataType::String => "String",
            DataType::Structure => "Structure",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(DataType::Byte.size(), Some(1));
        assert_eq!(DataType::Long.size(), Some(8));
        assert_eq!(DataType::String.size(), None);
    }

    #[test]
    fn test_classification() {
        assert!(DataType::Long.is_integral());
        assert!(!DataType::Float.is_integral());
        assert!(DataType::Float.is_numeric());
        assert!(DataType::Char.is_string());
        assert!(!DataType::Structure.is_numeric());
    }
}
