//! CDM attributes.

use serde::{Deserialize, Serialize};

use crate::data_type::DataType;

/// Attribute value: strings, or numbers with their declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttrValue {
    Strings(Vec<String>),
    Numbers {
        data_type: DataType,
        unsigned: bool,
        values: Vec<f64>,
    },
}

/// A named attribute attached to a variable, structure or the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: AttrValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, AttrValue::Strings(vec![value.into()]))
    }

    pub fn data_type(&self) -> DataType {
        match &self.value {
            AttrValue::Strings(_) => DataType::String,
            AttrValue::Numbers { data_type, .. } => *data_type,
        }
    }

    pub fn len(&self) -> usize {
        match &self.value {
            AttrValue::Strings(v) => v.len(),
            AttrValue::Numbers { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First string value, if string typed.
    pub fn string_value(&self) -> Option<&str> {
        match &self.value {
            AttrValue::Strings(v) => v.first().map(String::as_str),
            AttrValue::Numbers { .. } => None,
        }
    }

    /// Numeric value `i`, if numeric.
    pub fn numeric_value(&self, i: usize) -> Option<f64> {
        match &self.value {
            AttrValue::Numbers { values, .. } => values.get(i).copied(),
            AttrValue::Strings(_) => None,
        }
    }
}
