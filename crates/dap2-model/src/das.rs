//! DAS attribute tables.
//!
//! A DAS is a flat, ordered collection of named tables. Table names
//! usually match a variable name (possibly dotted for nested members);
//! a few reserved names carry file-level metadata. Attribute values are
//! kept as the textual tokens the server sent, typed by their DAP type.

use serde::{Deserialize, Serialize};

use crate::types::DapType;

/// The full attribute response for a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Das {
    pub tables: Vec<AttributeTable>,
}

impl Das {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, table: AttributeTable) {
        self.tables.push(table);
    }

    pub fn table(&self, name: &str) -> Option<&AttributeTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Table names in server order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }
}

/// A named list of attributes; containers nest further tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeTable {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<DasAttribute>,
}

impl AttributeTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Append a leaf attribute.
    pub fn with_values(
        mut self,
        name: impl Into<String>,
        dap_type: DapType,
        values: &[&str],
    ) -> Self {
        self.attributes.push(DasAttribute {
            name: name.into(),
            value: DasValue::Values {
                dap_type,
                values: values.iter().map(|v| v.to_string()).collect(),
            },
        });
        self
    }

    /// Append a nested container.
    pub fn with_container(mut self, table: AttributeTable) -> Self {
        self.attributes.push(DasAttribute {
            name: table.name.clone(),
            value: DasValue::Container(table),
        });
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&DasAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// One entry of an attribute table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DasAttribute {
    pub name: String,
    pub value: DasValue,
}

impl DasAttribute {
    pub fn is_container(&self) -> bool {
        matches!(self.value, DasValue::Container(_))
    }
}

/// Leaf tokens or a nested table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DasValue {
    Values {
        dap_type: DapType,
        values: Vec<String>,
    },
    Container(AttributeTable),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order() {
        let table = AttributeTable::new("T")
            .with_values("units", DapType::String, &["K"])
            .with_container(AttributeTable::new("inner"))
            .with_values("valid_range", DapType::Float32, &["0", "400"]);

        let names: Vec<&str> = table.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["units", "inner", "valid_range"]);
        assert!(table.attribute("inner").map_or(false, DasAttribute::is_container));
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{
            "tables": [
                { "name": "NC_GLOBAL", "attributes": [
                    { "name": "title", "value": { "kind": "values", "dap_type": "String", "values": ["demo"] } }
                ]},
                { "name": "T" }
            ]
        }"#;
        let das: Das = serde_json::from_str(json).expect("valid DAS json");
        assert_eq!(das.names().collect::<Vec<_>>(), vec!["NC_GLOBAL", "T"]);
        assert!(das.table("T").map_or(false, |t| t.attributes.is_empty()));
    }
}
