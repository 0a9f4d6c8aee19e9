//! Variable descriptors: the conversion target.

use crate::data_type::DataType;
use crate::index::Index;

/// A named, typed, shaped variable.
///
/// `parents` lists the short names of the enclosing structures, outermost
/// first; it is empty for a top-level variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    short_name: String,
    data_type: DataType,
    shape: Vec<usize>,
    parents: Vec<String>,
    unsigned: bool,
}

impl Variable {
    pub fn new(short_name: impl Into<String>, data_type: DataType, shape: Vec<usize>) -> Self {
        Self {
            short_name: short_name.into(),
            data_type,
            shape,
            parents: Vec::new(),
            unsigned: false,
        }
    }

    /// Place this variable inside the given structure chain.
    pub fn member_of<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_unsigned(mut self, unsigned: bool) -> Self {
        self.unsigned = unsigned;
        self
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Dotted name including the enclosing structures.
    pub fn full_name(&self) -> String {
        let mut parts: Vec<&str> = self.parents.iter().map(String::as_str).collect();
        parts.push(&self.short_name);
        parts.join(".")
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn set_data_type(&mut self, data_type: DataType) {
        self.data_type = data_type;
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn size(&self) -> usize {
        Index::compute_size(&self.shape)
    }

    pub fn is_unsigned(&self) -> bool {
        self.unsigned
    }

    pub fn is_member_of_structure(&self) -> bool {
        !self.parents.is_empty()
    }

    pub fn parents(&self) -> &[String] {
        &self.parents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_naming() {
        let v = Variable::new("temp", DataType::Float, vec![3]).member_of(["station", "obs"]);
        assert!(v.is_member_of_structure());
        assert_eq!(v.full_name(), "station.obs.temp");
        assert_eq!(v.size(), 3);
    }

    #[test]
    fn test_set_data_type() {
        let mut v = Variable::new("label", DataType::String, vec![]);
        v.set_data_type(DataType::Char);
        assert_eq!(v.data_type(), DataType::Char);
    }
}
