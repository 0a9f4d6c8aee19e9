//! DDS / DataDDS base types.
//!
//! A DDS is a list of [`BaseType`]s. Each base type is either a primitive
//! (scalar), an array wrapper around a template, or a constructor
//! (structure, grid, sequence) holding further base types. A DataDDS uses
//! the same shapes but carries values: scalars hold `Some(value)`, arrays
//! hold a filled [`VectorStorage`], and sequences hold their rows.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::escape::unescape_identifier;

/// The DAP2 type vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DapType {
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float32,
    Float64,
    String,
    Url,
    Structure,
    Grid,
    Sequence,
    Array,
    List,
}

impl DapType {
    /// Type name as it appears in a DDS document.
    pub fn type_name(&self) -> &'static str {
        match self {
            DapType::Byte => "Byte",
            DapType::Int16 => "Int16",
            DapType::UInt16 => "UInt16",
            DapType::Int32 => "Int32",
            DapType::UInt32 => "UInt32",
            DapType::Float32 => "Float32",
            DapType::Float64 => "Float64",
            DapType::String => "String",
            DapType::Url => "Url",
            DapType::Structure => "Structure",
            DapType::Grid => "Grid",
            DapType::Sequence => "Sequence",
            DapType::Array => "Array",
            DapType::List => "List",
        }
    }

    /// Fixed-width numeric types.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DapType::Byte
                | DapType::Int16
                | DapType::UInt16
                | DapType::Int32
                | DapType::UInt32
                | DapType::Float32
                | DapType::Float64
        )
    }

    /// String and Url carry text rather than numbers.
    pub fn is_string_like(&self) -> bool {
        matches!(self, DapType::String | DapType::Url)
    }

    /// Structure, Grid and Sequence contain other base types.
    pub fn is_constructor(&self) -> bool {
        matches!(self, DapType::Structure | DapType::Grid | DapType::Sequence)
    }

    /// Byte, UInt16 and UInt32 are unsigned on the wire.
    pub fn is_unsigned(&self) -> bool {
        matches!(self, DapType::Byte | DapType::UInt16 | DapType::UInt32)
    }
}

impl fmt::Display for DapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Error returned when a DDS type name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown DAP2 type name: {0}")]
pub struct DapTypeParseError(pub String);

impl FromStr for DapType {
    type Err = DapTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "byte" => Ok(DapType::Byte),
            "int16" => Ok(DapType::Int16),
            "uint16" => Ok(DapType::UInt16),
            "int32" => Ok(DapType::Int32),
            "uint32" => Ok(DapType::UInt32),
            "float32" => Ok(DapType::Float32),
            "float64" => Ok(DapType::Float64),
            "string" => Ok(DapType::String),
            "url" => Ok(DapType::Url),
            "structure" => Ok(DapType::Structure),
            "grid" => Ok(DapType::Grid),
            "sequence" => Ok(DapType::Sequence),
            "array" => Ok(DapType::Array),
            "list" => Ok(DapType::List),
            _ => Err(DapTypeParseError(s.to_string())),
        }
    }
}

/// A named DDS variable.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseType {
    /// Identifier as sent on the wire (may contain `%XX` escapes).
    name: String,
    value: DapValue,
}

impl BaseType {
    pub fn new(name: impl Into<String>, value: DapValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// The encoded (wire) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name with DAP escapes decoded.
    pub fn clear_name(&self) -> String {
        unescape_identifier(&self.name)
    }

    pub fn value(&self) -> &DapValue {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut DapValue {
        &mut self.value
    }

    pub fn dap_type(&self) -> DapType {
        self.value.dap_type()
    }

    /// Direct member lookup on a constructor, by encoded name.
    ///
    /// Grids expose their array first, then their maps. Sequences resolve
    /// against the template (declared field list), not row data.
    pub fn field(&self, name: &str) -> Option<&BaseType> {
        self.value.fields().find(|bt| bt.name == name)
    }

    // ----- convenience constructors -----

    pub fn structure(name: impl Into<String>, fields: Vec<BaseType>) -> Self {
        Self::new(name, DapValue::Structure(DStructure::new(fields)))
    }

    pub fn grid(name: impl Into<String>, array: BaseType, maps: Vec<BaseType>) -> Self {
        Self::new(name, DapValue::Grid(DGrid::new(array, maps)))
    }

    pub fn sequence(name: impl Into<String>, template: Vec<BaseType>) -> Self {
        Self::new(name, DapValue::Sequence(DSequence::new(template)))
    }

    pub fn array(
        name: impl Into<String>,
        dimensions: Vec<ArrayDimension>,
        vector: PrimitiveVector,
    ) -> Self {
        Self::new(name, DapValue::Array(DArray::new(dimensions, vector)))
    }
}

/// The payload of a [`BaseType`].
#[derive(Debug, Clone, PartialEq)]
pub enum DapValue {
    Byte(Option<u8>),
    Int16(Option<i16>),
    UInt16(Option<u16>),
    Int32(Option<i32>),
    UInt32(Option<u32>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Str(Option<String>),
    Url(Option<String>),
    Structure(DStructure),
    Grid(DGrid),
    Sequence(DSequence),
    Array(DArray),
    List(Box<BaseType>),
}

impl DapValue {
    pub fn dap_type(&self) -> DapType {
        match self {
            DapValue::Byte(_) => DapType::Byte,
            DapValue::Int16(_) => DapType::Int16,
            DapValue::UInt16(_) => DapType::UInt16,
            DapValue::Int32(_) => DapType::Int32,
            DapValue::UInt32(_) => DapType::UInt32,
            DapValue::Float32(_) => DapType::Float32,
            DapValue::Float64(_) => DapType::Float64,
            DapValue::Str(_) => DapType::String,
            DapValue::Url(_) => DapType::Url,
            DapValue::Structure(_) => DapType::Structure,
            DapValue::Grid(_) => DapType::Grid,
            DapValue::Sequence(_) => DapType::Sequence,
            DapValue::Array(_) => DapType::Array,
            DapValue::List(_) => DapType::List,
        }
    }

    /// Declared members of a constructor, in declaration order.
    /// Empty for primitives, arrays and lists.
    pub fn fields(&self) -> Box<dyn Iterator<Item = &BaseType> + '_> {
        match self {
            DapValue::Structure(s) => Box::new(s.fields.iter()),
            DapValue::Grid(g) => Box::new(g.variables()),
            DapValue::Sequence(s) => Box::new(s.template.iter()),
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Text of a String/Url scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DapValue::Str(s) | DapValue::Url(s) => s.as_deref(),
            _ => None,
        }
    }
}

/// Structure constructor: an ordered list of fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DStructure {
    pub fields: Vec<BaseType>,
}

impl DStructure {
    pub fn new(fields: Vec<BaseType>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&BaseType> {
        self.fields.iter().find(|bt| bt.name() == name)
    }
}

/// Grid constructor: one array plus 1-D coordinate maps.
#[derive(Debug, Clone, PartialEq)]
pub struct DGrid {
    pub array: Box<BaseType>,
    pub maps: Vec<BaseType>,
}

impl DGrid {
    pub fn new(array: BaseType, maps: Vec<BaseType>) -> Self {
        Self {
            array: Box::new(array),
            maps,
        }
    }

    /// The array followed by every map.
    pub fn variables(&self) -> impl Iterator<Item = &BaseType> {
        std::iter::once(self.array.as_ref()).chain(self.maps.iter())
    }
}

/// Sequence constructor: a declared field list and, for data, its rows.
///
/// Each row holds one value-bearing [`BaseType`] per field. Servers may
/// send the fields of a row in any order, so rows are matched by name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DSequence {
    pub template: Vec<BaseType>,
    pub rows: Vec<Vec<BaseType>>,
}

impl DSequence {
    pub fn new(template: Vec<BaseType>) -> Self {
        Self {
            template,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Vec<BaseType>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<&[BaseType]> {
        self.rows.get(index).map(Vec::as_slice)
    }
}

/// One declared array extent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayDimension {
    pub name: Option<String>,
    pub size: usize,
}

impl ArrayDimension {
    pub fn new(name: Option<&str>, size: usize) -> Self {
        Self {
            name: name.map(str::to_string),
            size,
        }
    }

    pub fn anonymous(size: usize) -> Self {
        Self { name: None, size }
    }

    pub fn named(name: &str, size: usize) -> Self {
        Self::new(Some(name), size)
    }
}

/// Array wrapper: declared extents plus a vector of elements.
#[derive(Debug, Clone, PartialEq)]
pub struct DArray {
    pub dimensions: Vec<ArrayDimension>,
    pub vector: PrimitiveVector,
}

impl DArray {
    pub fn new(dimensions: Vec<ArrayDimension>, vector: PrimitiveVector) -> Self {
        Self { dimensions, vector }
    }

    pub fn shape(&self) -> Vec<usize> {
        self.dimensions.iter().map(|d| d.size).collect()
    }

    /// The element type declaration.
    pub fn template(&self) -> &BaseType {
        &self.vector.template
    }
}

/// Element storage of an array.
///
/// `template` describes one element; `storage` is `None` in a DDS and
/// filled in a DataDDS.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveVector {
    pub template: Box<BaseType>,
    pub storage: Option<VectorStorage>,
}

impl PrimitiveVector {
    pub fn declared(template: BaseType) -> Self {
        Self {
            template: Box::new(template),
            storage: None,
        }
    }

    pub fn with_storage(template: BaseType, storage: VectorStorage) -> Self {
        Self {
            template: Box::new(template),
            storage: Some(storage),
        }
    }

    /// Number of stored elements (0 when declarations only).
    pub fn len(&self) -> usize {
        self.storage.as_ref().map_or(0, VectorStorage::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Contiguous element storage for a DataDDS array.
///
/// Numeric vectors are reference counted so the converter can hand the
/// same buffer to a CDM array without copying.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorStorage {
    Byte(Arc<[u8]>),
    Int16(Arc<[i16]>),
    UInt16(Arc<[u16]>),
    Int32(Arc<[i32]>),
    UInt32(Arc<[u32]>),
    Float32(Arc<[f32]>),
    Float64(Arc<[f64]>),
    /// Strings, Urls and structure instances, one base type per element.
    BaseTypes(Vec<BaseType>),
}

impl VectorStorage {
    pub fn len(&self) -> usize {
        match self {
            VectorStorage::Byte(v) => v.len(),
            VectorStorage::Int16(v) => v.len(),
            VectorStorage::UInt16(v) => v.len(),
            VectorStorage::Int32(v) => v.len(),
            VectorStorage::UInt32(v) => v.len(),
            VectorStorage::Float32(v) => v.len(),
            VectorStorage::Float64(v) => v.len(),
            VectorStorage::BaseTypes(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wire element type of the stored values, when numeric.
    pub fn dap_type(&self) -> Option<DapType> {
        match self {
            VectorStorage::Byte(_) => Some(DapType::Byte),
            VectorStorage::Int16(_) => Some(DapType::Int16),
            VectorStorage::UInt16(_) => Some(DapType::UInt16),
            VectorStorage::Int32(_) => Some(DapType::Int32),
            VectorStorage::UInt32(_) => Some(DapType::UInt32),
            VectorStorage::Float32(_) => Some(DapType::Float32),
            VectorStorage::Float64(_) => Some(DapType::Float64),
            VectorStorage::BaseTypes(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name_round_trip() {
        for t in [DapType::Byte, DapType::UInt32, DapType::Grid, DapType::Url] {
            assert_eq!(t.type_name().parse::<DapType>(), Ok(t));
        }
        assert!("Int64".parse::<DapType>().is_err());
    }

    #[test]
    fn test_unsigned_types() {
        assert!(DapType::Byte.is_unsigned());
        assert!(DapType::UInt16.is_unsigned());
        assert!(!DapType::Int16.is_unsigned());
        assert!(!DapType::Float64.is_unsigned());
    }

    #[test]
    fn test_grid_fields_array_first() {
        let array = BaseType::array(
            "T",
            vec![ArrayDimension::named("lat", 2)],
            PrimitiveVector::declared(BaseType::new("T", DapValue::Float32(None))),
        );
        let lat = BaseType::array(
            "lat",
            vec![ArrayDimension::named("lat", 2)],
            PrimitiveVector::declared(BaseType::new("lat", DapValue::Float32(None))),
        );
        let grid = BaseType::grid("T", array, vec![lat]);

        let names: Vec<&str> = grid.value().fields().map(BaseType::name).collect();
        assert_eq!(names, vec!["T", "lat"]);
        assert!(grid.field("lat").is_some());
        assert!(grid.field("lon").is_none());
    }

    #[test]
    fn test_clear_name_unescapes() {
        let bt = BaseType::new("sea%20level", DapValue::Int32(Some(1)));
        assert_eq!(bt.name(), "sea%20level");
        assert_eq!(bt.clear_name(), "sea level");
    }
}
