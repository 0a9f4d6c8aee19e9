//! Typed, shaped CDM arrays.

use bytes::Bytes;
use std::sync::Arc;

use crate::data_type::DataType;
use crate::error::{CdmError, CdmResult};
use crate::index::Index;
use crate::sequence::ArraySequenceNested;
use crate::structure::{ArrayStructure, StructureData};

/// Backing storage of a [`CdmArray`], one variant per element type.
///
/// Numeric and string storage is reference counted; cloning an array or
/// building one from an existing buffer never copies elements.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Byte(Arc<[i8]>),
    Short(Arc<[i16]>),
    Int(Arc<[i32]>),
    Long(Arc<[i64]>),
    Float(Arc<[f32]>),
    Double(Arc<[f64]>),
    Char(Bytes),
    String(Arc<[String]>),
    Structure(ArrayStructure),
    /// One variable-length row set per element.
    Sequence(ArraySequenceNested),
}

impl ArrayData {
    pub fn data_type(&self) -> DataType {
        match self {
            ArrayData::Byte(_) => DataType::Byte,
            ArrayData::Short(_) => DataType::Short,
            ArrayData::Int(_) => DataType::Int,
            ArrayData::Long(_) => DataType::Long,
            ArrayData::Float(_) => DataType::Float,
            ArrayData::Double(_) => DataType::Double,
            ArrayData::Char(_) => DataType::Char,
            ArrayData::String(_) => DataType::String,
            ArrayData::Structure(_) | ArrayData::Sequence(_) => DataType::Structure,
        }
    }

    /// Number of elements (records for structures, outer rows for sequences).
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Byte(v) => v.len(),
            ArrayData::Short(v) => v.len(),
            ArrayData::Int(v) => v.len(),
            ArrayData::Long(v) => v.len(),
            ArrayData::Float(v) => v.len(),
            ArrayData::Double(v) => v.len(),
            ArrayData::Char(v) => v.len(),
            ArrayData::String(v) => v.len(),
            ArrayData::Structure(s) => s.records(),
            ArrayData::Sequence(s) => s.outer_len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements `[start, start + count)`. Char data is sliced without copying.
    fn slice(&self, start: usize, count: usize) -> CdmResult<ArrayData> {
        let end = start + count;
        if end > self.len() {
            return Err(CdmError::IndexOutOfBounds {
                index: vec![end],
                shape: vec![self.len()],
            });
        }
        Ok(match self {
            ArrayData::Byte(v) => ArrayData::Byte(Arc::from(&v[start..end])),
            ArrayData::Short(v) => ArrayData::Short(Arc::from(&v[start..end])),
            ArrayData::Int(v) => ArrayData::Int(Arc::from(&v[start..end])),
            ArrayData::Long(v) => ArrayData::Long(Arc::from(&v[start..end])),
            ArrayData::Float(v) => ArrayData::Float(Arc::from(&v[start..end])),
            ArrayData::Double(v) => ArrayData::Double(Arc::from(&v[start..end])),
            ArrayData::Char(v) => ArrayData::Char(v.slice(start..end)),
            ArrayData::String(v) => ArrayData::String(v[start..end].to_vec().into()),
            ArrayData::Structure(s) => ArrayData::Structure(s.slice(start, count)?),
            ArrayData::Sequence(s) => ArrayData::Sequence(s.slice(start, count)?),
        })
    }
}

/// A borrowed view of one array element.
#[derive(Debug, Clone, PartialEq)]
pub enum Element<'a> {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(u8),
    Str(&'a str),
    Record(StructureData<'a>),
    Rows {
        sequence: &'a ArraySequenceNested,
        row: usize,
    },
}

/// An immutable, typed, shaped array.
#[derive(Debug, Clone, PartialEq)]
pub struct CdmArray {
    shape: Vec<usize>,
    data: ArrayData,
    unsigned: bool,
}

impl CdmArray {
    /// Wrap `data` with `shape`. The element count must match exactly.
    pub fn new(shape: Vec<usize>, data: ArrayData) -> CdmResult<Self> {
        let expected = Index::compute_size(&shape);
        if expected != data.len() {
            return Err(CdmError::ShapeMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            shape,
            data,
            unsigned: false,
        })
    }

    /// Mark integral data as unsigned.
    pub fn with_unsigned(mut self, unsigned: bool) -> Self {
        self.unsigned = unsigned;
        self
    }

    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Total element count; 1 for a scalar.
    pub fn size(&self) -> usize {
        Index::compute_size(&self.shape)
    }

    pub fn is_unsigned(&self) -> bool {
        self.unsigned
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn into_data(self) -> ArrayData {
        self.data
    }

    pub fn as_structure(&self) -> Option<&ArrayStructure> {
        match &self.data {
            ArrayData::Structure(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&ArraySequenceNested> {
        match &self.data {
            ArrayData::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Element at linear position `i`.
    pub fn element(&self, i: usize) -> Option<Element<'_>> {
        Some(match &self.data {
            ArrayData::Byte(v) => Element::Byte(*v.get(i)?),
            ArrayData::Short(v) => Element::Short(*v.get(i)?),
            ArrayData::Int(v) => Element::Int(*v.get(i)?),
            ArrayData::Long(v) => Element::Long(*v.get(i)?),
            ArrayData::Float(v) => Element::Float(*v.get(i)?),
            ArrayData::Double(v) => Element::Double(*v.get(i)?),
            ArrayData::Char(v) => Element::Char(*v.get(i)?),
            ArrayData::String(v) => Element::Str(v.get(i)?.as_str()),
            ArrayData::Structure(s) => Element::Record(s.record(i)?),
            ArrayData::Sequence(s) => {
                if i >= s.outer_len() {
                    return None;
                }
                Element::Rows { sequence: s, row: i }
            }
        })
    }

    /// Element at the current position of `index`.
    pub fn get(&self, index: &Index) -> CdmResult<Element<'_>> {
        if index.shape() != self.shape.as_slice() {
            return Err(CdmError::RankMismatch {
                expected: self.rank(),
                actual: index.rank(),
            });
        }
        let offset = index.current_element();
        self.element(offset).ok_or_else(|| CdmError::IndexOutOfBounds {
            index: index.current().to_vec(),
            shape: self.shape.clone(),
        })
    }

    /// Numeric value at linear position `i`, honouring the unsigned flag.
    pub fn get_f64(&self, i: usize) -> Option<f64> {
        match &self.data {
            ArrayData::Float(v) => v.get(i).map(|x| f64::from(*x)),
            ArrayData::Double(v) => v.get(i).copied(),
            _ => self.get_i64(i).map(|x| x as f64),
        }
    }

    /// Integral value at linear position `i`, honouring the unsigned flag.
    /// Floating point values are truncated.
    pub fn get_i64(&self, i: usize) -> Option<i64> {
        let unsigned = self.unsigned;
        match &self.data {
            ArrayData::Byte(v) => v
                .get(i)
                .map(|x| if unsigned { i64::from(*x as u8) } else { i64::from(*x) }),
            ArrayData::Short(v) => v
                .get(i)
                .map(|x| if unsigned { i64::from(*x as u16) } else { i64::from(*x) }),
            ArrayData::Int(v) => v
                .get(i)
                .map(|x| if unsigned { i64::from(*x as u32) } else { i64::from(*x) }),
            ArrayData::Long(v) => v.get(i).copied(),
            ArrayData::Float(v) => v.get(i).map(|x| *x as i64),
            ArrayData::Double(v) => v.get(i).map(|x| *x as i64),
            ArrayData::Char(v) => v.get(i).map(|x| i64::from(*x)),
            ArrayData::String(_) | ArrayData::Structure(_) | ArrayData::Sequence(_) => None,
        }
    }

    /// String at linear position `i` of a String array.
    pub fn get_str(&self, i: usize) -> Option<&str> {
        match &self.data {
            ArrayData::String(v) => v.get(i).map(String::as_str),
            _ => None,
        }
    }

    /// Elements `[start, start + count)` reshaped to `shape`.
    pub fn section_linear(
        &self,
        start: usize,
        count: usize,
        shape: Vec<usize>,
    ) -> CdmResult<CdmArray> {
        let data = self.data.slice(start, count)?;
        Ok(CdmArray::new(shape, data)?.with_unsigned(self.unsigned))
    }

    /// Same storage, new shape of equal size.
    pub fn reshape(&self, shape: Vec<usize>) -> CdmResult<CdmArray> {
        Ok(CdmArray::new(shape, self.data.clone())?.with_unsigned(self.unsigned))
    }

    /// Whole char block as one string, ending at the first NUL.
    pub fn char_string(&self) -> CdmResult<String> {
        match &self.data {
            ArrayData::Char(bytes) => Ok(decode_chars(bytes)),
            _ => Err(CdmError::wrong_type("char", self.data_type())),
        }
    }

    /// One string per innermost row of a char block.
    pub fn char_strings(&self) -> CdmResult<Vec<String>> {
        let bytes = match &self.data {
            ArrayData::Char(bytes) => bytes,
            _ => return Err(CdmError::wrong_type("char", self.data_type())),
        };
        let width = match self.shape.last() {
            Some(0) => return Ok(Vec::new()),
            Some(w) => *w,
            None => return Ok(vec![decode_chars(bytes)]),
        };
        Ok(bytes.chunks(width).map(decode_chars).collect())
    }
}

fn decode_chars(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
