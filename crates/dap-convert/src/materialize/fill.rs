//! Member filling for structure and sequence arrays.
//!
//! Records are filled member by member: for each declared member, the
//! value it holds in every wire instance is gathered and appended to one
//! column buffer through a [`Cursor`]. Members are matched by name, so
//! the declared order wins over wire arrival order.

use cdm_array::{
    ArrayData, ArraySequenceNested, ArrayStructure, CdmArray, Member, StructureMembers,
};
use dap2_model::{BaseType, DapValue, VectorStorage};
use std::sync::Arc;

use super::cursor::Cursor;
use crate::error::{ConvertError, ConvertResult};
use crate::node::{ElementKind, NodeId, NodeKind, PrimitiveType, ProtocolTree};
use crate::shape::{instance_size, shape_own};

/// One wire constructor instance whose fields can be looked up by name.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Instance<'a> {
    /// A structure or grid value.
    Value(&'a DapValue),
    /// One row of a sequence.
    Row(&'a [BaseType]),
}

impl<'a> Instance<'a> {
    fn field(self, name: &str) -> Option<&'a BaseType> {
        match self {
            Instance::Value(value) => value.fields().find(|f| f.name() == name),
            Instance::Row(row) => row.iter().find(|f| f.name() == name),
        }
    }
}

/// Fill every member of `parent` from `instances`, in declared order.
pub(crate) fn fill_members<'a>(
    tree: &ProtocolTree<'a>,
    parent: NodeId,
    instances: &[Instance<'a>],
) -> ConvertResult<StructureMembers> {
    let node = tree.node(parent);
    let mut members = StructureMembers::new(node.name.clone());
    for &child in &node.children {
        let member = tree.node(child);
        let values = instances
            .iter()
            .map(|inst| {
                inst.field(&member.encoded_name).ok_or_else(|| {
                    ConvertError::not_found(format!(
                        "member '{}' missing from '{}' data",
                        member.name, node.name
                    ))
                })
            })
            .collect::<ConvertResult<Vec<_>>>()?;
        members.add_member(fill_column(tree, child, &values)?);
    }
    Ok(members)
}

/// Build one member column from its value in each instance.
fn fill_column<'a>(
    tree: &ProtocolTree<'a>,
    id: NodeId,
    values: &[&'a BaseType],
) -> ConvertResult<Member> {
    let node = tree.node(id);
    let n = values.len();
    let own = shape_own(node);
    let per = instance_size(node);

    let mut column_shape = Vec::with_capacity(own.len() + 1);
    column_shape.push(n);

    let (member_shape, data) = match node.kind {
        NodeKind::Scalar(p) => {
            let mut column = PrimitiveColumn::new(&node.name, p, n);
            for &v in values {
                column.push_scalar(v.value())?;
            }
            (Vec::new(), column.finish(column_shape)?)
        }
        NodeKind::Array(ElementKind::Primitive(p)) => {
            let mut column = PrimitiveColumn::new(&node.name, p, n * per);
            for &v in values {
                column.extend(array_storage(v)?)?;
            }
            column_shape.extend_from_slice(&own);
            (own, column.finish(column_shape)?)
        }
        NodeKind::StringScalar => {
            let mut column = StringColumn::new(&node.name, n);
            for &v in values {
                column.push(scalar_string(v)?)?;
            }
            (Vec::new(), column.finish(column_shape)?)
        }
        NodeKind::Array(ElementKind::String) => {
            let mut column = StringColumn::new(&node.name, n * per);
            for &v in values {
                for s in string_elements(v)? {
                    column.push(s)?;
                }
            }
            column_shape.extend_from_slice(&own);
            (own, column.finish(column_shape)?)
        }
        NodeKind::Structure | NodeKind::Grid => {
            let instances: Vec<Instance<'a>> =
                values.iter().map(|&v| Instance::Value(v.value())).collect();
            let members = fill_members(tree, id, &instances)?;
            let structure = ArrayStructure::new(members, n)?;
            (
                Vec::new(),
                CdmArray::new(column_shape, ArrayData::Structure(structure))?,
            )
        }
        NodeKind::Array(ElementKind::Structure) => {
            let mut cursor = Cursor::new(node.name.clone(), n * per);
            let mut instances = Vec::with_capacity(n * per);
            for &v in values {
                let elements = structure_elements(v)?;
                cursor.advance(elements.len())?;
                instances.extend(elements.iter().map(|e| Instance::Value(e.value())));
            }
            cursor.finish()?;
            let members = fill_members(tree, id, &instances)?;
            let structure = ArrayStructure::new(members, n * per)?;
            column_shape.extend_from_slice(&own);
            (
                own,
                CdmArray::new(column_shape, ArrayData::Structure(structure))?,
            )
        }
        NodeKind::Sequence => {
            let mut row_lengths = Vec::with_capacity(n);
            let mut rows = Vec::new();
            for &v in values {
                let seq = match v.value() {
                    DapValue::Sequence(s) => s,
                    other => return Err(mismatch("Sequence", other)),
                };
                row_lengths.push(seq.row_count());
                rows.extend(seq.rows.iter().map(|r| Instance::Row(r.as_slice())));
            }
            let members = fill_members(tree, id, &rows)?;
            let nested = ArraySequenceNested::new(members, row_lengths)?;
            (
                Vec::new(),
                CdmArray::new(column_shape, ArrayData::Sequence(nested))?,
            )
        }
    };

    Ok(Member::new(node.name.clone(), member_shape, data))
}

pub(crate) fn mismatch(expected: impl Into<String>, found: &DapValue) -> ConvertError {
    ConvertError::type_mismatch(expected, found.dap_type().to_string())
}

fn missing_values(name: &str) -> ConvertError {
    ConvertError::not_found(format!("no data values for '{name}'"))
}

/// Filled element storage of an array value.
pub(crate) fn array_storage(bt: &BaseType) -> ConvertResult<&VectorStorage> {
    match bt.value() {
        DapValue::Array(a) => a
            .vector
            .storage
            .as_ref()
            .ok_or_else(|| missing_values(bt.name())),
        other => Err(mismatch("Array", other)),
    }
}

fn scalar_string(bt: &BaseType) -> ConvertResult<&str> {
    match bt.value() {
        DapValue::Str(s) | DapValue::Url(s) => {
            s.as_deref().ok_or_else(|| missing_values(bt.name()))
        }
        other => Err(mismatch("String", other)),
    }
}

/// Strings of a String/Url array value.
pub(crate) fn string_elements(bt: &BaseType) -> ConvertResult<Vec<&str>> {
    match array_storage(bt)? {
        VectorStorage::BaseTypes(elements) => elements.iter().map(scalar_string).collect(),
        other => Err(ConvertError::type_mismatch(
            "String elements",
            other
                .dap_type()
                .map_or_else(|| "unknown".to_string(), |t| t.to_string()),
        )),
    }
}

/// Structure instances of an array-of-structures value.
pub(crate) fn structure_elements(bt: &BaseType) -> ConvertResult<&[BaseType]> {
    match array_storage(bt)? {
        VectorStorage::BaseTypes(elements) => Ok(elements),
        other => Err(ConvertError::type_mismatch(
            "Structure elements",
            other
                .dap_type()
                .map_or_else(|| "unknown".to_string(), |t| t.to_string()),
        )),
    }
}

/// Widened storage for one primitive column.
enum PrimitiveData {
    Byte(Vec<i8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

/// Cursor-bounded primitive buffer applying the widening rules.
pub(crate) struct PrimitiveColumn {
    wire: PrimitiveType,
    cursor: Cursor,
    data: PrimitiveData,
}

impl PrimitiveColumn {
    pub(crate) fn new(member: &str, wire: PrimitiveType, capacity: usize) -> Self {
        let data = match wire {
            PrimitiveType::Byte => PrimitiveData::Byte(Vec::with_capacity(capacity)),
            PrimitiveType::Int16 => PrimitiveData::Short(Vec::with_capacity(capacity)),
            PrimitiveType::UInt16 | PrimitiveType::Int32 => {
                PrimitiveData::Int(Vec::with_capacity(capacity))
            }
            PrimitiveType::UInt32 => PrimitiveData::Long(Vec::with_capacity(capacity)),
            PrimitiveType::Float32 => PrimitiveData::Float(Vec::with_capacity(capacity)),
            PrimitiveType::Float64 => PrimitiveData::Double(Vec::with_capacity(capacity)),
        };
        Self {
            wire,
            cursor: Cursor::new(member, capacity),
            data,
        }
    }

    pub(crate) fn push_scalar(&mut self, value: &DapValue) -> ConvertResult<()> {
        if value.dap_type() != self.wire.dap_type() {
            return Err(mismatch(self.wire.dap_type().to_string(), value));
        }
        self.cursor.advance(1)?;
        let missing = || missing_values(self.cursor.member());
        match (&mut self.data, value) {
            (PrimitiveData::Byte(v), DapValue::Byte(x)) => v.push(x.ok_or_else(missing)? as i8),
            (PrimitiveData::Short(v), DapValue::Int16(x)) => v.push(x.ok_or_else(missing)?),
            (PrimitiveData::Int(v), DapValue::UInt16(x)) => {
                v.push(i32::from(x.ok_or_else(missing)?))
            }
            (PrimitiveData::Int(v), DapValue::Int32(x)) => v.push(x.ok_or_else(missing)?),
            (PrimitiveData::Long(v), DapValue::UInt32(x)) => {
                v.push(i64::from(x.ok_or_else(missing)?))
            }
            (PrimitiveData::Float(v), DapValue::Float32(x)) => v.push(x.ok_or_else(missing)?),
            (PrimitiveData::Double(v), DapValue::Float64(x)) => v.push(x.ok_or_else(missing)?),
            (_, other) => return Err(mismatch(self.wire.dap_type().to_string(), other)),
        }
        Ok(())
    }

    pub(crate) fn extend(&mut self, storage: &VectorStorage) -> ConvertResult<()> {
        if storage.dap_type() != Some(self.wire.dap_type()) {
            return Err(ConvertError::type_mismatch(
                self.wire.dap_type().to_string(),
                storage
                    .dap_type()
                    .map_or_else(|| "non-numeric storage".to_string(), |t| t.to_string()),
            ));
        }
        self.cursor.advance(storage.len())?;
        match (&mut self.data, storage) {
            (PrimitiveData::Byte(v), VectorStorage::Byte(s)) => {
                v.extend_from_slice(bytemuck::cast_slice::<u8, i8>(s))
            }
            (PrimitiveData::Short(v), VectorStorage::Int16(s)) => v.extend_from_slice(s),
            (PrimitiveData::Int(v), VectorStorage::UInt16(s)) => {
                v.extend(s.iter().map(|x| i32::from(*x)))
            }
            (PrimitiveData::Int(v), VectorStorage::Int32(s)) => v.extend_from_slice(s),
            (PrimitiveData::Long(v), VectorStorage::UInt32(s)) => {
                v.extend(s.iter().map(|x| i64::from(*x)))
            }
            (PrimitiveData::Float(v), VectorStorage::Float32(s)) => v.extend_from_slice(s),
            (PrimitiveData::Double(v), VectorStorage::Float64(s)) => v.extend_from_slice(s),
            _ => {
                return Err(ConvertError::type_mismatch(
                    self.wire.dap_type().to_string(),
                    "incompatible storage",
                ))
            }
        }
        Ok(())
    }

    pub(crate) fn finish(self, shape: Vec<usize>) -> ConvertResult<CdmArray> {
        self.cursor.finish()?;
        let data = match self.data {
            PrimitiveData::Byte(v) => ArrayData::Byte(v.into()),
            PrimitiveData::Short(v) => ArrayData::Short(v.into()),
            PrimitiveData::Int(v) => ArrayData::Int(v.into()),
            PrimitiveData::Long(v) => ArrayData::Long(v.into()),
            PrimitiveData::Float(v) => ArrayData::Float(v.into()),
            PrimitiveData::Double(v) => ArrayData::Double(v.into()),
        };
        Ok(CdmArray::new(shape, data)?.with_unsigned(self.wire.materialized_unsigned()))
    }
}

/// Cursor-bounded string buffer.
pub(crate) struct StringColumn {
    cursor: Cursor,
    data: Vec<String>,
}

impl StringColumn {
    pub(crate) fn new(member: &str, capacity: usize) -> Self {
        Self {
            cursor: Cursor::new(member, capacity),
            data: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, value: &str) -> ConvertResult<()> {
        self.cursor.advance(1)?;
        self.data.push(value.to_string());
        Ok(())
    }

    pub(crate) fn finish(self, shape: Vec<usize>) -> ConvertResult<CdmArray> {
        self.cursor.finish()?;
        let data: Arc<[String]> = self.data.into();
        Ok(CdmArray::new(shape, ArrayData::String(data))?)
    }
}
