//! Array materializer: value-bearing trees into CDM arrays.

mod chars;
mod cursor;
mod fill;

pub use chars::{pack_strings, string_to_chars};
pub use cursor::Cursor;

use cdm_array::{ArrayData, ArrayStructure, CdmArray, DataType, Variable};
use dap2_model::{DapValue, VectorStorage};
use std::sync::Arc;
use tracing::debug;

use crate::config::ConvertConfig;
use crate::constraint::{section_shape, Range};
use crate::error::{ConvertError, ConvertResult};
use crate::flatten::resolve_flattened;
use crate::node::{ElementKind, NodeId, NodeKind, PrimitiveType, ProtocolNode, ProtocolTree};
use crate::shape::shape_own;
use fill::{
    array_storage, fill_members, mismatch, string_elements, structure_elements, Instance,
    PrimitiveColumn,
};

/// Converts nodes of a value-bearing tree into CDM arrays.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConvertConfig,
}

impl Converter {
    pub fn new(config: ConvertConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Materialize `id` with its wire types, widening where required.
    ///
    /// Only nodes with a single wire instance can be converted directly:
    /// top-level variables and members of scalar structures. Members
    /// repeated inside arrays of structures or sequences are read through
    /// their top-level variable.
    pub fn convert(&self, tree: &ProtocolTree<'_>, id: NodeId) -> ConvertResult<CdmArray> {
        let node = tree.node(id);
        debug!(variable = %node.name, kind = %node.kind, "Materializing");
        let value = node.source().value();

        match node.kind {
            NodeKind::Scalar(p) => {
                let mut column = PrimitiveColumn::new(&node.name, p, 1);
                column.push_scalar(value)?;
                column.finish(Vec::new())
            }
            NodeKind::StringScalar => {
                let s = value.as_str().ok_or_else(|| no_values(node))?;
                let data: Arc<[String]> = vec![s.to_string()].into();
                Ok(CdmArray::new(Vec::new(), ArrayData::String(data))?)
            }
            NodeKind::Grid if node.is_collapsed_grid() => {
                let array = node.children.first().copied().ok_or_else(|| {
                    ConvertError::not_found(format!("grid '{}' has no array member", node.name))
                })?;
                self.convert(tree, array)
            }
            NodeKind::Structure | NodeKind::Grid => {
                let members = fill_members(tree, id, &[Instance::Value(value)])?;
                Ok(CdmArray::new(
                    Vec::new(),
                    ArrayData::Structure(ArrayStructure::new(members, 1)?),
                )?)
            }
            NodeKind::Sequence => {
                let seq = match value {
                    DapValue::Sequence(s) => s,
                    other => return Err(mismatch("Sequence", other)),
                };
                if tree.has_values() && node.row_count.is_none() {
                    return Err(ConvertError::invalid_variable(format!(
                        "sequence '{}' repeats per outer row; read its enclosing variable",
                        tree.full_name(id)
                    )));
                }
                let rows: Vec<Instance<'_>> = seq
                    .rows
                    .iter()
                    .map(|r| Instance::Row(r.as_slice()))
                    .collect();
                let members = fill_members(tree, id, &rows)?;
                let structure = ArrayStructure::new(members, rows.len())?;
                Ok(CdmArray::new(
                    vec![rows.len()],
                    ArrayData::Structure(structure),
                )?)
            }
            NodeKind::Array(ElementKind::Primitive(p)) => {
                primitive_array(node, p, array_storage(node.source())?)
            }
            NodeKind::Array(ElementKind::String) => {
                let strings: Vec<String> = string_elements(node.source())?
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                let data: Arc<[String]> = strings.into();
                Ok(CdmArray::new(shape_own(node), ArrayData::String(data))?)
            }
            NodeKind::Array(ElementKind::Structure) => {
                let elements = structure_elements(node.source())?;
                let shape = shape_own(node);
                let records: usize = shape.iter().product();
                let mut cursor = Cursor::new(node.name.clone(), records);
                cursor.advance(elements.len())?;
                cursor.finish()?;
                let instances: Vec<Instance<'_>> =
                    elements.iter().map(|e| Instance::Value(e.value())).collect();
                let members = fill_members(tree, id, &instances)?;
                Ok(CdmArray::new(
                    shape,
                    ArrayData::Structure(ArrayStructure::new(members, records)?),
                )?)
            }
        }
    }

    /// Convert a top-level variable, honouring its declared type.
    ///
    /// String arrays become char blocks when the variable is char typed.
    /// With `legacy_char_strings`, a lone string standing in for a char
    /// variable is copied into a char buffer of the variable's size, and
    /// the variable is retyped to char.
    pub fn convert_top_variable(
        &self,
        variable: &mut Variable,
        section: Option<&[Range]>,
        tree: &ProtocolTree<'_>,
        id: NodeId,
    ) -> ConvertResult<CdmArray> {
        let node = tree.node(id);
        let target = variable.data_type();

        match node.kind {
            NodeKind::Array(ElementKind::String) => match target {
                DataType::String => self.convert(tree, id),
                DataType::Char => {
                    let strings = string_elements(node.source())?;
                    let shape = section
                        .map(section_shape)
                        .unwrap_or_else(|| variable.shape().to_vec());
                    pack_strings(&strings, variable, &shape)
                }
                other => Err(ConvertError::invalid_variable(format!(
                    "string array '{}' cannot be read as {}",
                    variable.full_name(),
                    other
                ))),
            },
            NodeKind::StringScalar if self.is_degenerate_string(variable) => {
                let value = node.source().value().as_str().ok_or_else(|| no_values(node))?;
                let data = string_to_chars(value, variable)?;
                debug!(variable = %variable.full_name(), "Retyping string scalar as char");
                variable.set_data_type(DataType::Char);
                Ok(data)
            }
            NodeKind::StringScalar if target == DataType::Char => {
                Err(ConvertError::invalid_variable(format!(
                    "string scalar '{}' cannot be read as char",
                    variable.full_name()
                )))
            }
            _ => self.convert(tree, id),
        }
    }

    /// Convert the top-level variable `top` containing `variable`.
    ///
    /// With `flatten`, the structure wrapping is removed: the result is
    /// `variable`'s own member data across every record, with nested
    /// sequences concatenated.
    pub fn convert_nested_variable(
        &self,
        variable: &Variable,
        tree: &ProtocolTree<'_>,
        top: NodeId,
        flatten: bool,
    ) -> ConvertResult<CdmArray> {
        let data = self.convert(tree, top)?;
        if !flatten {
            return Ok(data);
        }
        resolve_flattened(variable, data)
    }

    fn is_degenerate_string(&self, variable: &Variable) -> bool {
        self.config.legacy_char_strings
            && match variable.data_type() {
                DataType::Char => true,
                DataType::String => variable.rank() > 0,
                _ => false,
            }
    }
}

fn no_values(node: &ProtocolNode<'_>) -> ConvertError {
    ConvertError::not_found(format!("no data values for '{}'", node.name))
}

/// Primitive array over the wire storage. Types that need no widening
/// share the wire buffer.
fn primitive_array(
    node: &ProtocolNode<'_>,
    p: PrimitiveType,
    storage: &VectorStorage,
) -> ConvertResult<CdmArray> {
    let shape = shape_own(node);
    let data = match storage {
        VectorStorage::Byte(v) if p == PrimitiveType::Byte => {
            match bytemuck::allocation::try_cast_slice_arc::<u8, i8>(Arc::clone(v)) {
                Ok(shared) => ArrayData::Byte(shared),
                Err((err, _)) => {
                    debug!(name = %node.name, %err, "Byte buffer not shareable, copying");
                    return copy_primitives(node, p, storage, shape);
                }
            }
        }
        VectorStorage::Int16(v) if p == PrimitiveType::Int16 => ArrayData::Short(Arc::clone(v)),
        VectorStorage::Int32(v) if p == PrimitiveType::Int32 => ArrayData::Int(Arc::clone(v)),
        VectorStorage::Float32(v) if p == PrimitiveType::Float32 => {
            ArrayData::Float(Arc::clone(v))
        }
        VectorStorage::Float64(v) if p == PrimitiveType::Float64 => {
            ArrayData::Double(Arc::clone(v))
        }
        _ => return copy_primitives(node, p, storage, shape),
    };
    Ok(CdmArray::new(shape, data)?.with_unsigned(p.materialized_unsigned()))
}

/// Element-wise copy, widening where the CDM type differs from the wire.
fn copy_primitives(
    node: &ProtocolNode<'_>,
    p: PrimitiveType,
    storage: &VectorStorage,
    shape: Vec<usize>,
) -> ConvertResult<CdmArray> {
    let mut column = PrimitiveColumn::new(&node.name, p, storage.len());
    column.extend(storage)?;
    column.finish(shape)
}
