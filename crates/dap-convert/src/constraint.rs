//! DAP constraint expressions: projections and hyperslab selectors.

use cdm_array::{DataType, Variable};
use std::fmt;

use crate::error::{ConvertError, ConvertResult};
use crate::node::{NodeId, NodeKind, ProtocolTree};

/// An inclusive strided index range along one dimension.
///
/// Always non-empty with a positive stride; fields are only set through
/// the checked constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    first: usize,
    stride: usize,
    last: usize,
}

impl Range {
    pub fn new(first: usize, stride: usize, last: usize) -> ConvertResult<Self> {
        if stride == 0 {
            return Err(ConvertError::invalid_variable("range stride must be > 0"));
        }
        if first > last {
            return Err(ConvertError::invalid_variable(format!(
                "range first {first} is past last {last}"
            )));
        }
        Ok(Self { first, stride, last })
    }

    /// Every index of a dimension of length `len`. Zero-length
    /// dimensions have no inclusive range.
    pub fn full(len: usize) -> ConvertResult<Self> {
        match len.checked_sub(1) {
            Some(last) => Self::new(0, 1, last),
            None => Err(ConvertError::invalid_variable(
                "cannot select a zero-length dimension",
            )),
        }
    }

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn last(&self) -> usize {
        self.last
    }

    /// Number of indices selected.
    pub fn length(&self) -> usize {
        (self.last - self.first) / self.stride + 1
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}:{}]", self.first, self.stride, self.last)
    }
}

/// Shape selected by a section.
pub fn section_shape(section: &[Range]) -> Vec<usize> {
    section.iter().map(Range::length).collect()
}

/// Render a section as `[first:stride:last]` per dimension.
pub fn selector(section: &[Range]) -> String {
    section.iter().map(Range::to_string).collect()
}

/// Projection clause `?a,b.c` naming each node by its encoded path.
pub fn projection(tree: &ProtocolTree<'_>, nodes: &[NodeId]) -> String {
    let names: Vec<String> = nodes.iter().map(|id| tree.encoded_full_name(*id)).collect();
    format!("?{}", names.join(","))
}

/// Constraint for reading `section` of `variable` through `node`.
///
/// Sequences cannot be subset by index, so they get no selector. Char
/// variables are served as strings; their innermost range is dropped when
/// the section covers every declared dimension.
pub fn variable_constraint(
    tree: &ProtocolTree<'_>,
    node: NodeId,
    variable: &Variable,
    section: Option<&[Range]>,
) -> ConvertResult<String> {
    let name = tree.encoded_full_name(node);
    if tree.node(node).kind == NodeKind::Sequence {
        return Ok(name);
    }

    let mut ranges: Vec<Range> = match section {
        Some(s) => s.to_vec(),
        None => variable
            .shape()
            .iter()
            .map(|len| Range::full(*len))
            .collect::<ConvertResult<_>>()?,
    };
    let is_char = variable.data_type() == DataType::Char;
    if is_char && !ranges.is_empty() && ranges.len() == variable.rank() {
        ranges.pop();
    }
    Ok(format!("{name}{}", selector(&ranges)))
}
