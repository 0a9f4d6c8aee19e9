//! Protocol node model.
//!
//! A [`ProtocolTree`] is an arena of [`ProtocolNode`]s built from one DDS or
//! DataDDS. Nodes refer to each other through [`NodeId`] indices; the
//! parent link is only used for name and shape resolution. The dataset
//! root is the tree itself: it owns the top-level node list, the global
//! attributes and the dimension extras found in the DAS.

use cdm_array::{Attribute, DataType};
use dap2_model::{ArrayDimension, BaseType, DapType};
use std::fmt;

/// Index of a node in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Fixed-width DAP numeric types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float32,
    Float64,
}

impl PrimitiveType {
    pub fn from_dap(dap_type: DapType) -> Option<Self> {
        match dap_type {
            DapType::Byte => Some(Self::Byte),
            DapType::Int16 => Some(Self::Int16),
            DapType::UInt16 => Some(Self::UInt16),
            DapType::Int32 => Some(Self::Int32),
            DapType::UInt32 => Some(Self::UInt32),
            DapType::Float32 => Some(Self::Float32),
            DapType::Float64 => Some(Self::Float64),
            _ => None,
        }
    }

    pub fn dap_type(self) -> DapType {
        match self {
            Self::Byte => DapType::Byte,
            Self::Int16 => DapType::Int16,
            Self::UInt16 => DapType::UInt16,
            Self::Int32 => DapType::Int32,
            Self::UInt32 => DapType::UInt32,
            Self::Float32 => DapType::Float32,
            Self::Float64 => DapType::Float64,
        }
    }

    /// Declared CDM type: same width as the wire type.
    pub fn data_type(self) -> DataType {
        match self {
            Self::Byte => DataType::Byte,
            Self::Int16 | Self::UInt16 => DataType::Short,
            Self::Int32 | Self::UInt32 => DataType::Int,
            Self::Float32 => DataType::Float,
            Self::Float64 => DataType::Double,
        }
    }

    /// CDM type after widening: unsigned 16/32-bit values move up one width.
    pub fn materialized_type(self) -> DataType {
        match self {
            Self::UInt16 => DataType::Int,
            Self::UInt32 => DataType::Long,
            other => other.data_type(),
        }
    }

    /// Whether the materialized array carries the unsigned flag.
    /// Only Byte keeps its width; widened types hold exact values.
    pub fn materialized_unsigned(self) -> bool {
        matches!(self, Self::Byte)
    }
}

/// Element type of an array node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Primitive(PrimitiveType),
    String,
    Structure,
}

/// Closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Scalar(PrimitiveType),
    StringScalar,
    Structure,
    Grid,
    Sequence,
    Array(ElementKind),
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Scalar(p) => write!(f, "{}", p.dap_type()),
            NodeKind::StringScalar => f.write_str("String"),
            NodeKind::Structure => f.write_str("Structure"),
            NodeKind::Grid => f.write_str("Grid"),
            NodeKind::Sequence => f.write_str("Sequence"),
            NodeKind::Array(ElementKind::Primitive(p)) => write!(f, "Array of {}", p.dap_type()),
            NodeKind::Array(ElementKind::String) => f.write_str("Array of String"),
            NodeKind::Array(ElementKind::Structure) => f.write_str("Array of Structure"),
        }
    }
}

/// CDM type a DAP type is declared as.
pub fn cdm_type_of(dap_type: DapType) -> DataType {
    match dap_type {
        DapType::String | DapType::Url => DataType::String,
        DapType::Structure | DapType::Grid | DapType::Sequence => DataType::Structure,
        other => PrimitiveType::from_dap(other).map_or(DataType::Structure, PrimitiveType::data_type),
    }
}

/// One declared or data-bearing protocol variable.
#[derive(Debug, Clone)]
pub struct ProtocolNode<'a> {
    /// Unescaped identifier.
    pub name: String,
    /// Identifier as sent on the wire.
    pub encoded_name: String,
    pub kind: NodeKind,
    /// Element type for arrays and collapsed grids.
    pub element_type: Option<ElementKind>,
    /// Extents declared directly on this node.
    pub dimensions: Vec<ArrayDimension>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Depth-first post-order number.
    pub seq: usize,
    pub attributes: Vec<Attribute>,
    /// Rows returned, for sequences whose single instance is known.
    pub row_count: Option<usize>,
    pub(crate) source: &'a BaseType,
}

impl<'a> ProtocolNode<'a> {
    /// The DDS/DataDDS variable this node was built from.
    pub fn source(&self) -> &'a BaseType {
        self.source
    }

    /// Declared CDM type.
    pub fn data_type(&self) -> DataType {
        match (self.kind, self.element_type) {
            (NodeKind::Scalar(p), _) => p.data_type(),
            (NodeKind::StringScalar, _) | (NodeKind::Array(ElementKind::String), _) => {
                DataType::String
            }
            (NodeKind::Array(ElementKind::Primitive(p)), _) => p.data_type(),
            (NodeKind::Grid, Some(ElementKind::Primitive(p))) => p.data_type(),
            _ => DataType::Structure,
        }
    }

    /// CDM type after widening.
    pub fn materialized_type(&self) -> DataType {
        match self.primitive() {
            Some(p) => p.materialized_type(),
            None => self.data_type(),
        }
    }

    /// Primitive element type, if this node holds plain numbers.
    pub fn primitive(&self) -> Option<PrimitiveType> {
        match (self.kind, self.element_type) {
            (NodeKind::Scalar(p), _) => Some(p),
            (NodeKind::Array(ElementKind::Primitive(p)), _) => Some(p),
            (NodeKind::Grid, Some(ElementKind::Primitive(p))) => Some(p),
            _ => None,
        }
    }

    pub fn is_unsigned(&self) -> bool {
        self.primitive()
            .is_some_and(|p| p.dap_type().is_unsigned())
    }

    /// A top-level grid standing in for its array member.
    pub fn is_collapsed_grid(&self) -> bool {
        self.kind == NodeKind::Grid && self.element_type.is_some()
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Add or replace an attribute by name.
    pub fn set_attribute(&mut self, attribute: Attribute) {
        match self.attributes.iter_mut().find(|a| a.name == attribute.name) {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
    }
}

/// Arena holding one dataset's protocol nodes.
#[derive(Debug, Clone, Default)]
pub struct ProtocolTree<'a> {
    pub(crate) nodes: Vec<ProtocolNode<'a>>,
    pub(crate) roots: Vec<NodeId>,
    /// Whether the tree was built from a DataDDS.
    pub(crate) has_values: bool,
    /// File-level attributes.
    pub attributes: Vec<Attribute>,
    pub unlimited_dimension: Option<String>,
    pub extra_dimensions: Vec<ArrayDimension>,
}

impl<'a> ProtocolTree<'a> {
    pub fn node(&self, id: NodeId) -> &ProtocolNode<'a> {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut ProtocolNode<'a> {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&ProtocolNode<'a>> {
        self.nodes.get(id.0)
    }

    /// Top-level nodes in declaration order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn has_values(&self) -> bool {
        self.has_values
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Nodes at the level below `parent`, or the top level for `None`.
    pub fn children_of(&self, parent: Option<NodeId>) -> &[NodeId] {
        match parent {
            Some(id) => &self.node(id).children,
            None => &self.roots,
        }
    }

    /// Find a node by unescaped name among the children of `parent`.
    pub fn find_child(&self, parent: Option<NodeId>, name: &str) -> Option<NodeId> {
        self.children_of(parent)
            .iter()
            .copied()
            .find(|id| self.node(*id).name == name)
    }

    /// Find a top-level node by unescaped name.
    pub fn find_top(&self, name: &str) -> Option<NodeId> {
        self.find_child(None, name)
    }

    /// Resolve a `.`-separated path of unescaped names from the top level.
    pub fn find_path(&self, path: &str) -> Option<NodeId> {
        let mut current = None;
        for segment in path.split('.') {
            current = Some(self.find_child(current, segment)?);
        }
        current
    }

    /// Ancestors of `id`, outermost first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.node(id).parent;
        while let Some(p) = current {
            chain.push(p);
            current = self.node(p).parent;
        }
        chain.reverse();
        chain
    }

    /// The top-level node containing `id` (itself when top-level).
    pub fn top_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).first().copied().unwrap_or(id)
    }

    /// Unescaped names from the top level down to `id`, joined by `.`.
    pub fn full_name(&self, id: NodeId) -> String {
        self.path_names(id, |n| n.name.as_str())
    }

    /// Encoded names from the top level down to `id`, joined by `.`.
    pub fn encoded_full_name(&self, id: NodeId) -> String {
        self.path_names(id, |n| n.encoded_name.as_str())
    }

    fn path_names<F>(&self, id: NodeId, name: F) -> String
    where
        F: for<'n> Fn(&'n ProtocolNode<'a>) -> &'n str,
    {
        let mut parts: Vec<&str> = self
            .ancestors(id)
            .into_iter()
            .map(|a| name(self.node(a)))
            .collect();
        parts.push(name(self.node(id)));
        parts.join(".")
    }

    /// Find a node by its post-order number.
    pub fn find_seq(&self, seq: usize) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.seq == seq).map(NodeId)
    }
}
