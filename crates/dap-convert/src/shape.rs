//! Inherited and own-only node shapes.

use crate::node::{NodeId, NodeKind, ProtocolNode, ProtocolTree};

/// Extents declared on the node itself: the per-instance member shape.
///
/// A sequence's single extent is its row count, once known.
pub fn shape_own(node: &ProtocolNode<'_>) -> Vec<usize> {
    match node.kind {
        NodeKind::Sequence => node.row_count.map(|n| vec![n]).unwrap_or_default(),
        _ => node.dimensions.iter().map(|d| d.size).collect(),
    }
}

/// Full shape: every ancestor's own extents, outermost first, then the
/// node's own.
///
/// Sequences never inherit: each instance has its own row count. A
/// collapsed grid's extents describe its array member, so they are not
/// repeated onto the grid's children.
pub fn shape_all(tree: &ProtocolTree<'_>, id: NodeId) -> Vec<usize> {
    let node = tree.node(id);
    if node.kind == NodeKind::Sequence {
        return shape_own(node);
    }

    let mut shape = Vec::new();
    for ancestor in tree.ancestors(id) {
        let a = tree.node(ancestor);
        if a.is_collapsed_grid() {
            continue;
        }
        shape.extend(shape_own(a));
    }
    shape.extend(shape_own(node));
    shape
}

/// Elements per instance (1 for scalars and records).
pub fn instance_size(node: &ProtocolNode<'_>) -> usize {
    match node.kind {
        NodeKind::Sequence => 1,
        _ => node.dimensions.iter().map(|d| d.size).product(),
    }
}
