//! Matching declaration nodes to their counterparts in a value tree.

use std::collections::HashSet;
use tracing::warn;

use crate::node::{NodeId, ProtocolTree};

/// A requested declaration node and the value node it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Correlation {
    pub decl: NodeId,
    pub value: Option<NodeId>,
}

/// Find the value node for each requested declaration node.
///
/// Requests are processed in post-order number order. Each node is looked
/// up under its parent's counterpart; when the parent has none (data
/// responses may drop the structure wrapper) the value tree's top level
/// is searched instead. A value node is claimed by at most one request.
pub fn correlate(
    decls: &ProtocolTree<'_>,
    values: &ProtocolTree<'_>,
    requested: &[NodeId],
) -> Vec<Correlation> {
    let mut order = requested.to_vec();
    order.sort_by_key(|id| decls.node(*id).seq);

    let mut claimed = HashSet::new();
    order
        .into_iter()
        .map(|decl| {
            let value = find_value(decls, values, decl, &claimed);
            match value {
                Some(v) => {
                    claimed.insert(v);
                }
                None => warn!(
                    variable = %decls.encoded_full_name(decl),
                    "No data found for requested variable"
                ),
            }
            Correlation { decl, value }
        })
        .collect()
}

fn find_value(
    decls: &ProtocolTree<'_>,
    values: &ProtocolTree<'_>,
    decl: NodeId,
    claimed: &HashSet<NodeId>,
) -> Option<NodeId> {
    let node = decls.node(decl);
    let scope = match node.parent {
        Some(parent) => find_value(decls, values, parent, &HashSet::new()),
        None => None,
    };
    values
        .children_of(scope)
        .iter()
        .copied()
        .find(|id| values.node(*id).encoded_name == node.encoded_name && !claimed.contains(id))
}
