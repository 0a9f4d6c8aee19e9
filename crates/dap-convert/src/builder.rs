//! Tree builder: DDS / DataDDS graphs into a [`ProtocolTree`].

use dap2_model::{BaseType, DapType, DapValue};
use tracing::debug;

use crate::error::{ConvertError, ConvertResult};
use crate::node::{ElementKind, NodeId, NodeKind, PrimitiveType, ProtocolNode, ProtocolTree};

/// Build a tree from a declarations-only graph.
pub fn build_declarations(dds: &[BaseType]) -> ConvertResult<ProtocolTree<'_>> {
    TreeBuilder::new(false).build(dds)
}

/// Build a tree from a declarations+values graph.
///
/// Sequences whose single instance is visible in the graph get their
/// row count; sequences repeated inside arrays of structures or other
/// sequences are jagged and take their row lengths from the data at
/// materialization.
pub fn build_values(data: &[BaseType]) -> ConvertResult<ProtocolTree<'_>> {
    TreeBuilder::new(true).build(data)
}

struct TreeBuilder<'a> {
    tree: ProtocolTree<'a>,
}

impl<'a> TreeBuilder<'a> {
    fn new(has_values: bool) -> Self {
        Self {
            tree: ProtocolTree {
                has_values,
                ..ProtocolTree::default()
            },
        }
    }

    fn build(mut self, variables: &'a [BaseType]) -> ConvertResult<ProtocolTree<'a>> {
        for bt in variables {
            let id = self.add(bt, None, true)?;
            self.tree.roots.push(id);
        }
        assign_sequence_numbers(&mut self.tree);
        debug!(
            nodes = self.tree.len(),
            top_level = self.tree.roots.len(),
            has_values = self.tree.has_values,
            "Built protocol tree"
        );
        Ok(self.tree)
    }

    /// Add `bt` and its subtree. `single` is false below arrays of
    /// structures and sequences, where `bt` is a template rather than a
    /// value instance.
    fn add(
        &mut self,
        bt: &'a BaseType,
        parent: Option<NodeId>,
        single: bool,
    ) -> ConvertResult<NodeId> {
        let name = bt.clear_name();
        let value = bt.value();

        let (kind, element_type, dimensions) = match value {
            DapValue::Str(_) | DapValue::Url(_) => (NodeKind::StringScalar, None, Vec::new()),
            DapValue::Structure(_) => (NodeKind::Structure, None, Vec::new()),
            DapValue::Sequence(_) => (NodeKind::Sequence, None, Vec::new()),
            DapValue::Grid(grid) => {
                let array = match grid.array.value() {
                    DapValue::Array(a) => a,
                    _ => return Err(ConvertError::unsupported("Grid without array", name)),
                };
                let element = PrimitiveType::from_dap(array.template().dap_type())
                    .ok_or_else(|| {
                        ConvertError::unsupported(
                            format!("Grid of {}", array.template().dap_type()),
                            name.clone(),
                        )
                    })?;
                if parent.is_none() {
                    (
                        NodeKind::Grid,
                        Some(ElementKind::Primitive(element)),
                        array.dimensions.clone(),
                    )
                } else {
                    (NodeKind::Grid, None, Vec::new())
                }
            }
            DapValue::Array(array) => {
                let template = array.template().dap_type();
                let element = match template {
                    DapType::String | DapType::Url => ElementKind::String,
                    DapType::Structure => ElementKind::Structure,
                    DapType::Grid | DapType::Sequence | DapType::Array | DapType::List => {
                        return Err(ConvertError::unsupported(
                            format!("Array of {template}"),
                            name,
                        ));
                    }
                    numeric => match PrimitiveType::from_dap(numeric) {
                        Some(p) => ElementKind::Primitive(p),
                        None => {
                            return Err(ConvertError::unsupported(
                                format!("Array of {template}"),
                                name,
                            ))
                        }
                    },
                };
                (
                    NodeKind::Array(element),
                    Some(element),
                    array.dimensions.clone(),
                )
            }
            DapValue::List(_) => return Err(ConvertError::unsupported("List", name)),
            scalar => match PrimitiveType::from_dap(scalar.dap_type()) {
                Some(p) => (NodeKind::Scalar(p), None, Vec::new()),
                None => return Err(ConvertError::unsupported(scalar.dap_type().to_string(), name)),
            },
        };

        let row_count = match value {
            DapValue::Sequence(seq) if self.tree.has_values && single => Some(seq.row_count()),
            _ => None,
        };

        let id = NodeId(self.tree.nodes.len());
        self.tree.nodes.push(ProtocolNode {
            name,
            encoded_name: bt.name().to_string(),
            kind,
            element_type,
            dimensions,
            children: Vec::new(),
            parent,
            seq: 0,
            attributes: Vec::new(),
            row_count,
            source: bt,
        });

        let children: Vec<NodeId> = match value {
            DapValue::Structure(s) => s
                .fields
                .iter()
                .map(|f| self.add(f, Some(id), single))
                .collect::<ConvertResult<_>>()?,
            DapValue::Grid(g) => g
                .variables()
                .map(|f| self.add(f, Some(id), single))
                .collect::<ConvertResult<_>>()?,
            DapValue::Sequence(s) => s
                .template
                .iter()
                .map(|f| self.add(f, Some(id), false))
                .collect::<ConvertResult<_>>()?,
            DapValue::Array(a) => match a.template().value() {
                DapValue::Structure(s) => s
                    .fields
                    .iter()
                    .map(|f| self.add(f, Some(id), false))
                    .collect::<ConvertResult<_>>()?,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        self.tree.nodes[id.0].children = children;

        Ok(id)
    }
}

/// Number every node in depth-first post-order, starting at 0.
pub fn assign_sequence_numbers(tree: &mut ProtocolTree<'_>) {
    fn visit(tree: &mut ProtocolTree<'_>, id: NodeId, next: &mut usize) {
        let children = tree.node(id).children.clone();
        for child in children {
            visit(tree, child, next);
        }
        tree.node_mut(id).seq = *next;
        *next += 1;
    }

    let mut next = 0;
    for root in tree.roots.clone() {
        visit(tree, root, &mut next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dap2_model::{ArrayDimension, PrimitiveVector};

    fn int_array(name: &str, n: usize) -> BaseType {
        BaseType::array(
            name,
            vec![ArrayDimension::anonymous(n)],
            PrimitiveVector::declared(BaseType::new(name, DapValue::Int32(None))),
        )
    }

    #[test]
    fn test_scalar_and_array_kinds() {
        let dds = vec![
            BaseType::new("x", DapValue::Float64(None)),
            BaseType::new("s", DapValue::Str(None)),
            int_array("v", 3),
        ];
        let tree = build_declarations(&dds).unwrap();
        let kinds: Vec<NodeKind> = tree.roots().iter().map(|id| tree.node(*id).kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Scalar(PrimitiveType::Float64),
                NodeKind::StringScalar,
                NodeKind::Array(ElementKind::Primitive(PrimitiveType::Int32)),
            ]
        );
        assert_eq!(tree.node(tree.roots()[2]).dimensions[0].size, 3);
    }

    #[test]
    fn test_array_of_sequence_is_unsupported() {
        let seq = BaseType::sequence("rows", vec![BaseType::new("a", DapValue::Int32(None))]);
        let dds = vec![BaseType::array(
            "bad",
            vec![ArrayDimension::anonymous(2)],
            PrimitiveVector::declared(seq),
        )];
        let err = build_declarations(&dds).unwrap_err();
        match err {
            ConvertError::Unsupported { kind, name } => {
                assert_eq!(kind, "Array of Sequence");
                assert_eq!(name, "bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_list_is_unsupported() {
        let dds = vec![BaseType::new(
            "l",
            DapValue::List(Box::new(BaseType::new("l", DapValue::Int32(None)))),
        )];
        assert!(matches!(
            build_declarations(&dds),
            Err(ConvertError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_post_order_numbering() {
        let dds = vec![
            BaseType::structure(
                "s",
                vec![
                    BaseType::new("a", DapValue::Int32(None)),
                    BaseType::new("b", DapValue::Int32(None)),
                ],
            ),
            BaseType::new("c", DapValue::Int32(None)),
        ];
        let tree = build_declarations(&dds).unwrap();
        let seq = |path: &str| tree.node(tree.find_path(path).unwrap()).seq;
        assert_eq!(seq("s.a"), 0);
        assert_eq!(seq("s.b"), 1);
        assert_eq!(seq("s"), 2);
        assert_eq!(seq("c"), 3);
    }

    #[test]
    fn test_escaped_names() {
        let dds = vec![BaseType::new("sea%20level", DapValue::Int16(None))];
        let tree = build_declarations(&dds).unwrap();
        let node = tree.node(tree.roots()[0]);
        assert_eq!(node.name, "sea level");
        assert_eq!(node.encoded_name, "sea%20level");
    }
}
