//! Attribute attacher: binds DAS tables onto tree nodes by name.
//!
//! Each table is placed by trying, in order, an exact top-level name, a
//! dotted path from the top level, and finally the dataset root with the
//! table name prefixed onto every attribute name. Nested containers use
//! the same rules relative to the node their parent table matched.

use cdm_array::{AttrValue, Attribute};
use dap2_model::{
    unescape_identifier, ArrayDimension, AttributeTable, DapType, Das, DasAttribute, DasValue,
};
use tracing::{debug, warn};

use crate::config::ConvertConfig;
use crate::node::{cdm_type_of, NodeId, ProtocolTree};

const COORDINATES: &str = "coordinates";
const COORDINATE_AXES: &str = "_CoordinateAxes";
const UNLIMITED_DIMENSION: &str = "Unlimited_Dimension";

/// Where a table's attributes land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Exact match on a top-level name.
    TopLevel(NodeId),
    /// Dotted path resolved from the top level.
    Path(NodeId),
    /// Unresolved: root, with names qualified by the table name.
    Fallback,
}

/// Attach every table of `das` onto `tree`.
pub fn attach_attributes(tree: &mut ProtocolTree<'_>, das: &Das, config: &ConvertConfig) {
    for table in &das.tables {
        if config.is_global_table(&table.name) {
            attach_entries(tree, None, None, table);
        } else if table.name == config.extra_table {
            read_extra_table(tree, table);
        } else if table.name == config.extra_dimension_table {
            read_extra_dimensions(tree, table);
        } else {
            match resolve_table(tree, &table.name) {
                Placement::TopLevel(id) | Placement::Path(id) => {
                    attach_entries(tree, Some(id), None, table)
                }
                Placement::Fallback => {
                    debug!(table = %table.name, "Attribute table unmatched, attaching to root");
                    attach_entries(tree, None, Some(table.name.clone()), table);
                }
            }
        }
    }

    if config.merge_coordinate_axes {
        merge_coordinate_axes(tree);
    }
}

/// Placement of a top-level table name.
///
/// Table names carry the same `%XX` escapes as DDS names; they are
/// decoded segment by segment before matching.
pub fn resolve_table(tree: &ProtocolTree<'_>, table: &str) -> Placement {
    if let Some(id) = tree.find_top(&unescape_identifier(table)) {
        return Placement::TopLevel(id);
    }
    if table.contains('.') {
        if let Some(id) = walk_segments(tree, None, table) {
            return Placement::Path(id);
        }
    }
    Placement::Fallback
}

/// Resolve a nested container name relative to `parent`.
fn resolve_nested(tree: &ProtocolTree<'_>, parent: Option<NodeId>, name: &str) -> Option<NodeId> {
    if let Some(id) = tree.find_child(parent, &unescape_identifier(name)) {
        return Some(id);
    }
    if !name.contains('.') {
        return None;
    }
    walk_segments(tree, parent, name)
}

/// Follow the `.`-separated encoded segments of `path` below `parent`.
fn walk_segments(tree: &ProtocolTree<'_>, parent: Option<NodeId>, path: &str) -> Option<NodeId> {
    let mut current = parent;
    for segment in path.split('.') {
        current = Some(tree.find_child(current, &unescape_identifier(segment))?);
    }
    current
}

/// Attach the entries of `table` to `target` (`None` is the root).
/// With a `prefix`, names are qualified and containers are not resolved.
fn attach_entries(
    tree: &mut ProtocolTree<'_>,
    target: Option<NodeId>,
    prefix: Option<String>,
    table: &AttributeTable,
) {
    for entry in &table.attributes {
        let qualified = match &prefix {
            Some(p) => format!("{p}.{}", entry.name),
            None => entry.name.clone(),
        };

        match &entry.value {
            DasValue::Values { dap_type, values } => {
                if let Some(attribute) = make_attribute(&qualified, *dap_type, values) {
                    add_attribute(tree, target, attribute);
                }
            }
            DasValue::Container(inner) => {
                let matched = match &prefix {
                    Some(_) => None,
                    None => resolve_nested(tree, target, &entry.name),
                };
                match matched {
                    Some(id) => attach_entries(tree, Some(id), None, inner),
                    None => attach_entries(tree, target, Some(qualified), inner),
                }
            }
        }
    }
}

fn add_attribute(tree: &mut ProtocolTree<'_>, target: Option<NodeId>, attribute: Attribute) {
    match target {
        Some(id) => tree.node_mut(id).set_attribute(attribute),
        None => match tree.attributes.iter_mut().find(|a| a.name == attribute.name) {
            Some(existing) => *existing = attribute,
            None => tree.attributes.push(attribute),
        },
    }
}

/// Typed attribute from DAS tokens, or `None` when a numeric token fails
/// to parse.
pub fn make_attribute(name: &str, dap_type: DapType, values: &[String]) -> Option<Attribute> {
    if !dap_type.is_numeric() {
        let strings = values.iter().map(|v| strip_quotes(v).to_string()).collect();
        return Some(Attribute::new(name, AttrValue::Strings(strings)));
    }

    let mut parsed = Vec::with_capacity(values.len());
    for token in values {
        match strip_quotes(token).trim().parse::<f64>() {
            Ok(v) => parsed.push(v),
            Err(e) => {
                warn!(
                    attribute = name,
                    token = %token,
                    error = %e,
                    "Dropping attribute with unparseable numeric value"
                );
                return None;
            }
        }
    }

    Some(Attribute::new(
        name,
        AttrValue::Numbers {
            data_type: cdm_type_of(dap_type),
            unsigned: dap_type.is_unsigned(),
            values: parsed,
        },
    ))
}

/// Remove one level of surrounding double quotes.
pub fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn first_value(entry: &DasAttribute) -> Option<&str> {
    match &entry.value {
        DasValue::Values { values, .. } => values.first().map(|v| strip_quotes(v)),
        DasValue::Container(_) => None,
    }
}

fn read_extra_table(tree: &mut ProtocolTree<'_>, table: &AttributeTable) {
    for entry in &table.attributes {
        if entry.name == UNLIMITED_DIMENSION {
            if let Some(dim) = first_value(entry) {
                debug!(dimension = dim, "Unlimited dimension");
                tree.unlimited_dimension = Some(dim.to_string());
            }
        } else {
            warn!(attribute = %entry.name, table = %table.name, "Unknown extra attribute");
        }
    }
}

fn read_extra_dimensions(tree: &mut ProtocolTree<'_>, table: &AttributeTable) {
    for entry in &table.attributes {
        let length = first_value(entry)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0);
        match length {
            Some(len) => tree
                .extra_dimensions
                .push(ArrayDimension::named(&entry.name, len as usize)),
            None => warn!(dimension = %entry.name, "Extra dimension without a usable length"),
        }
    }
}

/// Replace `_CoordinateAxes` with the union of itself and `coordinates`
/// on every node carrying both.
pub fn merge_coordinate_axes(tree: &mut ProtocolTree<'_>) {
    let ids: Vec<NodeId> = tree.ids().collect();
    for id in ids {
        let node = tree.node(id);
        let (Some(coords), Some(axes)) = (
            node.attribute(COORDINATES).and_then(Attribute::string_value),
            node.attribute(COORDINATE_AXES).and_then(Attribute::string_value),
        ) else {
            continue;
        };
        let merged = combine_axes(coords, axes);
        tree.node_mut(id)
            .set_attribute(Attribute::string(COORDINATE_AXES, merged));
    }
}

/// Whitespace-split union of two axis lists, first-seen order.
pub fn combine_axes(first: &str, second: &str) -> String {
    let mut combined: Vec<&str> = Vec::new();
    for axis in first.split_whitespace().chain(second.split_whitespace()) {
        if !combined.contains(&axis) {
            combined.push(axis);
        }
    }
    combined.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"degrees\""), "degrees");
        assert_eq!(strip_quotes("\"\"x\"\""), "\"x\"");
        assert_eq!(strip_quotes("plain"), "plain");
        assert_eq!(strip_quotes("\"open"), "\"open");
    }

    #[test]
    fn test_combine_axes() {
        assert_eq!(combine_axes("lat lon", "time  lat"), "lat lon time");
        assert_eq!(combine_axes("", " x "), "x");
    }

    #[test]
    fn test_numeric_attribute_parse_failure_drops() {
        let values = vec!["1.5".to_string(), "abc".to_string()];
        assert!(make_attribute("scale", DapType::Float32, &values).is_none());
    }

    #[test]
    fn test_numeric_attribute_typed() {
        let values = vec!["7".to_string()];
        let att = make_attribute("flag", DapType::UInt16, &values).unwrap();
        assert_eq!(
            att.value,
            AttrValue::Numbers {
                data_type: cdm_array::DataType::Short,
                unsigned: true,
                values: vec![7.0],
            }
        );
    }
}
