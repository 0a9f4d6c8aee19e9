//! Read entry points used by the variable layer.
//!
//! Conversion failures surface here as a single `std::io::Error` carrying
//! the variable name and the diagnostic.

use cdm_array::{CdmArray, Variable};
use std::collections::HashMap;
use std::io;
use tracing::{debug, error};

use crate::constraint::Range;
use crate::correlate::correlate;
use crate::error::ConvertError;
use crate::materialize::Converter;
use crate::node::{NodeId, ProtocolTree};

/// One variable to read from a data response.
#[derive(Debug, Clone)]
pub struct ReadRequest {
    pub variable: Variable,
    /// Node in the declarations tree.
    pub node: NodeId,
    pub section: Option<Vec<Range>>,
}

impl ReadRequest {
    pub fn new(variable: Variable, node: NodeId) -> Self {
        Self {
            variable,
            node,
            section: None,
        }
    }

    pub fn with_section(mut self, section: Vec<Range>) -> Self {
        self.section = Some(section);
        self
    }
}

/// Read `variable` from `node` of a value tree.
///
/// Structure members are read through their top-level variable and
/// flattened; everything else is converted directly.
pub fn read_variable(
    converter: &Converter,
    variable: &mut Variable,
    section: Option<&[Range]>,
    data: &ProtocolTree<'_>,
    node: NodeId,
) -> io::Result<CdmArray> {
    let result = if variable.is_member_of_structure() {
        let top = data.top_of(node);
        debug!(
            variable = %variable.full_name(),
            top = %data.node(top).name,
            "Reading structure member through top-level variable"
        );
        converter.convert_nested_variable(variable, data, top, true)
    } else {
        converter.convert_top_variable(variable, section, data, node)
    };
    result.map_err(|e| terminal_error(variable, e))
}

/// Read several variables from one data response, in request order.
///
/// Declaration nodes are matched against the value tree first; a request
/// with no matching data fails the whole read.
pub fn read_variables(
    converter: &Converter,
    decls: &ProtocolTree<'_>,
    data: &ProtocolTree<'_>,
    requests: &mut [ReadRequest],
) -> io::Result<Vec<CdmArray>> {
    let ids: Vec<NodeId> = requests.iter().map(|r| r.node).collect();
    let matches: HashMap<NodeId, NodeId> = correlate(decls, data, &ids)
        .into_iter()
        .filter_map(|c| c.value.map(|v| (c.decl, v)))
        .collect();

    requests
        .iter_mut()
        .map(|request| {
            let node = matches.get(&request.node).copied().ok_or_else(|| {
                terminal_error(
                    &request.variable,
                    ConvertError::not_found(format!(
                        "'{}' in data response",
                        decls.encoded_full_name(request.node)
                    )),
                )
            })?;
            read_variable(
                converter,
                &mut request.variable,
                request.section.as_deref(),
                data,
                node,
            )
        })
        .collect()
}

fn terminal_error(variable: &Variable, e: ConvertError) -> io::Error {
    error!(variable = %variable.full_name(), error = %e, "Conversion failed");
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("{}: {e}", variable.full_name()),
    )
}
