//! DAP2 to CDM conversion.
//!
//! Turns the object graphs a DAP2 client hands over into CDM arrays:
//!
//! 1. [`build_declarations`] / [`build_values`] walk a DDS or DataDDS into
//!    a [`ProtocolTree`], unwrapping arrays, collapsing top-level grids and
//!    numbering nodes in depth-first post-order.
//! 2. [`attach_attributes`] binds DAS tables onto the tree.
//! 3. [`Converter`] materializes nodes into [`cdm_array::CdmArray`]s,
//!    widening unsigned types and filling structure and sequence records.
//!
//! [`read_variable`] and [`read_variables`] wrap these steps for the
//! variable layer and report failures as `std::io::Error`.

pub mod attributes;
pub mod builder;
pub mod config;
pub mod constraint;
pub mod correlate;
pub mod error;
pub mod flatten;
pub mod materialize;
pub mod node;
pub mod reader;
pub mod shape;

pub use attributes::{attach_attributes, combine_axes, Placement};
pub use builder::{assign_sequence_numbers, build_declarations, build_values};
pub use config::ConvertConfig;
pub use constraint::{projection, section_shape, selector, variable_constraint, Range};
pub use correlate::{correlate, Correlation};
pub use error::{ConvertError, ConvertResult};
pub use flatten::resolve_flattened;
pub use materialize::{Converter, Cursor};
pub use node::{
    cdm_type_of, ElementKind, NodeId, NodeKind, PrimitiveType, ProtocolNode, ProtocolTree,
};
pub use reader::{read_variable, read_variables, ReadRequest};
pub use shape::{shape_all, shape_own};
