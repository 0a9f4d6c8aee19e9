//! DAP2 object graphs shared between the protocol client and the CDM converter.
//!
//! The protocol client parses wire bytes into the types in this crate:
//!
//! - [`BaseType`] trees for the DDS (declarations only) and the DataDDS
//!   (declarations plus values)
//! - [`Das`] attribute tables
//!
//! Nothing here performs I/O or conversion; the graphs are plain data.

pub mod das;
pub mod escape;
pub mod types;

pub use das::{AttributeTable, Das, DasAttribute, DasValue};
pub use escape::{escape_identifier, short_name, unescape_identifier};
pub use types::{
    ArrayDimension, BaseType, DArray, DGrid, DSequence, DStructure, DapType, DapValue,
    PrimitiveVector, VectorStorage,
};
