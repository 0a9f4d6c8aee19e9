//! CDM array model.
//!
//! The converter's output: immutable, typed, shaped arrays. Primitive data
//! is reference counted, so an array built from wire storage shares that
//! storage. Structure-typed arrays expose their members as named sub-arrays
//! holding every record, and nested sequences keep per-row lengths.

pub mod array;
pub mod attribute;
pub mod data_type;
pub mod error;
pub mod index;
pub mod sequence;
pub mod structure;
pub mod variable;

pub use array::{ArrayData, CdmArray, Element};
pub use attribute::{AttrValue, Attribute};
pub use data_type::DataType;
pub use error::{CdmError, CdmResult};
pub use index::Index;
pub use sequence::ArraySequenceNested;
pub use structure::{ArrayStructure, Member, StructureData, StructureMembers};
pub use variable::Variable;
