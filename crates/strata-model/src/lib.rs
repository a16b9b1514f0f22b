//! Persistent document model: schema-checked node trees, styles, slices and
//! position resolution.
//!
//! Documents are immutable. Every operation that changes a tree returns a new
//! tree sharing all untouched subtrees with the old one.

pub mod attrs;
pub mod build;
pub mod error;
pub mod fragment;
pub mod node;
mod replace;
pub mod resolve;
pub mod schema;
pub mod slice;
pub mod style;

pub use attrs::{AttrValue, Attrs, attrs};
pub use error::ModelError;
pub use fragment::Fragment;
pub use node::Node;
pub use resolve::{NodeRange, ResolvedPos};
pub use schema::{AttrSpec, NodeSpec, NodeType, Schema, SchemaSpec, StyleSpec, StyleType};
pub use slice::Slice;
pub use style::{Style, StyleSet};
