//! Operation builders.
//!
//! Every operation comes in two forms: a free function that computes the
//! steps against a document without applying them, and a [`Transform`]
//! method that applies those steps. Builders only produce steps that apply
//! cleanly; when an operation makes no sense at the given positions (nothing
//! to lift, no valid wrapping, types that cannot be joined) the step list is
//! empty. Malformed arguments are reported as
//! [`TransformError::InvalidArgument`].

mod block_type;
mod delete;
mod insert;
mod lift;
mod structure;
mod style;
mod wrap;

pub use block_type::set_block_type;
pub use delete::del;
pub use insert::{insert, insert_text, replace, replace_with};
pub use lift::{lift, lift_target};
pub use structure::{can_join, can_split, join, join_point, split};
pub use style::{add_style, remove_style};
pub use wrap::{Wrapping, find_wrapping, wrap};

use strata_model::{Attrs, Fragment, ModelError, Node, NodeType, Schema};

use crate::error::{StepError, TransformError};
use crate::step::Step;
use crate::transform::Transform;

/// A node type together with the attributes new nodes of that type get.
/// Describes the target of [`wrap`], [`set_block_type`] and [`split`].
#[derive(Debug, Clone, PartialEq)]
pub struct Markup {
    pub node_type: NodeType,
    pub attrs: Attrs,
}

impl Markup {
    pub fn new(node_type: NodeType, attrs: Option<&Attrs>) -> Result<Self, ModelError> {
        let attrs = node_type.compute_attrs(attrs)?;
        Ok(Self { node_type, attrs })
    }

    /// Look the type up by name.
    pub fn named(schema: &Schema, name: &str, attrs: Option<&Attrs>) -> Result<Self, ModelError> {
        let node_type = schema
            .node_type(name)
            .ok_or_else(|| ModelError::UnknownNodeType(name.to_string()))?;
        Self::new(node_type, attrs)
    }

    pub(crate) fn create(&self, content: Fragment) -> Result<Node, ModelError> {
        self.node_type
            .create(Some(&self.attrs), content, Default::default())
    }
}

/// Run `build` against a scratch transform of `doc` and return the steps it
/// applied. A failure anywhere discards the whole operation.
pub(crate) fn collect(
    doc: &Node,
    op: &str,
    build: impl FnOnce(&mut Transform) -> Result<(), StepError>,
) -> Vec<Step> {
    let mut tr = Transform::new(doc.clone());
    match build(&mut tr) {
        Ok(()) => {
            if !tr.doc_changed() {
                log::debug!("{op}: nothing to do");
            }
            tr.into_steps()
        }
        Err(err) => {
            log::debug!("{op}: not applicable: {err}");
            Vec::new()
        }
    }
}

pub(crate) fn check_range(from: usize, to: usize) -> Result<(), TransformError> {
    if from > to {
        return Err(TransformError::invalid(format!(
            "range start {from} is after its end {to}"
        )));
    }
    Ok(())
}

impl Transform {
    /// Apply steps computed by a builder against the current document.
    pub(crate) fn apply_built(&mut self, steps: Vec<Step>) -> &mut Self {
        for step in steps {
            self.maybe_step(step);
        }
        self
    }
}
