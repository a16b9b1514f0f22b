use strata_model::{Fragment, ModelError, Node, NodeRange, NodeType, Slice};

use super::{Markup, can_join, check_range, collect};
use crate::error::TransformError;
use crate::step::{ReplaceAroundStep, ReplaceStep, Step};
use crate::transform::Transform;

/// The node types needed to wrap a range of blocks in a given type.
#[derive(Debug, Clone, PartialEq)]
pub struct Wrapping {
    /// Wrappers needed around the new node so the range's parent accepts it,
    /// outermost first.
    pub around: Vec<NodeType>,
    /// Wrappers each wrapped block needs so the new node accepts it,
    /// outermost first.
    pub inner: Vec<NodeType>,
}

/// How the blocks in `range` can be wrapped in a node of `node_type`, or
/// `None` when they cannot.
pub fn find_wrapping(range: &NodeRange, node_type: &NodeType) -> Option<Wrapping> {
    let parent = range.parent();
    let schema = node_type.schema();
    let around = schema.find_wrapping(parent.node_type(), node_type)?;
    let first = parent.maybe_child(range.start_index())?;
    let inner = schema.find_wrapping(node_type, first.node_type())?;
    let innermost = inner.last().unwrap_or(node_type);
    let fits = (range.start_index()..range.end_index()).all(|i| {
        parent
            .maybe_child(i)
            .is_some_and(|child| innermost.allows_child(child.node_type()))
    });
    fits.then_some(Wrapping { around, inner })
}

fn fresh(types: &[NodeType]) -> Result<Vec<Node>, ModelError> {
    types
        .iter()
        .map(|t| t.create(None, Fragment::empty(), Default::default()))
        .collect()
}

/// Nest fresh nodes of `types` into each other, outermost first.
fn nest(types: &[Node]) -> Fragment {
    types
        .iter()
        .rev()
        .fold(Fragment::empty(), |content, node| Fragment::from_node(node.copy(content)))
}

/// Wrap the blocks between `from` and `to` in a new node described by
/// `markup`.
///
/// Wrappers the schema requires are added around the new node and around
/// each wrapped block; wrapping paragraphs in a list puts every paragraph
/// in its own list item. A wrapper landing next to a sibling of the same
/// type is joined with it.
pub fn wrap(doc: &Node, from: usize, to: usize, markup: &Markup) -> Result<Vec<Step>, TransformError> {
    check_range(from, to)?;
    Ok(collect(doc, "wrap", |tr| {
        let rfrom = tr.doc().resolve(from)?;
        let rto = tr.doc().resolve(to)?;
        let Some(range) = rfrom.block_range(&rto) else {
            return Ok(());
        };
        let Some(wrapping) = find_wrapping(&range, &markup.node_type) else {
            return Ok(());
        };
        let parent = range.parent();
        let mut boundaries = Vec::new();
        let mut pos = range.start();
        for i in range.start_index()..range.end_index() {
            let Some(block) = parent.maybe_child(i) else {
                return Ok(());
            };
            if i > range.start_index() {
                boundaries.push(pos);
            }
            pos += block.node_size();
        }

        // The whole range goes into a single innermost wrapper first, so
        // every intermediate document stays valid.
        let inner = fresh(&wrapping.inner)?;
        let mut wrappers = fresh(&wrapping.around)?;
        wrappers.push(markup.create(Fragment::empty())?);
        wrappers.extend(inner.iter().cloned());
        let depth = wrappers.len();
        let (start, end) = (range.start(), range.end());
        tr.step(
            ReplaceAroundStep::new(
                start,
                end,
                start,
                end,
                Slice::closed(nest(&wrappers)),
                depth,
                true,
            )
            .into(),
        )?;

        // Then the inner wrappers are split between neighbouring blocks,
        // last boundary first so earlier positions stay put.
        let mut grown = 0;
        if !inner.is_empty() {
            let split = Slice::new(nest(&inner).append(&nest(&inner)), inner.len(), inner.len());
            for boundary in boundaries.into_iter().rev() {
                let at = boundary + depth;
                tr.step(ReplaceStep::structural(at, at, split.clone()).into())?;
                grown += 2 * inner.len();
            }
        }

        if wrapping.around.is_empty() {
            let after = end + 2 * depth + grown;
            if can_join(tr.doc(), after) {
                tr.step(ReplaceStep::structural(after - 1, after + 1, Slice::empty()).into())?;
            }
            if can_join(tr.doc(), start) {
                tr.step(ReplaceStep::structural(start - 1, start + 1, Slice::empty()).into())?;
            }
        }
        Ok(())
    }))
}

impl Transform {
    pub fn wrap(&mut self, from: usize, to: usize, markup: &Markup) -> Result<&mut Self, TransformError> {
        let steps = wrap(self.doc(), from, to, markup)?;
        Ok(self.apply_built(steps))
    }
}
