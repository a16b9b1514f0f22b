//! Atomic, invertible document edits.

mod replace;
mod style;

pub use replace::{ReplaceAroundStep, ReplaceStep};
pub use style::{AddStyleStep, RemoveStyleStep};

use strata_model::{Node, Slice};

use crate::error::StepError;
use crate::map::{Mappable, StepMap};

/// The result of applying a step: the new document, how positions moved,
/// and the content the step displaced (kept so the step can be inverted).
#[derive(Debug, Clone)]
pub struct StepOutput {
    pub doc: Node,
    pub map: StepMap,
    pub displaced: Slice,
}

/// A single edit. Every step is a range replace at heart; the variants exist
/// so that position mapping and inversion stay precise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Replace(ReplaceStep),
    ReplaceAround(ReplaceAroundStep),
    AddStyle(AddStyleStep),
    RemoveStyle(RemoveStyleStep),
}

impl Step {
    pub fn apply(&self, doc: &Node) -> Result<StepOutput, StepError> {
        self.check_range()?;
        let new_doc = match self {
            Step::Replace(step) => step.apply(doc)?,
            Step::ReplaceAround(step) => step.apply(doc)?,
            Step::AddStyle(step) => step.apply(doc)?,
            Step::RemoveStyle(step) => step.apply(doc)?,
        };
        let (from, to) = self.range();
        Ok(StepOutput {
            doc: new_doc,
            map: self.get_map(),
            displaced: doc.slice(from, to)?,
        })
    }

    /// The position map this step produces.
    pub fn get_map(&self) -> StepMap {
        match self {
            Step::Replace(step) => step.get_map(),
            Step::ReplaceAround(step) => step.get_map(),
            Step::AddStyle(_) | Step::RemoveStyle(_) => StepMap::identity(),
        }
    }

    /// The step that undoes this one, given the slice it displaced when it
    /// was applied.
    pub fn invert(&self, displaced: &Slice) -> Result<Step, StepError> {
        Ok(match self {
            Step::Replace(step) => Step::Replace(step.invert(displaced)),
            Step::ReplaceAround(step) => Step::ReplaceAround(step.invert(displaced)?),
            Step::AddStyle(step) => Step::RemoveStyle(step.invert()),
            Step::RemoveStyle(step) => Step::AddStyle(step.invert()),
        })
    }

    /// Rebase this step over other changes. `None` when the content it
    /// applied to was deleted.
    pub fn map(&self, mapping: &impl Mappable) -> Option<Step> {
        match self {
            Step::Replace(step) => step.map(mapping).map(Step::Replace),
            Step::ReplaceAround(step) => step.map(mapping).map(Step::ReplaceAround),
            Step::AddStyle(step) => step.map(mapping).map(Step::AddStyle),
            Step::RemoveStyle(step) => step.map(mapping).map(Step::RemoveStyle),
        }
    }

    /// Reject positions that are out of order before anything is sliced or
    /// mapped.
    fn check_range(&self) -> Result<(), StepError> {
        let (from, to) = self.range();
        if from > to {
            return Err(StepError::InvalidRange { from, to });
        }
        if let Step::ReplaceAround(step) = self {
            if step.gap_from < from || step.gap_from > step.gap_to || step.gap_to > to {
                return Err(StepError::GapOutOfRange {
                    gap_from: step.gap_from,
                    gap_to: step.gap_to,
                });
            }
        }
        Ok(())
    }

    /// The document range the step touches.
    pub fn range(&self) -> (usize, usize) {
        match self {
            Step::Replace(step) => (step.from, step.to),
            Step::ReplaceAround(step) => (step.from, step.to),
            Step::AddStyle(step) => (step.from, step.to),
            Step::RemoveStyle(step) => (step.from, step.to),
        }
    }
}

impl From<ReplaceStep> for Step {
    fn from(step: ReplaceStep) -> Self {
        Step::Replace(step)
    }
}

impl From<ReplaceAroundStep> for Step {
    fn from(step: ReplaceAroundStep) -> Self {
        Step::ReplaceAround(step)
    }
}

impl From<AddStyleStep> for Step {
    fn from(step: AddStyleStep) -> Self {
        Step::AddStyle(step)
    }
}

impl From<RemoveStyleStep> for Step {
    fn from(step: RemoveStyleStep) -> Self {
        Step::RemoveStyle(step)
    }
}

/// Does `from..to` contain anything besides node boundaries that could be
/// closed and reopened?
pub(crate) fn content_between(doc: &Node, from: usize, to: usize) -> Result<bool, StepError> {
    let rfrom = doc.resolve(from)?;
    let mut dist = to - from;
    let mut depth = rfrom.depth();
    while dist > 0 && depth > 0 && rfrom.index_after(depth) == rfrom.node(depth).child_count() {
        depth -= 1;
        dist -= 1;
    }
    if dist > 0 {
        let mut next = rfrom
            .node(depth)
            .maybe_child(rfrom.index_after(depth))
            .cloned();
        while dist > 0 {
            match next {
                Some(node) if !node.is_leaf() => {
                    next = node.first_child().cloned();
                    dist -= 1;
                }
                _ => return Ok(true),
            }
        }
    }
    Ok(false)
}
