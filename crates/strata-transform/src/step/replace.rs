use strata_model::{Node, Slice};

use super::content_between;
use crate::error::StepError;
use crate::map::{Assoc, MapRange, Mappable, StepMap};

/// Replace `from..to` with a slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceStep {
    pub from: usize,
    pub to: usize,
    pub slice: Slice,
    /// Only node boundaries may be removed; fail rather than overwrite
    /// content that appeared in the range since the step was built.
    pub structure: bool,
}

impl ReplaceStep {
    pub fn new(from: usize, to: usize, slice: Slice) -> Self {
        Self {
            from,
            to,
            slice,
            structure: false,
        }
    }

    pub fn structural(from: usize, to: usize, slice: Slice) -> Self {
        Self {
            structure: true,
            ..Self::new(from, to, slice)
        }
    }

    pub(super) fn apply(&self, doc: &Node) -> Result<Node, StepError> {
        if self.structure && content_between(doc, self.from, self.to)? {
            return Err(StepError::StructureOverwrite);
        }
        Ok(doc.replace(self.from, self.to, &self.slice)?)
    }

    pub(super) fn get_map(&self) -> StepMap {
        StepMap::replace(self.from, self.to, self.slice.size())
    }

    pub(super) fn invert(&self, displaced: &Slice) -> ReplaceStep {
        ReplaceStep {
            from: self.from,
            to: self.from + self.slice.size(),
            slice: displaced.clone(),
            structure: self.structure,
        }
    }

    pub(super) fn map(&self, mapping: &impl Mappable) -> Option<ReplaceStep> {
        let from = mapping.map_result(self.from, Assoc::After);
        let to = mapping.map_result(self.to, Assoc::Before);
        if from.deleted_across() && to.deleted_across() {
            return None;
        }
        Some(ReplaceStep {
            from: from.pos,
            to: from.pos.max(to.pos),
            slice: self.slice.clone(),
            structure: self.structure,
        })
    }
}

/// Replace `from..to` with a slice while keeping the content of
/// `gap_from..gap_to`, which is moved into the slice at offset `insert`.
///
/// Wrapping, lifting and retyping blocks use this so positions inside the
/// moved content keep mapping one to one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceAroundStep {
    pub from: usize,
    pub to: usize,
    pub gap_from: usize,
    pub gap_to: usize,
    pub slice: Slice,
    pub insert: usize,
    pub structure: bool,
}

impl ReplaceAroundStep {
    pub fn new(
        from: usize,
        to: usize,
        gap_from: usize,
        gap_to: usize,
        slice: Slice,
        insert: usize,
        structure: bool,
    ) -> Self {
        Self {
            from,
            to,
            gap_from,
            gap_to,
            slice,
            insert,
            structure,
        }
    }

    pub(super) fn apply(&self, doc: &Node) -> Result<Node, StepError> {
        if self.structure
            && (content_between(doc, self.from, self.gap_from)?
                || content_between(doc, self.gap_to, self.to)?)
        {
            return Err(StepError::StructureOverwrite);
        }
        let gap = doc.slice(self.gap_from, self.gap_to)?;
        if gap.open_start > 0 || gap.open_end > 0 {
            return Err(StepError::GapNotFlat);
        }
        let inserted = self
            .slice
            .insert_at(self.insert, &gap.content)
            .ok_or(StepError::GapDoesNotFit)?;
        Ok(doc.replace(self.from, self.to, &inserted)?)
    }

    pub(super) fn get_map(&self) -> StepMap {
        StepMap::new(vec![
            MapRange {
                start: self.from,
                old_size: self.gap_from - self.from,
                new_size: self.insert,
            },
            MapRange {
                start: self.gap_to,
                old_size: self.to - self.gap_to,
                new_size: self.slice.size() - self.insert,
            },
        ])
    }

    pub(super) fn invert(&self, displaced: &Slice) -> Result<ReplaceAroundStep, StepError> {
        let gap = self.gap_to - self.gap_from;
        let slice = displaced.remove_between(self.gap_from - self.from, self.gap_to - self.from)?;
        Ok(ReplaceAroundStep {
            from: self.from,
            to: self.from + self.slice.size() + gap,
            gap_from: self.from + self.insert,
            gap_to: self.from + self.insert + gap,
            slice,
            insert: self.gap_from - self.from,
            structure: self.structure,
        })
    }

    pub(super) fn map(&self, mapping: &impl Mappable) -> Option<ReplaceAroundStep> {
        let from = mapping.map_result(self.from, Assoc::After);
        let to = mapping.map_result(self.to, Assoc::Before);
        let gap_from = if self.from == self.gap_from {
            from.pos
        } else {
            mapping.map(self.gap_from, Assoc::Before)
        };
        let gap_to = if self.to == self.gap_to {
            to.pos
        } else {
            mapping.map(self.gap_to, Assoc::After)
        };
        if (from.deleted_across() && to.deleted_across()) || gap_from < from.pos || gap_to > to.pos {
            return None;
        }
        Some(ReplaceAroundStep {
            from: from.pos,
            to: to.pos,
            gap_from,
            gap_to,
            slice: self.slice.clone(),
            insert: self.insert,
            structure: self.structure,
        })
    }
}
