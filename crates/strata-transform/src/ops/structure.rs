use strata_model::{Fragment, Node, Slice};

use super::{Markup, collect};
use crate::error::TransformError;
use crate::step::{ReplaceStep, Step};
use crate::transform::Transform;

/// Can the node at `pos` be split, along with `depth - 1` of its ancestors?
/// With `type_after` the innermost node after the split gets that type.
pub fn can_split(doc: &Node, pos: usize, depth: usize, type_after: Option<&Markup>) -> bool {
    let Ok(rpos) = doc.resolve(pos) else {
        return false;
    };
    let Some(base) = rpos.depth().checked_sub(depth) else {
        return false;
    };
    if depth == 0 {
        return false;
    }
    let parent = rpos.parent();
    let offset = rpos.parent_offset();
    let inner_type = type_after.map_or(parent.node_type(), |markup| &markup.node_type);
    if !parent
        .node_type()
        .valid_content(&parent.content().cut(0, offset))
        || !inner_type.valid_content(&parent.content().cut(offset, parent.content_size()))
    {
        return false;
    }
    for d in (base + 1..rpos.depth()).rev() {
        let node = rpos.node(d);
        let index = rpos.index(d);
        let mut rest = node.content().cut_by_index(index, node.child_count());
        if let (Some(markup), true) = (type_after, d + 1 == rpos.depth()) {
            match markup.create(Fragment::empty()) {
                Ok(child) => rest = rest.replace_child(0, child),
                Err(_) => return false,
            }
        }
        if !node.can_replace(index + 1, node.child_count(), &Fragment::empty())
            || !node.node_type().valid_content(&rest)
        {
            return false;
        }
    }
    let after_type = match type_after {
        Some(markup) if depth == 1 => &markup.node_type,
        _ => rpos.node(base + 1).node_type(),
    };
    rpos.node(base).node_type().allows_child(after_type)
}

/// Split the node at `pos`, and `depth - 1` of its ancestors, in two.
pub fn split(
    doc: &Node,
    pos: usize,
    depth: usize,
    type_after: Option<&Markup>,
) -> Result<Vec<Step>, TransformError> {
    if depth == 0 {
        return Err(TransformError::invalid("split depth must be at least 1"));
    }
    Ok(collect(doc, "split", |tr| {
        if !can_split(tr.doc(), pos, depth, type_after) {
            return Ok(());
        }
        let rpos = tr.doc().resolve(pos)?;
        let mut before = Fragment::empty();
        let mut after = Fragment::empty();
        for d in (rpos.depth() - depth + 1..=rpos.depth()).rev() {
            before = Fragment::from_node(rpos.node(d).copy(before));
            let next = match type_after {
                Some(markup) if d == rpos.depth() => markup.create(after)?,
                _ => rpos.node(d).copy(after),
            };
            after = Fragment::from_node(next);
        }
        let slice = Slice::new(before.append(&after), depth, depth);
        tr.step(ReplaceStep::structural(pos, pos, slice).into())?;
        Ok(())
    }))
}

fn joinable(before: &Node, after: &Node) -> bool {
    !before.is_leaf()
        && before.node_type() == after.node_type()
        && before
            .node_type()
            .valid_content(&before.content().append(after.content()))
}

/// Are the nodes directly before and after `pos` siblings that can be
/// merged into one?
pub fn can_join(doc: &Node, pos: usize) -> bool {
    let Ok(rpos) = doc.resolve(pos) else {
        return false;
    };
    match (rpos.node_before(), rpos.node_after()) {
        (Some(before), Some(after)) => joinable(&before, &after),
        _ => false,
    }
}

/// The position where a join at `pos` would happen. A position at the very
/// start or end of its parent moves out to the parent's boundary first.
pub fn join_point(doc: &Node, pos: usize) -> Option<usize> {
    let mut pos = pos;
    loop {
        let rpos = doc.resolve(pos).ok()?;
        let depth = rpos.depth();
        pos = match (rpos.node_before(), rpos.node_after()) {
            (Some(_), Some(_)) => return can_join(doc, pos).then_some(pos),
            (None, _) if depth > 0 => rpos.before(depth).ok()?,
            (_, None) if depth > 0 => rpos.after(depth).ok()?,
            _ => return None,
        };
    }
}

/// Merge the siblings meeting at `pos` (see [`join_point`]).
pub fn join(doc: &Node, pos: usize) -> Result<Vec<Step>, TransformError> {
    Ok(collect(doc, "join", |tr| {
        if let Some(point) = join_point(tr.doc(), pos) {
            tr.step(ReplaceStep::structural(point - 1, point + 1, Slice::empty()).into())?;
        }
        Ok(())
    }))
}

impl Transform {
    pub fn split(
        &mut self,
        pos: usize,
        depth: usize,
        type_after: Option<&Markup>,
    ) -> Result<&mut Self, TransformError> {
        let steps = split(self.doc(), pos, depth, type_after)?;
        Ok(self.apply_built(steps))
    }

    pub fn join(&mut self, pos: usize) -> Result<&mut Self, TransformError> {
        let steps = join(self.doc(), pos)?;
        Ok(self.apply_built(steps))
    }
}
