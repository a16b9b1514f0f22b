use strata_model::{Fragment, ModelError, Node, NodeRange, Slice};

use super::{check_range, collect};
use crate::error::{StepError, TransformError};
use crate::step::{ReplaceAroundStep, ReplaceStep, Step};
use crate::transform::Transform;

/// The depth the content of `range` can be lifted to, cutting through the
/// ancestors in between. `None` when no ancestor accepts the content or an
/// ancestor cannot be cut.
pub fn lift_target(range: &NodeRange) -> Option<usize> {
    let content = range
        .parent()
        .content()
        .cut_by_index(range.start_index(), range.end_index());
    let mut depth = range.depth();
    loop {
        let node = range.from().node(depth);
        let index = range.from().index(depth);
        let end_index = range.to().index_after(depth);
        if depth < range.depth() && node.can_replace(index, end_index, &content) {
            return Some(depth);
        }
        if depth == 0 || !can_cut(node, index, end_index) {
            return None;
        }
        depth -= 1;
    }
}

/// Both parts left over when `start..end` is cut out of `node` stay valid.
fn can_cut(node: &Node, start: usize, end: usize) -> bool {
    (start == 0 || node.can_replace(start, node.child_count(), &Fragment::empty()))
        && (end == node.child_count() || node.can_replace(0, end, &Fragment::empty()))
}

fn is_list(node: &Node) -> bool {
    match node.node_type().allowed_children().as_slice() {
        [item] => !item.is_inline() && !item.is_leaf() && !item.is_textblock(),
        _ => false,
    }
}

/// Move the blocks between `from` and `to` out of their parent, splitting
/// the parent (and any ancestors cut through) around them. Items of a list
/// that cannot be lifted one by one are merged and lifted out of the list
/// together.
pub fn lift(doc: &Node, from: usize, to: usize) -> Result<Vec<Step>, TransformError> {
    check_range(from, to)?;
    Ok(collect(doc, "lift", |tr| {
        let rfrom = tr.doc().resolve(from)?;
        let rto = tr.doc().resolve(to)?;
        let Some(range) = rfrom.block_range(&rto) else {
            return Ok(());
        };
        if let Some(target) = lift_target(&range) {
            tr.step(lift_step(&range, target)?.into())?;
        } else if let Some(items) = rfrom.block_range_where(&rto, is_list) {
            lift_out_of_list(tr, &items)?;
        }
        Ok(())
    }))
}

fn lift_step(range: &NodeRange, target: usize) -> Result<ReplaceAroundStep, ModelError> {
    let (rfrom, rto, depth) = (range.from(), range.to(), range.depth());
    let gap_start = rfrom.before(depth + 1)?;
    let gap_end = rto.after(depth + 1)?;

    let mut start = gap_start;
    let mut before = Fragment::empty();
    let mut open_start = 0;
    let mut splitting = false;
    for d in (target + 1..=depth).rev() {
        if splitting || rfrom.index(d) > 0 {
            splitting = true;
            before = Fragment::from_node(rfrom.node(d).copy(before));
            open_start += 1;
        } else {
            start -= 1;
        }
    }

    let mut end = gap_end;
    let mut after = Fragment::empty();
    let mut open_end = 0;
    splitting = false;
    for d in (target + 1..=depth).rev() {
        if splitting || rto.after(d + 1)? < rto.end(d) {
            splitting = true;
            after = Fragment::from_node(rto.node(d).copy(after));
            open_end += 1;
        } else {
            end += 1;
        }
    }

    let insert = before.size() - open_start;
    Ok(ReplaceAroundStep::new(
        start,
        end,
        gap_start,
        gap_end,
        Slice::new(before.append(&after), open_start, open_end),
        insert,
        true,
    ))
}

/// Merge the list items in `range` into one item and replace the list around
/// it by the item's content, splitting the list where items remain.
fn lift_out_of_list(tr: &mut Transform, range: &NodeRange) -> Result<(), StepError> {
    let list = range.parent().clone();
    let Some(outer) = range.depth().checked_sub(1) else {
        return Ok(());
    };
    let at_start = range.start_index() == 0;
    let at_end = range.end_index() == list.child_count();
    let Some(items) = (range.start_index()..range.end_index())
        .map(|i| list.maybe_child(i).cloned())
        .collect::<Option<Vec<Node>>>()
    else {
        return Ok(());
    };
    let merged = items
        .iter()
        .fold(Fragment::empty(), |content, item| content.append(item.content()));
    let parent = range.from().node(outer);
    let index = range.from().index(outer);
    let lifted = if at_end {
        merged.clone()
    } else {
        merged.add_to_end(list.clone())
    };
    if !parent.can_replace(index + usize::from(!at_start), index + 1, &lifted) {
        return Ok(());
    }

    let mut pos = range.end();
    for item in items.iter().skip(1).rev() {
        pos -= item.node_size();
        tr.step(ReplaceStep::structural(pos - 1, pos + 1, Slice::empty()).into())?;
    }

    let start = range.start();
    let end = start + merged.size() + 2;
    let shell = || Fragment::from_node(list.copy(Fragment::empty()));
    let before = if at_start { Fragment::empty() } else { shell() };
    let after = if at_end { Fragment::empty() } else { shell() };
    let slice = Slice::new(
        before.append(&after),
        usize::from(!at_start),
        usize::from(!at_end),
    );
    tr.step(
        ReplaceAroundStep::new(
            start - usize::from(at_start),
            end + usize::from(at_end),
            start + 1,
            end - 1,
            slice,
            usize::from(!at_start),
            true,
        )
        .into(),
    )?;
    Ok(())
}

impl Transform {
    pub fn lift(&mut self, from: usize, to: usize) -> Result<&mut Self, TransformError> {
        let steps = lift(self.doc(), from, to)?;
        Ok(self.apply_built(steps))
    }
}
