use strata_model::{Fragment, Node, NodeType, Slice};

use super::{Markup, check_range, collect};
use crate::error::{StepError, TransformError};
use crate::map::{Assoc, Mappable};
use crate::step::{RemoveStyleStep, ReplaceAroundStep, ReplaceStep, Step};
use crate::transform::Transform;

/// Change every textblock between `from` and `to` to the type and
/// attributes in `markup`. Inline content the new type does not allow is
/// removed first, as are styles it does not allow.
pub fn set_block_type(
    doc: &Node,
    from: usize,
    to: usize,
    markup: &Markup,
) -> Result<Vec<Step>, TransformError> {
    check_range(from, to)?;
    if !markup.node_type.is_textblock() {
        return Err(TransformError::invalid(format!(
            "{} is not a textblock type",
            markup.node_type.name()
        )));
    }
    Ok(collect(doc, "set_block_type", |tr| {
        let mut targets = Vec::new();
        tr.doc().nodes_between(from, to, |node, pos, parent, _| {
            if !node.is_textblock() {
                return true;
            }
            let allowed = parent.is_some_and(|p| p.node_type().allows_child(&markup.node_type));
            if allowed && !node.has_markup(&markup.node_type, Some(&markup.attrs), None) {
                targets.push((pos, node.node_size()));
            }
            false
        });
        for (pos, size) in targets {
            let start = tr.mapping().map(pos, Assoc::After);
            clear_incompatible(tr, start, &markup.node_type)?;
            let end = tr.mapping().map(pos + size, Assoc::After);
            let styles = tr
                .doc()
                .node_at(start)
                .map(|node| node.styles().clone())
                .unwrap_or_default();
            let node = markup
                .node_type
                .create(Some(&markup.attrs), Fragment::empty(), styles)?;
            tr.step(
                ReplaceAroundStep::new(
                    start,
                    end,
                    start + 1,
                    end - 1,
                    Slice::closed(Fragment::from_node(node)),
                    1,
                    true,
                )
                .into(),
            )?;
        }
        Ok(())
    }))
}

/// Strip the children of the node at `pos` that `node_type` would not
/// accept: disallowed styles are removed, disallowed nodes deleted.
fn clear_incompatible(tr: &mut Transform, pos: usize, node_type: &NodeType) -> Result<(), StepError> {
    let Some(node) = tr.doc().node_at(pos).cloned() else {
        return Ok(());
    };
    let mut deletions = Vec::new();
    let mut cur = pos + 1;
    for child in node.content() {
        let end = cur + child.node_size();
        if !node_type.allows_child(child.node_type()) {
            deletions.push((cur, end));
        } else {
            for style in child.styles() {
                if !node_type.allows_style(style.style_type()) {
                    tr.step(RemoveStyleStep::new(cur, end, style.clone()).into())?;
                }
            }
        }
        cur = end;
    }
    for (from, to) in deletions.into_iter().rev() {
        tr.step(ReplaceStep::new(from, to, Slice::empty()).into())?;
    }
    Ok(())
}

impl Transform {
    pub fn set_block_type(
        &mut self,
        from: usize,
        to: usize,
        markup: &Markup,
    ) -> Result<&mut Self, TransformError> {
        let steps = set_block_type(self.doc(), from, to, markup)?;
        Ok(self.apply_built(steps))
    }
}
