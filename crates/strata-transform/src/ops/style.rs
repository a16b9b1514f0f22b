use strata_model::{Node, Style};

use super::{check_range, collect};
use crate::error::TransformError;
use crate::step::{AddStyleStep, RemoveStyleStep, Step};
use crate::transform::Transform;

/// Add `style` to the inline content in `from..to`.
///
/// Content that already carries a different instance of the style's type
/// (a link with another target, say) first has that instance removed. Inline
/// content whose parent does not allow the style is left alone.
pub fn add_style(doc: &Node, from: usize, to: usize, style: &Style) -> Result<Vec<Step>, TransformError> {
    check_range(from, to)?;
    Ok(collect(doc, "add_style", |tr| {
        let mut removed: Vec<RemoveStyleStep> = Vec::new();
        let mut added: Vec<AddStyleStep> = Vec::new();
        tr.doc().nodes_between(from, to, |node, pos, parent, _| {
            if !node.is_inline() {
                return true;
            }
            let allowed = parent.is_some_and(|p| p.node_type().allows_style(style.style_type()));
            let start = pos.max(from);
            let end = (pos + node.node_size()).min(to);
            if !allowed || start >= end || style.is_in_set(node.styles()) {
                return true;
            }
            let styles = style.add_to_set(node.styles());
            for old in node.styles() {
                if old.is_in_set(&styles) {
                    continue;
                }
                match removed.last_mut() {
                    Some(step) if step.to == start && &step.style == old => step.to = end,
                    _ => removed.push(RemoveStyleStep::new(start, end, old.clone())),
                }
            }
            match added.last_mut() {
                Some(step) if step.to == start => step.to = end,
                _ => added.push(AddStyleStep::new(start, end, style.clone())),
            }
            true
        });
        for step in removed {
            tr.step(step.into())?;
        }
        for step in added {
            tr.step(step.into())?;
        }
        Ok(())
    }))
}

struct Run {
    style: Style,
    from: usize,
    to: usize,
    // index of the last inline node the run covers
    node: usize,
}

/// Remove `style` from the inline content in `from..to`, or every style
/// when `style` is `None`.
pub fn remove_style(
    doc: &Node,
    from: usize,
    to: usize,
    style: Option<&Style>,
) -> Result<Vec<Step>, TransformError> {
    check_range(from, to)?;
    Ok(collect(doc, "remove_style", |tr| {
        let mut runs: Vec<Run> = Vec::new();
        let mut inline_index = 0;
        tr.doc().nodes_between(from, to, |node, pos, _, _| {
            if !node.is_inline() {
                return true;
            }
            inline_index += 1;
            let start = pos.max(from);
            let end = (pos + node.node_size()).min(to);
            if start >= end {
                return true;
            }
            let targets: Vec<&Style> = match style {
                Some(style) if style.is_in_set(node.styles()) => vec![style],
                Some(_) => Vec::new(),
                None => node.styles().iter().collect(),
            };
            for target in targets {
                let open = runs
                    .iter_mut()
                    .find(|run| run.node + 1 == inline_index && &run.style == target);
                match open {
                    Some(run) => {
                        run.to = end;
                        run.node = inline_index;
                    }
                    None => runs.push(Run {
                        style: target.clone(),
                        from: start,
                        to: end,
                        node: inline_index,
                    }),
                }
            }
            true
        });
        for run in runs {
            tr.step(RemoveStyleStep::new(run.from, run.to, run.style).into())?;
        }
        Ok(())
    }))
}

impl Transform {
    pub fn add_style(&mut self, from: usize, to: usize, style: &Style) -> Result<&mut Self, TransformError> {
        let steps = add_style(self.doc(), from, to, style)?;
        Ok(self.apply_built(steps))
    }

    pub fn remove_style(
        &mut self,
        from: usize,
        to: usize,
        style: Option<&Style>,
    ) -> Result<&mut Self, TransformError> {
        let steps = remove_style(self.doc(), from, to, style)?;
        Ok(self.apply_built(steps))
    }
}
