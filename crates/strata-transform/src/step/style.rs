use strata_model::{Fragment, Node, Slice, Style};

use crate::error::StepError;
use crate::map::{Assoc, Mappable};

/// Add a style to the inline content in `from..to`, skipping nodes whose
/// parent does not allow it.
///
/// Fails when any of that content already carries a style of the same type,
/// so that removing the style again restores the document exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddStyleStep {
    pub from: usize,
    pub to: usize,
    pub style: Style,
}

/// Remove a style from the inline content in `from..to`. Every inline atom
/// in the range whose parent allows the style must carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveStyleStep {
    pub from: usize,
    pub to: usize,
    pub style: Style,
}

/// Rebuild `fragment`, passing every inline node through `f` along with its
/// parent.
fn map_fragment(fragment: &Fragment, parent: &Node, f: &impl Fn(&Node, &Node) -> Node) -> Fragment {
    let mapped = fragment
        .iter()
        .map(|child| {
            let child = if child.content_size() > 0 {
                child.copy(map_fragment(child.content(), child, f))
            } else {
                child.clone()
            };
            if child.is_inline() { f(&child, parent) } else { child }
        })
        .collect();
    Fragment::from_vec(mapped)
}

fn restyle(
    doc: &Node,
    from: usize,
    to: usize,
    f: impl Fn(&Node, &Node) -> Node,
) -> Result<Node, StepError> {
    let old = doc.slice(from, to)?;
    let rfrom = doc.resolve(from)?;
    let parent = rfrom.node(rfrom.shared_depth(to));
    let content = map_fragment(&old.content, parent, &f);
    let slice = Slice::new(content, old.open_start, old.open_end);
    Ok(doc.replace(from, to, &slice)?)
}

/// Inline atoms the style step touches: those overlapping `from..to` whose
/// parent allows `style`.
fn touches(node: &Node, parent: Option<&Node>, style: &Style) -> bool {
    node.is_inline()
        && node.is_atom()
        && parent.is_some_and(|p| p.node_type().allows_style(style.style_type()))
}

/// Does every touched node in `from..to` satisfy `f`?
fn all_touched(doc: &Node, from: usize, to: usize, style: &Style, f: impl Fn(&Node) -> bool) -> bool {
    let mut ok = true;
    doc.nodes_between(from, to, |node, pos, parent, _| {
        let overlaps = pos.max(from) < (pos + node.node_size()).min(to);
        if ok && overlaps && touches(node, parent, style) {
            ok = f(node);
        }
        ok
    });
    ok
}

fn map_range(from: usize, to: usize, mapping: &impl Mappable) -> Option<(usize, usize)> {
    let from = mapping.map_result(from, Assoc::After);
    let to = mapping.map_result(to, Assoc::Before);
    if (from.deleted() && to.deleted()) || from.pos >= to.pos {
        return None;
    }
    Some((from.pos, to.pos))
}

impl AddStyleStep {
    pub fn new(from: usize, to: usize, style: Style) -> Self {
        Self { from, to, style }
    }

    pub(super) fn apply(&self, doc: &Node) -> Result<Node, StepError> {
        let style_type = self.style.style_type();
        if !all_touched(doc, self.from, self.to, &self.style, |node| {
            node.styles().find_type(style_type).is_none()
        }) {
            return Err(StepError::StyleAlreadyPresent {
                style: self.style.name().to_string(),
            });
        }
        restyle(doc, self.from, self.to, |node, parent| {
            if !touches(node, Some(parent), &self.style) {
                return node.clone();
            }
            node.mark(self.style.add_to_set(node.styles()))
        })
    }

    pub(super) fn invert(&self) -> RemoveStyleStep {
        RemoveStyleStep::new(self.from, self.to, self.style.clone())
    }

    pub(super) fn map(&self, mapping: &impl Mappable) -> Option<AddStyleStep> {
        map_range(self.from, self.to, mapping)
            .map(|(from, to)| AddStyleStep::new(from, to, self.style.clone()))
    }
}

impl RemoveStyleStep {
    pub fn new(from: usize, to: usize, style: Style) -> Self {
        Self { from, to, style }
    }

    pub(super) fn apply(&self, doc: &Node) -> Result<Node, StepError> {
        if !all_touched(doc, self.from, self.to, &self.style, |node| {
            self.style.is_in_set(node.styles())
        }) {
            return Err(StepError::StyleNotPresent {
                style: self.style.name().to_string(),
            });
        }
        restyle(doc, self.from, self.to, |node, parent| {
            if !touches(node, Some(parent), &self.style) {
                return node.clone();
            }
            node.mark(self.style.remove_from_set(node.styles()))
        })
    }

    pub(super) fn invert(&self) -> AddStyleStep {
        AddStyleStep::new(self.from, self.to, self.style.clone())
    }

    pub(super) fn map(&self, mapping: &impl Mappable) -> Option<RemoveStyleStep> {
        map_range(self.from, self.to, mapping)
            .map(|(from, to)| RemoveStyleStep::new(from, to, self.style.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Step;
    use pretty_assertions::assert_eq;
    use strata_model::Schema;
    use strata_model::build::{block, doc, styled};

    fn hello_there() -> Node {
        let strong = styled("strong", None, vec!["there".into()]).unwrap();
        doc(vec![block("paragraph", None, vec!["hello ".into(), strong]).unwrap()])
            .unwrap()
            .node
    }

    #[test]
    fn add_style_splits_text() {
        let d = doc(vec![block("paragraph", None, vec!["hello".into()]).unwrap()])
            .unwrap()
            .node;
        let strong = Schema::basic().style("strong", None).unwrap();
        let step = Step::AddStyle(AddStyleStep::new(2, 4, strong));
        let out = step.apply(&d).unwrap();
        assert_eq!(out.doc.to_string(), r#"doc(paragraph("h", strong("el"), "lo"))"#);
        assert!(out.map.is_identity());
        let back = step.invert(&out.displaced).unwrap().apply(&out.doc).unwrap();
        assert_eq!(back.doc, d);
    }

    #[test]
    fn code_block_content_is_not_styled() {
        let d = doc(vec![block("code_block", None, vec!["x = 1".into()]).unwrap()])
            .unwrap()
            .node;
        let em = Schema::basic().style("em", None).unwrap();
        let out = Step::AddStyle(AddStyleStep::new(1, 6, em)).apply(&d).unwrap();
        assert_eq!(out.doc, d);
    }

    #[test]
    fn adding_over_the_same_style_fails() {
        let d = hello_there();
        let strong = Schema::basic().style("strong", None).unwrap();
        let err = Step::AddStyle(AddStyleStep::new(1, 12, strong)).apply(&d).unwrap_err();
        assert_eq!(err, StepError::StyleAlreadyPresent { style: "strong".into() });
    }

    #[test]
    fn adding_over_a_link_with_another_target_fails() {
        let schema = Schema::basic();
        let foo = schema.style("link", Some(&strata_model::attrs([("href", "foo")]))).unwrap();
        let bar = schema.style("link", Some(&strata_model::attrs([("href", "bar")]))).unwrap();
        let go = styled("link", Some(foo.attrs()), vec!["go".into()]).unwrap();
        let d = doc(vec![block("paragraph", None, vec![go]).unwrap()]).unwrap().node;
        let step = Step::AddStyle(AddStyleStep::new(1, 3, bar));
        assert!(matches!(step.apply(&d), Err(StepError::StyleAlreadyPresent { .. })));
    }

    #[test]
    fn removing_needs_the_style_throughout() {
        let d = hello_there();
        let strong = Schema::basic().style("strong", None).unwrap();
        let err = Step::RemoveStyle(RemoveStyleStep::new(1, 12, strong.clone()))
            .apply(&d)
            .unwrap_err();
        assert_eq!(err, StepError::StyleNotPresent { style: "strong".into() });

        let step = Step::RemoveStyle(RemoveStyleStep::new(7, 12, strong));
        let out = step.apply(&d).unwrap();
        assert_eq!(out.doc.to_string(), r#"doc(paragraph("hello there"))"#);
        let back = step.invert(&out.displaced).unwrap().apply(&out.doc).unwrap();
        assert_eq!(back.doc, d);
    }
}
