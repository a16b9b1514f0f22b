//! Fitting a slice into a document range.
//!
//! When a slice cannot simply be dropped between two positions (because the
//! node there does not accept its content, or its open sides do not line up
//! with the positions) the fitter rebuilds it: nodes are placed at the
//! deepest ancestor that accepts them, wrappers are created where the schema
//! requires them, and the slice is opened on both sides so that it joins
//! cleanly with the content around the replaced range.

use strata_model::{Fragment, Node, ModelError, ResolvedPos, Slice};

use crate::step::{ReplaceStep, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Root,
    /// An ancestor of the start position, joined with it on apply.
    Left,
    /// A node created while placing the slice.
    Fresh,
    /// An ancestor of the end position, joined with it on apply.
    Right,
}

#[derive(Debug)]
struct Frame {
    node: Node,
    content: Vec<Node>,
    kind: FrameKind,
}

impl Frame {
    fn new(node: Node, kind: FrameKind) -> Self {
        Self {
            node,
            content: Vec::new(),
            kind,
        }
    }

    fn accepts(&self, child: &Node) -> bool {
        let node_type = self.node.node_type();
        node_type.allows_child(child.node_type()) && node_type.allows_styles(child.styles())
    }
}

struct Fitter {
    frames: Vec<Frame>,
}

/// Build the step that replaces `from..to` with `slice`, fitting the slice to
/// the document when needed. `None` when there is nothing to do or no valid
/// fit exists.
pub fn replace_step(
    doc: &Node,
    from: usize,
    to: usize,
    slice: &Slice,
) -> Result<Option<Step>, ModelError> {
    if from == to && slice.size() == 0 {
        return Ok(None);
    }
    let rfrom = doc.resolve(from)?;
    let rto = doc.resolve(to)?;
    if fits_trivially(&rfrom, &rto, slice) {
        return Ok(Some(ReplaceStep::new(from, to, slice.clone()).into()));
    }
    let Some(fitted) = Fitter::new(&rfrom).fit(&rfrom, &rto, slice) else {
        return Ok(None);
    };
    if from == to && fitted.size() == 0 {
        return Ok(None);
    }
    Ok(Some(ReplaceStep::new(from, to, fitted).into()))
}

fn fits_trivially(rfrom: &ResolvedPos, rto: &ResolvedPos, slice: &Slice) -> bool {
    slice.open_start == 0
        && slice.open_end == 0
        && rfrom.start(rfrom.depth()) == rto.start(rto.depth())
        && rfrom.parent().can_replace(
            rfrom.index(rfrom.depth()),
            rto.index(rto.depth()),
            &slice.content,
        )
}

impl Fitter {
    fn new(rfrom: &ResolvedPos) -> Self {
        let frames = (0..=rfrom.depth())
            .map(|depth| {
                let kind = if depth == 0 {
                    FrameKind::Root
                } else {
                    FrameKind::Left
                };
                Frame::new(rfrom.node(depth).clone(), kind)
            })
            .collect();
        Self { frames }
    }

    fn top(&self) -> usize {
        self.frames.len() - 1
    }

    fn fit(mut self, rfrom: &ResolvedPos, rto: &ResolvedPos, slice: &Slice) -> Option<Slice> {
        let level = rfrom.depth().saturating_sub(slice.open_start);
        self.place_children(&slice.content, level, slice.open_start, slice.open_end)?;
        self.align_right(rto)?;
        while self.frames.len() > 1 {
            self.close_top();
        }
        let root = self.frames.pop()?;

        let mut content = Fragment::from_vec(root.content);
        let mut open_start = rfrom.depth();
        let mut open_end = rto.depth();
        while open_start > 0 && open_end > 0 && content.child_count() == 1 {
            content = content.child(0).content().clone();
            open_start -= 1;
            open_end -= 1;
        }
        Some(Slice::new(content, open_start, open_end))
    }

    /// Place the children of `content`, which sits at frame `level`. `os`
    /// and `oe` are the open depths of `content`'s first and last children.
    fn place_children(&mut self, content: &Fragment, level: usize, os: usize, oe: usize) -> Option<()> {
        let count = content.child_count();
        for (i, child) in content.iter().enumerate() {
            let open_start = (i == 0 && os > 0).then(|| os - 1);
            let open_end = (i + 1 == count && oe > 0).then(|| oe - 1);
            self.place(child, level, open_start, open_end)?;
        }
        Some(())
    }

    fn place(
        &mut self,
        child: &Node,
        level: usize,
        open_start: Option<usize>,
        open_end: Option<usize>,
    ) -> Option<()> {
        let open = !child.is_leaf() && (open_start.is_some() || open_end.is_some());

        // An open start continues the matching ancestor of the start position.
        if let (Some(inner_os), false) = (open_start, child.is_leaf()) {
            let merges = self.frames.get(level + 1).is_some_and(|frame| {
                frame.kind == FrameKind::Left
                    && frame.node.node_type().compatible_content(child.node_type())
            });
            if merges {
                self.place_children(child.content(), level + 1, inner_os, open_end.unwrap_or(0))?;
                if open_end.is_none() {
                    self.close_above(level);
                }
                return Some(());
            }
        }

        if !open {
            if let Some(at) = self.find_level(child) {
                self.close_above(at);
                self.frames[at].content.push(child.clone());
                return Some(());
            }
            let (at, wrappers) = self.find_wrapping(child)?;
            self.close_above(at);
            for wrapper in wrappers {
                self.frames.push(Frame::new(wrapper, FrameKind::Fresh));
            }
            let top = self.top();
            self.frames[top].content.push(child.clone());
            return Some(());
        }

        let at = match self.find_level(child) {
            Some(at) => {
                self.close_above(at);
                at
            }
            None => match self.find_wrapping(child) {
                Some((at, wrappers)) => {
                    self.close_above(at);
                    for wrapper in wrappers {
                        self.frames.push(Frame::new(wrapper, FrameKind::Fresh));
                    }
                    self.top()
                }
                // Open nodes that fit nowhere are dropped, keeping their content.
                None => {
                    let top = self.top();
                    return self.place_children(
                        child.content(),
                        top,
                        open_start.unwrap_or(0),
                        open_end.unwrap_or(0),
                    );
                }
            },
        };
        self.frames
            .push(Frame::new(child.copy(Fragment::empty()), FrameKind::Fresh));
        self.place_children(
            child.content(),
            at + 1,
            open_start.unwrap_or(0),
            open_end.unwrap_or(0),
        )?;
        if open_end.is_none() {
            self.close_above(at);
        }
        Some(())
    }

    /// Deepest frame that accepts `child` directly.
    fn find_level(&self, child: &Node) -> Option<usize> {
        (0..self.frames.len())
            .rev()
            .find(|&level| self.frames[level].accepts(child))
    }

    /// Deepest frame that accepts `child` through a chain of new wrapper
    /// nodes, plus those wrappers, outermost first.
    fn find_wrapping(&self, child: &Node) -> Option<(usize, Vec<Node>)> {
        (0..self.frames.len()).rev().find_map(|level| {
            let outer = self.frames[level].node.node_type();
            let types = outer.schema().find_wrapping(outer, child.node_type())?;
            let inner = types.last()?;
            if !inner.allows_styles(child.styles()) {
                return None;
            }
            let wrappers = types
                .iter()
                .map(|t| t.create(None, Fragment::empty(), Default::default()).ok())
                .collect::<Option<Vec<_>>>()?;
            Some((level, wrappers))
        })
    }

    fn close_above(&mut self, level: usize) {
        while self.frames.len() > level + 1 {
            self.close_top();
        }
    }

    fn close_top(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let droppable = frame.kind == FrameKind::Fresh
            && frame.content.is_empty()
            && frame.node.node_type().content_min() > 0;
        if droppable {
            return;
        }
        let node = frame.node.copy(Fragment::from_vec(frame.content));
        if let Some(parent) = self.frames.last_mut() {
            parent.content.push(node);
        }
    }

    /// Close or open frames so the right edge of the placed content lines up
    /// with the ancestors of the end position.
    fn align_right(&mut self, rto: &ResolvedPos) -> Option<()> {
        let depth = rto.depth();
        let mut keep = self.top().min(depth);
        while !self.aligns(keep, rto) {
            keep = keep.checked_sub(1)?;
        }
        self.close_above(keep);
        for frame in self.frames.iter_mut().skip(1) {
            if frame.kind == FrameKind::Fresh {
                frame.kind = FrameKind::Right;
            }
        }
        for d in keep + 1..=depth {
            self.frames
                .push(Frame::new(rto.node(d).copy(Fragment::empty()), FrameKind::Right));
        }
        Some(())
    }

    fn aligns(&self, keep: usize, rto: &ResolvedPos) -> bool {
        let depth = rto.depth();
        let joins = (1..=keep).all(|d| {
            let frame_type = self.frames[d].node.node_type();
            frame_type.compatible_content(rto.node(d).node_type()) && fits_after(&self.frames[d], rto, d)
        });
        joins && (keep == depth || self.frames[keep].node.node_type().allows_child(rto.node(keep + 1).node_type()))
    }
}

/// Can the content following the end position at `depth` be appended to
/// `frame`?
fn fits_after(frame: &Frame, rto: &ResolvedPos, depth: usize) -> bool {
    let node = rto.node(depth);
    let start = if depth < rto.depth() {
        rto.index(depth) + 1
    } else {
        rto.index(depth)
    };
    node.content()
        .iter()
        .skip(start)
        .all(|child| frame.accepts(child))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strata_model::build::{block, doc, leaf, Tagged};
    use strata_model::Schema;

    fn p(text: &str) -> strata_model::build::Item {
        block("paragraph", None, vec![text.into()]).unwrap()
    }

    fn apply(d: &Tagged, from: usize, to: usize, slice: &Slice) -> String {
        let step = replace_step(&d.node, from, to, slice).unwrap().unwrap();
        step.apply(&d.node).unwrap().doc.to_string()
    }

    #[test]
    fn block_inside_textblock_splits_it() {
        let d = doc(vec![p("he<a>llo")]).unwrap();
        let a = d.tag("a").unwrap();
        let para = Schema::basic()
            .node("paragraph", None, Fragment::empty())
            .unwrap();
        let result = apply(&d, a, a, &Slice::closed(Fragment::from_node(para)));
        assert_eq!(result, r#"doc(paragraph("he"), paragraph, paragraph("llo"))"#);
    }

    #[test]
    fn deleting_across_textblocks_joins_them() {
        let d = doc(vec![p("on<a>e"), p("t<b>wo")]).unwrap();
        let result = apply(&d, d.tag("a").unwrap(), d.tag("b").unwrap(), &Slice::empty());
        assert_eq!(result, r#"doc(paragraph("onwo"))"#);
    }

    #[test]
    fn deleting_into_a_quote_keeps_structure() {
        let quote = block("blockquote", None, vec![p("c<b>d")]).unwrap();
        let d = doc(vec![p("a<a>b"), quote]).unwrap();
        let result = apply(&d, d.tag("a").unwrap(), d.tag("b").unwrap(), &Slice::empty());
        assert_eq!(result, r#"doc(paragraph("a"), blockquote(paragraph("d")))"#);
    }

    #[test]
    fn text_at_block_level_gets_a_paragraph() {
        let d = doc(vec![p("one"), "<a>".into(), leaf("horizontal_rule").unwrap()]).unwrap();
        let a = d.tag("a").unwrap();
        let text = Schema::basic().text("new", Default::default());
        let result = apply(&d, a, a, &Slice::closed(Fragment::from_node(text)));
        assert_eq!(
            result,
            r#"doc(paragraph("one"), paragraph("new"), horizontal_rule)"#
        );
    }

    #[test]
    fn open_slice_joins_both_sides() {
        let d = doc(vec![p("ab<a>cd")]).unwrap();
        let source = doc(vec![p("x<a>y"), p("m"), p("z<b>w")]).unwrap();
        let slice = source
            .node
            .slice(source.tag("a").unwrap(), source.tag("b").unwrap())
            .unwrap();
        let a = d.tag("a").unwrap();
        let result = apply(&d, a, a, &slice);
        assert_eq!(
            result,
            r#"doc(paragraph("aby"), paragraph("m"), paragraph("zcd"))"#
        );
    }

    #[test]
    fn nothing_to_do() {
        let d = doc(vec![p("ab")]).unwrap();
        assert!(replace_step(&d.node, 1, 1, &Slice::empty()).unwrap().is_none());
    }
}
