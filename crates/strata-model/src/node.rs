use std::fmt;
use std::sync::Arc;

use crate::attrs::{AttrValue, Attrs};
use crate::error::ModelError;
use crate::fragment::Fragment;
use crate::replace;
use crate::resolve::ResolvedPos;
use crate::schema::NodeType;
use crate::slice::Slice;
use crate::style::StyleSet;

struct NodeInner {
    node_type: NodeType,
    attrs: Attrs,
    content: Fragment,
    styles: StyleSet,
    text: Option<String>,
    size: usize,
}

/// An immutable document node.
///
/// Cloning is cheap: nodes are reference counted, and every edit builds new
/// nodes along the path to the change while sharing untouched subtrees with
/// the previous tree.
///
/// Sizes are counted in positions: a text node spans one position per
/// character, a leaf node spans one, and any other node spans its content
/// plus one position for each of its two boundaries.
#[derive(Clone)]
pub struct Node(Arc<NodeInner>);

impl Node {
    pub(crate) fn new(node_type: NodeType, attrs: Attrs, content: Fragment, styles: StyleSet) -> Self {
        let size = if node_type.is_leaf() {
            1
        } else {
            content.size() + 2
        };
        Self(Arc::new(NodeInner {
            node_type,
            attrs,
            content,
            styles,
            text: None,
            size,
        }))
    }

    pub(crate) fn new_text(node_type: NodeType, text: String, styles: StyleSet) -> Self {
        let size = text.chars().count();
        Self(Arc::new(NodeInner {
            node_type,
            attrs: Attrs::new(),
            content: Fragment::empty(),
            styles,
            text: Some(text),
            size,
        }))
    }

    /// True when both handles point at the same allocation.
    pub fn ptr_eq(a: &Node, b: &Node) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn node_type(&self) -> &NodeType {
        &self.0.node_type
    }

    pub fn type_name(&self) -> &str {
        self.0.node_type.name()
    }

    pub fn attrs(&self) -> &Attrs {
        &self.0.attrs
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.0.attrs.get(name)
    }

    pub fn content(&self) -> &Fragment {
        &self.0.content
    }

    pub fn styles(&self) -> &StyleSet {
        &self.0.styles
    }

    /// The text of a text node; `None` for every other node.
    pub fn text(&self) -> Option<&str> {
        self.0.text.as_deref()
    }

    pub fn node_size(&self) -> usize {
        self.0.size
    }

    pub fn content_size(&self) -> usize {
        self.0.content.size()
    }

    pub fn child_count(&self) -> usize {
        self.0.content.child_count()
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn child(&self, index: usize) -> &Node {
        self.0.content.child(index)
    }

    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.0.content.maybe_child(index)
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.0.content.first_child()
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.0.content.last_child()
    }

    pub fn is_text(&self) -> bool {
        self.0.text.is_some()
    }

    pub fn is_inline(&self) -> bool {
        self.0.node_type.is_inline()
    }

    pub fn is_block(&self) -> bool {
        self.0.node_type.is_block()
    }

    pub fn is_textblock(&self) -> bool {
        self.0.node_type.is_textblock()
    }

    pub fn inline_content(&self) -> bool {
        self.0.node_type.inline_content()
    }

    pub fn is_leaf(&self) -> bool {
        self.0.node_type.is_leaf()
    }

    pub fn is_atom(&self) -> bool {
        self.0.node_type.is_atom()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        match self.text() {
            Some(text) => text.to_string(),
            None => self.0.content.text_between(0, self.content_size(), ""),
        }
    }

    /// Same type, attributes and styles.
    pub fn same_markup(&self, other: &Node) -> bool {
        self.has_markup(other.node_type(), Some(other.attrs()), Some(other.styles()))
    }

    pub fn has_markup(
        &self,
        node_type: &NodeType,
        attrs: Option<&Attrs>,
        styles: Option<&StyleSet>,
    ) -> bool {
        let empty_attrs = Attrs::new();
        let empty_styles = StyleSet::empty();
        self.node_type() == node_type
            && self.attrs() == attrs.unwrap_or(&empty_attrs)
            && self.styles() == styles.unwrap_or(&empty_styles)
    }

    /// A node with the same markup and different content. Text nodes are
    /// returned unchanged.
    pub fn copy(&self, content: Fragment) -> Node {
        if self.is_text() {
            return self.clone();
        }
        Node::new(
            self.0.node_type.clone(),
            self.0.attrs.clone(),
            content,
            self.0.styles.clone(),
        )
    }

    /// A node with the same type, attributes and content but different styles.
    pub fn mark(&self, styles: StyleSet) -> Node {
        if &styles == self.styles() {
            return self.clone();
        }
        match self.text() {
            Some(text) => Node::new_text(self.0.node_type.clone(), text.to_string(), styles),
            None => Node::new(
                self.0.node_type.clone(),
                self.0.attrs.clone(),
                self.0.content.clone(),
                styles,
            ),
        }
    }

    /// A text node with the same styles and different text.
    pub(crate) fn with_text(&self, text: String) -> Node {
        Node::new_text(self.0.node_type.clone(), text, self.0.styles.clone())
    }

    /// The part of this node between two content positions. For text nodes
    /// the positions are character offsets.
    pub fn cut(&self, from: usize, to: usize) -> Node {
        if let Some(text) = self.text() {
            if from == 0 && to >= self.node_size() {
                return self.clone();
            }
            let cut: String = text.chars().skip(from).take(to.saturating_sub(from)).collect();
            return self.with_text(cut);
        }
        if from == 0 && to >= self.content_size() {
            return self.clone();
        }
        self.copy(self.0.content.cut(from, to))
    }

    /// Resolve a position in this node's content.
    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos, ModelError> {
        ResolvedPos::resolve(self, pos)
    }

    /// The slice between two positions. The slice is open as deep as the
    /// innermost node containing both positions.
    pub fn slice(&self, from: usize, to: usize) -> Result<Slice, ModelError> {
        if from == to {
            return Ok(Slice::empty());
        }
        let rfrom = self.resolve(from)?;
        let rto = self.resolve(to)?;
        let depth = rfrom.shared_depth(to);
        let start = rfrom.start(depth);
        let node = rfrom.node(depth);
        let content = node.content().cut(rfrom.pos() - start, rto.pos() - start);
        Ok(Slice::new(content, rfrom.depth() - depth, rto.depth() - depth))
    }

    /// Replace `from..to` with `slice`. The slice's open sides must line up
    /// with the depths of `from` and `to`.
    pub fn replace(&self, from: usize, to: usize, slice: &Slice) -> Result<Node, ModelError> {
        let rfrom = self.resolve(from)?;
        let rto = self.resolve(to)?;
        replace::replace(&rfrom, &rto, slice)
    }

    /// The node directly after `pos`, descending as far as needed.
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        let mut node = self;
        let mut pos = pos;
        loop {
            let (index, offset) = node.content().find_index(pos, false).ok()?;
            let child = node.maybe_child(index)?;
            if offset == pos || child.is_text() {
                return Some(child);
            }
            pos -= offset + 1;
            node = child;
        }
    }

    /// Visit every descendant overlapping `from..to` in document order, with
    /// its absolute position, its parent and its index in the parent.
    /// Returning `false` from `f` skips the node's children.
    pub fn nodes_between<F>(&self, from: usize, to: usize, mut f: F)
    where
        F: FnMut(&Node, usize, Option<&Node>, usize) -> bool,
    {
        self.0.content.nodes_between(from, to, &mut f, 0, Some(self));
    }

    /// Validate the content model of this node and all of its descendants.
    pub fn check(&self) -> Result<(), ModelError> {
        if !self.node_type().valid_content(self.content()) {
            return Err(ModelError::InvalidContent {
                node_type: self.type_name().to_string(),
            });
        }
        self.content().iter().try_for_each(Node::check)
    }

    /// Can `replacement` take the place of the children `from..to`?
    pub fn can_replace(&self, from: usize, to: usize, replacement: &Fragment) -> bool {
        if from > to || to > self.child_count() {
            return false;
        }
        let content = self
            .content()
            .cut_by_index(0, from)
            .append(replacement)
            .append(&self.content().cut_by_index(to, self.child_count()));
        self.node_type().valid_content(&content)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Node::ptr_eq(self, other)
            || (self.0.node_type == other.0.node_type
                && self.0.attrs == other.0.attrs
                && self.0.styles == other.0.styles
                && self.0.text == other.0.text
                && self.0.content == other.0.content)
    }
}

impl Eq for Node {}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styles: Vec<_> = self.styles().iter().collect();
        for style in &styles {
            write!(f, "{}(", style.name())?;
        }
        match self.text() {
            Some(text) => write!(f, "{text:?}")?,
            None => {
                f.write_str(self.type_name())?;
                if self.content_size() > 0 {
                    f.write_str("(")?;
                    self.content().fmt_inner(f)?;
                    f.write_str(")")?;
                }
            }
        }
        for _ in &styles {
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
