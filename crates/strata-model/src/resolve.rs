//! Position resolution: turning an absolute offset into the path of
//! ancestors that contain it.

use crate::error::ModelError;
use crate::node::Node;
use crate::style::StyleSet;

#[derive(Debug, Clone)]
struct PathEntry {
    node: Node,
    /// Index of the child the position falls in or before.
    index: usize,
    /// Absolute start of that child.
    offset: usize,
}

/// A position resolved against a document. Depth 0 is the document itself;
/// `depth()` is the depth of the innermost node containing the position.
#[derive(Debug, Clone)]
pub struct ResolvedPos {
    pos: usize,
    path: Vec<PathEntry>,
    parent_offset: usize,
}

impl ResolvedPos {
    pub(crate) fn resolve(doc: &Node, pos: usize) -> Result<Self, ModelError> {
        if pos > doc.content_size() {
            return Err(ModelError::PositionOutOfRange {
                pos,
                size: doc.content_size(),
            });
        }
        let mut path = Vec::new();
        let mut start = 0;
        let mut parent_offset = pos;
        let mut node = doc.clone();
        loop {
            let (index, offset) = node.content().find_index(parent_offset, false)?;
            let rem = parent_offset - offset;
            path.push(PathEntry {
                node: node.clone(),
                index,
                offset: start + offset,
            });
            if rem == 0 {
                break;
            }
            let child = node.child(index).clone();
            if child.is_text() {
                break;
            }
            parent_offset = rem - 1;
            start += offset + 1;
            node = child;
        }
        Ok(Self {
            pos,
            path,
            parent_offset,
        })
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    /// Offset of the position inside its parent node.
    pub fn parent_offset(&self) -> usize {
        self.parent_offset
    }

    /// The innermost node containing the position.
    pub fn parent(&self) -> &Node {
        self.node(self.depth())
    }

    pub fn doc(&self) -> &Node {
        self.node(0)
    }

    /// # Panics
    ///
    /// Panics if `depth` is greater than [`ResolvedPos::depth`].
    pub fn node(&self, depth: usize) -> &Node {
        &self.path[depth].node
    }

    /// Index into the ancestor at `depth` of the child the position points
    /// into or before.
    pub fn index(&self, depth: usize) -> usize {
        self.path[depth].index
    }

    /// Index pointing after this position in the ancestor at `depth`.
    pub fn index_after(&self, depth: usize) -> usize {
        let bump = depth != self.depth() || self.text_offset() > 0;
        self.index(depth) + usize::from(bump)
    }

    /// Absolute position at the start of the ancestor at `depth`'s content.
    pub fn start(&self, depth: usize) -> usize {
        if depth == 0 {
            0
        } else {
            self.path[depth - 1].offset + 1
        }
    }

    pub fn end(&self, depth: usize) -> usize {
        self.start(depth) + self.node(depth).content_size()
    }

    /// Absolute position directly before the ancestor at `depth`.
    pub fn before(&self, depth: usize) -> Result<usize, ModelError> {
        if depth == 0 {
            return Err(ModelError::NoPositionBefore);
        }
        if depth == self.depth() + 1 {
            Ok(self.pos)
        } else {
            Ok(self.path[depth - 1].offset)
        }
    }

    /// Absolute position directly after the ancestor at `depth`.
    pub fn after(&self, depth: usize) -> Result<usize, ModelError> {
        if depth == 0 {
            return Err(ModelError::NoPositionBefore);
        }
        if depth == self.depth() + 1 {
            Ok(self.pos)
        } else {
            Ok(self.path[depth - 1].offset + self.node(depth).node_size())
        }
    }

    /// Offset into the text node the position points into; 0 when the
    /// position is between nodes.
    pub fn text_offset(&self) -> usize {
        self.pos - self.path[self.depth()].offset
    }

    /// The node directly after the position. When the position is inside a
    /// text node, only the part after it.
    pub fn node_after(&self) -> Option<Node> {
        let parent = self.parent();
        let index = self.index(self.depth());
        let child = parent.maybe_child(index)?;
        let offset = self.text_offset();
        if offset > 0 {
            Some(child.cut(offset, child.node_size()))
        } else {
            Some(child.clone())
        }
    }

    /// The node directly before the position. When the position is inside a
    /// text node, only the part before it.
    pub fn node_before(&self) -> Option<Node> {
        let parent = self.parent();
        let index = self.index(self.depth());
        let offset = self.text_offset();
        if offset > 0 {
            return parent.maybe_child(index).map(|child| child.cut(0, offset));
        }
        index.checked_sub(1).and_then(|i| parent.maybe_child(i)).cloned()
    }

    /// Absolute position of the child at `index` of the ancestor at `depth`.
    pub fn pos_at_index(&self, index: usize, depth: usize) -> usize {
        let node = self.node(depth);
        let mut pos = self.start(depth);
        for child in node.content().iter().take(index) {
            pos += child.node_size();
        }
        pos
    }

    /// Styles that text inserted here should carry. Inside a text node that
    /// node's styles; otherwise the styles of the node before, or of the node
    /// after when at the start of the parent.
    pub fn styles(&self) -> StyleSet {
        let parent = self.parent();
        if parent.content_size() == 0 {
            return StyleSet::empty();
        }
        let index = self.index(self.depth());
        if self.text_offset() > 0 {
            return parent.child(index).styles().clone();
        }
        let before = index.checked_sub(1).and_then(|i| parent.maybe_child(i));
        match before.or_else(|| parent.maybe_child(index)) {
            Some(node) => node.styles().clone(),
            None => StyleSet::empty(),
        }
    }

    /// Depth of the innermost ancestor that contains both this position and
    /// `pos`.
    pub fn shared_depth(&self, pos: usize) -> usize {
        (1..=self.depth())
            .rev()
            .find(|&d| self.start(d) <= pos && self.end(d) >= pos)
            .unwrap_or(0)
    }

    pub fn same_parent(&self, other: &ResolvedPos) -> bool {
        self.depth() == other.depth() && self.pos - self.parent_offset == other.pos - other.parent_offset
    }

    /// The range of block-level siblings around this position and `other`:
    /// the innermost ancestor whose children span both positions, excluding
    /// textblocks.
    pub fn block_range(&self, other: &ResolvedPos) -> Option<NodeRange> {
        self.block_range_where(other, |_| true)
    }

    /// Like [`ResolvedPos::block_range`] but only accepts ancestors for which
    /// `pred` returns true.
    pub fn block_range_where(
        &self,
        other: &ResolvedPos,
        pred: impl Fn(&Node) -> bool,
    ) -> Option<NodeRange> {
        if other.pos < self.pos {
            return other.block_range_where(self, pred);
        }
        let skip = self.parent().inline_content() || self.pos == other.pos;
        let top = if skip {
            self.depth().checked_sub(1)?
        } else {
            self.depth()
        };
        (0..=top)
            .rev()
            .find(|&d| other.pos <= self.end(d) && pred(self.node(d)))
            .map(|depth| NodeRange::new(self.clone(), other.clone(), depth))
    }
}

/// A flat range of siblings inside a common parent, described by the
/// positions at either end.
#[derive(Debug, Clone)]
pub struct NodeRange {
    from: ResolvedPos,
    to: ResolvedPos,
    depth: usize,
}

impl NodeRange {
    pub fn new(from: ResolvedPos, to: ResolvedPos, depth: usize) -> Self {
        Self { from, to, depth }
    }

    pub fn from(&self) -> &ResolvedPos {
        &self.from
    }

    pub fn to(&self) -> &ResolvedPos {
        &self.to
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Position before the first node in the range.
    pub fn start(&self) -> usize {
        self.from
            .before(self.depth + 1)
            .unwrap_or_else(|_| self.from.pos())
    }

    /// Position after the last node in the range.
    pub fn end(&self) -> usize {
        self.to.after(self.depth + 1).unwrap_or_else(|_| self.to.pos())
    }

    pub fn parent(&self) -> &Node {
        self.from.node(self.depth)
    }

    pub fn start_index(&self) -> usize {
        self.from.index(self.depth)
    }

    pub fn end_index(&self) -> usize {
        self.to.index_after(self.depth)
    }
}
