use std::fmt;

use crate::error::ModelError;
use crate::node::Node;

/// The ordered children of a node.
///
/// Fragments are normalised on construction: empty text nodes are dropped and
/// adjacent text nodes with identical styles are merged, so a run of equally
/// styled text is always a single node.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    nodes: Vec<Node>,
    size: usize,
}

impl Fragment {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_vec(nodes: Vec<Node>) -> Self {
        let mut joined: Vec<Node> = Vec::with_capacity(nodes.len());
        let mut size = 0;
        for node in nodes {
            if node.is_text() && node.node_size() == 0 {
                continue;
            }
            size += node.node_size();
            match joined.last_mut() {
                Some(last) if node.is_text() && last.is_text() && last.same_markup(&node) => {
                    let text = format!("{}{}", last.text().unwrap_or(""), node.text().unwrap_or(""));
                    *last = last.with_text(text);
                }
                _ => joined.push(node),
            }
        }
        Self {
            nodes: joined,
            size,
        }
    }

    pub fn from_node(node: Node) -> Self {
        Self::from_vec(vec![node])
    }

    /// Total size of the content, in positions.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn child_count(&self) -> usize {
        self.nodes.len()
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn child(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.nodes.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn to_vec(&self) -> Vec<Node> {
        self.nodes.clone()
    }

    /// Concatenate two fragments, merging text across the seam.
    pub fn append(&self, other: &Fragment) -> Fragment {
        if other.nodes.is_empty() {
            return self.clone();
        }
        if self.nodes.is_empty() {
            return other.clone();
        }
        let mut nodes = self.nodes.clone();
        nodes.extend(other.nodes.iter().cloned());
        Fragment::from_vec(nodes)
    }

    pub fn add_to_start(&self, node: Node) -> Fragment {
        let mut nodes = Vec::with_capacity(self.nodes.len() + 1);
        nodes.push(node);
        nodes.extend(self.nodes.iter().cloned());
        Fragment::from_vec(nodes)
    }

    pub fn add_to_end(&self, node: Node) -> Fragment {
        let mut nodes = self.nodes.clone();
        nodes.push(node);
        Fragment::from_vec(nodes)
    }

    pub fn replace_child(&self, index: usize, node: Node) -> Fragment {
        let mut nodes = self.nodes.clone();
        nodes[index] = node;
        Fragment::from_vec(nodes)
    }

    /// Content between two positions, cutting through partially covered
    /// children.
    pub fn cut(&self, from: usize, to: usize) -> Fragment {
        if from == 0 && to >= self.size {
            return self.clone();
        }
        let mut result = Vec::new();
        if to > from {
            let mut pos = 0;
            for child in &self.nodes {
                if pos >= to {
                    break;
                }
                let end = pos + child.node_size();
                if end > from {
                    let child = if pos < from || end > to {
                        if child.is_text() {
                            child.cut(from.saturating_sub(pos), (to - pos).min(child.node_size()))
                        } else {
                            child.cut(
                                from.saturating_sub(pos + 1),
                                (to.saturating_sub(pos + 1)).min(child.content_size()),
                            )
                        }
                    } else {
                        child.clone()
                    };
                    result.push(child);
                }
                pos = end;
            }
        }
        Fragment::from_vec(result)
    }

    /// Like [`Fragment::cut`] but addressed by child index.
    pub fn cut_by_index(&self, from: usize, to: usize) -> Fragment {
        if from == 0 && to == self.nodes.len() {
            return self.clone();
        }
        Fragment::from_vec(self.nodes[from..to].to_vec())
    }

    /// Find the child index at `pos`, returning the index and the start
    /// offset of that child. A position on a child boundary resolves to the
    /// child after it; with `round_up` a position inside a child resolves to
    /// the next one.
    pub fn find_index(&self, pos: usize, round_up: bool) -> Result<(usize, usize), ModelError> {
        if pos == 0 {
            return Ok((0, 0));
        }
        if pos == self.size {
            return Ok((self.nodes.len(), pos));
        }
        if pos > self.size {
            return Err(ModelError::PositionOutOfRange {
                pos,
                size: self.size,
            });
        }
        let mut cur = 0;
        for (i, child) in self.nodes.iter().enumerate() {
            let end = cur + child.node_size();
            if end >= pos {
                if end == pos || round_up {
                    return Ok((i + 1, end));
                }
                return Ok((i, cur));
            }
            cur = end;
        }
        Err(ModelError::PositionOutOfRange {
            pos,
            size: self.size,
        })
    }

    /// Call `f` for every node overlapping `from..to`, in document order.
    /// Returning `false` skips the node's children.
    pub(crate) fn nodes_between(
        &self,
        from: usize,
        to: usize,
        f: &mut dyn FnMut(&Node, usize, Option<&Node>, usize) -> bool,
        node_start: usize,
        parent: Option<&Node>,
    ) {
        let mut pos = 0;
        for (i, child) in self.nodes.iter().enumerate() {
            if pos >= to {
                break;
            }
            let end = pos + child.node_size();
            if end > from && f(child, node_start + pos, parent, i) && child.content_size() > 0 {
                let start = pos + 1;
                child.content().nodes_between(
                    from.saturating_sub(start),
                    (to - start).min(child.content_size()),
                    f,
                    node_start + start,
                    Some(child),
                );
            }
            pos = end;
        }
    }

    /// Concatenated text of every text node in `from..to`, with
    /// `block_separator` between block nodes.
    pub fn text_between(&self, from: usize, to: usize, block_separator: &str) -> String {
        let mut text = String::new();
        let mut first = true;
        self.nodes_between(
            from,
            to,
            &mut |node, pos, _, _| {
                if node.is_textblock() {
                    if !first {
                        text.push_str(block_separator);
                    }
                    first = false;
                }
                if let Some(t) = node.text() {
                    let start = from.saturating_sub(pos);
                    let end = (to - pos).min(node.node_size());
                    text.extend(t.chars().skip(start).take(end.saturating_sub(start)));
                }
                true
            },
            0,
            None,
        );
        text
    }

    pub(crate) fn fmt_inner(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(node, f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<")?;
        self.fmt_inner(f)?;
        f.write_str(">")
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<'a> IntoIterator for &'a Fragment {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl From<Node> for Fragment {
    fn from(node: Node) -> Self {
        Fragment::from_node(node)
    }
}

impl From<Vec<Node>> for Fragment {
    fn from(nodes: Vec<Node>) -> Self {
        Fragment::from_vec(nodes)
    }
}
