use std::fmt;

use crate::error::ModelError;
use crate::fragment::Fragment;
use crate::node::Node;

/// A piece of document cut out of a tree.
///
/// `open_start` and `open_end` count how many levels of nodes on each side
/// were cut through: an open node continues past the slice boundary and is
/// joined with the surrounding content when the slice is inserted.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Slice {
    pub content: Fragment,
    pub open_start: usize,
    pub open_end: usize,
}

impl Slice {
    pub fn new(content: Fragment, open_start: usize, open_end: usize) -> Self {
        Self {
            content,
            open_start,
            open_end,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// A closed slice wrapping a fragment.
    pub fn closed(content: Fragment) -> Self {
        Self::new(content, 0, 0)
    }

    /// A slice of `fragment` open as deep as its first and last children go.
    pub fn max_open(content: Fragment) -> Self {
        let open_start = open_depth(content.first_child(), Node::first_child);
        let open_end = open_depth(content.last_child(), Node::last_child);
        Self::new(content, open_start, open_end)
    }

    /// Number of positions the slice adds when inserted.
    pub fn size(&self) -> usize {
        self.content.size() - self.open_start - self.open_end
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Insert `fragment` at `pos` (relative to the slice's own start). Returns
    /// `None` when the result would violate the content model of the node it
    /// lands in.
    pub fn insert_at(&self, pos: usize, fragment: &Fragment) -> Option<Slice> {
        let content = insert_into(&self.content, pos + self.open_start, fragment, None)?;
        Some(Self::new(content, self.open_start, self.open_end))
    }

    /// Remove `from..to` (relative to the slice's own start). The range must
    /// be flat: both ends inside the same parent.
    pub fn remove_between(&self, from: usize, to: usize) -> Result<Slice, ModelError> {
        let content = remove_range(&self.content, from + self.open_start, to + self.open_start)?;
        Ok(Self::new(content, self.open_start, self.open_end))
    }
}

fn open_depth(mut node: Option<&Node>, next: fn(&Node) -> Option<&Node>) -> usize {
    let mut depth = 0;
    while let Some(n) = node {
        if n.is_leaf() {
            break;
        }
        depth += 1;
        node = next(n);
    }
    depth
}

fn insert_into(
    content: &Fragment,
    dist: usize,
    insert: &Fragment,
    parent: Option<&Node>,
) -> Option<Fragment> {
    let (index, offset) = content.find_index(dist, false).ok()?;
    let child = content.maybe_child(index);
    if offset == dist || child.is_some_and(Node::is_text) {
        if let Some(parent) = parent {
            if !parent.can_replace(index, index, insert) {
                return None;
            }
        }
        return Some(
            content
                .cut(0, dist)
                .append(insert)
                .append(&content.cut(dist, content.size())),
        );
    }
    let child = child?;
    let inner = insert_into(child.content(), dist - offset - 1, insert, Some(child))?;
    Some(content.replace_child(index, child.copy(inner)))
}

fn remove_range(content: &Fragment, from: usize, to: usize) -> Result<Fragment, ModelError> {
    let (index, offset) = content.find_index(from, false)?;
    let child = content.maybe_child(index);
    let (index_to, offset_to) = content.find_index(to, false)?;
    if offset == from || child.is_some_and(Node::is_text) {
        let end_is_text = content.maybe_child(index_to).is_some_and(Node::is_text);
        if offset_to != to && !end_is_text {
            return Err(ModelError::replace("removing non-flat range"));
        }
        return Ok(content.cut(0, from).append(&content.cut(to, content.size())));
    }
    if index != index_to {
        return Err(ModelError::replace("removing non-flat range"));
    }
    let child = content
        .maybe_child(index)
        .ok_or_else(|| ModelError::replace("removing non-flat range"))?;
    let inner = remove_range(child.content(), from - offset - 1, to - offset - 1)?;
    Ok(content.replace_child(index, child.copy(inner)))
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.content, self.open_start, self.open_end)
    }
}

impl fmt::Debug for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
