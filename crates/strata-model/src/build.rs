//! Compact construction of documents for tests and tools.
//!
//! Strings may contain `<name>` tags, which are stripped from the text and
//! recorded as positions in the finished document:
//!
//! ```
//! use strata_model::build::{block, doc};
//!
//! let d = doc(vec![block("paragraph", None, vec!["foo<a>bar".into()]).unwrap()]).unwrap();
//! assert_eq!(d.tag("a"), Some(4));
//! assert_eq!(d.node.to_string(), r#"doc(paragraph("foobar"))"#);
//! ```

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::attrs::Attrs;
use crate::error::ModelError;
use crate::fragment::Fragment;
use crate::node::Node;
use crate::schema::Schema;
use crate::style::StyleSet;

/// A flat run of nodes plus the tags found in it, relative to its start.
#[derive(Debug, Clone, Default)]
pub struct Item {
    nodes: Vec<Node>,
    tags: Vec<(String, usize)>,
}

impl Item {
    fn size(&self) -> usize {
        self.nodes.iter().map(Node::node_size).sum()
    }
}

impl From<&str> for Item {
    fn from(text: &str) -> Self {
        static TAG: OnceLock<Regex> = OnceLock::new();
        let tag = TAG.get_or_init(|| Regex::new(r"<(\w+)>").expect("Invalid tag regex"));

        let schema = Schema::basic();
        let mut nodes = Vec::new();
        let mut tags = Vec::new();
        let mut plain = String::new();
        let mut last = 0;
        for caps in tag.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            plain.push_str(&text[last..whole.start()]);
            tags.push((caps[1].to_string(), plain.chars().count()));
            last = whole.end();
        }
        plain.push_str(&text[last..]);
        if !plain.is_empty() {
            nodes.push(schema.text(plain, StyleSet::empty()));
        }
        Self { nodes, tags }
    }
}

impl From<Node> for Item {
    fn from(node: Node) -> Self {
        Self {
            nodes: vec![node],
            tags: Vec::new(),
        }
    }
}

/// A built document and the positions of its tags.
#[derive(Debug, Clone)]
pub struct Tagged {
    pub node: Node,
    pub tags: BTreeMap<String, usize>,
}

impl Tagged {
    pub fn tag(&self, name: &str) -> Option<usize> {
        self.tags.get(name).copied()
    }
}

fn flatten(items: Vec<Item>) -> Item {
    let mut flat = Item::default();
    let mut pos = 0;
    for item in items {
        let size = item.size();
        flat.tags
            .extend(item.tags.into_iter().map(|(name, at)| (name, at + pos)));
        flat.nodes.extend(item.nodes);
        pos += size;
    }
    flat
}

/// A node of the named type holding `items`. Tags inside move one position
/// in, past the node's opening boundary.
pub fn block(name: &str, attrs: Option<&Attrs>, items: Vec<Item>) -> Result<Item, ModelError> {
    let flat = flatten(items);
    let node = Schema::basic().node(name, attrs, Fragment::from_vec(flat.nodes))?;
    Ok(Item {
        nodes: vec![node],
        tags: flat
            .tags
            .into_iter()
            .map(|(name, at)| (name, at + 1))
            .collect(),
    })
}

/// Add the named style to every node in `items`.
pub fn styled(name: &str, attrs: Option<&Attrs>, items: Vec<Item>) -> Result<Item, ModelError> {
    let style = Schema::basic().style(name, attrs)?;
    let flat = flatten(items);
    Ok(Item {
        nodes: flat
            .nodes
            .into_iter()
            .map(|node| {
                let styles = style.add_to_set(node.styles());
                node.mark(styles)
            })
            .collect(),
        tags: flat.tags,
    })
}

/// A node without content, such as `hard_break` or `horizontal_rule`.
pub fn leaf(name: &str) -> Result<Item, ModelError> {
    let node = Schema::basic().node(name, None, Fragment::empty())?;
    Ok(node.into())
}

/// A document holding `items`. Tags are positions in the document's content.
pub fn doc(items: Vec<Item>) -> Result<Tagged, ModelError> {
    let flat = flatten(items);
    let node = Schema::basic().node("doc", None, Fragment::from_vec(flat.nodes))?;
    Ok(Tagged {
        node,
        tags: flat.tags.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::attrs;
    use pretty_assertions::assert_eq;

    #[test]
    fn tags_are_absolute() {
        let d = doc(vec![
            block("paragraph", None, vec!["<a>one".into()]).unwrap(),
            block(
                "blockquote",
                None,
                vec![block("paragraph", None, vec!["t<b>wo".into()]).unwrap()],
            )
            .unwrap(),
            "<c>".into(),
        ])
        .unwrap();
        assert_eq!(d.tag("a"), Some(1));
        assert_eq!(d.tag("b"), Some(8));
        assert_eq!(d.tag("c"), Some(12));
        assert_eq!(d.tag("missing"), None);
    }

    #[test]
    fn styles_wrap_text_and_merge() {
        let link = attrs([("href", "http://foo")]);
        let d = doc(vec![block(
            "paragraph",
            None,
            vec![
                styled("em", None, vec!["a".into()]).unwrap(),
                styled("em", None, vec!["b".into()]).unwrap(),
                styled("link", Some(&link), vec!["c".into()]).unwrap(),
            ],
        )
        .unwrap()])
        .unwrap();
        assert_eq!(d.node.to_string(), r#"doc(paragraph(em("ab"), link("c")))"#);
    }

    #[test]
    fn leaves_and_attrs() {
        let level = attrs([("level", 2i64)]);
        let d = doc(vec![
            block("heading", Some(&level), vec!["h".into()]).unwrap(),
            leaf("horizontal_rule").unwrap(),
        ])
        .unwrap();
        assert_eq!(d.node.child(0).attr("level").and_then(|v| v.as_int()), Some(2));
        assert_eq!(d.node.to_string(), r#"doc(heading("h"), horizontal_rule)"#);
        assert!(block("widget", None, vec![]).is_err());
    }
}
