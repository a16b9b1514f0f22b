use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attrs::AttrValue;

/// Serializable description of a schema. Turned into a [`Schema`](super::Schema)
/// with [`Schema::new`](super::Schema::new).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSpec {
    /// Name of the node type used as the document root.
    pub top: String,
    /// Node types, in declaration order. Order matters: group expansion and
    /// wrapping searches follow it.
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub styles: Vec<StyleSpec>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    /// Content expression, e.g. `"block+"` or `"(text | hard_break)*"`.
    /// Empty for leaf nodes.
    #[serde(default)]
    pub content: String,
    /// Space separated group names this type belongs to.
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub inline: bool,
    #[serde(default)]
    pub atom: bool,
    /// Styles allowed on inline content. `None` allows every style.
    #[serde(default)]
    pub marks: Option<Vec<String>>,
    /// Marks a node holding code. Informational; the style policy is
    /// governed by `marks`.
    #[serde(default)]
    pub code: bool,
    #[serde(default)]
    pub attrs: BTreeMap<String, AttrSpec>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleSpec {
    pub name: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, AttrSpec>,
}

/// An attribute declaration. Attributes without a default are required.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttrSpec {
    #[serde(default)]
    pub default: Option<AttrValue>,
}

impl AttrSpec {
    pub fn required() -> Self {
        Self { default: None }
    }

    pub fn with_default(value: impl Into<AttrValue>) -> Self {
        Self {
            default: Some(value.into()),
        }
    }
}

impl NodeSpec {
    fn new(name: &str, content: &str, group: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
            group: group.map(str::to_string),
            ..Default::default()
        }
    }

    fn attr(mut self, name: &str, spec: AttrSpec) -> Self {
        self.attrs.insert(name.to_string(), spec);
        self
    }
}

impl SchemaSpec {
    /// The built-in rich text schema: paragraphs, headings, quotes, lists,
    /// code blocks and rules, with emphasis, strong, code and link styles.
    pub fn basic() -> Self {
        let nodes = vec![
            NodeSpec::new("doc", "block+", None),
            NodeSpec::new("paragraph", "inline*", Some("block")),
            NodeSpec::new("blockquote", "block*", Some("block")),
            NodeSpec::new("horizontal_rule", "", Some("block")),
            NodeSpec::new("heading", "inline*", Some("block"))
                .attr("level", AttrSpec::with_default(1i64)),
            NodeSpec {
                marks: Some(Vec::new()),
                code: true,
                ..NodeSpec::new("code_block", "text*", Some("block"))
            },
            NodeSpec::new("ordered_list", "list_item+", Some("block"))
                .attr("order", AttrSpec::with_default(1i64)),
            NodeSpec::new("bullet_list", "list_item+", Some("block")),
            NodeSpec::new("list_item", "block+", None),
            NodeSpec {
                inline: true,
                ..NodeSpec::new("text", "", Some("inline"))
            },
            NodeSpec {
                inline: true,
                atom: true,
                ..NodeSpec::new("hard_break", "", Some("inline"))
            },
        ];

        let styles = vec![
            StyleSpec {
                name: "em".to_string(),
                attrs: BTreeMap::new(),
            },
            StyleSpec {
                name: "strong".to_string(),
                attrs: BTreeMap::new(),
            },
            StyleSpec {
                name: "code".to_string(),
                attrs: BTreeMap::new(),
            },
            StyleSpec {
                name: "link".to_string(),
                attrs: BTreeMap::from([("href".to_string(), AttrSpec::required())]),
            },
        ];

        Self {
            top: "doc".to_string(),
            nodes,
            styles,
        }
    }
}
