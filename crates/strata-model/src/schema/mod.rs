//! The content-model table.
//!
//! A [`Schema`] is built once from a [`SchemaSpec`] and then consulted by
//! every part of the engine that needs to know what may go where:
//! [`NodeType::allows_child`], [`NodeType::valid_content`],
//! [`NodeType::allows_style`] and [`Schema::find_wrapping`].

mod spec;

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, LazyLock};

pub use spec::{AttrSpec, NodeSpec, SchemaSpec, StyleSpec};

use crate::attrs::Attrs;
use crate::error::ModelError;
use crate::fragment::Fragment;
use crate::node::Node;
use crate::style::{Style, StyleSet};

static BASIC: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(SchemaSpec::basic()).expect("built-in schema spec is valid")
});

/// Allowed children of a node type plus the minimum child count.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ContentRule {
    allowed: Vec<usize>,
    min: usize,
}

#[derive(Debug)]
struct NodeTypeData {
    name: String,
    groups: Vec<String>,
    inline: bool,
    atom: bool,
    code: bool,
    content: ContentRule,
    /// `None` allows every style.
    styles: Option<Vec<usize>>,
    attrs: BTreeMap<String, AttrSpec>,
}

#[derive(Debug)]
struct StyleTypeData {
    name: String,
    attrs: BTreeMap<String, AttrSpec>,
}

#[derive(Debug)]
struct SchemaData {
    spec: SchemaSpec,
    nodes: Vec<NodeTypeData>,
    styles: Vec<StyleTypeData>,
    node_names: HashMap<String, usize>,
    style_names: HashMap<String, usize>,
    top: usize,
    text: usize,
}

/// A compiled schema. Cheap to clone; node and style types hold a handle to
/// the schema they belong to.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<SchemaData>,
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Schema {}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("top", &self.inner.spec.top)
            .field("nodes", &self.inner.nodes.len())
            .field("styles", &self.inner.styles.len())
            .finish()
    }
}

impl Schema {
    /// Compile a schema spec, validating names and content expressions.
    pub fn new(spec: SchemaSpec) -> Result<Self, ModelError> {
        let mut node_names = HashMap::new();
        for (i, node) in spec.nodes.iter().enumerate() {
            if node_names.insert(node.name.clone(), i).is_some() {
                return Err(ModelError::InvalidSchema(format!(
                    "duplicate node type {}",
                    node.name
                )));
            }
        }
        let mut style_names = HashMap::new();
        for (i, style) in spec.styles.iter().enumerate() {
            if style_names.insert(style.name.clone(), i).is_some() {
                return Err(ModelError::InvalidSchema(format!(
                    "duplicate style type {}",
                    style.name
                )));
            }
        }

        let top = *node_names
            .get(&spec.top)
            .ok_or_else(|| ModelError::InvalidSchema(format!("missing top node {}", spec.top)))?;
        let text = *node_names
            .get("text")
            .ok_or_else(|| ModelError::InvalidSchema("missing text node type".to_string()))?;

        let groups: Vec<Vec<String>> = spec
            .nodes
            .iter()
            .map(|n| {
                n.group
                    .as_deref()
                    .unwrap_or_default()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect()
            })
            .collect();

        let mut nodes = Vec::with_capacity(spec.nodes.len());
        for (i, node) in spec.nodes.iter().enumerate() {
            let content = parse_content(&node.content, &node_names, &groups).map_err(|msg| {
                ModelError::InvalidSchema(format!("{}: {msg}", node.name))
            })?;
            if i == text && !content.allowed.is_empty() {
                return Err(ModelError::InvalidSchema(
                    "text node type cannot have content".to_string(),
                ));
            }
            let styles = match &node.marks {
                None => None,
                Some(names) => Some(
                    names
                        .iter()
                        .map(|name| {
                            style_names.get(name).copied().ok_or_else(|| {
                                ModelError::InvalidSchema(format!(
                                    "{}: unknown style {name}",
                                    node.name
                                ))
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                ),
            };
            nodes.push(NodeTypeData {
                name: node.name.clone(),
                groups: groups[i].clone(),
                inline: node.inline || i == text,
                atom: node.atom,
                code: node.code,
                content,
                styles,
                attrs: node.attrs.clone(),
            });
        }

        let styles = spec
            .styles
            .iter()
            .map(|s| StyleTypeData {
                name: s.name.clone(),
                attrs: s.attrs.clone(),
            })
            .collect();

        Ok(Self {
            inner: Arc::new(SchemaData {
                spec,
                nodes,
                styles,
                node_names,
                style_names,
                top,
                text,
            }),
        })
    }

    /// The built-in schema, shared by every caller.
    pub fn basic() -> Self {
        BASIC.clone()
    }

    pub fn spec(&self) -> &SchemaSpec {
        &self.inner.spec
    }

    pub fn top_node_type(&self) -> NodeType {
        self.node_handle(self.inner.top)
    }

    pub fn text_type(&self) -> NodeType {
        self.node_handle(self.inner.text)
    }

    pub fn node_type(&self, name: &str) -> Option<NodeType> {
        self.inner
            .node_names
            .get(name)
            .map(|&i| self.node_handle(i))
    }

    pub fn style_type(&self, name: &str) -> Option<StyleType> {
        self.inner
            .style_names
            .get(name)
            .map(|&i| self.style_handle(i))
    }

    /// All node types in declaration order.
    pub fn node_types(&self) -> impl Iterator<Item = NodeType> + '_ {
        (0..self.inner.nodes.len()).map(|i| self.node_handle(i))
    }

    /// Create a node of the named type. Content is not validated.
    pub fn node(
        &self,
        name: &str,
        attrs: Option<&Attrs>,
        content: Fragment,
    ) -> Result<Node, ModelError> {
        let node_type = self
            .node_type(name)
            .ok_or_else(|| ModelError::UnknownNodeType(name.to_string()))?;
        node_type.create(attrs, content, StyleSet::empty())
    }

    /// Create a text node.
    pub fn text(&self, text: impl Into<String>, styles: StyleSet) -> Node {
        Node::new_text(self.text_type(), text.into(), styles)
    }

    pub fn style(&self, name: &str, attrs: Option<&Attrs>) -> Result<Style, ModelError> {
        let style_type = self
            .style_type(name)
            .ok_or_else(|| ModelError::UnknownStyleType(name.to_string()))?;
        style_type.create(attrs)
    }

    /// Shortest chain of wrapper types that makes `inner` valid content of
    /// `outer`. `Some(vec![])` when `outer` accepts `inner` directly.
    pub fn find_wrapping(&self, outer: &NodeType, inner: &NodeType) -> Option<Vec<NodeType>> {
        let mut seen = HashSet::from([outer.index]);
        let mut queue = VecDeque::from([(outer.index, Vec::<usize>::new())]);
        while let Some((current, path)) = queue.pop_front() {
            let data = &self.inner.nodes[current];
            if data.content.allowed.contains(&inner.index) {
                return Some(path.into_iter().map(|i| self.node_handle(i)).collect());
            }
            for &child in &data.content.allowed {
                let candidate = &self.inner.nodes[child];
                let usable = !candidate.inline
                    && !candidate.content.allowed.is_empty()
                    && !has_required_attrs(&candidate.attrs);
                if usable && seen.insert(child) {
                    let mut next = path.clone();
                    next.push(child);
                    queue.push_back((child, next));
                }
            }
        }
        None
    }

    fn node_handle(&self, index: usize) -> NodeType {
        NodeType {
            schema: self.clone(),
            index,
        }
    }

    fn style_handle(&self, index: usize) -> StyleType {
        StyleType {
            schema: self.clone(),
            index,
        }
    }
}

fn parse_content(
    expr: &str,
    node_names: &HashMap<String, usize>,
    groups: &[Vec<String>],
) -> Result<ContentRule, String> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Ok(ContentRule {
            allowed: Vec::new(),
            min: 0,
        });
    }
    let (body, min) = if let Some(body) = expr.strip_suffix('*') {
        (body, 0)
    } else if let Some(body) = expr.strip_suffix('+') {
        (body, 1)
    } else {
        return Err(format!("content expression {expr:?} must end in * or +"));
    };
    let body = body.trim();
    let body = body
        .strip_prefix('(')
        .and_then(|b| b.strip_suffix(')'))
        .unwrap_or(body);

    let mut allowed = Vec::new();
    for item in body.split('|').map(str::trim) {
        if item.is_empty() {
            return Err(format!("empty item in content expression {expr:?}"));
        }
        let matches: Vec<usize> = match node_names.get(item) {
            Some(&i) => vec![i],
            None => groups
                .iter()
                .enumerate()
                .filter(|(_, g)| g.iter().any(|name| name == item))
                .map(|(i, _)| i)
                .collect(),
        };
        if matches.is_empty() {
            return Err(format!("unknown node type or group {item}"));
        }
        for i in matches {
            if !allowed.contains(&i) {
                allowed.push(i);
            }
        }
    }
    Ok(ContentRule { allowed, min })
}

fn has_required_attrs(attrs: &BTreeMap<String, AttrSpec>) -> bool {
    attrs.values().any(|a| a.default.is_none())
}

fn compute_attrs(
    owner: &str,
    specs: &BTreeMap<String, AttrSpec>,
    given: Option<&Attrs>,
) -> Result<Attrs, ModelError> {
    let mut attrs = Attrs::new();
    for (name, spec) in specs {
        let value = given
            .and_then(|g| g.get(name))
            .or(spec.default.as_ref())
            .cloned()
            .ok_or_else(|| ModelError::MissingAttr {
                owner: owner.to_string(),
                attr: name.clone(),
            })?;
        attrs.insert(name.clone(), value);
    }
    Ok(attrs)
}

/// Handle to a node type within a schema.
#[derive(Clone)]
pub struct NodeType {
    schema: Schema,
    index: usize,
}

impl PartialEq for NodeType {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.schema == other.schema
    }
}

impl Eq for NodeType {}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeType({})", self.name())
    }
}

impl NodeType {
    fn data(&self) -> &NodeTypeData {
        &self.schema.inner.nodes[self.index]
    }

    pub fn name(&self) -> &str {
        &self.data().name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn groups(&self) -> &[String] {
        &self.data().groups
    }

    pub fn is_text(&self) -> bool {
        self.index == self.schema.inner.text
    }

    pub fn is_inline(&self) -> bool {
        self.data().inline
    }

    pub fn is_block(&self) -> bool {
        !self.is_inline()
    }

    pub fn is_leaf(&self) -> bool {
        self.data().content.allowed.is_empty()
    }

    /// Atoms are treated as a single unit: leaves and explicitly atomic types.
    pub fn is_atom(&self) -> bool {
        self.data().atom || self.is_leaf()
    }

    pub fn is_code(&self) -> bool {
        self.data().code
    }

    /// True when every allowed child is inline.
    pub fn inline_content(&self) -> bool {
        let nodes = &self.schema.inner.nodes;
        let allowed = &self.data().content.allowed;
        !allowed.is_empty() && allowed.iter().all(|&i| nodes[i].inline)
    }

    pub fn is_textblock(&self) -> bool {
        self.is_block() && self.inline_content()
    }

    /// Minimum number of children a node of this type must hold.
    pub fn content_min(&self) -> usize {
        self.data().content.min
    }

    pub fn allows_child(&self, child: &NodeType) -> bool {
        child.schema == self.schema && self.data().content.allowed.contains(&child.index)
    }

    /// Allowed child types, in declaration order.
    pub fn allowed_children(&self) -> Vec<NodeType> {
        self.data()
            .content
            .allowed
            .iter()
            .map(|&i| self.schema.node_handle(i))
            .collect()
    }

    pub fn allows_style(&self, style: &StyleType) -> bool {
        match &self.data().styles {
            None => true,
            Some(allowed) => allowed.contains(&style.index),
        }
    }

    pub fn allows_styles(&self, styles: &StyleSet) -> bool {
        styles.iter().all(|s| self.allows_style(s.style_type()))
    }

    /// Check a content fragment against this type's content rule and style
    /// policy.
    pub fn valid_content(&self, content: &Fragment) -> bool {
        content.child_count() >= self.content_min()
            && content
                .iter()
                .all(|child| self.allows_child(child.node_type()) && self.allows_styles(child.styles()))
    }

    /// Two types with overlapping allowed children can have their content
    /// joined.
    pub fn compatible_content(&self, other: &NodeType) -> bool {
        self == other
            || self
                .data()
                .content
                .allowed
                .iter()
                .any(|i| other.data().content.allowed.contains(i))
    }

    pub fn has_required_attrs(&self) -> bool {
        has_required_attrs(&self.data().attrs)
    }

    /// Fill in defaults for missing attributes and drop unknown ones.
    pub fn compute_attrs(&self, given: Option<&Attrs>) -> Result<Attrs, ModelError> {
        compute_attrs(self.name(), &self.data().attrs, given)
    }

    /// Create a node of this type. Content is not checked; see
    /// [`NodeType::create_checked`].
    pub fn create(
        &self,
        attrs: Option<&Attrs>,
        content: Fragment,
        styles: StyleSet,
    ) -> Result<Node, ModelError> {
        if self.is_text() {
            return Err(ModelError::InvalidContent {
                node_type: self.name().to_string(),
            });
        }
        let attrs = self.compute_attrs(attrs)?;
        Ok(Node::new(self.clone(), attrs, content, styles))
    }

    pub fn create_checked(
        &self,
        attrs: Option<&Attrs>,
        content: Fragment,
        styles: StyleSet,
    ) -> Result<Node, ModelError> {
        if !self.valid_content(&content) {
            return Err(ModelError::InvalidContent {
                node_type: self.name().to_string(),
            });
        }
        self.create(attrs, content, styles)
    }
}

/// Handle to a style type within a schema. The declaration index is the
/// style's rank, which orders style sets.
#[derive(Clone)]
pub struct StyleType {
    schema: Schema,
    index: usize,
}

impl PartialEq for StyleType {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.schema == other.schema
    }
}

impl Eq for StyleType {}

impl fmt::Debug for StyleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StyleType({})", self.name())
    }
}

impl StyleType {
    fn data(&self) -> &StyleTypeData {
        &self.schema.inner.styles[self.index]
    }

    pub fn name(&self) -> &str {
        &self.data().name
    }

    pub fn rank(&self) -> usize {
        self.index
    }

    pub fn create(&self, attrs: Option<&Attrs>) -> Result<Style, ModelError> {
        let attrs = compute_attrs(self.name(), &self.data().attrs, attrs)?;
        Ok(Style::new(self.clone(), attrs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::attrs;
    use rstest::rstest;

    fn node(name: &str) -> NodeType {
        Schema::basic().node_type(name).unwrap()
    }

    #[test]
    fn basic_schema_is_shared() {
        assert_eq!(Schema::basic(), Schema::basic());
        assert_eq!(node("paragraph"), node("paragraph"));
    }

    #[rstest]
    #[case("doc", "paragraph", true)]
    #[case("doc", "list_item", false)]
    #[case("doc", "text", false)]
    #[case("paragraph", "text", true)]
    #[case("paragraph", "hard_break", true)]
    #[case("bullet_list", "list_item", true)]
    #[case("list_item", "bullet_list", true)]
    #[case("code_block", "hard_break", false)]
    #[case("horizontal_rule", "text", false)]
    fn allows_child(#[case] parent: &str, #[case] child: &str, #[case] expected: bool) {
        assert_eq!(node(parent).allows_child(&node(child)), expected);
    }

    #[rstest]
    #[case("paragraph", true)]
    #[case("heading", true)]
    #[case("code_block", true)]
    #[case("blockquote", false)]
    #[case("horizontal_rule", false)]
    #[case("text", false)]
    fn textblocks(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(node(name).is_textblock(), expected);
    }

    #[test]
    fn code_block_forbids_styles() {
        let schema = Schema::basic();
        let strong = schema.style_type("strong").unwrap();
        assert!(!node("code_block").allows_style(&strong));
        assert!(node("paragraph").allows_style(&strong));
        assert!(node("code_block").is_code());
    }

    #[test]
    fn atoms_and_leaves() {
        assert!(node("horizontal_rule").is_atom());
        assert!(node("hard_break").is_atom());
        assert!(node("hard_break").is_inline());
        assert!(!node("paragraph").is_atom());
    }

    #[test]
    fn find_wrapping_for_list() {
        let schema = Schema::basic();
        let wrap = schema
            .find_wrapping(&node("bullet_list"), &node("paragraph"))
            .unwrap();
        assert_eq!(wrap, vec![node("list_item")]);
        assert_eq!(
            schema.find_wrapping(&node("doc"), &node("paragraph")),
            Some(vec![])
        );
        assert_eq!(
            schema.find_wrapping(&node("doc"), &node("text")),
            Some(vec![node("paragraph")])
        );
        assert_eq!(
            schema.find_wrapping(&node("code_block"), &node("paragraph")),
            None
        );
    }

    #[test]
    fn attrs_fall_back_to_defaults() {
        let computed = node("heading").compute_attrs(None).unwrap();
        assert_eq!(computed, attrs([("level", 1i64)]));
        let computed = node("heading")
            .compute_attrs(Some(&attrs([("level", 2i64)])))
            .unwrap();
        assert_eq!(computed, attrs([("level", 2i64)]));
    }

    #[test]
    fn missing_required_style_attr() {
        let err = Schema::basic().style("link", None).unwrap_err();
        assert_eq!(
            err,
            ModelError::MissingAttr {
                owner: "link".into(),
                attr: "href".into()
            }
        );
    }

    #[test]
    fn rejects_unknown_content_item() {
        let mut spec = SchemaSpec::basic();
        spec.nodes[1].content = "widget*".into();
        let err = Schema::new(spec).unwrap_err();
        assert!(matches!(err, ModelError::InvalidSchema(msg) if msg.contains("widget")));
    }

    #[test]
    fn rejects_missing_text_type() {
        let mut spec = SchemaSpec::basic();
        spec.nodes.retain(|n| n.name != "text");
        spec.nodes[1].content = "hard_break*".into();
        assert!(matches!(
            Schema::new(spec),
            Err(ModelError::InvalidSchema(_))
        ));
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut spec = SchemaSpec::basic();
        let dup = spec.nodes[1].clone();
        spec.nodes.push(dup);
        assert!(matches!(
            Schema::new(spec),
            Err(ModelError::InvalidSchema(msg)) if msg.contains("duplicate")
        ));
    }
}
