// Shared by every integration test binary; each one uses a different subset.
#![allow(dead_code, unused_macros, unused_imports)]

use pretty_assertions::assert_eq;
use strata_model::build;
pub use strata_model::build::{Item, Tagged};
use strata_model::{Attrs, Node, Schema, Style, attrs};
use strata_transform::{Assoc, Mappable, Markup, Transform};

macro_rules! items {
    ($($x:expr),* $(,)?) => {
        vec![$($crate::support::Item::from($x)),*]
    };
}

macro_rules! doc {
    ($($x:expr),* $(,)?) => {
        $crate::support::doc_of(items![$($x),*])
    };
}

macro_rules! p {
    ($($x:expr),* $(,)?) => {
        $crate::support::block_of("paragraph", None, items![$($x),*])
    };
}

macro_rules! h1 {
    ($($x:expr),* $(,)?) => {
        $crate::support::block_of("heading", Some($crate::support::level(1)), items![$($x),*])
    };
}

macro_rules! h2 {
    ($($x:expr),* $(,)?) => {
        $crate::support::block_of("heading", Some($crate::support::level(2)), items![$($x),*])
    };
}

macro_rules! blockquote {
    ($($x:expr),* $(,)?) => {
        $crate::support::block_of("blockquote", None, items![$($x),*])
    };
}

macro_rules! pre {
    ($($x:expr),* $(,)?) => {
        $crate::support::block_of("code_block", None, items![$($x),*])
    };
}

macro_rules! ol {
    ($($x:expr),* $(,)?) => {
        $crate::support::block_of("ordered_list", None, items![$($x),*])
    };
}

macro_rules! ul {
    ($($x:expr),* $(,)?) => {
        $crate::support::block_of("bullet_list", None, items![$($x),*])
    };
}

macro_rules! li {
    ($($x:expr),* $(,)?) => {
        $crate::support::block_of("list_item", None, items![$($x),*])
    };
}

macro_rules! em {
    ($($x:expr),* $(,)?) => {
        $crate::support::styled_of("em", None, items![$($x),*])
    };
}

macro_rules! strong {
    ($($x:expr),* $(,)?) => {
        $crate::support::styled_of("strong", None, items![$($x),*])
    };
}

macro_rules! code {
    ($($x:expr),* $(,)?) => {
        $crate::support::styled_of("code", None, items![$($x),*])
    };
}

/// A link to `http://foo`, or to the given target with `a!(href: ..; ..)`.
macro_rules! a {
    (href: $href:expr; $($x:expr),* $(,)?) => {
        $crate::support::styled_of("link", Some($crate::support::href($href)), items![$($x),*])
    };
    ($($x:expr),* $(,)?) => {
        $crate::support::styled_of("link", Some($crate::support::href("http://foo")), items![$($x),*])
    };
}

pub fn doc_of(items: Vec<Item>) -> Tagged {
    build::doc(items).unwrap()
}

pub fn block_of(name: &str, attrs: Option<Attrs>, items: Vec<Item>) -> Item {
    build::block(name, attrs.as_ref(), items).unwrap()
}

pub fn styled_of(name: &str, attrs: Option<Attrs>, items: Vec<Item>) -> Item {
    build::styled(name, attrs.as_ref(), items).unwrap()
}

pub fn br() -> Item {
    build::leaf("hard_break").unwrap()
}

pub fn hr() -> Item {
    build::leaf("horizontal_rule").unwrap()
}

pub fn level(level: i64) -> Attrs {
    attrs([("level", level)])
}

pub fn href(target: &str) -> Attrs {
    attrs([("href", target)])
}

pub fn style(name: &str) -> Style {
    Schema::basic().style(name, None).unwrap()
}

pub fn link(target: &str) -> Style {
    Schema::basic().style("link", Some(&href(target))).unwrap()
}

pub fn markup(name: &str, attrs: Option<Attrs>) -> Markup {
    Markup::named(&Schema::basic(), name, attrs.as_ref()).unwrap()
}

/// A single node, for operations that take nodes rather than tagged items.
pub fn node(item: Item) -> Node {
    let d = build::doc(vec![item]).unwrap();
    d.node.child(0).clone()
}

pub fn tag(d: &Tagged, name: &str) -> usize {
    d.tag(name)
        .unwrap_or_else(|| panic!("no tag <{name}> in {}", d.node))
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Check a transform of `input` against `expect`:
///
/// - the result matches and the input document is untouched
/// - every tag present in both documents maps to its new position
/// - every position in the input maps back to itself through the inverse
///   mapping
/// - applying the inverted steps restores the input
pub fn check_transform(input: &Tagged, tr: &Transform, expect: &Tagged) {
    assert_eq!(tr.doc().to_string(), expect.node.to_string());
    assert_eq!(tr.doc(), &expect.node);
    assert!(tr.doc().check().is_ok(), "invalid result {}", tr.doc());
    assert!(Node::ptr_eq(tr.before(), &input.node));
    assert!(tr.skipped().is_empty(), "skipped steps: {:?}", tr.skipped());

    for (name, &pos) in &expect.tags {
        if let Some(orig) = input.tag(name) {
            assert_eq!(
                tr.mapping().map(orig, Assoc::After),
                pos,
                "mapping of tag <{name}>"
            );
        }
    }

    let round_trip = tr.inverse_mapping();
    for pos in 0..=input.node.content_size() {
        assert_eq!(round_trip.map(pos, Assoc::After), pos, "round trip of position {pos}");
    }

    let undo = Transform::apply(tr.doc().clone(), tr.invert().unwrap());
    assert!(undo.skipped().is_empty(), "inverse steps failed: {:?}", undo.skipped());
    assert_eq!(undo.doc(), &input.node);
}

/// Check that a transform left the document alone.
pub fn check_no_change(input: &Tagged, tr: &Transform) {
    assert!(!tr.doc_changed(), "unexpected steps: {:?}", tr.steps());
    assert!(Node::ptr_eq(tr.doc(), &input.node));
}
