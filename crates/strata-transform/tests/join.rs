#[macro_use]
mod support;

use strata_transform::Transform;
use support::*;

fn join(input: Tagged, expect: Tagged) {
    init_logging();
    let mut tr = Transform::new(input.node.clone());
    tr.join(tag(&input, "a")).unwrap();
    check_transform(&input, &tr, &expect);
}

#[test]
fn quotes() {
    join(
        doc!(
            blockquote!(p!("<before>a")),
            "<a>",
            blockquote!(p!("b")),
            p!("after<after>")
        ),
        doc!(
            blockquote!(p!("<before>a"), "<a>", p!("b")),
            p!("after<after>")
        ),
    );
}

#[test]
fn nested_quotes() {
    join(
        doc!(blockquote!(
            blockquote!(p!("a"), p!("b<before>")),
            "<a>",
            blockquote!(p!("c"), p!("d<after>"))
        )),
        doc!(blockquote!(blockquote!(
            p!("a"),
            p!("b<before>"),
            "<a>",
            p!("c"),
            p!("d<after>")
        ))),
    );
}

#[test]
fn lists() {
    join(
        doc!(
            ol!(li!(p!("one")), li!(p!("two"))),
            "<a>",
            ol!(li!(p!("three")))
        ),
        doc!(ol!(li!(p!("one")), li!(p!("two")), "<a>", li!(p!("three")))),
    );
}

#[test]
fn list_items() {
    join(
        doc!(ol!(li!(p!("one")), li!(p!("two")), "<a>", li!(p!("three")))),
        doc!(ol!(li!(p!("one")), li!(p!("two"), "<a>", p!("three")))),
    );
}

#[test]
fn textblocks() {
    join(
        doc!(p!("foo"), "<a>", p!("bar")),
        doc!(p!("foo<a>bar")),
    );
}

#[test]
fn from_the_end_of_a_block() {
    join(doc!(p!("foo<a>"), p!("bar")), doc!(p!("foo<a>bar")));
}

#[test]
fn different_types_stay_apart() {
    init_logging();
    let input = doc!(p!("foo"), "<a>", blockquote!(p!("bar")));
    let mut tr = Transform::new(input.node.clone());
    tr.join(tag(&input, "a")).unwrap();
    check_no_change(&input, &tr);
}

#[test]
fn undoes_a_split() {
    init_logging();
    let input = doc!(p!("foo<a>bar"));
    let a = tag(&input, "a");
    let mut tr = Transform::new(input.node.clone());
    tr.split(a, 1, None).unwrap().join(a + 1).unwrap();
    assert_eq!(tr.steps().len(), 2);
    assert_eq!(tr.doc(), &input.node);
}
