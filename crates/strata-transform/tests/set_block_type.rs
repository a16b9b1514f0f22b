#[macro_use]
mod support;

use strata_transform::{Markup, Transform, TransformError};
use support::*;

fn set_type(input: Tagged, markup: Markup, expect: Tagged) {
    init_logging();
    let a = tag(&input, "a");
    let b = input.tag("b").unwrap_or(a);
    let mut tr = Transform::new(input.node.clone());
    tr.set_block_type(a, b, &markup).unwrap();
    check_transform(&input, &tr, &expect);
}

#[test]
fn paragraph_to_heading() {
    set_type(
        doc!(p!("am<a> i")),
        markup("heading", Some(level(2))),
        doc!(h2!("am i")),
    );
}

#[test]
fn several_blocks() {
    set_type(
        doc!(h1!("<a>hello"), p!("there"), p!("<b>you"), p!("end")),
        markup("code_block", None),
        doc!(pre!("hello"), pre!("there"), pre!("you"), p!("end")),
    );
}

#[test]
fn inside_a_quote() {
    set_type(
        doc!(blockquote!(p!("one<a>"), p!("two<b>"))),
        markup("heading", Some(level(1))),
        doc!(blockquote!(h1!("one<a>"), h1!("two<b>"))),
    );
}

#[test]
fn code_block_strips_styles() {
    set_type(
        doc!(p!("hello<a> ", em!("world"))),
        markup("code_block", None),
        doc!(pre!("hello<a> world")),
    );
}

#[test]
fn heading_keeps_styles() {
    set_type(
        doc!(p!("hello<a> ", em!("world"))),
        markup("heading", Some(level(1))),
        doc!(h1!("hello<a> ", em!("world"))),
    );
}

#[test]
fn code_block_drops_breaks() {
    set_type(
        doc!(p!("a<a>", br(), "b")),
        markup("code_block", None),
        doc!(pre!("a<a>b")),
    );
}

#[test]
fn same_type_is_left_alone() {
    init_logging();
    let input = doc!(h1!("<a>x"));
    let mut tr = Transform::new(input.node.clone());
    let a = tag(&input, "a");
    tr.set_block_type(a, a, &markup("heading", Some(level(1))))
        .unwrap();
    check_no_change(&input, &tr);
}

#[test]
fn container_type_is_rejected() {
    let input = doc!(p!("<a>x"));
    let mut tr = Transform::new(input.node.clone());
    let a = tag(&input, "a");
    let err = tr
        .set_block_type(a, a, &markup("blockquote", None))
        .unwrap_err();
    assert!(matches!(err, TransformError::InvalidArgument(_)));
}
