#[macro_use]
mod support;

use strata_model::Node;
use strata_transform::{Transform, TransformError};
use support::*;

fn ins(input: Tagged, nodes: Vec<Node>, expect: Tagged) {
    init_logging();
    let mut tr = Transform::new(input.node.clone());
    tr.insert(tag(&input, "a"), &nodes).unwrap();
    check_transform(&input, &tr, &expect);
}

#[test]
fn inline_break() {
    ins(
        doc!(p!("hello<a>there")),
        vec![node(br())],
        doc!(p!("hello", br(), "<a>there")),
    );
}

#[test]
fn block_between_blocks() {
    ins(
        doc!(p!("one"), "<a>", p!("two<2>")),
        vec![node(p!())],
        doc!(p!("one"), p!(), "<a>", p!("two<2>")),
    );
}

#[test]
fn two_blocks() {
    ins(
        doc!(p!("one"), "<a>", p!("two<2>")),
        vec![node(p!("hi")), node(hr())],
        doc!(p!("one"), p!("hi"), hr(), "<a>", p!("two<2>")),
    );
}

#[test]
fn at_end_of_blockquote() {
    ins(
        doc!(blockquote!(p!("he<before>y"), "<a>"), p!("after<after>")),
        vec![node(p!())],
        doc!(blockquote!(p!("he<before>y"), p!()), p!("after<after>")),
    );
}

#[test]
fn at_start_of_blockquote() {
    ins(
        doc!(blockquote!("<a>", p!("he<1>y")), p!("after<2>")),
        vec![node(p!())],
        doc!(blockquote!(p!(), p!("he<1>y")), p!("after<2>")),
    );
}

#[test]
fn block_inside_text_splits_the_textblock() {
    ins(
        doc!(p!("he<a>llo")),
        vec![node(p!())],
        doc!(p!("he"), p!(), p!("<a>llo")),
    );
}

#[test]
fn text_at_block_level_is_wrapped() {
    init_logging();
    let input = doc!(p!("one"), "<a>", hr());
    let text = input.node.child(0).child(0).cut(0, 3);
    let mut tr = Transform::new(input.node.clone());
    tr.insert(tag(&input, "a"), &[text]).unwrap();
    check_transform(&input, &tr, &doc!(p!("one"), p!("one"), "<a>", hr()));
}

#[test]
fn empty_list_is_rejected() {
    let input = doc!(p!("<a>x"));
    let mut tr = Transform::new(input.node.clone());
    let err = tr.insert(tag(&input, "a"), &[]).unwrap_err();
    assert!(matches!(err, TransformError::InvalidArgument(_)));
    check_no_change(&input, &tr);
}
