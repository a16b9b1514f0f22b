#[macro_use]
mod support;

use strata_transform::Transform;
use support::*;

fn ins(input: Tagged, text: &str, expect: Tagged) {
    init_logging();
    let mut tr = Transform::new(input.node.clone());
    tr.insert_text(tag(&input, "a"), text).unwrap();
    check_transform(&input, &tr, &expect);
}

#[test]
fn at_end() {
    ins(doc!(p!("hello<a>")), " world", doc!(p!("hello world<a>")));
}

#[test]
fn inside() {
    ins(doc!(p!("he<a>llo")), "j", doc!(p!("hej<a>llo")));
}

#[test]
fn at_start() {
    ins(doc!(p!("<a>one")), "two ", doc!(p!("two <a>one")));
}

#[test]
fn inherits_surrounding_style() {
    ins(doc!(p!(em!("he<a>lo"))), "l", doc!(p!(em!("hel<a>lo"))));
}

#[test]
fn takes_the_style_before() {
    ins(
        doc!(p!(em!("hello<a>"), " world<after>")),
        " big",
        doc!(p!(em!("hello big<a>"), " world<after>")),
    );
}

#[test]
fn paths_around_the_insert() {
    ins(
        doc!(p!("<1>before"), p!("<2>here<a>"), p!("after<3>")),
        "!",
        doc!(p!("<1>before"), p!("<2>here!<a>"), p!("after<3>")),
    );
}

#[test]
fn after_a_break() {
    ins(
        doc!(p!("hello", br(), "<a>you")),
        "...",
        doc!(p!("hello", br(), "...<a>you")),
    );
}

#[test]
fn after_a_break_before_styled_text() {
    ins(
        doc!(p!("hello", br(), em!("<a>you"))),
        "...",
        doc!(p!("hello", br(), "...", em!("<a>you"))),
    );
}

#[test]
fn before_a_break() {
    ins(
        doc!(p!("<a>", br(), "ok")),
        "ay",
        doc!(p!("ay<a>", br(), "ok")),
    );
}

#[test]
fn between_blocks_gets_a_paragraph() {
    ins(
        doc!(p!("one"), "<a>", p!("two")),
        "x",
        doc!(p!("one"), p!("x"), "<a>", p!("two")),
    );
}

#[test]
fn empty_text_does_nothing() {
    init_logging();
    let input = doc!(p!("he<a>llo"));
    let mut tr = Transform::new(input.node.clone());
    tr.insert_text(tag(&input, "a"), "").unwrap();
    check_no_change(&input, &tr);
}
