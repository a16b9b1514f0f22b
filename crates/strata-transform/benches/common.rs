// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
use strata_model::Node;
use strata_model::build::{Item, block, doc, styled};

#[allow(dead_code)]
pub fn paragraph(text: &str) -> Item {
    block("paragraph", None, vec![text.into()]).unwrap()
}

/// A document of `sections` headed sections, each with a few paragraphs, a
/// quote and a short list.
#[allow(dead_code)]
pub fn generate_document(sections: usize) -> Node {
    let mut items = Vec::new();
    for section in 0..sections {
        items.push(
            block(
                "heading",
                Some(&strata_model::attrs([("level", 2i64)])),
                vec![format!("Section {section}").as_str().into()],
            )
            .unwrap(),
        );
        items.push(
            block(
                "paragraph",
                None,
                vec![
                    "Some paragraph content with ".into(),
                    styled("em", None, vec!["styled".into()]).unwrap(),
                    " text in it.".into(),
                ],
            )
            .unwrap(),
        );
        items.push(
            block(
                "blockquote",
                None,
                vec![paragraph("A quoted remark."), paragraph("And another.")],
            )
            .unwrap(),
        );
        let list_item = |text: &str| block("list_item", None, vec![paragraph(text)]).unwrap();
        items.push(
            block(
                "bullet_list",
                None,
                vec![list_item("first"), list_item("second"), list_item("third")],
            )
            .unwrap(),
        );
    }
    doc(items).unwrap().node
}

/// The position just inside the first textblock at or after `pos`.
#[allow(dead_code)]
pub fn text_position(doc: &Node, pos: usize) -> usize {
    let mut found = None;
    doc.nodes_between(pos, doc.content_size(), |node, at, _, _| {
        if found.is_some() {
            return false;
        }
        if node.is_textblock() {
            found = Some(at + 1);
            return false;
        }
        true
    });
    found.unwrap_or(pos)
}
