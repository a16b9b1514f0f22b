use strata_model::{ModelError, Node, Slice};

use super::{check_range, collect};
use crate::error::TransformError;
use crate::fit::replace_step;
use crate::step::Step;
use crate::transform::Transform;

/// Delete the content between `from` and `to`.
///
/// Textblocks cut open on both sides of the range are joined. Ancestors whose
/// entire content falls inside the range and which may not be empty are
/// deleted along with it.
pub fn del(doc: &Node, from: usize, to: usize) -> Result<Vec<Step>, TransformError> {
    check_range(from, to)?;
    if from == to {
        return Ok(Vec::new());
    }
    Ok(collect(doc, "del", |tr| {
        let (from, to) = covered_range(tr.doc(), from, to)?;
        if let Some(step) = replace_step(tr.doc(), from, to, &Slice::empty())? {
            tr.step(step)?;
        }
        Ok(())
    }))
}

/// Widen `from..to` over the ancestors it empties that require content.
fn covered_range(doc: &Node, mut from: usize, mut to: usize) -> Result<(usize, usize), ModelError> {
    loop {
        let rfrom = doc.resolve(from)?;
        let depth = rfrom.shared_depth(to);
        if depth == 0 {
            break;
        }
        let covers = from == rfrom.start(depth) && to == rfrom.end(depth);
        if !covers || rfrom.node(depth).node_type().content_min() == 0 {
            break;
        }
        from = rfrom.before(depth)?;
        to = rfrom.after(depth)?;
    }
    Ok((from, to))
}

impl Transform {
    pub fn del(&mut self, from: usize, to: usize) -> Result<&mut Self, TransformError> {
        let steps = del(self.doc(), from, to)?;
        Ok(self.apply_built(steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_model::build::{block, doc};

    fn p(text: &str) -> strata_model::build::Item {
        block("paragraph", None, vec![text.into()]).unwrap()
    }

    #[test]
    fn widens_over_required_containers() {
        let item = block("list_item", None, vec![p("<a>a<b>")]).unwrap();
        let list = block("bullet_list", None, vec![item]).unwrap();
        let d = doc(vec![list, p("b")]).unwrap();
        // the whole list item content, not just the paragraph text
        assert_eq!(covered_range(&d.node, 2, 5).unwrap(), (0, 7));
        // a paragraph may be empty
        let (a, b) = (d.tag("a").unwrap(), d.tag("b").unwrap());
        assert_eq!(covered_range(&d.node, a, b).unwrap(), (a, b));
    }

    #[test]
    fn empty_range_is_a_no_op() {
        let d = doc(vec![p("abc")]).unwrap();
        assert!(del(&d.node, 2, 2).unwrap().is_empty());
    }

    #[test]
    fn reversed_range_is_rejected() {
        let d = doc(vec![p("abc")]).unwrap();
        assert!(matches!(
            del(&d.node, 3, 1),
            Err(TransformError::InvalidArgument(_))
        ));
    }
}
