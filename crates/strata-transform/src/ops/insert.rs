use strata_model::{Fragment, Node, Slice};

use super::{check_range, collect};
use crate::error::TransformError;
use crate::fit::replace_step;
use crate::step::Step;
use crate::transform::Transform;

/// Insert `nodes` at `pos`. When the parent at `pos` does not accept them
/// the surrounding nodes are split up to the nearest ancestor that does, and
/// missing wrappers are created.
pub fn insert(doc: &Node, pos: usize, nodes: &[Node]) -> Result<Vec<Step>, TransformError> {
    if nodes.is_empty() {
        return Err(TransformError::invalid("nothing to insert"));
    }
    let slice = Slice::closed(Fragment::from_vec(nodes.to_vec()));
    Ok(replace_slice(doc, "insert", pos, pos, &slice))
}

/// Insert text at `pos`, carrying the styles of the text around it.
pub fn insert_text(doc: &Node, pos: usize, text: &str) -> Result<Vec<Step>, TransformError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let styles = match doc.resolve(pos) {
        Ok(rpos) => rpos.styles(),
        Err(err) => {
            log::debug!("insert_text: {err}");
            return Ok(Vec::new());
        }
    };
    let node = doc.node_type().schema().text(text, styles);
    let slice = Slice::closed(Fragment::from_node(node));
    Ok(replace_slice(doc, "insert_text", pos, pos, &slice))
}

/// Replace `from..to` with the content of `source` between `source_from`
/// and `source_to`, or delete it when there is no source.
pub fn replace(
    doc: &Node,
    from: usize,
    to: usize,
    source: Option<&Node>,
    source_from: usize,
    source_to: usize,
) -> Result<Vec<Step>, TransformError> {
    check_range(from, to)?;
    let slice = match source {
        Some(source) => {
            check_range(source_from, source_to)?;
            source.slice(source_from, source_to)?
        }
        None => Slice::empty(),
    };
    Ok(replace_slice(doc, "replace", from, to, &slice))
}

/// Replace `from..to` with `slice`, fitting it to the document.
pub fn replace_with(doc: &Node, from: usize, to: usize, slice: &Slice) -> Result<Vec<Step>, TransformError> {
    check_range(from, to)?;
    Ok(replace_slice(doc, "replace", from, to, slice))
}

pub(crate) fn replace_slice(doc: &Node, op: &str, from: usize, to: usize, slice: &Slice) -> Vec<Step> {
    collect(doc, op, |tr| {
        if let Some(step) = replace_step(tr.doc(), from, to, slice)? {
            tr.step(step)?;
        }
        Ok(())
    })
}

impl Transform {
    pub fn insert(&mut self, pos: usize, nodes: &[Node]) -> Result<&mut Self, TransformError> {
        let steps = insert(self.doc(), pos, nodes)?;
        Ok(self.apply_built(steps))
    }

    pub fn insert_text(&mut self, pos: usize, text: &str) -> Result<&mut Self, TransformError> {
        let steps = insert_text(self.doc(), pos, text)?;
        Ok(self.apply_built(steps))
    }

    pub fn replace(
        &mut self,
        from: usize,
        to: usize,
        source: Option<&Node>,
        source_from: usize,
        source_to: usize,
    ) -> Result<&mut Self, TransformError> {
        let steps = replace(self.doc(), from, to, source, source_from, source_to)?;
        Ok(self.apply_built(steps))
    }

    pub fn replace_with(&mut self, from: usize, to: usize, slice: &Slice) -> Result<&mut Self, TransformError> {
        let steps = replace_with(self.doc(), from, to, slice)?;
        Ok(self.apply_built(steps))
    }
}
