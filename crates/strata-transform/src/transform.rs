use strata_model::{Node, Slice};

use crate::error::StepError;
use crate::map::{Mapping, StepMap};
use crate::step::{Step, StepOutput};

/// Applies a sequence of steps to a document, keeping every intermediate
/// document, the composite position mapping and the content each step
/// displaced.
///
/// The starting document is never modified; applying no steps leaves
/// [`Transform::doc`] pointing at the very same node as
/// [`Transform::before`].
///
/// ```
/// use strata_model::build::{block, doc};
/// use strata_model::Schema;
/// use strata_transform::Transform;
///
/// let d = doc(vec![block("paragraph", None, vec!["hello".into()]).unwrap()]).unwrap();
/// let strong = Schema::basic().style("strong", None).unwrap();
///
/// let mut tr = Transform::new(d.node.clone());
/// tr.add_style(2, 4, &strong).unwrap();
/// assert_eq!(tr.doc().to_string(), r#"doc(paragraph("h", strong("el"), "lo"))"#);
///
/// let undo = Transform::apply(tr.doc().clone(), tr.invert().unwrap());
/// assert_eq!(undo.doc(), &d.node);
/// ```
#[derive(Debug, Clone)]
pub struct Transform {
    before: Node,
    doc: Node,
    steps: Vec<Step>,
    docs: Vec<Node>,
    displaced: Vec<Slice>,
    mapping: Mapping,
    skipped: Vec<Step>,
}

impl Transform {
    pub fn new(doc: Node) -> Self {
        Self {
            before: doc.clone(),
            doc,
            steps: Vec::new(),
            docs: Vec::new(),
            displaced: Vec::new(),
            mapping: Mapping::new(),
            skipped: Vec::new(),
        }
    }

    /// Apply `steps` in order, skipping any that no longer apply.
    pub fn apply(doc: Node, steps: impl IntoIterator<Item = Step>) -> Self {
        let mut tr = Transform::new(doc);
        for step in steps {
            tr.maybe_step(step);
        }
        tr
    }

    /// Apply a step, failing if it does not apply to the current document.
    pub fn step(&mut self, step: Step) -> Result<&mut Self, StepError> {
        let output = step.apply(&self.doc)?;
        self.push(step, output);
        Ok(self)
    }

    fn push(&mut self, step: Step, output: StepOutput) {
        log::trace!("applied {step:?}");
        self.docs.push(std::mem::replace(&mut self.doc, output.doc));
        self.mapping.append_map(output.map, None);
        self.displaced.push(output.displaced);
        self.steps.push(step);
    }

    /// Apply a step if it applies. A failing step leaves the document alone,
    /// contributes an identity map and is recorded in [`Transform::skipped`].
    pub fn maybe_step(&mut self, step: Step) -> bool {
        match step.apply(&self.doc) {
            Ok(output) => {
                self.push(step, output);
                true
            }
            Err(err) => {
                log::debug!("skipping step {step:?}: {err}");
                self.mapping.append_map(StepMap::identity(), None);
                self.skipped.push(step);
                false
            }
        }
    }

    /// The document the transform started from.
    pub fn before(&self) -> &Node {
        &self.before
    }

    /// The current document.
    pub fn doc(&self) -> &Node {
        &self.doc
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The document before each applied step.
    pub fn docs(&self) -> &[Node] {
        &self.docs
    }

    /// The slice each applied step displaced.
    pub fn displaced(&self) -> &[Slice] {
        &self.displaced
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn skipped(&self) -> &[Step] {
        &self.skipped
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }

    /// Steps that undo this transform, newest first. Applied to
    /// [`Transform::doc`] they reproduce [`Transform::before`].
    pub fn invert(&self) -> Result<Vec<Step>, StepError> {
        self.steps
            .iter()
            .zip(&self.displaced)
            .rev()
            .map(|(step, displaced)| step.invert(displaced))
            .collect()
    }

    /// The forward mapping followed by the inverse of every map, each linked
    /// to its mirror. Mapping through it returns any position in
    /// [`Transform::before`] to itself, including positions inside content
    /// the transform deleted.
    pub fn inverse_mapping(&self) -> Mapping {
        let mut mapping = self.mapping.clone();
        for (i, map) in self.mapping.maps().iter().enumerate().rev() {
            mapping.append_map(map.invert(), Some(i));
        }
        mapping
    }
}

/// The steps that undo `tr`, newest first.
pub fn invert_transform(tr: &Transform) -> Result<Vec<Step>, StepError> {
    tr.invert()
}
