//! Invertible, position-mapped edits on strata documents.
//!
//! Every change is expressed as a list of [`Step`]s. A step knows how to
//! apply itself, how positions move across it ([`StepMap`]) and how to undo
//! itself given the content it displaced. [`Transform`] applies steps in
//! sequence and keeps the composite [`Mapping`]; the builders in [`ops`]
//! turn editing intents (style a range, split a block, wrap in a list) into
//! steps.

pub mod error;
mod fit;
pub mod map;
pub mod ops;
pub mod step;
pub mod transform;

pub use error::{StepError, TransformError};
pub use fit::replace_step;
pub use map::{Assoc, MapResult, Mappable, Mapping, StepMap};
pub use ops::{
    Markup, Wrapping, add_style, can_join, can_split, del, find_wrapping, insert, insert_text, join,
    join_point, lift, lift_target, remove_style, replace, replace_with, set_block_type, split,
    wrap,
};
pub use step::{AddStyleStep, RemoveStyleStep, ReplaceAroundStep, ReplaceStep, Step, StepOutput};
pub use transform::{Transform, invert_transform};
