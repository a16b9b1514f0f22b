use strata_model::ModelError;
use thiserror::Error;

/// Why a step could not be applied to a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("structure replace would overwrite content")]
    StructureOverwrite,

    #[error("gap is not a flat range")]
    GapNotFlat,

    #[error("content does not fit in gap")]
    GapDoesNotFit,

    #[error("invalid step range {from}..{to}")]
    InvalidRange { from: usize, to: usize },

    #[error("gap {gap_from}..{gap_to} lies outside the step range")]
    GapOutOfRange { gap_from: usize, gap_to: usize },

    #[error("content in range already carries a `{style}` style")]
    StyleAlreadyPresent { style: String },

    #[error("content in range does not carry the `{style}` style")]
    StyleNotPresent { style: String },
}

/// Errors raised by operation builders for malformed arguments.
///
/// Preconditions that merely cannot be met against the current document are
/// not errors: builders return an empty step list instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl TransformError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        TransformError::InvalidArgument(msg.into())
    }
}
