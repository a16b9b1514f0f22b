use thiserror::Error;

/// Errors raised by the document model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("position {pos} out of range (document size {size})")]
    PositionOutOfRange { pos: usize, size: usize },

    #[error("invalid content for node type {node_type}")]
    InvalidContent { node_type: String },

    #[error("replace failed: {0}")]
    Replace(String),

    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("unknown style type: {0}")]
    UnknownStyleType(String),

    #[error("missing required attribute {attr} on {owner}")]
    MissingAttr { owner: String, attr: String },

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("there is no position before the top-level node")]
    NoPositionBefore,
}

impl ModelError {
    pub(crate) fn replace(msg: impl Into<String>) -> Self {
        ModelError::Replace(msg.into())
    }
}
