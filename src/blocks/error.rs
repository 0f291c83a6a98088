use super::types::{BlockType, UnknownBlockType};

/// Errors surfaced by the block core.
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    #[error("block {0} not found")]
    NotFound(i64),

    #[error("malformed reorder: {0}")]
    MalformedReorder(String),

    #[error("invalid block content: {0}")]
    InvalidContent(String),

    #[error("block order must be non-negative, got {0}")]
    NegativeOrder(i64),

    #[error("content is for a {actual} block but the block is {expected}")]
    TypeMismatch {
        expected: BlockType,
        actual: BlockType,
    },

    #[error("persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, BlockError>;

impl From<UnknownBlockType> for BlockError {
    fn from(err: UnknownBlockType) -> Self {
        BlockError::InvalidContent(err.to_string())
    }
}
