/*!
 * Blocks Module
 * Typed block documents, the block repository and the reorder protocol
 */
pub mod content;
pub mod error;
pub mod migrate;
pub mod reorder;
pub mod repository;
pub mod styles;
pub mod types;

pub use content::BlockContent;
pub use error::{BlockError, Result};
pub use migrate::{migrate, Migrated};
pub use repository::BlockRepository;
pub use styles::{BlockStyles, StyleValue};
pub use types::{Block, BlockType, Direction, OrderAssignment};
