//! Block Types - the positioned content unit and its identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::content::BlockContent;
use super::styles::BlockStyles;

/// The fixed set of block kinds the editor can place on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    Hero,
    Text,
    Image,
    TwoColumn,
    Gallery,
    Video,
    Contact,
    Testimonials,
    Spacer,
}

impl BlockType {
    pub const ALL: [BlockType; 9] = [
        BlockType::Hero,
        BlockType::Text,
        BlockType::Image,
        BlockType::TwoColumn,
        BlockType::Gallery,
        BlockType::Video,
        BlockType::Contact,
        BlockType::Testimonials,
        BlockType::Spacer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Hero => "hero",
            BlockType::Text => "text",
            BlockType::Image => "image",
            BlockType::TwoColumn => "two-column",
            BlockType::Gallery => "gallery",
            BlockType::Video => "video",
            BlockType::Contact => "contact",
            BlockType::Testimonials => "testimonials",
            BlockType::Spacer => "spacer",
        }
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised block type string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown block type '{0}'")]
pub struct UnknownBlockType(pub String);

impl FromStr for BlockType {
    type Err = UnknownBlockType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownBlockType(s.to_string()))
    }
}

/// A decoded block, as handed to the route layer and renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub id: i64,
    pub block_type: BlockType,
    pub block_order: i64,
    pub content: BlockContent,
    pub styles: BlockStyles,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One `(id, block_order)` pair of a reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAssignment {
    pub id: i64,
    pub block_order: i64,
}

/// Single-step move used by the up/down controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}
