//! Block Styles - flat style maps with per-type defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

use super::types::BlockType;

/// A single style value. Integers keep their integer spelling on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(Number),
    Text(String),
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Text(value.to_string())
    }
}

impl From<u32> for StyleValue {
    fn from(value: u32) -> Self {
        StyleValue::Number(value.into())
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        Number::from_f64(value)
            .map(StyleValue::Number)
            .unwrap_or_else(|| StyleValue::Text(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockStyles(pub BTreeMap<String, StyleValue>);

impl BlockStyles {
    pub fn get(&self, key: &str) -> Option<&StyleValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<StyleValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Build from an arbitrary JSON value, dropping entries that are not a
    /// string or a number.
    pub fn from_value(value: Value) -> Self {
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return BlockStyles::default(),
            _ => {
                tracing::warn!("block styles are not an object, ignoring them");
                return BlockStyles::default();
            }
        };
        let styles = map
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Number(n) => Some((key, StyleValue::Number(n))),
                Value::String(s) => Some((key, StyleValue::Text(s))),
                other => {
                    tracing::warn!(key = %key, value = %other, "dropping non-scalar style value");
                    None
                }
            })
            .collect();
        BlockStyles(styles)
    }

    pub fn decode_lenient(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => BlockStyles::from_value(value),
            Err(e) => {
                tracing::warn!(error = %e, "unreadable block styles, using defaults");
                BlockStyles::default()
            }
        }
    }

    /// Fill every key a renderer expects for `block_type` that is missing here.
    pub fn with_defaults(mut self, block_type: BlockType) -> Self {
        for (key, value) in BlockStyles::default_for(block_type).0 {
            self.0.entry(key).or_insert(value);
        }
        self
    }

    pub fn default_for(block_type: BlockType) -> Self {
        let mut styles = BlockStyles::default();
        styles.insert("paddingTop", 48u32);
        styles.insert("paddingBottom", 48u32);
        styles.insert("backgroundColor", "#ffffff");
        styles.insert("textColor", "#111827");

        match block_type {
            BlockType::Hero => {
                styles.insert("paddingTop", 96u32);
                styles.insert("paddingBottom", 96u32);
                styles.insert("backgroundColor", "#1f2937");
                styles.insert("textColor", "#ffffff");
                styles.insert("backgroundImage", "");
                styles.insert("overlayOpacity", 0.5);
                styles.insert("minHeight", 520u32);
                styles.insert("buttonColor", "#2563eb");
                styles.insert("buttonTextColor", "#ffffff");
            }
            BlockType::Text => {
                styles.insert("maxWidth", 800u32);
                styles.insert("fontSize", 16u32);
            }
            BlockType::Image => {
                styles.insert("maxWidth", 1000u32);
                styles.insert("borderRadius", 8u32);
                styles.insert("objectFit", "cover");
            }
            BlockType::TwoColumn => {
                styles.insert("columnGap", 32u32);
                styles.insert("verticalAlign", "center");
            }
            BlockType::Gallery => {
                styles.insert("columns", 3u32);
                styles.insert("gap", 16u32);
                styles.insert("borderRadius", 8u32);
            }
            BlockType::Video => {
                styles.insert("maxWidth", 960u32);
                styles.insert("aspectRatio", "16:9");
                styles.insert("borderRadius", 8u32);
            }
            BlockType::Contact => {
                styles.insert("backgroundColor", "#f9fafb");
                styles.insert("maxWidth", 640u32);
                styles.insert("buttonColor", "#2563eb");
                styles.insert("buttonTextColor", "#ffffff");
                styles.insert("inputBorderColor", "#d1d5db");
            }
            BlockType::Testimonials => {
                styles.insert("backgroundColor", "#f3f4f6");
                styles.insert("cardBackgroundColor", "#ffffff");
                styles.insert("starColor", "#f59e0b");
            }
            BlockType::Spacer => {
                styles.insert("paddingTop", 0u32);
                styles.insert("paddingBottom", 0u32);
                styles.insert("backgroundColor", "transparent");
                styles.insert("dividerColor", "#e5e7eb");
            }
        }
        styles
    }

    pub fn to_json_string(&self) -> String {
        // A map of strings and finite numbers always serializes.
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}
