//! Migration-on-read for hero and text blocks.
//!
//! Older documents carry flat `title`/`subtitle`/`description` (hero) or
//! `heading`/`text` (text) fields. Current editors work on an ordered list of
//! text boxes. `migrate` is pure; persisting the result is the repository's
//! `migrate_block` step.

use serde_json::{Map, Value};

use super::content::{Alignment, BlockContent, HeroContent, TextBox, TextBoxKind, TextContent};

/// Outcome of running the migration over one document.
#[derive(Debug, Clone, PartialEq)]
pub enum Migrated {
    Unchanged(BlockContent),
    Upgraded(BlockContent),
}

impl Migrated {
    pub fn is_upgraded(&self) -> bool {
        matches!(self, Migrated::Upgraded(_))
    }

    pub fn into_inner(self) -> BlockContent {
        match self {
            Migrated::Unchanged(content) | Migrated::Upgraded(content) => content,
        }
    }
}

/// Synthesize `textBoxes` from legacy scalar fields when none exist yet.
///
/// Non-empty `textBoxes` always wins and the legacy fields are left alone, which
/// makes a second pass a no-op.
pub fn migrate(content: BlockContent) -> Migrated {
    match content {
        BlockContent::Hero(mut hero) if hero.text_boxes.is_empty() => {
            let boxes = hero_text_boxes(&hero);
            if boxes.is_empty() {
                return Migrated::Unchanged(BlockContent::Hero(hero));
            }
            hero.text_boxes = boxes;
            Migrated::Upgraded(BlockContent::Hero(hero))
        }
        BlockContent::Text(mut text) if text.text_boxes.is_empty() => {
            let boxes = text_text_boxes(&text);
            if boxes.is_empty() {
                return Migrated::Unchanged(BlockContent::Text(text));
            }
            text.text_boxes = boxes;
            Migrated::Upgraded(BlockContent::Text(text))
        }
        other => Migrated::Unchanged(other),
    }
}

/// Whether a stored document may be rewritten by `migrate`.
///
/// Only an object whose `textBoxes` is absent, null or an empty list
/// qualifies. Any other `textBoxes` value belongs to the user even when it
/// did not decode, and a document that is not an object is never touched.
pub fn is_migratable(raw: &str) -> bool {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(doc)) => match doc.get("textBoxes") {
            None | Some(Value::Null) => true,
            Some(Value::Array(items)) => items.is_empty(),
            Some(_) => false,
        },
        _ => false,
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

fn primary_heading(id: &str, text: &str, align: Alignment) -> TextBox {
    TextBox {
        id: id.to_string(),
        kind: TextBoxKind::Input,
        text: text.to_string(),
        font_size: 48,
        font_weight: 700,
        color: "#ffffff".to_string(),
        text_align: align,
        margin_bottom: 24,
        opacity: 1.0,
        line_height: 1.2,
        max_width: 900,
        extra: Map::new(),
    }
}

fn secondary_heading(id: &str, text: &str, align: Alignment) -> TextBox {
    TextBox {
        id: id.to_string(),
        kind: TextBoxKind::Input,
        text: text.to_string(),
        font_size: 20,
        font_weight: 600,
        color: "#ffffff".to_string(),
        text_align: align,
        margin_bottom: 16,
        opacity: 0.9,
        line_height: 1.4,
        max_width: 800,
        extra: Map::new(),
    }
}

fn body_text(id: &str, text: &str, align: Alignment) -> TextBox {
    TextBox {
        id: id.to_string(),
        kind: TextBoxKind::Textarea,
        text: text.to_string(),
        font_size: 18,
        font_weight: 400,
        color: "#ffffff".to_string(),
        text_align: align,
        margin_bottom: 32,
        opacity: 0.85,
        line_height: 1.6,
        max_width: 700,
        extra: Map::new(),
    }
}

fn hero_text_boxes(hero: &HeroContent) -> Vec<TextBox> {
    let mut boxes = Vec::new();
    if let Some(subtitle) = present(&hero.subtitle) {
        boxes.push(secondary_heading("hero-subtitle", subtitle, Alignment::Center));
    }
    if let Some(title) = present(&hero.title) {
        boxes.push(primary_heading("hero-title", title, Alignment::Center));
    }
    if let Some(description) = present(&hero.description) {
        boxes.push(body_text("hero-description", description, Alignment::Center));
    }
    boxes
}

fn text_text_boxes(text: &TextContent) -> Vec<TextBox> {
    // Text blocks sit on a light background.
    let dark = |mut b: TextBox| {
        b.color = "#111827".to_string();
        b
    };
    let mut boxes = Vec::new();
    if let Some(heading) = present(&text.heading) {
        let mut heading = dark(primary_heading("text-heading", heading, text.alignment));
        heading.font_size = 32;
        heading.margin_bottom = 16;
        boxes.push(heading);
    }
    if let Some(body) = present(&text.text) {
        let mut body = dark(body_text("text-body", body, text.alignment));
        body.font_size = 16;
        body.opacity = 1.0;
        body.margin_bottom = 16;
        boxes.push(body);
    }
    boxes
}
