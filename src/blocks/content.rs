//! Block Content Model - typed content documents, one per block type.
//!
//! Documents are stored as JSON text. Every struct decodes with serde defaults
//! for missing fields and keeps keys it does not know in `extra`, so fields
//! written by newer editors survive a load/save cycle.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

use super::error::BlockError;
use super::migrate::migrate;
use super::types::BlockType;

// ============================================================================
// Shared field types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBoxKind {
    #[default]
    Input,
    Textarea,
}

/// A freely positioned run of text inside a hero or text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextBox {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TextBoxKind,
    pub text: String,
    pub font_size: u32,
    pub font_weight: u32,
    pub color: String,
    pub text_align: Alignment,
    pub margin_bottom: u32,
    pub opacity: f64,
    pub line_height: f64,
    pub max_width: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for TextBox {
    fn default() -> Self {
        Self {
            id: String::new(),
            kind: TextBoxKind::Input,
            text: String::new(),
            font_size: 16,
            font_weight: 400,
            color: "#111827".to_string(),
            text_align: Alignment::Left,
            margin_bottom: 16,
            opacity: 1.0,
            line_height: 1.5,
            max_width: 800,
            extra: Map::new(),
        }
    }
}

/// Boxes decode one at a time, and a field holding a value of the wrong type
/// falls back to its default, so one odd value never costs the whole list. A
/// `textBoxes` value that is not a list reads as no boxes at all.
fn lenient_text_boxes<'de, D>(deserializer: D) -> Result<Vec<TextBox>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items.into_iter().filter_map(lenient_text_box).collect()),
        other => {
            tracing::warn!(kind = %json_kind(&other), "discarding textBoxes that is not a list");
            Ok(Vec::new())
        }
    }
}

fn lenient_text_box(value: Value) -> Option<TextBox> {
    let fields = match value {
        Value::Object(fields) => fields,
        other => {
            tracing::warn!(kind = %json_kind(&other), "discarding text box that is not an object");
            return None;
        }
    };
    if let Ok(text_box) = serde_json::from_value(Value::Object(fields.clone())) {
        return Some(text_box);
    }

    let readable: Map<String, Value> = fields
        .into_iter()
        .filter(|(key, field)| {
            let single = Value::Object(Map::from_iter([(key.clone(), field.clone())]));
            let ok = serde_json::from_value::<TextBox>(single).is_ok();
            if !ok {
                tracing::warn!(field = %key, "ignoring unreadable text box field");
            }
            ok
        })
        .collect();
    serde_json::from_value(Value::Object(readable)).ok()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Per-type documents
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    #[default]
    Primary,
    Secondary,
    Outline,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroButton {
    pub text: String,
    pub link: String,
    pub style: ButtonStyle,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroContent {
    #[serde(deserialize_with = "lenient_text_boxes")]
    pub text_boxes: Vec<TextBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub buttons: Vec<HeroButton>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextContent {
    #[serde(deserialize_with = "lenient_text_boxes")]
    pub text_boxes: Vec<TextBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    /// Rich text (HTML).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub alignment: Alignment,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageContent {
    pub image_url: String,
    pub alt: String,
    pub caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    Text,
    Image,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Column {
    #[serde(rename = "type")]
    pub kind: ColumnKind,
    pub content: String,
    pub heading: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TwoColumnContent {
    pub left_column: Column,
    pub right_column: Column,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryImage {
    pub url: String,
    pub alt: String,
    pub size: ImageSize,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GalleryContent {
    pub title: String,
    pub images: Vec<GalleryImage>,
    pub expandable: bool,
    pub initial_visible_count: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoType {
    #[default]
    Youtube,
    Vimeo,
    Direct,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoContent {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub video_type: VideoType,
    pub autoplay: bool,
    pub muted: bool,
    pub controls: bool,
    #[serde(rename = "loop")]
    pub loop_playback: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Email,
    Tel,
    Textarea,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub label: String,
    pub placeholder: String,
    pub required: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactContent {
    pub title: String,
    pub description: String,
    pub fields: Vec<FormField>,
    pub submit_button_text: String,
    pub success_message: String,
    pub email_to: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Testimonial {
    pub id: String,
    pub name: String,
    pub role: String,
    pub company: String,
    pub testimonial: String,
    pub rating: u8,
    pub avatar: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestimonialsContent {
    pub title: String,
    pub description: String,
    pub testimonials: Vec<Testimonial>,
    pub autoplay: bool,
    /// Milliseconds between slides.
    pub autoplay_speed: u32,
    pub show_ratings: bool,
    pub show_avatars: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DividerType {
    #[default]
    Line,
    Dots,
    Wave,
    Zigzag,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpacerContent {
    pub height: u32,
    pub show_divider: bool,
    pub divider_type: DividerType,
    /// Percentage of the container width.
    pub divider_width: u32,
    pub divider_thickness: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Tagged union
// ============================================================================

/// Content document of a block. The tag lives in the `block_type` column, not
/// in the document, so this serializes as the bare inner document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BlockContent {
    Hero(HeroContent),
    Text(TextContent),
    Image(ImageContent),
    TwoColumn(TwoColumnContent),
    Gallery(GalleryContent),
    Video(VideoContent),
    Contact(ContactContent),
    Testimonials(TestimonialsContent),
    Spacer(SpacerContent),
}

impl BlockContent {
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockContent::Hero(_) => BlockType::Hero,
            BlockContent::Text(_) => BlockType::Text,
            BlockContent::Image(_) => BlockType::Image,
            BlockContent::TwoColumn(_) => BlockType::TwoColumn,
            BlockContent::Gallery(_) => BlockType::Gallery,
            BlockContent::Video(_) => BlockType::Video,
            BlockContent::Contact(_) => BlockType::Contact,
            BlockContent::Testimonials(_) => BlockType::Testimonials,
            BlockContent::Spacer(_) => BlockType::Spacer,
        }
    }

    /// Decode a document for the given block type. `null` reads as `{}`.
    pub fn from_value(block_type: BlockType, value: Value) -> Result<Self, serde_json::Error> {
        let value = match value {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        Ok(match block_type {
            BlockType::Hero => BlockContent::Hero(serde_json::from_value(value)?),
            BlockType::Text => BlockContent::Text(serde_json::from_value(value)?),
            BlockType::Image => BlockContent::Image(serde_json::from_value(value)?),
            BlockType::TwoColumn => BlockContent::TwoColumn(serde_json::from_value(value)?),
            BlockType::Gallery => BlockContent::Gallery(serde_json::from_value(value)?),
            BlockType::Video => BlockContent::Video(serde_json::from_value(value)?),
            BlockType::Contact => BlockContent::Contact(serde_json::from_value(value)?),
            BlockType::Testimonials => {
                BlockContent::Testimonials(serde_json::from_value(value)?)
            }
            BlockType::Spacer => BlockContent::Spacer(serde_json::from_value(value)?),
        })
    }

    /// Decode stored text. A document that cannot be read falls back to an
    /// empty text-box document for hero and text blocks and to the type's
    /// defaults otherwise, so a single bad row never hides the rest of the page.
    pub fn decode_lenient(block_type: BlockType, raw: &str) -> Self {
        let decoded = serde_json::from_str::<Value>(raw)
            .and_then(|value| BlockContent::from_value(block_type, value));
        match decoded {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    block_type = %block_type,
                    error = %e,
                    "unreadable block content, using fallback"
                );
                match block_type {
                    BlockType::Hero => BlockContent::Hero(HeroContent::default()),
                    BlockType::Text => BlockContent::Text(TextContent::default()),
                    other => BlockContent::default_for(other),
                }
            }
        }
    }

    pub fn to_json_string(&self) -> Result<String, BlockError> {
        serde_json::to_string(self).map_err(|e| BlockError::InvalidContent(e.to_string()))
    }

    /// Default content a freshly added block starts with.
    pub fn default_for(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Hero => {
                let hero = BlockContent::Hero(HeroContent {
                    title: Some("Welcome to Our Business".to_string()),
                    subtitle: Some("Quality service you can trust".to_string()),
                    description: Some(
                        "We help our customers get more done with less hassle.".to_string(),
                    ),
                    buttons: vec![
                        HeroButton {
                            text: "Get Started".to_string(),
                            link: "#contact".to_string(),
                            style: ButtonStyle::Primary,
                            extra: Map::new(),
                        },
                        HeroButton {
                            text: "Learn More".to_string(),
                            link: "#about".to_string(),
                            style: ButtonStyle::Secondary,
                            extra: Map::new(),
                        },
                    ],
                    ..Default::default()
                });
                migrate(hero).into_inner()
            }
            BlockType::Text => {
                let text = BlockContent::Text(TextContent {
                    heading: Some("About Us".to_string()),
                    text: Some("<p>Tell your visitors what makes your business special.</p>".to_string()),
                    alignment: Alignment::Left,
                    ..Default::default()
                });
                migrate(text).into_inner()
            }
            BlockType::Image => BlockContent::Image(ImageContent::default()),
            BlockType::TwoColumn => BlockContent::TwoColumn(TwoColumnContent {
                left_column: Column {
                    kind: ColumnKind::Text,
                    content: "<p>Describe what you offer here.</p>".to_string(),
                    heading: "Our Services".to_string(),
                    extra: Map::new(),
                },
                right_column: Column {
                    kind: ColumnKind::Image,
                    content: String::new(),
                    heading: String::new(),
                    extra: Map::new(),
                },
                extra: Map::new(),
            }),
            BlockType::Gallery => BlockContent::Gallery(GalleryContent {
                title: "Gallery".to_string(),
                images: Vec::new(),
                expandable: false,
                initial_visible_count: 6,
                extra: Map::new(),
            }),
            BlockType::Video => BlockContent::Video(VideoContent {
                video_type: VideoType::Youtube,
                controls: true,
                ..Default::default()
            }),
            BlockType::Contact => BlockContent::Contact(ContactContent {
                title: "Contact Us".to_string(),
                description: "Send us a message and we'll get back to you shortly.".to_string(),
                fields: vec![
                    form_field("name", FieldType::Text, "Name", "Your name", true),
                    form_field("email", FieldType::Email, "Email", "you@example.com", true),
                    form_field("phone", FieldType::Tel, "Phone", "Your phone number", false),
                    form_field("message", FieldType::Textarea, "Message", "How can we help?", true),
                ],
                submit_button_text: "Send Message".to_string(),
                success_message: "Thank you! We'll be in touch soon.".to_string(),
                email_to: String::new(),
                extra: Map::new(),
            }),
            BlockType::Testimonials => BlockContent::Testimonials(TestimonialsContent {
                title: "What Our Customers Say".to_string(),
                description: String::new(),
                testimonials: vec![Testimonial {
                    id: "testimonial-1".to_string(),
                    name: "Jane Doe".to_string(),
                    role: "Owner".to_string(),
                    company: "Example Co.".to_string(),
                    testimonial: "Fantastic service from start to finish.".to_string(),
                    rating: 5,
                    avatar: String::new(),
                    extra: Map::new(),
                }],
                autoplay: true,
                autoplay_speed: 5000,
                show_ratings: true,
                show_avatars: true,
                extra: Map::new(),
            }),
            BlockType::Spacer => BlockContent::Spacer(SpacerContent {
                height: 50,
                show_divider: false,
                divider_type: DividerType::Line,
                divider_width: 100,
                divider_thickness: 1,
                extra: Map::new(),
            }),
        }
    }

    /// Checks applied before a document is written.
    pub fn validate(&self) -> Result<(), BlockError> {
        match self {
            BlockContent::Hero(hero) => unique_ids("text box", hero.text_boxes.iter().map(|b| &b.id)),
            BlockContent::Text(text) => unique_ids("text box", text.text_boxes.iter().map(|b| &b.id)),
            BlockContent::Video(video) => validate_video_url(video),
            BlockContent::Contact(contact) => {
                unique_ids("form field", contact.fields.iter().map(|f| &f.id))?;
                let email_to = contact.email_to.trim();
                if !email_to.is_empty() && !EMAIL_REGEX.is_match(email_to) {
                    return Err(BlockError::InvalidContent(format!(
                        "emailTo '{}' is not an email address",
                        email_to
                    )));
                }
                Ok(())
            }
            BlockContent::Testimonials(testimonials) => {
                unique_ids("testimonial", testimonials.testimonials.iter().map(|t| &t.id))?;
                if let Some(t) = testimonials.testimonials.iter().find(|t| t.rating > 5) {
                    return Err(BlockError::InvalidContent(format!(
                        "testimonial '{}' has rating {} (maximum is 5)",
                        t.id, t.rating
                    )));
                }
                Ok(())
            }
            BlockContent::Gallery(gallery) => {
                if gallery.expandable && gallery.initial_visible_count == 0 {
                    return Err(BlockError::InvalidContent(
                        "an expandable gallery must show at least one image".to_string(),
                    ));
                }
                Ok(())
            }
            BlockContent::Spacer(spacer) => {
                if spacer.height == 0 {
                    return Err(BlockError::InvalidContent(
                        "spacer height must be greater than zero".to_string(),
                    ));
                }
                Ok(())
            }
            BlockContent::Image(_) | BlockContent::TwoColumn(_) => Ok(()),
        }
    }

    /// Clean every rich-text HTML field.
    pub fn sanitized(self) -> Self {
        match self {
            BlockContent::Hero(mut hero) => {
                sanitize_text_boxes(&mut hero.text_boxes);
                BlockContent::Hero(hero)
            }
            BlockContent::Text(mut text) => {
                sanitize_text_boxes(&mut text.text_boxes);
                text.text = text.text.map(|html| ammonia::clean(&html));
                BlockContent::Text(text)
            }
            BlockContent::TwoColumn(mut columns) => {
                for column in [&mut columns.left_column, &mut columns.right_column] {
                    if column.kind == ColumnKind::Text {
                        column.content = ammonia::clean(&column.content);
                    }
                }
                BlockContent::TwoColumn(columns)
            }
            other => other,
        }
    }
}

fn form_field(id: &str, kind: FieldType, label: &str, placeholder: &str, required: bool) -> FormField {
    FormField {
        id: id.to_string(),
        kind,
        label: label.to_string(),
        placeholder: placeholder.to_string(),
        required,
        extra: Map::new(),
    }
}

fn sanitize_text_boxes(boxes: &mut [TextBox]) {
    for text_box in boxes.iter_mut().filter(|b| b.kind == TextBoxKind::Textarea) {
        text_box.text = ammonia::clean(&text_box.text);
    }
}

fn unique_ids<'a>(what: &str, ids: impl Iterator<Item = &'a String>) -> Result<(), BlockError> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(BlockError::InvalidContent(format!("{} id must not be empty", what)));
        }
        if !seen.insert(id.as_str()) {
            return Err(BlockError::InvalidContent(format!("duplicate {} id '{}'", what, id)));
        }
    }
    Ok(())
}

// ============================================================================
// Validation
// ============================================================================

lazy_static! {
    static ref YOUTUBE_REGEX: Regex = Regex::new(
        r"^https?://(?:www\.|m\.)?(?:youtube\.com/(?:watch\?v=|embed/|shorts/)|youtu\.be/)[A-Za-z0-9_-]{6,}"
    )
    .unwrap();
    static ref VIMEO_REGEX: Regex =
        Regex::new(r"^https?://(?:www\.|player\.)?vimeo\.com/(?:video/)?\d+").unwrap();
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// Infer the hosting service from a video URL.
pub fn detect_video_type(url: &str) -> VideoType {
    if YOUTUBE_REGEX.is_match(url) {
        VideoType::Youtube
    } else if VIMEO_REGEX.is_match(url) {
        VideoType::Vimeo
    } else {
        VideoType::Direct
    }
}

fn validate_video_url(video: &VideoContent) -> Result<(), BlockError> {
    let url = video.video_url.trim();
    if url.is_empty() || video.video_type == VideoType::Direct {
        return Ok(());
    }
    let detected = detect_video_type(url);
    if detected != video.video_type {
        return Err(BlockError::InvalidContent(format!(
            "videoUrl '{}' is not a {:?} link",
            url, video.video_type
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_take_serde_defaults() {
        let content = BlockContent::from_value(BlockType::Spacer, json!({ "height": 80 })).unwrap();
        let BlockContent::Spacer(spacer) = content else {
            panic!("expected spacer");
        };
        assert_eq!(spacer.height, 80);
        assert_eq!(spacer.divider_type, DividerType::Line);
        assert!(!spacer.show_divider);
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let doc = json!({ "imageUrl": "/uploads/a.png", "alt": "A", "caption": "", "borderRadius": 12 });
        let content = BlockContent::from_value(BlockType::Image, doc).unwrap();
        let back = serde_json::to_value(&content).unwrap();
        assert_eq!(back["borderRadius"], json!(12));
        assert_eq!(back["imageUrl"], json!("/uploads/a.png"));
        assert!(back.get("link").is_none());
    }

    #[test]
    fn test_odd_text_box_fields_fall_back_per_field() {
        let doc = json!({ "textBoxes": [
            { "id": "a", "text": "Keep me", "fontWeight": "bold", "fontSize": 18.5, "color": "#ff0000" },
            42,
            { "id": "b", "text": "Fine" }
        ] });
        let BlockContent::Text(text) = BlockContent::from_value(BlockType::Text, doc).unwrap() else {
            panic!("expected text");
        };
        assert_eq!(text.text_boxes.len(), 2);
        let first = &text.text_boxes[0];
        assert_eq!(first.text, "Keep me");
        assert_eq!(first.color, "#ff0000");
        assert_eq!(first.font_weight, 400);
        assert_eq!(first.font_size, 16);
        assert_eq!(text.text_boxes[1].id, "b");
    }

    #[test]
    fn test_unknown_keys_on_items_survive_round_trip() {
        let hero = json!({
            "textBoxes": [{ "id": "t", "text": "Hi", "fontFamily": "Georgia" }],
            "buttons": [{ "text": "Go", "link": "/x", "style": "outline", "target": "_blank" }]
        });
        let back = serde_json::to_value(BlockContent::from_value(BlockType::Hero, hero).unwrap()).unwrap();
        assert_eq!(back["textBoxes"][0]["fontFamily"], json!("Georgia"));
        assert_eq!(back["buttons"][0]["target"], json!("_blank"));

        let columns = json!({ "leftColumn": { "type": "image", "content": "/a.png", "objectFit": "cover" } });
        let back = serde_json::to_value(BlockContent::from_value(BlockType::TwoColumn, columns).unwrap()).unwrap();
        assert_eq!(back["leftColumn"]["objectFit"], json!("cover"));

        let gallery = json!({ "images": [{ "url": "/a.png", "alt": "A", "caption": "Front" }] });
        let back = serde_json::to_value(BlockContent::from_value(BlockType::Gallery, gallery).unwrap()).unwrap();
        assert_eq!(back["images"][0]["caption"], json!("Front"));

        let contact = json!({ "fields": [{ "id": "n", "type": "text", "maxLength": 80 }] });
        let back = serde_json::to_value(BlockContent::from_value(BlockType::Contact, contact).unwrap()).unwrap();
        assert_eq!(back["fields"][0]["maxLength"], json!(80));

        let testimonials = json!({ "testimonials": [{ "id": "t1", "rating": 4, "date": "2024-05-01" }] });
        let back = serde_json::to_value(BlockContent::from_value(BlockType::Testimonials, testimonials).unwrap()).unwrap();
        assert_eq!(back["testimonials"][0]["date"], json!("2024-05-01"));
    }

    #[test]
    fn test_null_document_reads_as_empty_object() {
        let content = BlockContent::from_value(BlockType::Gallery, Value::Null).unwrap();
        assert_eq!(content, BlockContent::Gallery(GalleryContent::default()));
    }

    #[test]
    fn test_malformed_text_boxes_read_as_empty() {
        let doc = json!({ "title": "Hi", "textBoxes": "not a list" });
        let BlockContent::Hero(hero) = BlockContent::from_value(BlockType::Hero, doc).unwrap() else {
            panic!("expected hero");
        };
        assert!(hero.text_boxes.is_empty());
        assert_eq!(hero.title.as_deref(), Some("Hi"));
    }

    #[test]
    fn test_unreadable_document_falls_back() {
        let content = BlockContent::decode_lenient(BlockType::Spacer, r#"{"height": "tall"}"#);
        assert_eq!(content, BlockContent::default_for(BlockType::Spacer));

        let content = BlockContent::decode_lenient(BlockType::Text, "{not json");
        let BlockContent::Text(text) = content else {
            panic!("expected text");
        };
        assert!(text.text_boxes.is_empty());
        assert!(text.heading.is_none());
    }

    #[test]
    fn test_two_column_and_loop_use_wire_names() {
        let BlockContent::TwoColumn(columns) = BlockContent::default_for(BlockType::TwoColumn) else {
            panic!("expected two-column");
        };
        let value = serde_json::to_value(&columns).unwrap();
        assert_eq!(value["leftColumn"]["type"], json!("text"));
        assert_eq!(value["rightColumn"]["type"], json!("image"));

        let video = serde_json::to_value(BlockContent::default_for(BlockType::Video)).unwrap();
        assert_eq!(video["loop"], json!(false));
        assert_eq!(video["videoType"], json!("youtube"));
    }

    #[test]
    fn test_every_default_passes_validation_and_matches_its_type() {
        for block_type in BlockType::ALL {
            let content = BlockContent::default_for(block_type);
            assert_eq!(content.block_type(), block_type);
            content.validate().unwrap();
        }
    }

    #[test]
    fn test_default_hero_already_has_text_boxes() {
        let BlockContent::Hero(hero) = BlockContent::default_for(BlockType::Hero) else {
            panic!("expected hero");
        };
        assert_eq!(hero.text_boxes.len(), 3);
        assert_eq!(hero.buttons.len(), 2);
    }

    #[test]
    fn test_detect_video_type() {
        assert_eq!(detect_video_type("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), VideoType::Youtube);
        assert_eq!(detect_video_type("https://youtu.be/dQw4w9WgXcQ"), VideoType::Youtube);
        assert_eq!(detect_video_type("https://vimeo.com/76979871"), VideoType::Vimeo);
        assert_eq!(detect_video_type("/uploads/intro.mp4"), VideoType::Direct);
    }

    #[test]
    fn test_video_url_must_match_declared_type() {
        let video = BlockContent::Video(VideoContent {
            video_url: "https://vimeo.com/76979871".to_string(),
            video_type: VideoType::Youtube,
            ..Default::default()
        });
        assert!(matches!(video.validate(), Err(BlockError::InvalidContent(_))));
    }

    #[test]
    fn test_validation_rejects_bad_documents() {
        let mut contact = ContactContent::default();
        contact.email_to = "not-an-email".to_string();
        assert!(BlockContent::Contact(contact).validate().is_err());

        let testimonials = TestimonialsContent {
            testimonials: vec![Testimonial {
                id: "t1".to_string(),
                rating: 6,
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(BlockContent::Testimonials(testimonials).validate().is_err());

        let spacer = SpacerContent::default();
        assert!(BlockContent::Spacer(spacer).validate().is_err());

        let gallery = GalleryContent {
            expandable: true,
            initial_visible_count: 0,
            ..Default::default()
        };
        assert!(BlockContent::Gallery(gallery).validate().is_err());
    }

    #[test]
    fn test_duplicate_text_box_ids_are_rejected() {
        let text_box = TextBox {
            id: "same".to_string(),
            ..Default::default()
        };
        let hero = HeroContent {
            text_boxes: vec![text_box.clone(), text_box],
            ..Default::default()
        };
        let err = BlockContent::Hero(hero).validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid block content: duplicate text box id 'same'");
    }

    #[test]
    fn test_sanitized_strips_scripts_from_rich_text() {
        let text = BlockContent::Text(TextContent {
            text: Some("<p>Hello</p><script>alert(1)</script>".to_string()),
            ..Default::default()
        });
        let BlockContent::Text(clean) = text.sanitized() else {
            panic!("expected text");
        };
        assert_eq!(clean.text.as_deref(), Some("<p>Hello</p>"));
    }
}
