//! Canvas item model — the in-memory item list for one day's board.
//!
//! DESIGN
//! ======
//! Item mutations update the in-memory list immediately and return; the
//! owning session persists by re-sending the whole serialized list. Item
//! payloads are a tagged union so the three kinds are matched exhaustively
//! at compile time; the flat [`ItemRecord`] projection exists only at the
//! storage boundary, where every optional field must be an explicit null
//! because the document store rejects undefined values.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// PALETTES & LIMITS
// =============================================================================

/// Note background fill palette. New notes default to the first entry.
pub const NOTE_COLORS: [&str; 5] = ["#B5EAEA", "#EDF6E5", "#E3DFFD", "#FFB5B5", "#DFCCFB"];

/// Font sizes offered by the note composer.
pub const FONT_SIZES: [f32; 4] = [14.0, 16.0, 20.0, 24.0];

/// Note text color choices.
pub const TEXT_COLORS: [&str; 6] = ["#333", "#3a6073", "#f87171", "#a3d2ca", "#dfbbf6", "#e39898"];

/// Smallest width or height a resize can produce.
pub const MIN_ITEM_EXTENT: f64 = 30.0;

const DEFAULT_ITEM_SIZE: Size = Size { width: 120.0, height: 120.0 };
const DEFAULT_STICKER_SIZE: Size = Size { width: 60.0, height: 60.0 };

/// Offset used when an item is too large for random placement to have room.
const PLACEMENT_FALLBACK: f64 = 10.0;

const BUNDLED_PREFIX: &str = "asset://";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("item content is empty")]
    EmptyContent,
    #[error("unknown item kind: {0}")]
    UnknownKind(String),
    #[error("color {0} is not in the palette")]
    ColorOutsidePalette(String),
    #[error("item not found: {0}")]
    ItemNotFound(Uuid),
}

/// Pixel offset from the board's top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Item extent in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Where a sticker's artwork comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StickerSource {
    /// Remote image URL.
    Remote(String),
    /// Name of an asset bundled with the app.
    Bundled(String),
}

impl StickerSource {
    /// Storage form: remote URLs verbatim, bundled assets behind `asset://`.
    #[must_use]
    pub fn to_content(&self) -> String {
        match self {
            Self::Remote(url) => url.clone(),
            Self::Bundled(name) => format!("{BUNDLED_PREFIX}{name}"),
        }
    }

    #[must_use]
    pub fn from_content(content: &str) -> Self {
        match content.strip_prefix(BUNDLED_PREFIX) {
            Some(name) => Self::Bundled(name.to_owned()),
            None => Self::Remote(content.to_owned()),
        }
    }
}

/// Kind-specific payload of one item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemPayload {
    Note {
        text: String,
        /// Background fill, one of [`NOTE_COLORS`].
        color: String,
        emoji: Option<String>,
        font_size: Option<f32>,
        text_color: Option<String>,
    },
    Photo {
        url: String,
    },
    Sticker {
        source: StickerSource,
    },
}

impl ItemPayload {
    /// Storage tag for this payload kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Note { .. } => "text",
            Self::Photo { .. } => "image",
            Self::Sticker { .. } => "sticker",
        }
    }
}

/// One freeform element on a board.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasItem {
    /// Unique only within the owning board's item list, never globally.
    pub id: Uuid,
    pub payload: ItemPayload,
    pub position: Position,
    pub size: Size,
}

/// Caller-facing spec for a new item. Position and size fall back to the
/// placement policy and per-kind defaults when not given.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub payload: ItemPayload,
    pub position: Option<Position>,
    pub size: Option<Size>,
}

impl NewItem {
    #[must_use]
    pub fn new(payload: ItemPayload) -> Self {
        Self { payload, position: None, size: None }
    }

    #[must_use]
    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn sized(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }
}

// =============================================================================
// STORAGE RECORD
// =============================================================================

/// Flat storage projection of one item. Every optional field serializes as
/// an explicit null; this is the single normalization point before a write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub position: Position,
    pub size: Size,
    pub color: Option<String>,
    pub emoji: Option<String>,
    #[serde(rename = "fontSize")]
    pub font_size: Option<f32>,
    #[serde(rename = "textColor")]
    pub text_color: Option<String>,
}

impl CanvasItem {
    /// Project into the storage record.
    #[must_use]
    pub fn to_record(&self) -> ItemRecord {
        let (content, color, emoji, font_size, text_color) = match &self.payload {
            ItemPayload::Note { text, color, emoji, font_size, text_color } => (
                text.clone(),
                Some(color.clone()),
                emoji.clone(),
                *font_size,
                text_color.clone(),
            ),
            ItemPayload::Photo { url } => (url.clone(), None, None, None, None),
            ItemPayload::Sticker { source } => (source.to_content(), None, None, None, None),
        };
        ItemRecord {
            id: self.id.to_string(),
            kind: self.payload.kind().to_owned(),
            content,
            position: self.position,
            size: self.size,
            color,
            emoji,
            font_size,
            text_color,
        }
    }

    /// Rebuild from a storage record.
    ///
    /// Stored ids are not trusted to be stable across sessions; an id that
    /// does not parse gets a fresh one, the way the original data was
    /// repaired on load.
    ///
    /// # Errors
    ///
    /// Returns `UnknownKind` for any kind outside the three known variants.
    pub fn from_record(record: &ItemRecord) -> Result<Self, ValidationError> {
        let payload = match record.kind.as_str() {
            "text" => ItemPayload::Note {
                text: record.content.clone(),
                color: record
                    .color
                    .clone()
                    .unwrap_or_else(|| NOTE_COLORS[0].to_owned()),
                emoji: record.emoji.clone(),
                font_size: record.font_size,
                text_color: record.text_color.clone(),
            },
            "image" => ItemPayload::Photo { url: record.content.clone() },
            "sticker" => ItemPayload::Sticker { source: StickerSource::from_content(&record.content) },
            other => return Err(ValidationError::UnknownKind(other.to_owned())),
        };
        Ok(Self {
            id: Uuid::parse_str(&record.id).unwrap_or_else(|_| Uuid::new_v4()),
            payload,
            position: record.position,
            size: record.size,
        })
    }
}

// =============================================================================
// CANVAS
// =============================================================================

/// Visible canvas bounds used by the placement policy.
#[derive(Debug, Clone, Copy)]
pub struct CanvasBounds {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasBounds {
    fn default() -> Self {
        Self { width: 360.0, height: 500.0 }
    }
}

/// The mutable item list for one board, held by the owning session.
///
/// All mutations are synchronous and take effect immediately; persistence is
/// the caller's concern and always re-sends the whole list.
#[derive(Debug)]
pub struct Canvas {
    bounds: CanvasBounds,
    items: Vec<CanvasItem>,
}

impl Canvas {
    #[must_use]
    pub fn new(bounds: CanvasBounds) -> Self {
        Self { bounds, items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[CanvasItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Create an item from the spec and append it to the list.
    ///
    /// Without a caller-specified position, one is chosen pseudo-randomly
    /// inside the canvas bounds, clamped so the bounding box never goes
    /// negative. Best-effort layout only: overlap is permitted and expected.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for empty content or a note color
    /// outside the palette.
    pub fn create_item(&mut self, spec: NewItem) -> Result<CanvasItem, ValidationError> {
        validate_payload(&spec.payload)?;

        let size = spec.size.unwrap_or(match &spec.payload {
            ItemPayload::Sticker { .. } => DEFAULT_STICKER_SIZE,
            _ => DEFAULT_ITEM_SIZE,
        });
        let position = spec.position.unwrap_or_else(|| self.random_position(size));

        let item = CanvasItem { id: Uuid::new_v4(), payload: spec.payload, position, size };
        self.items.push(item.clone());
        Ok(item)
    }

    /// Replace the position of one item. Size and payload are untouched.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if `id` is absent from the current list.
    pub fn move_item(&mut self, id: Uuid, position: Position) -> Result<(), ValidationError> {
        let item = self.find_mut(id)?;
        item.position = position;
        Ok(())
    }

    /// Replace the size of one item, flooring both extents at
    /// [`MIN_ITEM_EXTENT`]. Only gesture-release sizes reach this; drag
    /// frames stay in the view layer.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if `id` is absent from the current list.
    pub fn resize_item(&mut self, id: Uuid, size: Size) -> Result<(), ValidationError> {
        let item = self.find_mut(id)?;
        item.size = Size {
            width: size.width.max(MIN_ITEM_EXTENT),
            height: size.height.max(MIN_ITEM_EXTENT),
        };
        Ok(())
    }

    /// Remove one item. Deleting the last item leaves an empty list; the
    /// board itself stays present.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if `id` is absent from the current list.
    pub fn delete_item(&mut self, id: Uuid) -> Result<(), ValidationError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(ValidationError::ItemNotFound(id))?;
        self.items.remove(index);
        Ok(())
    }

    /// Replace the entire list, e.g. after hydrating a stored board.
    pub fn replace_all(&mut self, items: Vec<CanvasItem>) {
        self.items = items;
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Project every item into its storage record, insertion order preserved.
    #[must_use]
    pub fn to_records(&self) -> Vec<ItemRecord> {
        self.items.iter().map(CanvasItem::to_record).collect()
    }

    fn find_mut(&mut self, id: Uuid) -> Result<&mut CanvasItem, ValidationError> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(ValidationError::ItemNotFound(id))
    }

    fn random_position(&self, size: Size) -> Position {
        let mut rng = rand::rng();
        let max_x = self.bounds.width - size.width;
        let max_y = self.bounds.height - size.height;
        Position {
            x: if max_x > 0.0 { rng.random_range(0.0..max_x) } else { PLACEMENT_FALLBACK },
            y: if max_y > 0.0 { rng.random_range(0.0..max_y) } else { PLACEMENT_FALLBACK },
        }
    }
}

fn validate_payload(payload: &ItemPayload) -> Result<(), ValidationError> {
    match payload {
        ItemPayload::Note { text, color, .. } => {
            if text.trim().is_empty() {
                return Err(ValidationError::EmptyContent);
            }
            if !NOTE_COLORS.contains(&color.as_str()) {
                return Err(ValidationError::ColorOutsidePalette(color.clone()));
            }
            Ok(())
        }
        ItemPayload::Photo { url } => {
            if url.trim().is_empty() {
                return Err(ValidationError::EmptyContent);
            }
            Ok(())
        }
        ItemPayload::Sticker { source } => {
            let name = match source {
                StickerSource::Remote(url) => url,
                StickerSource::Bundled(name) => name,
            };
            if name.trim().is_empty() {
                return Err(ValidationError::EmptyContent);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "canvas_test.rs"]
mod tests;
