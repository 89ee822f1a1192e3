//! Board aggregate — one mood board per owner per calendar day.
//!
//! DESIGN
//! ======
//! A board's storage key is derived from its owner and date, so reads and
//! writes address the aggregate directly; no index lookup or query exists on
//! the hot path. Boards of different dates are unrelated.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::canvas::{CanvasItem, ItemRecord};

/// Placeholder title for a board that has never been renamed.
pub const DEFAULT_TITLE: &str = "Today's Emotions";

/// Background color for a board that has never been recolored.
pub const DEFAULT_BACKGROUND: &str = "#E0F7FA";

/// Preset board background palette.
pub const BOARD_COLORS: [&str; 15] = [
    "#FDEEDC", "#D6E5FA", "#E3DFFD", "#FFF7D4", "#FFB5B5", "#F6DFEB", "#D1FFF3", "#B5EAEA",
    "#EDEDED", "#DFCCFB", "#BBE2EC", "#C3EDC0", "#F9C5D1", "#F7D6E0", "#FFFACD",
];

// =============================================================================
// IDENTITY
// =============================================================================

/// Opaque identifier for a board's owner. Always threaded explicitly; there
/// is no ambient "current user".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl OwnerId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Calendar date in `YYYY-MM-DD` form — the board's sharding key, taken from
/// the device's local clock, not UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoardDate(NaiveDate);

impl BoardDate {
    /// Today according to the device's local timezone.
    #[must_use]
    pub fn today_local() -> Self {
        Self(Local::now().date_naive())
    }

    #[must_use]
    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl std::fmt::Display for BoardDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid board date (expected YYYY-MM-DD): {0}")]
pub struct ParseDateError(String);

impl std::str::FromStr for BoardDate {
    type Err = ParseDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ParseDateError(s.to_owned()))
    }
}

impl Serialize for BoardDate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BoardDate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Deterministic document key for one (owner, date) aggregate.
#[must_use]
pub fn board_key(owner: &OwnerId, date: BoardDate) -> String {
    format!("owner_{owner}_board_{date}")
}

// =============================================================================
// AGGREGATE
// =============================================================================

/// The per-owner, per-date aggregate. Exactly one logical board exists per
/// (owner, date) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub owner_id: OwnerId,
    pub date: BoardDate,
    pub title: String,
    pub background_color: String,
    /// Insertion order preserved; z-order is implied by list order.
    pub items: Vec<CanvasItem>,
    /// Rasterized capture of the rendered board, written only on explicit
    /// save.
    pub snapshot_image_url: Option<String>,
    pub last_saved_at: Option<DateTime<Utc>>,
}

impl Board {
    /// Empty initial state for a day with no stored document.
    #[must_use]
    pub fn empty(owner_id: OwnerId, date: BoardDate) -> Self {
        Self {
            owner_id,
            date,
            title: DEFAULT_TITLE.to_owned(),
            background_color: DEFAULT_BACKGROUND.to_owned(),
            items: Vec::new(),
            snapshot_image_url: None,
            last_saved_at: None,
        }
    }

    /// Replace the entire item list. Items have no sub-document addressing,
    /// so every persisted mutation re-sends the list whole.
    pub fn replace_items(&mut self, items: Vec<CanvasItem>) {
        self.items = items;
    }
}

/// Partial field set for a merge-upsert. Only fields set here reach the
/// stored document; everything else is left untouched.
#[derive(Debug, Clone, Default)]
pub struct BoardPatch {
    pub title: Option<String>,
    pub background_color: Option<String>,
    /// Always the entire current list when present, never a delta.
    pub items: Option<Vec<ItemRecord>>,
    /// `None` leaves the stored snapshot untouched; `Some(None)` writes an
    /// explicit null; `Some(Some(url))` replaces it.
    pub snapshot_image_url: Option<Option<String>>,
}

impl BoardPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    #[must_use]
    pub fn items(mut self, items: Vec<ItemRecord>) -> Self {
        self.items = Some(items);
        self
    }

    #[must_use]
    pub fn snapshot(mut self, url: Option<String>) -> Self {
        self.snapshot_image_url = Some(url);
        self
    }
}
