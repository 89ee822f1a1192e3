//! Board store — addressed reads and merge-upserts for day boards.
//!
//! DESIGN
//! ======
//! One document per (owner, date), addressed by `board_key`; no query runs
//! on the hot path. Every persisted mutation re-sends the whole item list
//! because items have no sub-document addressing. Each upsert stamps the
//! owner, the date, and a fresh `lastSavedAt`.
//!
//! ERROR HANDLING
//! ==============
//! A missing board is `Ok(None)` — the expected state for a fresh day —
//! never an error. Failed writes surface with the transport's message and
//! leave in-memory state untouched: the caller decides between retry and
//! reconcile, because a blind rollback could discard an edit made while the
//! write was in flight.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::board::{
    Board, BoardDate, BoardPatch, DEFAULT_BACKGROUND, DEFAULT_TITLE, OwnerId, board_key,
};
use crate::canvas::{CanvasItem, ItemRecord};
use crate::store::{DbError, DocumentDatabase, Fields};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BoardStoreError {
    #[error("database error: {0}")]
    Database(#[from] DbError),
    #[error("stored board {key} is malformed: {reason}")]
    Malformed { key: String, reason: String },
}

/// Wire layout of a stored board document. Items stay as raw values so a
/// single undecodable item cannot poison the whole board.
#[derive(Debug, Serialize, Deserialize)]
struct BoardDoc {
    #[serde(rename = "ownerId")]
    owner_id: OwnerId,
    #[serde(rename = "dateString")]
    date_string: BoardDate,
    #[serde(default)]
    title: Option<String>,
    #[serde(rename = "backgroundColor", default)]
    background_color: Option<String>,
    #[serde(default)]
    items: Vec<Value>,
    #[serde(rename = "snapshotImageUrl", default)]
    snapshot_image_url: Option<String>,
    #[serde(rename = "lastSavedAt", default)]
    last_saved_at: Option<DateTime<Utc>>,
}

// =============================================================================
// STORE
// =============================================================================

/// Translates board aggregate reads and writes into addressed operations
/// against the document database collaborator.
#[derive(Clone)]
pub struct BoardStore {
    db: Arc<dyn DocumentDatabase>,
}

impl BoardStore {
    #[must_use]
    pub fn new(db: Arc<dyn DocumentDatabase>) -> Self {
        Self { db }
    }

    /// Point lookup for one (owner, date). `Ok(None)` means no board has
    /// ever been saved for that day; callers treat it as the empty initial
    /// state, not a failure.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` when a document exists but cannot be decoded as
    /// a board, or `Database` when the read itself fails.
    pub async fn load_board_for_date(
        &self,
        owner: &OwnerId,
        date: BoardDate,
    ) -> Result<Option<Board>, BoardStoreError> {
        let key = board_key(owner, date);
        let Some(value) = self.db.get(&key).await? else {
            return Ok(None);
        };

        let doc: BoardDoc = serde_json::from_value(value).map_err(|e| {
            BoardStoreError::Malformed { key: key.clone(), reason: e.to_string() }
        })?;
        let board = decode_board(&key, doc);
        info!(%key, items = board.items.len(), "loaded board");
        Ok(Some(board))
    }

    /// Merge the patch into the stored board, creating it if absent.
    ///
    /// Last-merge-wins: there is no version token, so two sessions writing
    /// the same field concurrently resolve to whichever write lands last.
    /// Fields absent from the patch are never touched.
    ///
    /// # Errors
    ///
    /// Returns a database error if the write fails; local state is not
    /// rolled back here.
    pub async fn upsert_board(
        &self,
        owner: &OwnerId,
        date: BoardDate,
        patch: BoardPatch,
    ) -> Result<(), BoardStoreError> {
        let key = board_key(owner, date);
        let fields = patch_fields(owner, date, patch);
        self.db.merge(&key, fields).await?;
        info!(%key, "board upserted");
        Ok(())
    }

    /// Remove the whole aggregate — items, metadata, and snapshot — in one
    /// operation. Deleting an absent board is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns a database error if the delete fails.
    pub async fn delete_board(&self, owner: &OwnerId, date: BoardDate) -> Result<(), BoardStoreError> {
        let key = board_key(owner, date);
        self.db.delete(&key).await?;
        info!(%key, "board deleted");
        Ok(())
    }

    /// Every board for one owner, newest date first. Documents that fail to
    /// decode are skipped so one bad row cannot empty the albums view.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list_boards_for_owner(&self, owner: &OwnerId) -> Result<Vec<Board>, BoardStoreError> {
        let values = self.db.find_by_owner(owner.as_str(), "dateString", true).await?;
        let mut boards = Vec::with_capacity(values.len());
        for value in values {
            match serde_json::from_value::<BoardDoc>(value) {
                Ok(doc) => {
                    let key = board_key(&doc.owner_id, doc.date_string);
                    boards.push(decode_board(&key, doc));
                }
                Err(e) => warn!(%owner, error = %e, "skipping undecodable board document"),
            }
        }
        Ok(boards)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn patch_fields(owner: &OwnerId, date: BoardDate, patch: BoardPatch) -> Fields {
    let mut fields = Fields::new();
    // Stamped on every write, the way every original write carried them.
    fields.insert("ownerId".into(), serde_json::json!(owner));
    fields.insert("dateString".into(), serde_json::json!(date));
    fields.insert("lastSavedAt".into(), serde_json::json!(Utc::now()));

    if let Some(title) = patch.title {
        fields.insert("title".into(), Value::String(title));
    }
    if let Some(color) = patch.background_color {
        fields.insert("backgroundColor".into(), Value::String(color));
    }
    if let Some(items) = patch.items {
        let items = serde_json::to_value(items).unwrap_or_else(|_| Value::Array(Vec::new()));
        fields.insert("items".into(), items);
    }
    if let Some(snapshot) = patch.snapshot_image_url {
        let value = snapshot.map_or(Value::Null, Value::String);
        fields.insert("snapshotImageUrl".into(), value);
    }
    fields
}

fn decode_board(key: &str, doc: BoardDoc) -> Board {
    let mut items = Vec::with_capacity(doc.items.len());
    for value in doc.items {
        let record = match serde_json::from_value::<ItemRecord>(value) {
            Ok(record) => record,
            Err(e) => {
                warn!(%key, error = %e, "skipping undecodable board item");
                continue;
            }
        };
        match CanvasItem::from_record(&record) {
            Ok(item) => items.push(item),
            Err(e) => warn!(%key, error = %e, "skipping board item"),
        }
    }

    Board {
        owner_id: doc.owner_id,
        date: doc.date_string,
        title: doc.title.unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
        background_color: doc
            .background_color
            .unwrap_or_else(|| DEFAULT_BACKGROUND.to_owned()),
        items,
        snapshot_image_url: doc.snapshot_image_url,
        last_saved_at: doc.last_saved_at,
    }
}

#[cfg(test)]
#[path = "boards_test.rs"]
mod tests;
