//! Board session — the screen-facing facade for one day's board.
//!
//! DESIGN
//! ======
//! A session owns the in-memory canvas for exactly one (owner, date) pair.
//! Mutations apply locally first, then persist by re-sending the entire
//! serialized item list as a merge-upsert; there is no per-item remote
//! mutation. Every mutating method takes `&mut self`, so one session can
//! never have two writes to the same aggregate in flight — the client-side
//! mutual-exclusion convention the UI relies on, enforced by the borrow
//! checker instead of a busy flag.
//!
//! ERROR HANDLING
//! ==============
//! Errors are returned, never panicked, and carry enough to render a user
//! alert via [`UserAlert`]. A failed write leaves the optimistic local
//! state in place: a blind rollback could discard an edit made while the
//! write was in flight, so the user retries by repeating the gesture. No
//! operation retries automatically, and an issued write is never cancelled.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::board::{
    BOARD_COLORS, BoardDate, BoardPatch, DEFAULT_BACKGROUND, DEFAULT_TITLE, OwnerId,
};
use crate::canvas::{
    Canvas, CanvasBounds, CanvasItem, ItemPayload, NOTE_COLORS, NewItem, Position, Size,
    StickerSource, ValidationError,
};
use crate::services::boards::{BoardStore, BoardStoreError};
use crate::services::snapshot::{RenderTarget, capture_and_upload_snapshot};
use crate::upload::{CapturedImage, ImageUploader, UploadError};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No signed-in owner at the time a persistence operation was attempted.
    /// Fatal to that operation; never retried automatically.
    #[error("authentication required; no signed-in owner")]
    AuthenticationRequired,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] BoardStoreError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Maps an error to the alert title a screen shows above its message.
pub trait UserAlert: std::fmt::Display {
    fn alert_title(&self) -> &'static str;
}

impl UserAlert for SessionError {
    fn alert_title(&self) -> &'static str {
        match self {
            Self::AuthenticationRequired => "Authentication Error",
            Self::Validation(_) => "Invalid Item",
            Self::Store(_) => "Sync Failed",
            Self::Upload(_) => "Upload Failed",
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Styling choices from the note composer. Unset fields fall back to the
/// palette defaults.
#[derive(Debug, Clone, Default)]
pub struct NoteStyle {
    pub color: Option<String>,
    pub emoji: Option<String>,
    pub font_size: Option<f32>,
    pub text_color: Option<String>,
}

/// One screen's handle on one day's board.
pub struct BoardSession {
    /// Signed-in owner, if any. Persistence fails without one.
    owner: Option<OwnerId>,
    date: BoardDate,
    store: BoardStore,
    uploader: Arc<dyn ImageUploader>,
    canvas: Canvas,
    title: String,
    background_color: String,
    snapshot_image_url: Option<String>,
    board_exists: bool,
}

impl BoardSession {
    #[must_use]
    pub fn new(
        owner: Option<OwnerId>,
        date: BoardDate,
        bounds: CanvasBounds,
        store: BoardStore,
        uploader: Arc<dyn ImageUploader>,
    ) -> Self {
        Self {
            owner,
            date,
            store,
            uploader,
            canvas: Canvas::new(bounds),
            title: DEFAULT_TITLE.to_owned(),
            background_color: DEFAULT_BACKGROUND.to_owned(),
            snapshot_image_url: None,
            board_exists: false,
        }
    }

    /// Session for the device-local current date.
    #[must_use]
    pub fn for_today(
        owner: Option<OwnerId>,
        bounds: CanvasBounds,
        store: BoardStore,
        uploader: Arc<dyn ImageUploader>,
    ) -> Self {
        Self::new(owner, BoardDate::today_local(), bounds, store, uploader)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Load the stored board, or start from the empty initial state when no
    /// board has been saved for this day yet.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationRequired` without a signed-in owner, or a
    /// store error if the read fails.
    pub async fn open(&mut self) -> Result<(), SessionError> {
        let owner = self.owner()?.clone();
        match self.store.load_board_for_date(&owner, self.date).await? {
            Some(board) => {
                self.title = board.title;
                self.background_color = board.background_color;
                self.snapshot_image_url = board.snapshot_image_url;
                self.canvas.replace_all(board.items);
                self.board_exists = true;
            }
            None => {
                // Expected for a fresh day: nothing stored, start empty.
                self.reset_local();
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Item mutations — optimistic local update, then whole-list upsert
    // -------------------------------------------------------------------------

    /// Add a text note and persist.
    ///
    /// # Errors
    ///
    /// Validation failures (empty text, off-palette color) surface before
    /// any network call is attempted.
    pub async fn add_note(
        &mut self,
        text: impl Into<String>,
        style: NoteStyle,
    ) -> Result<CanvasItem, SessionError> {
        let payload = ItemPayload::Note {
            text: text.into(),
            color: style.color.unwrap_or_else(|| NOTE_COLORS[0].to_owned()),
            emoji: style.emoji,
            font_size: style.font_size,
            text_color: style.text_color,
        };
        self.add_item(NewItem::new(payload)).await
    }

    /// Add a sticker and persist.
    ///
    /// # Errors
    ///
    /// Returns validation, authentication, or store errors.
    pub async fn add_sticker(&mut self, source: StickerSource) -> Result<CanvasItem, SessionError> {
        self.add_item(NewItem::new(ItemPayload::Sticker { source })).await
    }

    /// Upload a picked photo, then add it as a board item.
    ///
    /// An upload failure aborts the add: no item is created without a
    /// stable URL. This is the opposite of the snapshot path, where upload
    /// failures are tolerated.
    ///
    /// # Errors
    ///
    /// Returns upload, authentication, or store errors.
    pub async fn add_photo(&mut self, image: CapturedImage) -> Result<CanvasItem, SessionError> {
        self.owner()?;
        let url = self.uploader.upload(image).await?;
        self.add_item(NewItem::new(ItemPayload::Photo { url })).await
    }

    /// Replace one item's position (drag release) and persist.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound`, authentication, or store errors.
    pub async fn move_item(&mut self, id: Uuid, position: Position) -> Result<(), SessionError> {
        self.canvas.move_item(id, position)?;
        self.persist_items().await
    }

    /// Replace one item's size (resize release) and persist.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound`, authentication, or store errors.
    pub async fn resize_item(&mut self, id: Uuid, size: Size) -> Result<(), SessionError> {
        self.canvas.resize_item(id, size)?;
        self.persist_items().await
    }

    /// Remove one item and persist. Irreversible; the caller must have
    /// confirmed with the user first.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound`, authentication, or store errors.
    pub async fn delete_item(&mut self, id: Uuid) -> Result<(), SessionError> {
        self.canvas.delete_item(id)?;
        self.persist_items().await
    }

    // -------------------------------------------------------------------------
    // Metadata
    // -------------------------------------------------------------------------

    /// Local only; rides along with every subsequent upsert.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Pick a board background from the preset palette. Local only.
    ///
    /// # Errors
    ///
    /// Returns `ColorOutsidePalette` for anything off the preset list.
    pub fn set_background(&mut self, color: &str) -> Result<(), SessionError> {
        if !BOARD_COLORS.contains(&color) {
            return Err(ValidationError::ColorOutsidePalette(color.to_owned()).into());
        }
        self.background_color = color.to_owned();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Save / delete
    // -------------------------------------------------------------------------

    /// Explicit save: best-effort snapshot capture and upload, then a full
    /// metadata + item upsert. A missing snapshot writes an explicit null.
    ///
    /// # Errors
    ///
    /// Returns authentication or store errors. Snapshot failures do not
    /// surface here.
    pub async fn save(&mut self, target: &dyn RenderTarget) -> Result<(), SessionError> {
        let owner = self.owner()?.clone();
        let snapshot = capture_and_upload_snapshot(target, self.uploader.as_ref()).await;
        self.snapshot_image_url = snapshot.clone();

        let patch = BoardPatch::new()
            .title(self.title.clone())
            .background_color(self.background_color.clone())
            .items(self.canvas.to_records())
            .snapshot(snapshot);
        self.store.upsert_board(&owner, self.date, patch).await?;
        self.board_exists = true;
        info!(date = %self.date, items = self.canvas.len(), "board saved");
        Ok(())
    }

    /// Delete the whole aggregate and reset local state to the defaults.
    /// Irreversible; caller-confirmed. Deleting a board that was never
    /// saved is a remote no-op and still resets locally.
    ///
    /// # Errors
    ///
    /// Returns authentication or store errors.
    pub async fn delete_board(&mut self) -> Result<(), SessionError> {
        let owner = self.owner()?.clone();
        self.store.delete_board(&owner, self.date).await?;
        self.reset_local();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn date(&self) -> BoardDate {
        self.date
    }

    #[must_use]
    pub fn items(&self) -> &[CanvasItem] {
        self.canvas.items()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn background_color(&self) -> &str {
        &self.background_color
    }

    #[must_use]
    pub fn snapshot_image_url(&self) -> Option<&str> {
        self.snapshot_image_url.as_deref()
    }

    /// Whether a document is known to exist remotely for this day.
    #[must_use]
    pub fn board_exists(&self) -> bool {
        self.board_exists
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn owner(&self) -> Result<&OwnerId, SessionError> {
        self.owner.as_ref().ok_or(SessionError::AuthenticationRequired)
    }

    async fn add_item(&mut self, spec: NewItem) -> Result<CanvasItem, SessionError> {
        // Validation happens locally, before any network call.
        let item = self.canvas.create_item(spec)?;
        self.persist_items().await?;
        Ok(item)
    }

    /// Upsert the entire current item list plus the metadata that rides
    /// along with every write.
    async fn persist_items(&mut self) -> Result<(), SessionError> {
        let owner = self.owner()?.clone();
        let patch = BoardPatch::new()
            .title(self.title.clone())
            .background_color(self.background_color.clone())
            .items(self.canvas.to_records());
        self.store.upsert_board(&owner, self.date, patch).await?;
        self.board_exists = true;
        Ok(())
    }

    fn reset_local(&mut self) {
        self.title = DEFAULT_TITLE.to_owned();
        self.background_color = DEFAULT_BACKGROUND.to_owned();
        self.snapshot_image_url = None;
        self.canvas.clear();
        self.board_exists = false;
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
