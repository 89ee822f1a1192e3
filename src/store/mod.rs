//! Document store — point-addressed JSON document persistence.
//!
//! ARCHITECTURE
//! ============
//! Board services talk to a [`DocumentDatabase`] collaborator: point read by
//! key, shallow field-merge write (create-if-absent), full-document delete,
//! and one owner-scoped listing query. [`MemoryDb`] backs tests and embedded
//! use; [`PostgresDb`] maps the same contract onto a single JSONB table.
//! Read-after-write for one key from the same client is assumed strongly
//! consistent.

pub mod memory;
pub mod postgres;

pub use memory::MemoryDb;
pub use postgres::PostgresDb;

use serde_json::{Map, Value};

/// Top-level fields of a stored document.
pub type Fields = Map<String, Value>;

/// Field every stored document uses to advertise its owner; the listing
/// query filters on it.
pub const OWNER_FIELD: &str = "ownerId";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Async document-database collaborator. Object-safe so callers can hold
/// `Arc<dyn DocumentDatabase>` and tests can substitute mocks.
#[async_trait::async_trait]
pub trait DocumentDatabase: Send + Sync {
    /// Point read by key. A missing document is `Ok(None)`, never an error.
    async fn get(&self, key: &str) -> Result<Option<Value>, DbError>;

    /// Shallow field-merge write. Creates the document when absent; fields
    /// not named in `fields` are left untouched.
    async fn merge(&self, key: &str, fields: Fields) -> Result<(), DbError>;

    /// Full-document delete. Deleting a missing key is a no-op.
    async fn delete(&self, key: &str) -> Result<(), DbError>;

    /// All documents whose [`OWNER_FIELD`] equals `owner`, ordered by the
    /// named top-level field.
    async fn find_by_owner(
        &self,
        owner: &str,
        order_field: &str,
        descending: bool,
    ) -> Result<Vec<Value>, DbError>;
}
