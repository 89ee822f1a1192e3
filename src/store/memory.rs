//! In-memory document store.
//!
//! Shallow-merge semantics identical to the Postgres backend, so tests
//! exercise the same contract the hosted store provides.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::RwLock;

use super::{DbError, DocumentDatabase, Fields, OWNER_FIELD};

#[derive(Debug, Default)]
pub struct MemoryDb {
    docs: RwLock<HashMap<String, Fields>>,
}

impl MemoryDb {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentDatabase for MemoryDb {
    async fn get(&self, key: &str) -> Result<Option<Value>, DbError> {
        let docs = self.docs.read().await;
        Ok(docs.get(key).cloned().map(Value::Object))
    }

    async fn merge(&self, key: &str, fields: Fields) -> Result<(), DbError> {
        let mut docs = self.docs.write().await;
        let doc = docs.entry(key.to_owned()).or_default();
        for (name, value) in fields {
            doc.insert(name, value);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), DbError> {
        let mut docs = self.docs.write().await;
        docs.remove(key);
        Ok(())
    }

    async fn find_by_owner(
        &self,
        owner: &str,
        order_field: &str,
        descending: bool,
    ) -> Result<Vec<Value>, DbError> {
        let docs = self.docs.read().await;
        let mut hits: Vec<&Fields> = docs
            .values()
            .filter(|doc| doc.get(OWNER_FIELD).and_then(Value::as_str) == Some(owner))
            .collect();
        hits.sort_by_key(|doc| {
            doc.get(order_field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        });
        if descending {
            hits.reverse();
        }
        Ok(hits.into_iter().cloned().map(Value::Object).collect())
    }
}
