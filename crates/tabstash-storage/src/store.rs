//! Key-value storage capability

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// Asynchronous get/set over JSON documents.
///
/// The backend offers no transactions: callers that read-modify-write a key
/// must serialize their own mutations.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the document stored under `key`, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the document stored under `key`.
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}
