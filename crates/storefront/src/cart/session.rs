//! Key-value session contract used by the cart.
//!
//! The cart never touches a global session. It is handed a [`SessionStore`]
//! at construction: in the server this is the request's
//! [`tower_sessions::Session`], in tests a [`MemorySession`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors raised by a session backend.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// The underlying tower-sessions record could not be read or written.
    #[error("session backend error: {0}")]
    Backend(#[from] tower_sessions::session::Error),

    /// A value could not be converted to or from JSON.
    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Per-user key-value storage of JSON blobs.
pub trait SessionStore: Send + Sync {
    /// Read the blob stored under `key`, if any.
    fn get(&self, key: &str)
    -> impl Future<Output = Result<Option<Value>, SessionStoreError>> + Send;

    /// Store `value` under `key`, replacing any previous blob.
    fn set(
        &self,
        key: &str,
        value: Value,
    ) -> impl Future<Output = Result<(), SessionStoreError>> + Send;

    /// Remove `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), SessionStoreError>> + Send;

    /// Flag the session as modified so the backend persists it.
    fn mark_dirty(&self) -> impl Future<Output = ()> + Send;
}

impl SessionStore for tower_sessions::Session {
    async fn get(&self, key: &str) -> Result<Option<Value>, SessionStoreError> {
        Ok(Self::get::<Value>(self, key).await?)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), SessionStoreError> {
        Ok(self.insert(key, value).await?)
    }

    async fn delete(&self, key: &str) -> Result<(), SessionStoreError> {
        self.remove_value(key).await?;
        Ok(())
    }

    // insert and remove already flag the record as modified
    async fn mark_dirty(&self) {}
}

/// In-memory session for tests and local tooling.
///
/// Clones share the same underlying map, so a test can keep a handle and
/// inspect what the cart wrote.
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    values: Arc<Mutex<HashMap<String, Value>>>,
    dirty: Arc<AtomicBool>,
}

impl MemorySession {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `mark_dirty` has been called since creation or the last
    /// [`MemorySession::reset_dirty`].
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag.
    pub fn reset_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    /// Snapshot of the blob under `key`.
    pub async fn raw(&self, key: &str) -> Option<Value> {
        self.values.lock().await.get(key).cloned()
    }
}

impl SessionStore for MemorySession {
    async fn get(&self, key: &str) -> Result<Option<Value>, SessionStoreError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), SessionStoreError> {
        self.values.lock().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), SessionStoreError> {
        self.values.lock().await.remove(key);
        Ok(())
    }

    async fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }
}
