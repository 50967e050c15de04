//! Ephemeral key-value store contract.
//!
//! Everything written here carries a TTL and disappears on its own; the
//! store is the sole authority on expiry-by-time. Keys:
//!
//! ```text
//! note:{token}          → Note JSON (auto-expires)
//! stats:created_total   → creation counter
//! history:creations     → capped list of content-free creation events
//! ```

mod redis;

pub use self::redis::RedisStore;

#[cfg(test)]
mod memory;
#[cfg(test)]
pub use memory::MemoryStore;

use std::sync::Arc;

use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Redis(#[from] ::redis::RedisError),
}

pub type Store = Arc<dyn NoteStore>;

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Writes `value` under `key` with an absolute expiry `ttl_seconds`
    /// from now. Overwrites any previous value and its TTL.
    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()>;

    /// Returns the value, or `None` if the key never existed, expired or
    /// was deleted. Those cases are indistinguishable on purpose.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Remaining lifetime in seconds, `None` for absent or non-expiring keys.
    async fn ttl_remaining(&self, key: &str) -> Result<Option<u64>>;

    async fn increment(&self, key: &str) -> Result<i64>;

    async fn get_counter(&self, key: &str) -> Result<i64>;

    /// Prepends `value` to the list at `key`, trimming it to `cap` entries.
    async fn push_capped(&self, key: &str, value: &str, cap: usize) -> Result<()>;

    /// Newest-first entries of the list at `key`, at most `count`.
    async fn list_recent(&self, key: &str, count: usize) -> Result<Vec<String>>;

    async fn ping(&self) -> Result<()>;
}

pub fn note_key(token: &str) -> String {
    format!("note:{token}")
}
