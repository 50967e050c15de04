use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use async_trait::async_trait;

use super::{NoteStore, Result};

/// In-memory stand-in for the Redis store, used by tests. Expiry is
/// tracked per key and applied lazily on access.
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    counters: HashMap<String, i64>,
    lists: HashMap<String, VecDeque<String>>,
}

struct Entry {
    value: String,
    expires_at: Instant,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces a key past its expiry, simulating elapsed store time.
    pub fn expire(&self, key: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.entries.get_mut(key) {
            entry.expires_at = Instant::now() - Duration::from_secs(1);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        purge(&mut inner, key);
        inner.entries.contains_key(key)
    }
}

fn purge(inner: &mut Inner, key: &str) {
    let expired = inner
        .entries
        .get(key)
        .is_some_and(|entry| entry.expires_at <= Instant::now());
    if expired {
        inner.entries.remove(key);
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.insert(
            key.into(),
            Entry {
                value: value.into(),
                expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut inner = self.inner.lock().unwrap();
        purge(&mut inner, key);
        Ok(inner.entries.get(key).map(|e| e.value.clone()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.remove(key);
        Ok(())
    }

    async fn ttl_remaining(&self, key: &str) -> Result<Option<u64>> {
        let mut inner = self.inner.lock().unwrap();
        purge(&mut inner, key);
        Ok(inner
            .entries
            .get(key)
            .map(|e| e.expires_at.saturating_duration_since(Instant::now()).as_secs()))
    }

    async fn increment(&self, key: &str) -> Result<i64> {
        let mut inner = self.inner.lock().unwrap();
        let counter = inner.counters.entry(key.into()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn get_counter(&self, key: &str) -> Result<i64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.counters.get(key).copied().unwrap_or(0))
    }

    async fn push_capped(&self, key: &str, value: &str, cap: usize) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let list = inner.lists.entry(key.into()).or_default();
        list.push_front(value.into());
        list.truncate(cap);
        Ok(())
    }

    async fn list_recent(&self, key: &str, count: usize) -> Result<Vec<String>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .lists
            .get(key)
            .map(|list| list.iter().take(count).cloned().collect())
            .unwrap_or_default())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn expired_keys_read_as_absent() -> Result<()> {
        let store = MemoryStore::new();
        store.put("note:abc", "{}", 300).await?;
        assert!(store.get("note:abc").await?.is_some());

        store.expire("note:abc");
        assert_eq!(store.get("note:abc").await?, None);
        assert_eq!(store.ttl_remaining("note:abc").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn capped_list_drops_oldest() -> Result<()> {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.push_capped("history", &i.to_string(), 3).await?;
        }
        let recent = store.list_recent("history", 10).await?;
        assert_eq!(recent, vec!["4", "3", "2"]);
        Ok(())
    }
}
