//! In-memory `MovieStore` used by tests in this crate and the lambda crates.

use crate::access::SecondaryIndex;
use crate::codec::{self, Item};
use crate::error::StoreError;
use crate::store::MovieStore;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryMovieStore {
    rows: Mutex<HashMap<String, Item>>,
    failing_ids: Mutex<HashSet<String>>,
    offline: AtomicBool,
    requests: AtomicUsize,
}

impl MemoryMovieStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let store = Self::new();
        {
            let mut rows = store.rows.lock().unwrap();
            for item in items {
                let key = item
                    .get(codec::MOVIE_ID)
                    .map(codec::decode_attribute)
                    .unwrap_or_default();
                rows.insert(key, item);
            }
        }
        store
    }

    /// Every request fails as if the table were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Requests touching this key fail.
    pub fn fail_on(&self, movie_id: &str) {
        self.failing_ids.lock().unwrap().insert(movie_id.to_string());
    }

    /// Number of requests that reached the store, failed ones included.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn row(&self, movie_id: &str) -> Option<Item> {
        self.rows.lock().unwrap().get(movie_id).cloned()
    }

    pub fn score(&self, movie_id: &str) -> Option<u64> {
        self.row(movie_id)
            .and_then(|item| item.get(codec::GRINNING_SCORE).cloned())
            .and_then(|v| codec::decode_attribute(&v).parse().ok())
    }

    fn begin(&self, movie_id: Option<&str>) -> Result<(), StoreError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Request("store offline".to_string()));
        }
        if let Some(id) = movie_id {
            if self.failing_ids.lock().unwrap().contains(id) {
                return Err(StoreError::Request(format!("injected failure for {}", id)));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MovieStore for MemoryMovieStore {
    async fn get(&self, movie_id: &str) -> Result<Option<Item>, StoreError> {
        self.begin(Some(movie_id))?;
        Ok(self.row(movie_id))
    }

    async fn query_index(
        &self,
        index: SecondaryIndex,
        value: &str,
    ) -> Result<Vec<Item>, StoreError> {
        self.begin(None)?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|item| {
                matches!(item.get(index.attribute()), Some(AttributeValue::S(v)) if v == value)
            })
            .cloned()
            .collect())
    }

    async fn scan(&self, limit: i32) -> Result<Vec<Item>, StoreError> {
        self.begin(None)?;
        let limit = usize::try_from(limit).unwrap_or(0);
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().take(limit).cloned().collect())
    }

    async fn put(&self, item: Item) -> Result<(), StoreError> {
        let key = item
            .get(codec::MOVIE_ID)
            .map(codec::decode_attribute)
            .unwrap_or_default();
        self.begin(Some(&key))?;
        self.rows.lock().unwrap().insert(key, item);
        Ok(())
    }

    async fn add_score(&self, movie_id: &str, delta: u64) -> Result<(), StoreError> {
        self.begin(Some(movie_id))?;
        let mut rows = self.rows.lock().unwrap();
        let item = rows.get_mut(movie_id).ok_or(StoreError::ConditionFailed)?;
        let current: u64 = item
            .get(codec::GRINNING_SCORE)
            .map(codec::decode_attribute)
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        let total = current.checked_add(delta).ok_or_else(|| {
            StoreError::Request(format!("score overflow for {}", movie_id))
        })?;
        item.insert(
            codec::GRINNING_SCORE.to_string(),
            AttributeValue::N(total.to_string()),
        );
        Ok(())
    }
}
