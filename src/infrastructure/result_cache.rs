//! In-memory store of completed pipeline runs keyed by request
//!
//! Entries never expire. Only successful runs are inserted; callers decide
//! when to bypass or invalidate.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{ProfileBatch, ScrapeRequest};

#[derive(Debug, Default, Clone)]
pub struct ResultCache {
    entries: Arc<RwLock<HashMap<String, Arc<ProfileBatch>>>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, request: &ScrapeRequest) -> Option<Arc<ProfileBatch>> {
        let key = request.cache_key();
        let hit = self.entries.read().await.get(&key).cloned();
        debug!(key = %key, hit = hit.is_some(), "Result cache lookup");
        hit
    }

    pub async fn insert(&self, request: &ScrapeRequest, batch: ProfileBatch) -> Arc<ProfileBatch> {
        let batch = Arc::new(batch);
        self.entries
            .write()
            .await
            .insert(request.cache_key(), Arc::clone(&batch));
        batch
    }

    /// Remove one entry; returns whether it existed
    pub async fn invalidate(&self, request: &ScrapeRequest) -> bool {
        self.entries.write().await.remove(&request.cache_key()).is_some()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_for(request: &ScrapeRequest) -> ProfileBatch {
        ProfileBatch::new(request, Vec::new(), None)
    }

    #[tokio::test]
    async fn insert_then_get_returns_same_batch() {
        let cache = ResultCache::new();
        let request = ScrapeRequest::new("rust", 2);

        let stored = cache.insert(&request, batch_for(&request)).await;
        let fetched = cache.get(&request).await.unwrap();

        assert!(Arc::ptr_eq(&stored, &fetched));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn keys_distinguish_page_counts() {
        let cache = ResultCache::new();
        let two = ScrapeRequest::new("rust", 2);
        let three = ScrapeRequest::new("rust", 3);

        cache.insert(&two, batch_for(&two)).await;

        assert!(cache.get(&two).await.is_some());
        assert!(cache.get(&three).await.is_none());
    }

    #[tokio::test]
    async fn invalidate_and_clear() {
        let cache = ResultCache::new();
        let request = ScrapeRequest::default();
        cache.insert(&request, batch_for(&request)).await;

        assert!(cache.invalidate(&request).await);
        assert!(!cache.invalidate(&request).await);
        assert!(cache.is_empty().await);

        cache.insert(&request, batch_for(&request)).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let cache = ResultCache::new();
        let other = cache.clone();
        let request = ScrapeRequest::default();

        other.insert(&request, batch_for(&request)).await;
        assert!(cache.get(&request).await.is_some());
    }
}
