//! Deduplicating fetch cache keyed by [`CacheKey`]

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::source::error::TransportError;
use crate::source::query::Request;
use crate::source::strategy::CacheKey;
use crate::source::transport::Transport;

/// At most one in-flight request per key; successful payloads are memoized
/// until [`AsyncCache::clear`]. Failed fetches are not stored, so the next
/// caller for the same key tries again.
pub struct AsyncCache {
    transport: Arc<dyn Transport>,
    entries: Mutex<HashMap<CacheKey, Arc<OnceCell<Value>>>>,
}

impl AsyncCache {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the payload for `key`, sending `request` only if nothing is
    /// cached or in flight for it
    pub async fn fetch(&self, key: CacheKey, request: &Request) -> Result<Value, TransportError> {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries.entry(key).or_default().clone()
        };

        let payload = cell
            .get_or_try_init(|| async {
                debug!("Cache miss, fetching {}", request.url);
                self.transport.send(request).await
            })
            .await?;

        Ok(payload.clone())
    }

    /// Drops every memoized payload
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::transport::MockTransport;
    use serde_json::json;

    fn key(url: &str) -> CacheKey {
        CacheKey::Rest {
            url: url.to_string(),
            token: None,
        }
    }

    #[tokio::test]
    async fn fetch_memoizes_payload_per_key() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(json!({"tag_name": "v1"})));
        let cache = AsyncCache::new(Arc::new(transport));
        let request = Request::get("https://api.github.com/a");

        let first = cache.fetch(key("a"), &request).await.unwrap();
        let second = cache.fetch(key("a"), &request).await.unwrap();

        assert_eq!(first, json!({"tag_name": "v1"}));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn fetch_sends_once_for_concurrent_callers() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(json!([])));
        let cache = AsyncCache::new(Arc::new(transport));
        let request = Request::get("https://api.github.com/a");

        let (first, second) = tokio::join!(
            cache.fetch(key("a"), &request),
            cache.fetch(key("a"), &request)
        );

        assert_eq!(first.unwrap(), json!([]));
        assert_eq!(second.unwrap(), json!([]));
    }

    #[tokio::test]
    async fn fetch_keeps_distinct_keys_apart() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(2)
            .returning(|request| Ok(json!(request.url)));
        let cache = AsyncCache::new(Arc::new(transport));

        let a = cache
            .fetch(key("a"), &Request::get("https://api.github.com/a"))
            .await
            .unwrap();
        let b = cache
            .fetch(key("b"), &Request::get("https://api.github.com/b"))
            .await
            .unwrap();

        assert_eq!(a, json!("https://api.github.com/a"));
        assert_eq!(b, json!("https://api.github.com/b"));
    }

    #[tokio::test]
    async fn fetch_does_not_memoize_failures() {
        let mut transport = MockTransport::new();
        let mut seq = mockall::Sequence::new();
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(TransportError::no_response("timeout")));
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(json!({"ok": true})));
        let cache = AsyncCache::new(Arc::new(transport));
        let request = Request::get("https://api.github.com/a");

        assert!(cache.fetch(key("a"), &request).await.is_err());
        assert_eq!(
            cache.fetch(key("a"), &request).await.unwrap(),
            json!({"ok": true})
        );
    }

    #[tokio::test]
    async fn clear_forces_refetch() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(2)
            .returning(|_| Ok(json!(1)));
        let cache = AsyncCache::new(Arc::new(transport));
        let request = Request::get("https://api.github.com/a");

        cache.fetch(key("a"), &request).await.unwrap();
        cache.clear().await;
        cache.fetch(key("a"), &request).await.unwrap();
    }
}
