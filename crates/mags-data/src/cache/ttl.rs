//! 시간 제한(TTL) 메모리 캐시.
//!
//! 저장 시각으로부터 TTL이 지나지 않은 값만 반환합니다. 시각은
//! `tokio::time::Instant`를 사용하므로 테스트에서 시계를 멈추고 앞당길 수 있습니다.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// 캐시 항목.
#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    stored_at: Instant,
}

/// 키 → (값, 저장 시각) TTL 캐시.
///
/// 복제 시 같은 저장소를 공유합니다.
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<String, Entry<T>>>>,
}

impl<T> Clone for TtlCache<T> {
    fn clone(&self) -> Self {
        Self {
            ttl: self.ttl,
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T: Clone> TtlCache<T> {
    /// 새 캐시를 생성합니다.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 유효한 값을 조회합니다.
    pub async fn get(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .map(|e| e.value.clone())
    }

    /// 값을 저장합니다.
    pub async fn insert(&self, key: impl Into<String>, value: T) {
        self.entries.write().await.insert(
            key.into(),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// 유효한 값이 있으면 반환하고, 없으면 `fetch`로 가져와 저장합니다.
    ///
    /// 실패한 결과는 캐시하지 않습니다.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(key).await {
            tracing::debug!(key = key, "캐시 적중");
            return Ok(value);
        }

        let value = fetch().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    /// 모든 항목을 삭제합니다.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// 저장된 항목 수 (만료된 항목 포함).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
