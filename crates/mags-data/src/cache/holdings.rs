//! 보유 종목 소스 캐시 데코레이터.

use async_trait::async_trait;
use std::sync::Arc;

use super::ttl::TtlCache;
use crate::error::Result;
use crate::provider::{HoldingsSource, SourceKind};
use mags_core::HoldingsSnapshot;

/// 임의의 소스를 TTL 캐시로 감쌉니다. 캐시 키는 소스 이름입니다.
pub struct CachedHoldingsSource {
    inner: Arc<dyn HoldingsSource>,
    cache: TtlCache<HoldingsSnapshot>,
}

impl CachedHoldingsSource {
    /// 소스와 (공유 가능한) 캐시로 생성합니다.
    pub fn new(inner: Arc<dyn HoldingsSource>, cache: TtlCache<HoldingsSnapshot>) -> Self {
        Self { inner, cache }
    }

    /// 이 소스의 캐시 항목을 포함한 캐시 전체를 비웁니다.
    pub async fn clear(&self) {
        self.cache.clear().await;
    }
}

#[async_trait]
impl HoldingsSource for CachedHoldingsSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn kind(&self) -> SourceKind {
        self.inner.kind()
    }

    async fn fetch(&self) -> Result<HoldingsSnapshot> {
        let key = self.inner.name().to_string();
        self.cache
            .get_or_try_insert_with(&key, || self.inner.fetch())
            .await
    }
}
