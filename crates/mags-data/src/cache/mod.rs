//! 캐싱 레이어.
//!
//! - TTL 캐시: 시간 제한 메모리 캐시 (보유 종목 15분, 시세 5분)
//! - 보유 종목 캐시: 소스 데코레이터

pub mod holdings;
pub mod ttl;

pub use holdings::CachedHoldingsSource;
pub use ttl::TtlCache;
