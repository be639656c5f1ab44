//! MAGS 데이터 수집.
//!
//! 이 crate는 다음을 제공합니다:
//! - 보유 종목 소스 (StockAnalysis, Yahoo Finance, Roundhill)
//! - MAG7 실시간 시세 (Yahoo Finance)
//! - TTL 메모리 캐시
//! - 순서가 있는 소스 폴백 체인
//! - 위 구성 요소를 조립한 `FundDataService`

pub mod cache;
pub mod chain;
pub mod error;
pub mod provider;
pub mod service;

pub use error::{DataError, Result};

pub use cache::{CachedHoldingsSource, TtlCache};
pub use chain::{FetchReport, SourceChain, SourceFailure};
pub use provider::{
    build_http_client, HoldingsSource, QuoteSource, RoundhillSource, SourceKind,
    StockAnalysisSource, YahooHoldingsSource, YahooQuoteSource,
};
pub use service::{configured_order, FundDataService};
