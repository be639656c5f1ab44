//! 노출 분석 및 시나리오 계산 도메인 모델.
//!
//! - [`resolver`]: 종목명 → 티커 변환
//! - [`normalizer`]: 비중 정규화
//! - [`snapshot`]: 보유 종목 스냅샷
//! - [`bumps`]: 가격 변동(범프) 집합과 텍스트 파서
//! - [`scenario`]: what-if 시나리오 엔진
//! - [`quote`]: 실시간 시세와 변동률

pub mod bumps;
pub mod normalizer;
pub mod quote;
pub mod resolver;
pub mod scenario;
pub mod snapshot;

pub use bumps::{
    parse_bump_entry, parse_bumps_text, BumpParseOutcome, BumpSet, BumpWarning, MAX_MOVE_PCT,
    WILDCARD_KEY,
};
pub use normalizer::{normalize, WeightSummary};
pub use quote::{Quote, QuoteBoard};
pub use resolver::{IdentityResolver, MAG7_TICKERS};
pub use scenario::{project_weights, Projection, ScenarioEngine, ScenarioRow, WeightBasis};
pub use snapshot::{HoldingsSnapshot, RawHolding};
