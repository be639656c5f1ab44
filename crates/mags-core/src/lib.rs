//! # MAGS Core
//!
//! MAGS ETF 노출 분석 도구의 핵심 도메인 모델 및 계산 엔진을 제공합니다.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 보유 종목 스냅샷 (티커/종목명 기준 비중, NAV, 기준일)
//! - 종목명 → 티커 변환기 (스왑 포지션 포함)
//! - 비중 정규화
//! - 가격 변동 시나리오(what-if) 엔진 및 예상 NAV 계산
//! - 범프(가격 변동) 텍스트 파서
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
