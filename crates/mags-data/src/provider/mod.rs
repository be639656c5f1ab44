//! 보유 종목 데이터 Provider 모듈.
//!
//! MAGS 보유 종목과 NAV를 가져오는 소스들을 정의합니다.
//!
//! ## StockAnalysis
//! - `StockAnalysisSource`: 보유 종목 테이블 HTML + 시세 페이지 NAV
//! - 직접 보유와 스왑 포지션을 티커별로 합산 (MAG7 전용)
//!
//! ## Yahoo Finance
//! - `YahooHoldingsSource`: quoteSummary JSON (topHoldings, summaryDetail)
//!
//! ## Roundhill
//! - `RoundhillSource`: 운용사 펀드 페이지 HTML (상위 10 종목 테이블)
//!
//! ## 실시간 시세
//! - `YahooQuoteSource`: MAG7 현재가/전일 종가

pub mod quotes;
pub mod roundhill;
pub mod stockanalysis;
pub mod text;
pub mod yahoo;

pub use quotes::{QuoteSource, YahooQuoteSource};
pub use roundhill::RoundhillSource;
pub use stockanalysis::StockAnalysisSource;
pub use yahoo::YahooHoldingsSource;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::error::{DataError, Result};
use mags_core::{HoldingsSnapshot, SourcesConfig};

/// 보유 종목 소스 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// stockanalysis.com
    StockAnalysis,
    /// Yahoo Finance quoteSummary
    Yahoo,
    /// roundhillinvestments.com
    Roundhill,
}

impl SourceKind {
    /// 기본 시도 순서.
    pub const ALL: [SourceKind; 3] = [
        SourceKind::StockAnalysis,
        SourceKind::Yahoo,
        SourceKind::Roundhill,
    ];

    /// 설정/CLI에서 사용하는 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::StockAnalysis => "stockanalysis",
            SourceKind::Yahoo => "yahoo",
            SourceKind::Roundhill => "roundhill",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = DataError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stockanalysis" | "stock-analysis" | "sa" => Ok(SourceKind::StockAnalysis),
            "yahoo" | "yfinance" => Ok(SourceKind::Yahoo),
            "roundhill" | "http" => Ok(SourceKind::Roundhill),
            other => Err(DataError::ConfigError(format!(
                "unknown holdings source '{}' (expected stockanalysis, yahoo or roundhill)",
                other
            ))),
        }
    }
}

/// 보유 종목 소스 trait.
#[async_trait]
pub trait HoldingsSource: Send + Sync {
    /// 소스 이름 (캐시 키, 로그에 사용).
    fn name(&self) -> &str;

    /// 소스 종류.
    fn kind(&self) -> SourceKind;

    /// 스냅샷을 가져옵니다.
    async fn fetch(&self) -> Result<HoldingsSnapshot>;
}

/// 설정으로 공용 HTTP 클라이언트를 생성합니다.
pub fn build_http_client(config: &SourcesConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))
}

/// GET 요청 후 본문을 문자열로 반환합니다.
///
/// 429는 `RateLimited`, 그 외 실패 상태는 `StatusError`로 변환합니다.
pub(crate) async fn get_text(client: &Client, url: &str) -> Result<String> {
    debug!(url = url, "HTTP 요청");
    let response = client.get(url).send().await?;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(DataError::RateLimited(url.to_string()));
    }
    if !status.is_success() {
        return Err(DataError::StatusError {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response.text().await?)
}
