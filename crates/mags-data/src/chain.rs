//! 보유 종목 소스 체인.
//!
//! 소스를 명시적인 순서로 하나씩 시도하고, 각 시도의 실패를 기록합니다.
//! 첫 번째로 비어 있지 않은 스냅샷을 돌려준 소스가 채택됩니다.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn, Instrument};

use crate::error::{DataError, Result};
use crate::provider::{HoldingsSource, SourceKind};
use mags_core::{HoldingsSnapshot, DEFAULT_FUND_SYMBOL};

/// 개별 소스 실패 기록.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source: SourceKind,
    pub message: String,
    /// 나중에 다시 시도하면 성공할 수 있는 실패인지 (타임아웃, 429, 5xx 등)
    pub retryable: bool,
}

impl std::fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}

/// 체인 실행 결과.
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// 채택된 스냅샷 (모두 실패하면 None)
    pub snapshot: Option<HoldingsSnapshot>,
    /// 스냅샷을 제공한 소스
    pub source: Option<SourceKind>,
    /// 시도 순서대로의 실패 목록
    pub failures: Vec<SourceFailure>,
}

impl FetchReport {
    /// 스냅샷이 없으면 `AllSourcesFailed` 오류로 변환합니다.
    pub fn into_result(self) -> Result<(HoldingsSnapshot, SourceKind)> {
        match (self.snapshot, self.source) {
            (Some(snapshot), Some(source)) => Ok((snapshot, source)),
            _ => Err(DataError::AllSourcesFailed(
                self.failures.iter().map(ToString::to_string).collect(),
            )),
        }
    }

    /// 일시적인 실패가 하나라도 있었는지 확인합니다.
    pub fn any_retryable(&self) -> bool {
        self.failures.iter().any(|f| f.retryable)
    }

    /// 폴백이 일어났는지 (앞선 소스가 실패했는지) 확인합니다.
    pub fn used_fallback(&self) -> bool {
        self.snapshot.is_some() && !self.failures.is_empty()
    }
}

/// 순서가 있는 소스 목록.
pub struct SourceChain {
    sources: Vec<Arc<dyn HoldingsSource>>,
    fund: String,
}

impl SourceChain {
    /// 주어진 순서 그대로 체인을 만듭니다.
    pub fn new(sources: Vec<Arc<dyn HoldingsSource>>) -> Self {
        Self {
            sources,
            fund: DEFAULT_FUND_SYMBOL.to_string(),
        }
    }

    /// 로그 span에 기록할 펀드 심볼을 지정합니다.
    pub fn with_fund(mut self, fund: impl Into<String>) -> Self {
        self.fund = fund.into();
        self
    }

    pub fn fund(&self) -> &str {
        &self.fund
    }

    /// 선호 소스를 맨 앞에 두고 나머지는 기존 순서를 유지합니다.
    pub fn ordered(sources: Vec<Arc<dyn HoldingsSource>>, preferred: Option<SourceKind>) -> Self {
        let Some(preferred) = preferred else {
            return Self::new(sources);
        };

        let (mut first, rest): (Vec<_>, Vec<_>) =
            sources.into_iter().partition(|s| s.kind() == preferred);
        first.extend(rest);
        Self::new(first)
    }

    /// 시도 순서.
    pub fn kinds(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|s| s.kind()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// 소스를 순서대로 시도합니다.
    ///
    /// 티커/종목명 어느 쪽에도 보유 종목이 없는 스냅샷은 실패로 취급합니다.
    pub async fn fetch(&self) -> FetchReport {
        let mut failures = Vec::new();

        for source in &self.sources {
            let span = mags_core::fund_span!("holdings_fetch", self.fund, source.name());
            match source.fetch().instrument(span).await {
                Ok(snapshot) if !snapshot.is_empty() => {
                    info!(
                        source = source.name(),
                        holdings = snapshot.holding_count(),
                        "보유 종목 소스 채택"
                    );
                    return FetchReport {
                        snapshot: Some(snapshot),
                        source: Some(source.kind()),
                        failures,
                    };
                }
                Ok(_) => {
                    warn!(source = source.name(), "보유 종목이 비어 있음, 다음 소스 시도");
                    failures.push(SourceFailure {
                        source: source.kind(),
                        message: "empty holdings".to_string(),
                        retryable: false,
                    });
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "보유 종목 소스 실패, 다음 소스 시도");
                    failures.push(SourceFailure {
                        source: source.kind(),
                        message: e.to_string(),
                        retryable: e.is_retryable(),
                    });
                }
            }
        }

        FetchReport {
            snapshot: None,
            source: None,
            failures,
        }
    }
}
