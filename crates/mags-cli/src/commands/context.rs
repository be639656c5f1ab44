//! 명령 공통 실행 컨텍스트.
//!
//! 설정, 종목명 변환기, 데이터 서비스, 시나리오 엔진을 한 번 조립하여
//! 모든 서브커맨드가 공유합니다.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

use mags_core::{AppConfig, HoldingsSnapshot, IdentityResolver, MagsError, ScenarioEngine};
use mags_data::{DataError, FundDataService, SourceKind};

/// 서브커맨드 실행 컨텍스트.
pub struct AppContext {
    pub config: AppConfig,
    pub resolver: Arc<IdentityResolver>,
    pub service: FundDataService,
    pub engine: ScenarioEngine,
}

impl AppContext {
    /// 설정으로 컨텍스트를 조립합니다.
    ///
    /// 설정의 `[resolver]` 별칭은 기본 MAG7 테이블에 추가됩니다.
    pub fn build(config: AppConfig) -> Result<Self> {
        let resolver = Arc::new(build_resolver(&config));
        let service = FundDataService::from_config(&config, Arc::clone(&resolver))
            .context("Failed to build data service")?;
        let engine = ScenarioEngine::new(Arc::clone(&resolver));

        info!(
            sources = ?service.source_order(),
            tracked = service.tracked_tickers().len(),
            "실행 컨텍스트 준비 완료"
        );

        Ok(Self {
            config,
            resolver,
            service,
            engine,
        })
    }

    /// 보유 종목 스냅샷을 가져옵니다.
    ///
    /// `refresh`가 켜져 있으면 캐시를 먼저 비웁니다. 모든 소스가 실패하면
    /// 소스별 실패 내역과 조치 방법을 stderr에 출력하고 오류를 반환합니다.
    pub async fn fetch_snapshot(
        &self,
        preferred: Option<SourceKind>,
        refresh: bool,
    ) -> Result<HoldingsSnapshot> {
        if refresh {
            self.service.clear_cache().await;
        }

        let report = self.service.snapshot(preferred).await;
        if report.used_fallback() {
            for failure in &report.failures {
                warn!(%failure, "앞선 소스 실패로 폴백 사용");
            }
        }

        let transient = report.any_retryable();
        match report.into_result() {
            Ok((snapshot, source)) => {
                info!(%source, holdings = snapshot.holding_count(), "보유 종목 조회 완료");
                Ok(snapshot)
            }
            Err(e) => {
                eprintln!("보유 종목을 가져올 수 없습니다. 모든 소스가 실패했습니다.");
                if let DataError::AllSourcesFailed(details) = &e {
                    for detail in details {
                        eprintln!("  - {}", detail);
                    }
                }
                let err = holdings_failure(e, transient);
                eprintln!("{}", retry_hint(&err));
                Err(anyhow::Error::new(err).context("Holdings unavailable"))
            }
        }
    }
}

/// 소스 체인 실패를 공통 오류로 변환합니다.
///
/// 일시적인 실패가 섞여 있었다면 네트워크 오류로 분류합니다.
pub fn holdings_failure(err: DataError, transient: bool) -> MagsError {
    if transient {
        MagsError::Network(err.to_string())
    } else {
        MagsError::from(err)
    }
}

/// 오류 종류에 맞는 조치 안내.
pub fn retry_hint(err: &MagsError) -> &'static str {
    if err.is_retryable() {
        "잠시 후 --refresh 로 다시 시도하거나 --source 로 다른 소스를 지정하세요."
    } else {
        "--source 로 다른 소스를 지정하거나 설정 파일의 [sources] URL을 확인하세요."
    }
}

/// 설정 별칭을 반영한 변환기.
pub fn build_resolver(config: &AppConfig) -> IdentityResolver {
    IdentityResolver::mag7().with_aliases(
        config
            .resolver
            .aliases
            .iter()
            .map(|a| (a.name.clone(), a.ticker.clone())),
    )
}

/// `--source` 값을 해석합니다.
pub fn parse_source(source: Option<&str>) -> Result<Option<SourceKind>> {
    source
        .map(|s| s.parse::<SourceKind>().context("Invalid --source"))
        .transpose()
}

/// NAV 입력값을 검증합니다. 0 이하는 잘못된 입력입니다.
pub fn validate_nav(value: Option<Decimal>, flag: &str) -> Result<Option<Decimal>, MagsError> {
    match value {
        Some(nav) if nav <= Decimal::ZERO => Err(MagsError::InvalidInput(format!(
            "{} 값은 0보다 커야 합니다: {}",
            flag, nav
        ))),
        other => Ok(other),
    }
}
