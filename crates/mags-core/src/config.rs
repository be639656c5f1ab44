//! 설정 관리.
//!
//! 기본값 → TOML 파일(선택) → 환경 변수(`MAGS__...`) 순서로 병합합니다.
//! 모든 섹션은 `Default`를 가지므로 설정 파일 없이도 동작합니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::resolver::MAG7_TICKERS;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 대상 펀드 설정
    pub fund: FundConfig,
    /// 데이터 소스 설정
    pub sources: SourcesConfig,
    /// 캐시 설정
    pub cache: CacheConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 시나리오 기본값
    pub scenario: ScenarioConfig,
    /// 종목명 변환기 설정
    pub resolver: ResolverConfig,
}

/// 기본 펀드 심볼.
pub const DEFAULT_FUND_SYMBOL: &str = "MAGS";

/// 대상 펀드 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FundConfig {
    /// 펀드 심볼
    pub symbol: String,
    /// 추적 대상 종목 (시세 조회용)
    pub tracked_tickers: Vec<String>,
}

impl Default for FundConfig {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_FUND_SYMBOL.to_string(),
            tracked_tickers: MAG7_TICKERS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// 데이터 소스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Roundhill 펀드 페이지
    pub roundhill_url: String,
    /// StockAnalysis 보유 종목 페이지
    pub stockanalysis_holdings_url: String,
    /// StockAnalysis 시세 페이지 (NAV 추출용)
    pub stockanalysis_quote_url: String,
    /// Yahoo Finance quoteSummary 엔드포인트
    pub yahoo_summary_url: String,
    /// HTTP User-Agent
    pub user_agent: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 기본 시도 순서 (stockanalysis, yahoo, roundhill)
    pub order: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            roundhill_url: "https://www.roundhillinvestments.com/etf/mags/".to_string(),
            stockanalysis_holdings_url: "https://stockanalysis.com/etf/mags/holdings/"
                .to_string(),
            stockanalysis_quote_url: "https://stockanalysis.com/etf/mags/".to_string(),
            yahoo_summary_url:
                "https://query2.finance.yahoo.com/v10/finance/quoteSummary/MAGS".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36".to_string(),
            timeout_secs: 12,
            order: vec![
                "stockanalysis".to_string(),
                "yahoo".to_string(),
                "roundhill".to_string(),
            ],
        }
    }
}

/// 캐시 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 보유 종목 스냅샷 캐시 TTL (초)
    pub holdings_ttl_secs: u64,
    /// 시세 캐시 TTL (초)
    pub quotes_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            holdings_ttl_secs: 15 * 60,
            quotes_ttl_secs: 5 * 60,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// 시나리오 기본값.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// 비중을 100%로 정규화할지 여부
    pub normalize_weights: bool,
    /// NAV를 찾지 못했을 때 사용할 가정 NAV
    pub assumed_nav: Option<Decimal>,
}

/// 종목명 별칭 항목.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AliasEntry {
    /// 공시된 종목명
    pub name: String,
    /// 대응하는 티커
    pub ticker: String,
}

/// 종목명 변환기 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// 기본 테이블에 추가할 별칭
    pub aliases: Vec<AliasEntry>,
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("fund.symbol", DEFAULT_FUND_SYMBOL)?
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("MAGS")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.fund.symbol, "MAGS");
        assert_eq!(config.fund.tracked_tickers.len(), 7);
        assert_eq!(config.cache.holdings_ttl_secs, 900);
        assert_eq!(config.cache.quotes_ttl_secs, 300);
        assert!(!config.scenario.normalize_weights);
        assert!(config.scenario.assumed_nav.is_none());
        assert_eq!(config.sources.order[0], "stockanalysis");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.fund.symbol, "MAGS");
        assert_eq!(config.sources.timeout_secs, 12);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let toml = r#"
            [cache]
            holdings_ttl_secs = 60

            [scenario]
            normalize_weights = true

            [[resolver.aliases]]
            name = "Nvidia Corp"
            ticker = "NVDA"
        "#;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.cache.holdings_ttl_secs, 60);
        assert_eq!(config.cache.quotes_ttl_secs, 300);
        assert!(config.scenario.normalize_weights);
        assert_eq!(config.resolver.aliases.len(), 1);
        assert_eq!(config.resolver.aliases[0].ticker, "NVDA");
    }
}
