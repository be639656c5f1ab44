//! 펀드 데이터 서비스.
//!
//! 설정으로부터 HTTP 클라이언트, 캐시된 보유 종목 소스, 시세 소스를 조립하고
//! CLI가 사용하는 단일 진입점을 제공합니다.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::cache::{CachedHoldingsSource, TtlCache};
use crate::chain::{FetchReport, SourceChain};
use crate::error::Result;
use crate::provider::{
    build_http_client, HoldingsSource, QuoteSource, RoundhillSource, SourceKind,
    StockAnalysisSource, YahooHoldingsSource, YahooQuoteSource,
};
use mags_core::{AppConfig, HoldingsSnapshot, IdentityResolver, QuoteBoard, DEFAULT_FUND_SYMBOL};

/// 시세 캐시 키.
const QUOTE_BOARD_KEY: &str = "board";

/// 보유 종목/시세 조회 서비스.
pub struct FundDataService {
    sources: Vec<Arc<dyn HoldingsSource>>,
    holdings_cache: TtlCache<HoldingsSnapshot>,
    quote_source: Arc<dyn QuoteSource>,
    quote_cache: TtlCache<QuoteBoard>,
    tracked_tickers: Vec<String>,
    fund_symbol: String,
}

impl FundDataService {
    /// 설정으로 서비스를 생성합니다.
    pub fn from_config(config: &AppConfig, resolver: Arc<IdentityResolver>) -> Result<Self> {
        let client = build_http_client(&config.sources)?;
        let order = configured_order(&config.sources.order);

        let sources: Vec<Arc<dyn HoldingsSource>> = order
            .into_iter()
            .map(|kind| -> Arc<dyn HoldingsSource> {
                match kind {
                    SourceKind::StockAnalysis => Arc::new(StockAnalysisSource::new(
                        client.clone(),
                        config.sources.stockanalysis_holdings_url.as_str(),
                        config.sources.stockanalysis_quote_url.as_str(),
                        Arc::clone(&resolver),
                    )),
                    SourceKind::Yahoo => Arc::new(YahooHoldingsSource::new(
                        client.clone(),
                        config.sources.yahoo_summary_url.as_str(),
                        Arc::clone(&resolver),
                    )),
                    SourceKind::Roundhill => Arc::new(RoundhillSource::new(
                        client.clone(),
                        config.sources.roundhill_url.as_str(),
                        Arc::clone(&resolver),
                    )),
                }
            })
            .collect();

        let quote_source: Arc<dyn QuoteSource> = Arc::new(YahooQuoteSource::new()?);

        Ok(Self::with_parts(
            sources,
            quote_source,
            config.fund.tracked_tickers.clone(),
            Duration::from_secs(config.cache.holdings_ttl_secs),
            Duration::from_secs(config.cache.quotes_ttl_secs),
        )
        .with_fund_symbol(config.fund.symbol.as_str()))
    }

    /// 구성 요소를 직접 지정하여 생성합니다.
    ///
    /// 보유 종목 소스는 공유 캐시를 사용하는 `CachedHoldingsSource`로 감싸집니다.
    pub fn with_parts(
        sources: Vec<Arc<dyn HoldingsSource>>,
        quote_source: Arc<dyn QuoteSource>,
        tracked_tickers: Vec<String>,
        holdings_ttl: Duration,
        quotes_ttl: Duration,
    ) -> Self {
        let holdings_cache = TtlCache::new(holdings_ttl);
        let sources = sources
            .into_iter()
            .map(|s| -> Arc<dyn HoldingsSource> {
                Arc::new(CachedHoldingsSource::new(s, holdings_cache.clone()))
            })
            .collect();

        Self {
            sources,
            holdings_cache,
            quote_source,
            quote_cache: TtlCache::new(quotes_ttl),
            tracked_tickers,
            fund_symbol: DEFAULT_FUND_SYMBOL.to_string(),
        }
    }

    /// 대상 펀드 심볼을 지정합니다.
    pub fn with_fund_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.fund_symbol = symbol.into();
        self
    }

    /// 보유 종목 스냅샷을 가져옵니다.
    ///
    /// `preferred`가 있으면 그 소스를 먼저 시도하고, 실패하면 나머지 소스를
    /// 설정된 순서대로 시도합니다.
    pub async fn snapshot(&self, preferred: Option<SourceKind>) -> FetchReport {
        let chain = SourceChain::ordered(self.sources.clone(), preferred)
            .with_fund(self.fund_symbol.as_str());
        info!(fund = %self.fund_symbol, order = ?chain.kinds(), "보유 종목 조회 시작");
        chain.fetch().await
    }

    /// 추적 종목의 시세판 (캐시 적용).
    pub async fn quotes(&self) -> QuoteBoard {
        if let Some(board) = self.quote_cache.get(QUOTE_BOARD_KEY).await {
            return board;
        }

        let board = self.quote_source.fetch_board(&self.tracked_tickers).await;
        // 전부 실패한 시세판은 캐시하지 않음
        if board.known_count() > 0 {
            self.quote_cache.insert(QUOTE_BOARD_KEY, board.clone()).await;
        }
        board
    }

    /// 모든 캐시를 비웁니다.
    pub async fn clear_cache(&self) {
        self.holdings_cache.clear().await;
        self.quote_cache.clear().await;
        info!("캐시 초기화");
    }

    /// 대상 펀드 심볼.
    pub fn fund_symbol(&self) -> &str {
        &self.fund_symbol
    }

    /// 추적 종목.
    pub fn tracked_tickers(&self) -> &[String] {
        &self.tracked_tickers
    }

    /// 설정된 소스 순서.
    pub fn source_order(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|s| s.kind()).collect()
    }
}

/// 설정의 소스 이름 목록을 파싱합니다.
///
/// 알 수 없는 이름과 중복은 경고 후 무시합니다. 결과가 비면 기본 순서를 사용합니다.
pub fn configured_order(names: &[String]) -> Vec<SourceKind> {
    let mut order: Vec<SourceKind> = Vec::new();
    for name in names {
        match name.parse::<SourceKind>() {
            Ok(kind) if !order.contains(&kind) => order.push(kind),
            Ok(_) => warn!(source = %name, "중복된 소스 설정 무시"),
            Err(e) => warn!(error = %e, "알 수 없는 소스 설정 무시"),
        }
    }

    if order.is_empty() {
        SourceKind::ALL.to_vec()
    } else {
        order
    }
}
