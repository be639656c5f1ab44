//! 실시간 시세 소스.
//!
//! Yahoo Finance 일봉 데이터(최근 5일)에서 마지막 종가를 현재가로,
//! 그 직전 봉의 종가를 전일 종가로 사용합니다.

use async_trait::async_trait;
use futures::future::join_all;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use yahoo_finance_api as yahoo;

use crate::error::{DataError, Result};
use mags_core::{Price, Quote, QuoteBoard};

/// 시세 소스 trait.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// 단일 종목 시세 조회.
    async fn fetch_quote(&self, ticker: &str) -> Result<Quote>;

    /// 여러 종목 시세 조회.
    ///
    /// 개별 종목 실패는 로그만 남기고 빈 시세로 채우므로 결과에는
    /// 요청한 모든 티커가 포함됩니다.
    async fn fetch_board(&self, tickers: &[String]) -> QuoteBoard {
        let results = join_all(tickers.iter().map(|t| self.fetch_quote(t))).await;

        tickers
            .iter()
            .zip(results)
            .map(|(ticker, result)| match result {
                Ok(quote) => quote,
                Err(e) => {
                    warn!(ticker = %ticker, error = %e, "시세 조회 실패");
                    Quote::empty(ticker)
                }
            })
            .collect()
    }
}

/// 종가 목록에서 (현재가, 전일 종가)를 추출합니다.
pub fn last_and_previous(closes: &[f64]) -> (Option<Price>, Option<Price>) {
    let to_price = |v: &f64| Decimal::from_f64(*v).filter(|p| *p > Decimal::ZERO);
    let last = closes.last().and_then(to_price);
    let prev = closes
        .len()
        .checked_sub(2)
        .and_then(|i| closes.get(i))
        .and_then(to_price);
    (last, prev)
}

/// Yahoo Finance 시세 소스.
pub struct YahooQuoteSource {
    connector: yahoo::YahooConnector,
}

impl YahooQuoteSource {
    /// 새로운 YahooQuoteSource 생성.
    pub fn new() -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| DataError::ConnectionError(format!("{}", e)))?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl QuoteSource for YahooQuoteSource {
    async fn fetch_quote(&self, ticker: &str) -> Result<Quote> {
        debug!("시세 조회: {}", ticker);

        // 주말/휴일을 고려하여 5일 범위 조회
        let response = self
            .connector
            .get_quote_range(ticker, "1d", "5d")
            .await
            .map_err(|e| DataError::ApiError {
                symbol: ticker.to_string(),
                message: format!("{}", e),
            })?;

        let bars = response
            .quotes()
            .map_err(|e| DataError::ParseError(format!("{}", e)))?;

        if bars.is_empty() {
            return Err(DataError::NoData(format!("심볼 {} 데이터 없음", ticker)));
        }

        let closes: Vec<f64> = bars.iter().map(|q| q.close).collect();
        let (last, prev) = last_and_previous(&closes);
        let quote = Quote::from_prices(ticker, last, prev);

        info!(
            ticker = %quote.ticker,
            last = ?quote.last,
            change_pct = ?quote.change_pct,
            "시세 수신"
        );
        Ok(quote)
    }
}
