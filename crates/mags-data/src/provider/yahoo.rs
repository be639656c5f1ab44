//! Yahoo Finance quoteSummary 보유 종목 소스.
//!
//! `modules=topHoldings,summaryDetail`로 요청하여 상위 보유 종목과 NAV를 읽습니다.
//! `holdingPercent.raw`는 비율(0.1428)이므로 100을 곱해 퍼센트로 변환합니다.

use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::{get_text, HoldingsSource, SourceKind};
use crate::error::{DataError, Result};
use mags_core::{last_weekday, HoldingsSnapshot, IdentityResolver, Price, RawHolding, HUNDRED};

/// 요청 모듈.
const SUMMARY_MODULES: &str = "topHoldings,summaryDetail";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<SummaryResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    top_holdings: Option<TopHoldings>,
    summary_detail: Option<SummaryDetail>,
}

#[derive(Debug, Deserialize)]
struct TopHoldings {
    #[serde(default)]
    holdings: Vec<YahooHolding>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooHolding {
    symbol: Option<String>,
    holding_name: Option<String>,
    holding_percent: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    nav_price: Option<RawValue>,
    previous_close: Option<RawValue>,
}

/// Yahoo의 `{ "raw": 0.1428, "fmt": "14.28%" }` 형식 값.
#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

impl RawValue {
    fn decimal(&self) -> Option<Decimal> {
        self.raw.and_then(Decimal::from_f64)
    }
}

/// quoteSummary JSON을 (원시 행, NAV)로 파싱합니다.
pub fn parse_quote_summary(json: &str) -> Result<(Vec<RawHolding>, Option<Price>)> {
    let response: QuoteSummaryResponse = serde_json::from_str(json)?;

    if let Some(err) = response.quote_summary.error.filter(|e| !e.is_null()) {
        return Err(DataError::ApiError {
            symbol: "MAGS".to_string(),
            message: err.to_string(),
        });
    }

    let result = response
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| DataError::NoData("quoteSummary 결과 없음".to_string()))?;

    let rows: Vec<RawHolding> = result
        .top_holdings
        .map(|t| t.holdings)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|h| {
            let weight = h.holding_percent.as_ref()?.decimal()? * HUNDRED;
            if weight.is_zero() {
                return None;
            }
            let symbol = h.symbol.filter(|s| !s.trim().is_empty());
            let name = h
                .holding_name
                .filter(|n| !n.trim().is_empty())
                .or_else(|| symbol.clone())?;
            let row = RawHolding::named(name, weight);
            Some(match symbol {
                Some(s) => row.with_symbol(s),
                None => row,
            })
        })
        .collect();

    let nav = result.summary_detail.and_then(|d| {
        d.nav_price
            .as_ref()
            .and_then(RawValue::decimal)
            .filter(|v| *v > Decimal::ZERO)
            .or_else(|| d.previous_close.as_ref().and_then(RawValue::decimal))
    });

    Ok((rows, nav))
}

/// Yahoo Finance 보유 종목 소스.
pub struct YahooHoldingsSource {
    client: Client,
    summary_url: String,
    resolver: Arc<IdentityResolver>,
}

impl YahooHoldingsSource {
    pub fn new(
        client: Client,
        summary_url: impl Into<String>,
        resolver: Arc<IdentityResolver>,
    ) -> Self {
        Self {
            client,
            summary_url: summary_url.into(),
            resolver,
        }
    }

    fn request_url(&self) -> String {
        let sep = if self.summary_url.contains('?') { '&' } else { '?' };
        format!("{}{}modules={}", self.summary_url, sep, SUMMARY_MODULES)
    }
}

#[async_trait]
impl HoldingsSource for YahooHoldingsSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Yahoo
    }

    async fn fetch(&self) -> Result<HoldingsSnapshot> {
        let url = self.request_url();
        info!(url = %url, "Yahoo Finance 보유 종목 조회");

        let body = get_text(&self.client, &url).await?;
        let (rows, nav) = parse_quote_summary(&body)?;

        if rows.is_empty() {
            return Err(DataError::NoData("Yahoo 보유 종목 없음".to_string()));
        }
        debug!(rows = rows.len(), "Yahoo 보유 종목 수신");

        let today = Local::now().date_naive();
        let snapshot = HoldingsSnapshot::from_holdings(&rows, &self.resolver)
            .with_nav(nav)
            .with_as_of(last_weekday(today))
            .with_source(self.name());

        info!(
            holdings = snapshot.holding_count(),
            nav = ?snapshot.nav,
            "Yahoo Finance 조회 완료"
        );
        Ok(snapshot)
    }
}
