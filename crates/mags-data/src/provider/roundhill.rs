//! Roundhill 펀드 페이지 크롤러.
//!
//! 운용사 페이지의 상위 10 종목 테이블(`tbody.fund-topTenHoldings`)을 읽습니다.
//! 데스크톱 테이블이 비어 있으면 모바일 테이블을, 그것도 없으면 페이지에
//! 내장된 JSON 조각(`"name":"…","weight":"…"`)을 정규식으로 찾습니다.
//!
//! NAV와 기준일은 페이지 텍스트에서 먼저 찾고, 없으면 원본 HTML에서 찾습니다.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::Html;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::text::{coerce_percent, element_text, extract_nav, latest_date_in_text, page_text, selector};
use super::{get_text, HoldingsSource, SourceKind};
use crate::error::{DataError, Result};
use mags_core::{last_weekday, AsOfDate, HoldingsSnapshot, IdentityResolver, Price, RawHolding};

static EMBEDDED_HOLDING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)"name"\s*:\s*"([^"]+)"\s*,\s*"weight"\s*:\s*"([^"]+)""#)
        .unwrap_or_else(|e| panic!("invalid holdings regex: {e}"))
});

/// 페이지에서 추출한 값.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundhillPage {
    pub rows: Vec<RawHolding>,
    pub nav: Option<Price>,
    pub as_of: Option<NaiveDate>,
}

/// 펀드 페이지 HTML을 파싱합니다.
pub fn parse_fund_page(html: &str, today: NaiveDate) -> Result<RoundhillPage> {
    let document = Html::parse_document(html);

    let mut rows = parse_table_rows(&document, "tbody.fund-topTenHoldings tr")?;
    if rows.is_empty() {
        rows = parse_table_rows(&document, "tbody.fund-topTenHoldings-mobile tr")?;
    }
    if rows.is_empty() {
        debug!("보유 종목 테이블 없음, 내장 JSON 탐색");
        rows = parse_embedded_rows(html);
    }

    let text = page_text(&document);
    let nav = extract_nav(&text).or_else(|| extract_nav(html));
    let as_of = latest_date_in_text(&text, today).or_else(|| latest_date_in_text(html, today));

    Ok(RoundhillPage { rows, nav, as_of })
}

/// `data-title`에 Name/Weight가 포함된 셀에서 종목명과 비중을 읽습니다.
fn parse_table_rows(document: &Html, row_css: &str) -> Result<Vec<RawHolding>> {
    let row_sel = selector(row_css)?;
    let cell_sel = selector("td")?;
    let mut rows = Vec::new();

    for tr in document.select(&row_sel) {
        let mut name: Option<String> = None;
        let mut weight = None;

        for td in tr.select(&cell_sel) {
            let title = td.value().attr("data-title").unwrap_or("").trim();
            let content = element_text(&td);
            if content.is_empty() {
                continue;
            }
            if title.contains("Name") {
                name = Some(content);
            } else if title.contains("Weight") {
                weight = coerce_percent(&content);
            }
        }

        if let (Some(name), Some(weight)) = (name, weight) {
            rows.push(RawHolding::named(name, weight));
        }
    }

    Ok(rows)
}

/// 원본 HTML에 포함된 JSON 조각에서 보유 종목을 찾습니다.
fn parse_embedded_rows(html: &str) -> Vec<RawHolding> {
    EMBEDDED_HOLDING_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().trim();
            let weight = coerce_percent(caps.get(2)?.as_str())?;
            if name.is_empty() {
                return None;
            }
            Some(RawHolding::named(name, weight))
        })
        .collect()
}

/// Roundhill 소스.
pub struct RoundhillSource {
    client: Client,
    url: String,
    resolver: Arc<IdentityResolver>,
}

impl RoundhillSource {
    pub fn new(client: Client, url: impl Into<String>, resolver: Arc<IdentityResolver>) -> Self {
        Self {
            client,
            url: url.into(),
            resolver,
        }
    }
}

#[async_trait]
impl HoldingsSource for RoundhillSource {
    fn name(&self) -> &str {
        "roundhill"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Roundhill
    }

    async fn fetch(&self) -> Result<HoldingsSnapshot> {
        info!(url = %self.url, "Roundhill 펀드 페이지 조회");

        let html = get_text(&self.client, &self.url).await?;
        let today = Local::now().date_naive();
        let page = parse_fund_page(&html, today)?;

        if page.rows.is_empty() {
            return Err(DataError::NoData("Roundhill 보유 종목 없음".to_string()));
        }
        if page.nav.is_none() {
            warn!("Roundhill 페이지에서 NAV를 찾지 못함");
        }

        let as_of = page
            .as_of
            .map(AsOfDate::from)
            .unwrap_or_else(|| AsOfDate::from(last_weekday(today)));

        let snapshot = HoldingsSnapshot::from_holdings(&page.rows, &self.resolver)
            .with_nav(page.nav)
            .with_as_of(as_of)
            .with_source(self.name());

        info!(
            holdings = snapshot.holding_count(),
            nav = ?snapshot.nav,
            as_of = %snapshot.as_of,
            "Roundhill 조회 완료"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    const FUND_HTML: &str = r#"
<html><body>
<div class="fund-nav">Net Asset Value <span>$61.25</span></div>
<p>Holdings are subject to change. Data as of 10/15/2026</p>
<table>
 <tbody class="fund-topTenHoldings">
  <tr><td data-title="Name">NVIDIA</td><td data-title="Ticker">NVDA</td><td data-title="Weight">14.28%</td></tr>
  <tr><td data-title="Name">Meta Platforms</td><td data-title="Weight">14.05%</td></tr>
  <tr><td data-title="Name">NVIDIA CORP SWAP</td><td data-title="Weight">0.50%</td></tr>
  <tr><td data-title="Name">First American Treasury</td><td data-title="Weight">2.10%</td></tr>
  <tr><td data-title="Name">No weight</td><td data-title="Weight"></td></tr>
 </tbody>
</table>
</body></html>"#;

    #[test]
    fn test_parse_desktop_table() {
        let page = parse_fund_page(FUND_HTML, today()).unwrap();
        assert_eq!(page.rows.len(), 4);
        assert_eq!(page.rows[0], RawHolding::named("NVIDIA", dec!(14.28)));
        assert_eq!(page.nav, Some(dec!(61.25)));
        assert_eq!(page.as_of, NaiveDate::from_ymd_opt(2026, 10, 15));

        let snapshot = HoldingsSnapshot::from_holdings(&page.rows, &IdentityResolver::mag7());
        assert_eq!(snapshot.holdings_by_ticker["NVDA"], dec!(14.78));
        assert_eq!(snapshot.holdings_by_ticker["META"], dec!(14.05));
        assert_eq!(snapshot.holdings_by_name.len(), 4);
    }

    #[test]
    fn test_mobile_table_fallback() {
        let html = r#"<table><tbody class="fund-topTenHoldings-mobile">
            <tr><td data-title="Holding Name">Tesla</td><td data-title="% Weight">13.9</td></tr>
        </tbody></table>"#;
        let page = parse_fund_page(html, today()).unwrap();
        assert_eq!(page.rows, vec![RawHolding::named("Tesla", dec!(13.9))]);
        assert_eq!(page.nav, None);
        assert_eq!(page.as_of, None);
    }

    #[test]
    fn test_embedded_json_fallback() {
        let html = r#"<script>var h=[{"name":"Apple","weight":"13.2%"},{"name":"Microsoft","weight":"12.8"}];
            var f={"NetAssetValue": 58.10};</script>"#;
        let page = parse_fund_page(html, today()).unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[1], RawHolding::named("Microsoft", dec!(12.8)));
        assert_eq!(page.nav, Some(dec!(58.10)));
    }

    #[tokio::test]
    async fn test_fetch_empty_page_is_no_data() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/etf/mags/")
            .with_status(200)
            .with_body("<html><body>Coming soon</body></html>")
            .create_async()
            .await;

        let source = RoundhillSource::new(
            Client::new(),
            format!("{}/etf/mags/", server.url()),
            Arc::new(IdentityResolver::mag7()),
        );
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, DataError::NoData(_)));
    }

    #[tokio::test]
    async fn test_fetch_builds_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/etf/mags/")
            .with_status(200)
            .with_body(FUND_HTML)
            .create_async()
            .await;

        let source = RoundhillSource::new(
            Client::new(),
            format!("{}/etf/mags/", server.url()),
            Arc::new(IdentityResolver::mag7()),
        );
        let snapshot = source.fetch().await.unwrap();
        assert_eq!(snapshot.source.as_deref(), Some("roundhill"));
        assert_eq!(snapshot.nav, Some(dec!(61.25)));
        assert!(snapshot.as_of.is_known());
    }
}
