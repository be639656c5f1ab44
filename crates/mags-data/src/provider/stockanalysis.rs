//! StockAnalysis.com 보유 종목 크롤러.
//!
//! ## 데이터 소스
//! - `/etf/mags/holdings/`: 전체 보유 종목 테이블 (심볼, 종목명, 비중)
//! - `/etf/mags/`: 시세 페이지 (`div.text-4xl.font-bold`에 현재가)
//!
//! MAGS는 주식 직접 보유와 총수익스왑을 함께 사용하므로 같은 종목이 여러
//! 행에 나타납니다. 이 소스는 티커별로 합산한 MAG7 노출만 보고합니다.
//! 국채, 현금성 자산, MMF 행은 건너뜁니다.

use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use rust_decimal::Decimal;
use scraper::Html;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::text::{coerce_percent, element_text, selector};
use super::{get_text, HoldingsSource, SourceKind};
use crate::error::{DataError, Result};
use mags_core::{
    last_weekday, parse_signed_decimal, HoldingsSnapshot, IdentityResolver, Price, RawHolding,
};

/// 비주식 행 식별 키워드.
const NON_EQUITY_MARKERS: [&str; 4] = ["TREASURY", "BILL", "CASH", "FUND"];

/// StockAnalysis.com 소스.
pub struct StockAnalysisSource {
    client: Client,
    holdings_url: String,
    quote_url: String,
    resolver: Arc<IdentityResolver>,
}

impl StockAnalysisSource {
    /// 새 소스를 생성합니다.
    pub fn new(
        client: Client,
        holdings_url: impl Into<String>,
        quote_url: impl Into<String>,
        resolver: Arc<IdentityResolver>,
    ) -> Self {
        Self {
            client,
            holdings_url: holdings_url.into(),
            quote_url: quote_url.into(),
            resolver,
        }
    }

    /// 시세 페이지에서 NAV를 가져옵니다. 실패는 경고 후 무시합니다.
    async fn fetch_nav(&self) -> Option<Price> {
        match get_text(&self.client, &self.quote_url).await {
            Ok(html) => {
                let nav = parse_quote_nav(&html);
                if nav.is_none() {
                    warn!(url = %self.quote_url, "StockAnalysis 시세 페이지에서 NAV를 찾지 못함");
                }
                nav
            }
            Err(e) => {
                warn!(error = %e, "StockAnalysis NAV 조회 실패");
                None
            }
        }
    }
}

/// 보유 종목 테이블을 파싱하여 티커별 합산 비중을 반환합니다.
///
/// 첫 번째 `<table>`의 헤더 행을 건너뛰고, 셀이 4개 이상인 행에서
/// 심볼(1), 종목명(2), 비중(3) 셀을 읽습니다.
pub fn parse_holdings_table(
    html: &str,
    resolver: &IdentityResolver,
) -> Result<BTreeMap<String, Decimal>> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td")?;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| DataError::ParseError("보유 종목 테이블 없음".to_string()))?;

    let mut exposures: BTreeMap<String, Decimal> = BTreeMap::new();

    for row in table.select(&row_sel).skip(1) {
        let cells: Vec<String> = row.select(&cell_sel).map(|c| element_text(&c)).collect();
        if cells.len() < 4 {
            continue;
        }

        let symbol = cells[1].trim();
        let name = cells[2].trim().to_uppercase();

        if NON_EQUITY_MARKERS.iter().any(|m| name.contains(m)) {
            debug!(name = %name, "비주식 행 건너뜀");
            continue;
        }

        let weight = match coerce_percent(&cells[3]) {
            Some(w) if !w.is_zero() => w,
            _ => continue,
        };

        let ticker = if resolver.is_tracked(symbol) {
            Some(symbol.to_uppercase())
        } else {
            resolver.resolve(&name).map(str::to_string)
        };

        match ticker {
            Some(ticker) => {
                *exposures.entry(ticker).or_insert(Decimal::ZERO) += weight;
            }
            None => debug!(symbol = symbol, name = %name, "MAG7 외 종목 건너뜀"),
        }
    }

    if exposures.is_empty() {
        return Err(DataError::NoData("MAG7 보유 종목 없음".to_string()));
    }

    Ok(exposures)
}

/// 시세 페이지의 `div.text-4xl.font-bold` 텍스트를 가격으로 파싱합니다.
pub fn parse_quote_nav(html: &str) -> Option<Price> {
    let document = Html::parse_document(html);
    let price_sel = selector("div.text-4xl.font-bold").ok()?;
    let div = document.select(&price_sel).next()?;
    parse_signed_decimal(&element_text(&div)).filter(|v| *v > Decimal::ZERO)
}

/// 티커별 합산 비중을 스냅샷으로 변환합니다.
///
/// 종목명 맵에는 대표 회사명을 사용합니다.
fn exposures_to_snapshot(
    exposures: &BTreeMap<String, Decimal>,
    resolver: &IdentityResolver,
) -> HoldingsSnapshot {
    let rows: Vec<RawHolding> = exposures
        .iter()
        .map(|(ticker, weight)| {
            let name = resolver.display_name(ticker).unwrap_or(ticker.as_str());
            RawHolding::named(name, *weight).with_symbol(ticker.as_str())
        })
        .collect();
    HoldingsSnapshot::from_holdings(&rows, resolver)
}

#[async_trait]
impl HoldingsSource for StockAnalysisSource {
    fn name(&self) -> &str {
        "stockanalysis"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::StockAnalysis
    }

    async fn fetch(&self) -> Result<HoldingsSnapshot> {
        info!(url = %self.holdings_url, "StockAnalysis 보유 종목 조회");

        let html = get_text(&self.client, &self.holdings_url).await?;
        let exposures = parse_holdings_table(&html, &self.resolver)?;
        let nav = self.fetch_nav().await;

        let today = Local::now().date_naive();
        let snapshot = exposures_to_snapshot(&exposures, &self.resolver)
            .with_nav(nav)
            .with_as_of(last_weekday(today))
            .with_source(self.name());

        info!(
            holdings = snapshot.holdings_by_ticker.len(),
            nav = ?snapshot.nav,
            "StockAnalysis 조회 완료"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HOLDINGS_HTML: &str = r#"
<html><body>
<table>
  <thead><tr><th>No.</th><th>Symbol</th><th>Name</th><th>% Weight</th><th>Shares</th></tr></thead>
  <tbody>
    <tr><td>1</td><td>n/a</td><td>First American Treasury Obligations Fund</td><td>24.10%</td><td>1</td></tr>
    <tr><td>2</td><td>NVDA</td><td>NVIDIA Corporation</td><td>6.12%</td><td>1</td></tr>
    <tr><td>3</td><td>n/a</td><td>Nvidia Corp Swap Gs</td><td>8.20%</td><td>1</td></tr>
    <tr><td>4</td><td>AAPL</td><td>Apple Inc.</td><td>13.40%</td><td>1</td></tr>
    <tr><td>5</td><td>n/a</td><td>United States Treasury Bill</td><td>10.00%</td><td>1</td></tr>
    <tr><td>6</td><td>MSFT</td><td>Microsoft Corporation</td><td>0.00%</td><td>1</td></tr>
    <tr><td>7</td><td>SPY</td><td>SPDR S&amp;P 500</td><td>1.00%</td><td>1</td></tr>
    <tr><td>short row</td></tr>
  </tbody>
</table>
<table><tr><td>ignored</td></tr></table>
</body></html>"#;

    #[test]
    fn test_parse_holdings_table_sums_swaps() {
        let resolver = IdentityResolver::mag7();
        let exposures = parse_holdings_table(HOLDINGS_HTML, &resolver).unwrap();

        assert_eq!(exposures.len(), 2);
        assert_eq!(exposures["NVDA"], dec!(14.32));
        assert_eq!(exposures["AAPL"], dec!(13.40));
        assert!(!exposures.contains_key("MSFT"));
    }

    #[test]
    fn test_parse_holdings_table_without_mag7_is_no_data() {
        let resolver = IdentityResolver::mag7();
        let html = "<table><tr><th>h</th></tr><tr><td>1</td><td>SPY</td><td>SPDR</td><td>5%</td></tr></table>";
        let err = parse_holdings_table(html, &resolver).unwrap_err();
        assert!(matches!(err, DataError::NoData(_)));

        let err = parse_holdings_table("<p>nothing</p>", &resolver).unwrap_err();
        assert!(matches!(err, DataError::ParseError(_)));
    }

    #[test]
    fn test_parse_quote_nav() {
        let html = r#"<div class="text-4xl font-bold transition-colors duration-300 block sm:inline">67.96</div>"#;
        assert_eq!(parse_quote_nav(html), Some(dec!(67.96)));
        assert_eq!(parse_quote_nav(r#"<div class="text-4xl">67.96</div>"#), None);
    }

    #[test]
    fn test_snapshot_uses_display_names() {
        let resolver = IdentityResolver::mag7();
        let exposures = parse_holdings_table(HOLDINGS_HTML, &resolver).unwrap();
        let snapshot = exposures_to_snapshot(&exposures, &resolver);
        assert_eq!(snapshot.holdings_by_name["NVIDIA"], dec!(14.32));
        assert_eq!(snapshot.holdings_by_ticker["AAPL"], dec!(13.40));
    }
}
