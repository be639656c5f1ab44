//! 보유 종목 스냅샷.
//!
//! 외부 데이터 소스(웹 페이지, API, 수동 입력)가 생성하는 구조화된 레코드입니다.
//! 조회할 때마다 새로 만들어지며 저장되지 않습니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::resolver::{normalize_key, IdentityResolver};
use crate::types::{AsOfDate, Percent, Price};

/// 소스에서 읽어온 원시 보유 종목 행.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHolding {
    /// 공시된 종목명
    pub name: String,
    /// 소스가 제공한 심볼 (있는 경우)
    pub symbol: Option<String>,
    /// 비중 (%)
    pub weight: Percent,
}

impl RawHolding {
    /// 종목명과 비중만으로 생성합니다.
    pub fn named(name: impl Into<String>, weight: Percent) -> Self {
        Self {
            name: name.into(),
            symbol: None,
            weight,
        }
    }

    /// 심볼을 지정합니다.
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

/// 보유 종목 스냅샷.
///
/// `holdings_by_ticker`의 모든 항목은 `holdings_by_name`의 하나 이상의 항목에서
/// 파생됩니다. 변환에 실패한 종목명은 `holdings_by_name`에만 존재합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsSnapshot {
    /// 주당 순자산가치 (찾지 못하면 None)
    pub nav: Option<Price>,
    /// 공시 기준일
    pub as_of: AsOfDate,
    /// 정규 티커 → 비중 (%)
    pub holdings_by_ticker: BTreeMap<String, Percent>,
    /// 공시 종목명 → 비중 (%)
    pub holdings_by_name: BTreeMap<String, Percent>,
    /// 스냅샷을 만든 소스 이름
    pub source: Option<String>,
    /// 수집 시각
    pub fetched_at: DateTime<Utc>,
}

impl Default for HoldingsSnapshot {
    fn default() -> Self {
        Self {
            nav: None,
            as_of: AsOfDate::Unknown,
            holdings_by_ticker: BTreeMap::new(),
            holdings_by_name: BTreeMap::new(),
            source: None,
            fetched_at: Utc::now(),
        }
    }
}

impl HoldingsSnapshot {
    /// 원시 행 목록에서 스냅샷을 생성합니다.
    ///
    /// 티커 결정 순서:
    /// 1. 소스가 준 심볼이 변환기의 정규 티커이면 그 심볼
    /// 2. 그렇지 않으면 종목명을 변환기로 변환 (스왑 포함)
    ///
    /// 같은 티커로 변환되는 행(직접 보유 + 스왑 등)의 비중은 합산합니다.
    pub fn from_holdings(rows: &[RawHolding], resolver: &IdentityResolver) -> Self {
        let mut snapshot = Self::default();

        for row in rows {
            let name = row.name.trim();
            if name.is_empty() {
                continue;
            }

            *snapshot
                .holdings_by_name
                .entry(name.to_string())
                .or_insert(Decimal::ZERO) += row.weight;

            let ticker = row
                .symbol
                .as_deref()
                .filter(|s| resolver.is_tracked(s))
                .map(normalize_key)
                .or_else(|| resolver.resolve(name).map(str::to_string));

            match ticker {
                Some(ticker) => {
                    *snapshot
                        .holdings_by_ticker
                        .entry(ticker)
                        .or_insert(Decimal::ZERO) += row.weight;
                }
                None => {
                    debug!(name = name, "티커 변환 실패, 종목명으로만 유지");
                }
            }
        }

        snapshot
    }

    /// NAV를 지정합니다. 0 이하의 값은 무시합니다.
    pub fn with_nav(mut self, nav: Option<Price>) -> Self {
        self.nav = nav.filter(|n| *n > Decimal::ZERO);
        self
    }

    /// 기준일을 지정합니다.
    pub fn with_as_of(mut self, as_of: impl Into<AsOfDate>) -> Self {
        self.as_of = as_of.into();
        self
    }

    /// 소스 이름을 지정합니다.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// 티커/종목명 어느 쪽에도 보유 종목이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.holdings_by_ticker.is_empty() && self.holdings_by_name.is_empty()
    }

    /// 표시용 보유 종목 수 (티커 기준 우선).
    pub fn holding_count(&self) -> usize {
        if self.holdings_by_ticker.is_empty() {
            self.holdings_by_name.len()
        } else {
            self.holdings_by_ticker.len()
        }
    }

    /// 비중 내림차순으로 정렬된 (키, 비중) 목록. 티커 기준 우선.
    pub fn sorted_holdings(&self) -> Vec<(&str, Percent)> {
        let source = if self.holdings_by_ticker.is_empty() {
            &self.holdings_by_name
        } else {
            &self.holdings_by_ticker
        };
        let mut items: Vec<(&str, Percent)> =
            source.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        items
    }
}
