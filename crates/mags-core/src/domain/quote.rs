//! 실시간 시세와 변동률.

use serde::Serialize;
use std::collections::BTreeMap;

use super::bumps::BumpSet;
use super::resolver::normalize_key;
use crate::types::{Percent, Price, HUNDRED};

/// 종목 시세.
///
/// `change`/`change_pct`는 두 가격이 모두 있고 전일 종가가 0이 아닐 때만 채워집니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub ticker: String,
    pub last: Option<Price>,
    pub prev_close: Option<Price>,
    pub change: Option<Price>,
    pub change_pct: Option<Percent>,
}

impl Quote {
    /// 현재가/전일 종가로 시세를 생성하고 변동을 계산합니다.
    pub fn from_prices(ticker: &str, last: Option<Price>, prev_close: Option<Price>) -> Self {
        let (change, change_pct) = match (last, prev_close) {
            (Some(l), Some(p)) if !p.is_zero() => {
                let change = l - p;
                (Some(change), Some(change / p * HUNDRED))
            }
            _ => (None, None),
        };

        Self {
            ticker: normalize_key(ticker),
            last,
            prev_close,
            change,
            change_pct,
        }
    }

    /// 조회 실패 시 사용하는 빈 시세.
    pub fn empty(ticker: &str) -> Self {
        Self::from_prices(ticker, None, None)
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_none() && self.prev_close.is_none()
    }
}

/// 티커 → 시세.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuoteBoard {
    quotes: BTreeMap<String, Quote>,
}

impl QuoteBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 시세를 추가합니다. 같은 티커는 덮어씁니다.
    pub fn insert(&mut self, quote: Quote) {
        self.quotes.insert(quote.ticker.clone(), quote);
    }

    pub fn get(&self, ticker: &str) -> Option<&Quote> {
        self.quotes.get(&normalize_key(ticker))
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// 티커 순으로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = &Quote> {
        self.quotes.values()
    }

    /// 변동률이 계산된 시세를 범프 집합으로 변환합니다.
    ///
    /// 변동률을 모르는 종목은 제외됩니다.
    pub fn live_bumps(&self) -> BumpSet {
        self.quotes
            .values()
            .filter_map(|q| q.change_pct.map(|pct| (q.ticker.clone(), pct)))
            .collect()
    }

    /// 변동률을 아는 종목 수.
    pub fn known_count(&self) -> usize {
        self.quotes
            .values()
            .filter(|q| q.change_pct.is_some())
            .count()
    }
}

impl FromIterator<Quote> for QuoteBoard {
    fn from_iter<I: IntoIterator<Item = Quote>>(iter: I) -> Self {
        let mut board = QuoteBoard::new();
        for quote in iter {
            board.insert(quote);
        }
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_change_computation() {
        let q = Quote::from_prices("nvda", Some(dec!(102)), Some(dec!(100)));
        assert_eq!(q.ticker, "NVDA");
        assert_eq!(q.change, Some(dec!(2)));
        assert_eq!(q.change_pct, Some(dec!(2)));
    }

    #[test]
    fn test_change_requires_both_prices_and_nonzero_prev() {
        let q = Quote::from_prices("AAPL", Some(dec!(200)), None);
        assert!(q.change.is_none());
        assert!(q.change_pct.is_none());

        let q = Quote::from_prices("AAPL", Some(dec!(200)), Some(dec!(0)));
        assert!(q.change.is_none());

        assert!(Quote::empty("MSFT").is_empty());
    }

    #[test]
    fn test_live_bumps_skip_unknown() {
        let board: QuoteBoard = vec![
            Quote::from_prices("NVDA", Some(dec!(99)), Some(dec!(100))),
            Quote::empty("TSLA"),
        ]
        .into_iter()
        .collect();

        let bumps = board.live_bumps();
        assert_eq!(board.len(), 2);
        assert_eq!(board.known_count(), 1);
        assert_eq!(bumps.len(), 1);
        assert_eq!(bumps.get("nvda"), Some(dec!(-1)));
    }
}
