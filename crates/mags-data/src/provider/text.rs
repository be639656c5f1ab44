//! 웹 페이지 텍스트 추출 헬퍼.
//!
//! 퍼센트 문자열, NAV, 공시 기준일처럼 여러 소스에서 공통으로 쓰는
//! 정규식 기반 추출 함수를 모아둡니다.

use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use scraper::{Html, Selector};

use mags_core::{parse_signed_decimal, Percent, Price};

/// 기준일 탐색 범위 (일).
const MAX_DATE_AGE_DAYS: i64 = 730;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid regex {pattern}: {e}"))
}

static PERCENT_RE: Lazy<Regex> = Lazy::new(|| compile(r"([+-]?\d+(?:\.\d+)?)\s*%?$"));

static DATE_RE: Lazy<Regex> = Lazy::new(|| compile(r"\b([0-1]?\d/[0-3]?\d/\d{4})\b"));

static NAV_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        compile(r"(?i)Net Asset Value[^$]*\$\s*([0-9][0-9,]*\.?[0-9]*)"),
        compile(r"(?i)\bNAV\b[^$]*\$\s*([0-9][0-9,]*\.?[0-9]*)"),
        compile(r#"(?i)"NetAssetValue"[^0-9]*([0-9][0-9,]*\.?[0-9]*)"#),
    ]
});

/// 셀 텍스트를 퍼센트 숫자로 변환합니다 (예: "14.28%" → 14.28).
///
/// 문자열 끝에 있는 숫자(선택적 `%`)만 인식합니다.
pub fn coerce_percent(text: &str) -> Option<Percent> {
    let trimmed = text.trim();
    let caps = PERCENT_RE.captures(trimmed)?;
    parse_signed_decimal(caps.get(1)?.as_str())
}

/// 텍스트에서 NAV를 추출합니다.
///
/// 패턴을 순서대로 시도하며 0보다 큰 첫 번째 값을 반환합니다.
pub fn extract_nav(text: &str) -> Option<Price> {
    NAV_PATTERNS.iter().find_map(|re| {
        let caps = re.captures(text)?;
        parse_signed_decimal(caps.get(1)?.as_str()).filter(|v| *v > Decimal::ZERO)
    })
}

/// 텍스트에 있는 가장 최근의 `M/D/YYYY` 날짜.
///
/// `today` 이후 날짜와 730일 이상 지난 날짜는 제외합니다.
/// 텍스트에 `TBD`가 포함되어 있으면 날짜를 신뢰할 수 없으므로 `None`입니다.
pub fn latest_date_in_text(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if text.is_empty() || text.to_uppercase().contains("TBD") {
        return None;
    }

    let oldest = today - Duration::days(MAX_DATE_AGE_DAYS);
    DATE_RE
        .captures_iter(text)
        .filter_map(|caps| NaiveDate::parse_from_str(caps.get(1)?.as_str(), "%m/%d/%Y").ok())
        .filter(|d| *d <= today && *d > oldest)
        .max()
}

/// CSS 셀렉터를 파싱합니다.
pub fn selector(css: &str) -> crate::Result<Selector> {
    Selector::parse(css)
        .map_err(|e| crate::DataError::ParseError(format!("잘못된 셀렉터 '{}': {}", css, e)))
}

/// HTML 문서의 표시 텍스트 (공백으로 이어 붙임).
pub fn page_text(document: &Html) -> String {
    document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 요소 텍스트를 공백 정리하여 반환합니다.
pub fn element_text(element: &scraper::ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_coerce_percent() {
        assert_eq!(coerce_percent("14.28%"), Some(dec!(14.28)));
        assert_eq!(coerce_percent(" 8 % "), Some(dec!(8)));
        assert_eq!(coerce_percent("-0.5"), Some(dec!(-0.5)));
        assert_eq!(coerce_percent("Weight 12.1%"), Some(dec!(12.1)));
        assert_eq!(coerce_percent("n/a"), None);
        assert_eq!(coerce_percent(""), None);
    }

    #[test]
    fn test_extract_nav_patterns() {
        assert_eq!(
            extract_nav("Fund Details Net Asset Value as of 10/16/2026 $61.25"),
            Some(dec!(61.25))
        );
        assert_eq!(extract_nav("Daily NAV: $1,061.50"), Some(dec!(1061.50)));
        assert_eq!(
            extract_nav(r#"{"NetAssetValue": "58.17"}"#),
            Some(dec!(58.17))
        );
        assert_eq!(extract_nav("no price here"), None);
        assert_eq!(extract_nav("NAV $0"), None);
    }

    #[test]
    fn test_latest_date_in_text() {
        let today = day(2026, 10, 17);
        let text = "Holdings as of 10/15/2026. Inception 4/10/2024. Next 12/31/2026";
        assert_eq!(latest_date_in_text(text, today), Some(day(2026, 10, 15)));

        // 2년 이상 지난 날짜는 무시
        assert_eq!(latest_date_in_text("as of 1/2/2024", today), None);
        assert_eq!(latest_date_in_text("Date: TBD 10/15/2026", today), None);
        assert_eq!(latest_date_in_text("13/45/2026", today), None);
    }

    #[test]
    fn test_page_text_collapses_whitespace() {
        let html = Html::parse_document("<html><body><p> Hello </p>\n<div>World</div></body></html>");
        assert_eq!(page_text(&html), "Hello World");
    }
}
