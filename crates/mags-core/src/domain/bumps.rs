//! 가격 변동(범프) 집합과 텍스트 파서.
//!
//! ## 텍스트 문법
//!
//! 줄바꿈, 쉼표, 세미콜론으로 구분된 항목. 각 항목은 다음 형식입니다:
//!
//! ```text
//! KEY [: 또는 =] SIGNED_NUMBER [%]
//! ```
//!
//! `KEY`는 콜론/등호를 포함하지 않는 임의의 텍스트(티커, 종목명, `ALL`)입니다.
//! 변동률의 절댓값은 [`MAX_MOVE_PCT`] 이하여야 합니다.
//! 형식에 맞지 않는 항목은 경고와 함께 버려지며 나머지 항목은 계속 처리됩니다.
//!
//! ```rust
//! use mags_core::parse_bumps_text;
//!
//! let outcome = parse_bumps_text("NVDA:+2\nAAPL=-1.5\nALL:+0.25\nMeta:+0.5%");
//! assert_eq!(outcome.bumps.len(), 4);
//! assert!(outcome.warnings.is_empty());
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::resolver::normalize_key;
use crate::types::{parse_signed_decimal, Percent};

/// 모든 보유 종목에 적용되는 와일드카드 키.
pub const WILDCARD_KEY: &str = "ALL";

/// 텍스트로 입력할 수 있는 변동률 절댓값 상한 (1,000,000%).
pub const MAX_MOVE_PCT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

static BUMP_ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^:=]+?)\s*[:=]\s*([+-]?\d+(?:\.\d+)?)\s*%?\s*$")
        .unwrap_or_else(|e| panic!("invalid bump regex: {e}"))
});

static BUMP_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\n,;]+").unwrap_or_else(|e| panic!("invalid separator regex: {e}")));

/// 키 → 변동률(%) 집합.
///
/// 키는 삽입 시 공백 제거 + 대문자로 정규화되므로 조회는 대소문자를 무시합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BumpSet {
    moves: BTreeMap<String, Percent>,
}

impl BumpSet {
    /// 빈 집합을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 변동을 추가합니다. 같은 키가 있으면 덮어씁니다.
    pub fn insert(&mut self, key: &str, move_pct: Percent) {
        let key = normalize_key(key);
        if key.is_empty() {
            return;
        }
        self.moves.insert(key, move_pct);
    }

    /// 체이닝용 추가.
    pub fn with(mut self, key: &str, move_pct: Percent) -> Self {
        self.insert(key, move_pct);
        self
    }

    /// 키로 변동을 조회합니다 (대소문자/공백 무시).
    pub fn get(&self, key: &str) -> Option<Percent> {
        self.moves.get(&normalize_key(key)).copied()
    }

    /// 와일드카드(`ALL`) 변동.
    pub fn wildcard(&self) -> Option<Percent> {
        self.moves.get(WILDCARD_KEY).copied()
    }

    /// 다른 집합의 항목으로 덮어씁니다. `other`가 우선합니다.
    ///
    /// 실시간 시세로 채운 값 위에 수동 입력을 얹을 때 사용합니다.
    pub fn overlay(&mut self, other: &BumpSet) {
        for (k, v) in &other.moves {
            self.moves.insert(k.clone(), *v);
        }
    }

    /// `overlay`의 소비형 버전.
    pub fn merged_with(mut self, other: &BumpSet) -> Self {
        self.overlay(other);
        self
    }

    /// 키 삭제.
    pub fn remove(&mut self, key: &str) -> Option<Percent> {
        self.moves.remove(&normalize_key(key))
    }

    /// 모든 항목 삭제.
    pub fn clear(&mut self) {
        self.moves.clear();
    }

    /// 항목 수.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// (정규화된 키, 변동) 순회.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Percent)> {
        self.moves.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, Percent)> for BumpSet {
    fn from_iter<I: IntoIterator<Item = (String, Percent)>>(iter: I) -> Self {
        let mut set = BumpSet::new();
        for (k, v) in iter {
            set.insert(&k, v);
        }
        set
    }
}

/// 파싱할 수 없는 범프 항목.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BumpWarning {
    /// 원본 항목 텍스트
    pub entry: String,
}

impl std::fmt::Display for BumpWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "범프 형식 오류 또는 범위 초과, 무시됨: '{}' (예: NVDA:+2, AAPL=-1.5%)",
            self.entry
        )
    }
}

/// 텍스트 파싱 결과.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BumpParseOutcome {
    /// 파싱된 범프
    pub bumps: BumpSet,
    /// 버려진 항목
    pub warnings: Vec<BumpWarning>,
}

/// 단일 항목 파싱. 형식이 맞지 않거나 변동률이 [`MAX_MOVE_PCT`]를 넘으면 `None`.
///
/// 반환되는 키는 공백만 제거된 원본 표기입니다.
pub fn parse_bump_entry(entry: &str) -> Option<(String, Percent)> {
    let caps = BUMP_ENTRY_RE.captures(entry)?;
    let key = caps.get(1)?.as_str().trim();
    if key.is_empty() {
        return None;
    }
    let value = parse_signed_decimal(caps.get(2)?.as_str())?;
    if value.abs() > MAX_MOVE_PCT {
        return None;
    }
    Some((key.to_string(), value))
}

/// 여러 항목이 포함된 텍스트 블록 파싱.
///
/// 빈 조각은 조용히 건너뜁니다. 뒤에 나온 같은 키가 앞의 값을 덮어씁니다.
pub fn parse_bumps_text(block: &str) -> BumpParseOutcome {
    let mut outcome = BumpParseOutcome::default();

    for part in BUMP_SEPARATOR_RE.split(block) {
        if part.trim().is_empty() {
            continue;
        }
        match parse_bump_entry(part) {
            Some((key, value)) => outcome.bumps.insert(&key, value),
            None => {
                tracing::warn!(entry = part.trim(), "범프 항목 파싱 실패");
                outcome.warnings.push(BumpWarning {
                    entry: part.trim().to_string(),
                });
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_entry_variants() {
        assert_eq!(parse_bump_entry("NVDA:+2"), Some(("NVDA".to_string(), dec!(2))));
        assert_eq!(parse_bump_entry("NVDA=2%"), Some(("NVDA".to_string(), dec!(2))));
        assert_eq!(
            parse_bump_entry("  Meta Platforms : -0.5 % "),
            Some(("Meta Platforms".to_string(), dec!(-0.5)))
        );
        assert_eq!(parse_bump_entry("NVDA 2"), None);
        assert_eq!(parse_bump_entry("NVDA:abc"), None);
        assert_eq!(parse_bump_entry(":2"), None);
        assert_eq!(parse_bump_entry("NVDA:2.5.1"), None);
    }

    #[test]
    fn test_parse_block_keeps_going_after_bad_line() {
        let outcome = parse_bumps_text("NVDA 2\nAAPL=-1.5, ALL:+0.25;;\n\nmeta:+0.5%");
        assert_eq!(outcome.bumps.len(), 3);
        assert_eq!(outcome.bumps.get("aapl"), Some(dec!(-1.5)));
        assert_eq!(outcome.bumps.wildcard(), Some(dec!(0.25)));
        assert_eq!(outcome.bumps.get("META"), Some(dec!(0.5)));
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].entry, "NVDA 2");
    }

    #[test]
    fn test_out_of_range_move_is_warning() {
        assert_eq!(
            parse_bump_entry("NVDA:-1000000"),
            Some(("NVDA".to_string(), dec!(-1000000)))
        );
        assert_eq!(parse_bump_entry("NVDA:1000000.01"), None);

        let outcome = parse_bumps_text("NVDA:+9999999999999999999999999999\nAAPL:+1");
        assert_eq!(outcome.bumps.len(), 1);
        assert_eq!(outcome.bumps.get("AAPL"), Some(dec!(1)));
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].entry, "NVDA:+9999999999999999999999999999");
    }

    #[test]
    fn test_later_duplicates_override() {
        let outcome = parse_bumps_text("nvda:1\nNVDA:3");
        assert_eq!(outcome.bumps.len(), 1);
        assert_eq!(outcome.bumps.get("NVDA"), Some(dec!(3)));
    }

    #[test]
    fn test_overlay_manual_wins() {
        let live = BumpSet::new().with("NVDA", dec!(1.2)).with("AAPL", dec!(-0.4));
        let manual = BumpSet::new().with("nvda", dec!(5));
        let merged = live.merged_with(&manual);
        assert_eq!(merged.get("NVDA"), Some(dec!(5)));
        assert_eq!(merged.get("AAPL"), Some(dec!(-0.4)));
    }

    #[test]
    fn test_empty_key_ignored() {
        let mut set = BumpSet::new();
        set.insert("   ", dec!(1));
        assert!(set.is_empty());
    }
}
