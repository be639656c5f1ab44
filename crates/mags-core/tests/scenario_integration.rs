//! 시나리오 엔진 통합 테스트
//!
//! 스냅샷 생성 → 범프 파싱 → 시나리오 계산의 전체 흐름을 검증합니다.

use std::sync::Arc;

use mags_core::{
    normalize, parse_bumps_text, project_weights, BumpSet, HoldingsSnapshot, IdentityResolver,
    QuoteBoard, Quote, RawHolding, ScenarioEngine, WeightBasis, WeightSummary,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

fn engine() -> ScenarioEngine {
    ScenarioEngine::new(Arc::new(IdentityResolver::mag7()))
}

/// 실제 공시와 비슷한 형태의 MAGS 보유 종목.
fn sample_rows() -> Vec<RawHolding> {
    vec![
        RawHolding::named("NVIDIA", dec!(6.1)).with_symbol("NVDA"),
        RawHolding::named("NVIDIA CORP SWAP", dec!(8.2)),
        RawHolding::named("Apple", dec!(5.4)).with_symbol("AAPL"),
        RawHolding::named("APPLE INC SWAP", dec!(8.5)),
        RawHolding::named("Microsoft", dec!(13.9)).with_symbol("MSFT"),
        RawHolding::named("Alphabet", dec!(14.2)).with_symbol("GOOGL"),
        RawHolding::named("AMAZON.COM INC", dec!(14.0)).with_symbol("AMZN"),
        RawHolding::named("Meta Platforms", dec!(14.3)).with_symbol("META"),
        RawHolding::named("Tesla", dec!(13.6)).with_symbol("TSLA"),
        RawHolding::named("First American Treasury Obligations", dec!(1.8)),
    ]
}

#[test]
fn test_full_flow_with_text_bumps() {
    let engine = engine();
    let snapshot = HoldingsSnapshot::from_holdings(&sample_rows(), engine.resolver())
        .with_nav(Some(dec!(50)))
        .with_source("fixture");

    assert_eq!(snapshot.holdings_by_ticker.len(), 7);
    assert_eq!(snapshot.holdings_by_ticker["NVDA"], dec!(14.3));
    assert_eq!(snapshot.holdings_by_ticker["AAPL"], dec!(13.9));
    assert_eq!(snapshot.holdings_by_name.len(), 10);

    let outcome = parse_bumps_text("NVDA:+10\nALL=-1%\nbad line");
    assert_eq!(outcome.warnings.len(), 1);

    let p = engine.project(&snapshot, &outcome.bumps, None, false);
    assert_eq!(p.basis, WeightBasis::Ticker);
    assert_eq!(p.rows.len(), 7);
    assert_eq!(p.row("NVDA").map(|r| r.move_pct), Some(dec!(10)));
    assert_eq!(p.row("TSLA").map(|r| r.move_pct), Some(dec!(-1)));

    // NVDA 14.3 × 10 / 100 + 나머지 6종목(83.9) × -1 / 100
    let others: Decimal = snapshot
        .holdings_by_ticker
        .iter()
        .filter(|(k, _)| k.as_str() != "NVDA")
        .map(|(_, v)| *v)
        .sum();
    let expected = dec!(1.43) - others / dec!(100);
    assert_eq!(p.total_return_pct, expected);
    assert_eq!(
        p.projected_nav,
        Some(dec!(50) * (Decimal::ONE + expected / dec!(100)))
    );
}

#[test]
fn test_exact_key_overrides_wildcard() {
    let snapshot = HoldingsSnapshot {
        holdings_by_ticker: BTreeMap::from([("NVDA".to_string(), dec!(10))]),
        holdings_by_name: BTreeMap::from([("NVIDIA".to_string(), dec!(10))]),
        ..Default::default()
    };
    let bumps = BumpSet::new().with("NVDA", dec!(5)).with("ALL", dec!(1));
    let p = engine().project(&snapshot, &bumps, None, false);
    assert_eq!(p.rows[0].move_pct, dec!(5));
}

#[test]
fn test_wildcard_applies_to_unlisted() {
    let snapshot = HoldingsSnapshot {
        holdings_by_ticker: BTreeMap::from([("AAPL".to_string(), dec!(20))]),
        holdings_by_name: BTreeMap::from([("Apple".to_string(), dec!(20))]),
        ..Default::default()
    };
    let bumps = BumpSet::new().with("ALL", dec!(-2));
    let p = engine().project(&snapshot, &bumps, None, false);
    assert_eq!(p.rows[0].move_pct, dec!(-2));
    assert_eq!(p.total_return_pct, dec!(-0.4));
}

#[test]
fn test_no_nav_means_no_projection() {
    let engine = engine();
    let snapshot = HoldingsSnapshot::from_holdings(&sample_rows(), engine.resolver());
    let bumps = BumpSet::new().with("ALL", dec!(3));

    let p = engine.project(&snapshot, &bumps, None, false);
    assert!(p.base_nav.is_none());
    assert!(p.projected_nav.is_none());
    assert_ne!(p.total_return_pct, Decimal::ZERO);
}

#[test]
fn test_bump_text_forms() {
    let outcome = parse_bumps_text("NVDA 2");
    assert!(outcome.bumps.is_empty());
    assert_eq!(outcome.warnings.len(), 1);

    for text in ["NVDA:+2", "NVDA=2%", " nvda : 2.0 "] {
        let outcome = parse_bumps_text(text);
        assert_eq!(outcome.bumps.get("NVDA"), Some(dec!(2)), "입력: {text}");
        assert!(outcome.warnings.is_empty());
    }
}

#[test]
fn test_manual_bumps_override_live_quotes() {
    let engine = engine();
    let snapshot = HoldingsSnapshot::from_holdings(&sample_rows(), engine.resolver());

    let board: QuoteBoard = vec![
        Quote::from_prices("NVDA", Some(dec!(110)), Some(dec!(100))),
        Quote::from_prices("AAPL", Some(dec!(95)), Some(dec!(100))),
    ]
    .into_iter()
    .collect();

    let manual = parse_bumps_text("AAPL:+1").bumps;
    let bumps = board.live_bumps().merged_with(&manual);

    let p = engine.project(&snapshot, &bumps, Some(dec!(40)), false);
    assert_eq!(p.row("NVDA").map(|r| r.move_pct), Some(dec!(10)));
    assert_eq!(p.row("AAPL").map(|r| r.move_pct), Some(dec!(1)));
    assert_eq!(p.row("MSFT").map(|r| r.move_pct), Some(dec!(0)));
    assert_eq!(p.base_nav, Some(dec!(40)));
}

#[test]
fn test_normalized_weights_sum_to_hundred() {
    let engine = engine();
    let snapshot = HoldingsSnapshot::from_holdings(&sample_rows(), engine.resolver());
    let summary = WeightSummary::of(&snapshot.holdings_by_ticker);
    assert_eq!(summary.total, dec!(98.2));
    assert_eq!(summary.residual, dec!(1.8));

    let p = engine.project(&snapshot, &BumpSet::new(), None, true);
    let diff = (p.total_weight() - dec!(100)).abs();
    assert!(diff < dec!(0.000001), "합계 오차: {diff}");

    let weights = project_weights(&p);
    let total: Decimal = weights.values().copied().sum();
    assert!((total - dec!(100)).abs() < dec!(0.000001));
}

#[test]
fn test_normalize_empty_and_zero_inputs() {
    let empty: BTreeMap<String, Decimal> = BTreeMap::new();
    assert_eq!(normalize(&empty), empty);

    let zeros = BTreeMap::from([("A".to_string(), dec!(0))]);
    assert_eq!(normalize(&zeros), zeros);
}
