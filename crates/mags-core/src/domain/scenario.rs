//! What-if 시나리오 엔진.
//!
//! 보유 종목 스냅샷과 범프 집합으로부터 종목별 기여도, 가중 수익률,
//! 예상 NAV를 계산합니다. 1차 선형 근사이며 부족한 데이터로 실패하지 않습니다.
//!
//! # 계산식
//!
//! ```text
//! contribution_bps = W × M
//! contribution_pct = W × M / 100
//! total_return_pct = Σ contribution_pct
//! projected_nav    = base_nav × (1 + total_return_pct / 100)
//! ```

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::bumps::BumpSet;
use super::normalizer::normalize;
use super::resolver::{normalize_key, IdentityResolver};
use super::snapshot::HoldingsSnapshot;
use crate::types::{Percent, Price, HUNDRED};

/// 시나리오 행의 키 기준.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightBasis {
    /// 정규 티커 기준
    Ticker,
    /// 공시 종목명 기준 (티커 변환 결과가 없을 때)
    Name,
}

impl std::fmt::Display for WeightBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeightBasis::Ticker => write!(f, "ticker"),
            WeightBasis::Name => write!(f, "name"),
        }
    }
}

/// 종목별 시나리오 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioRow {
    /// 보유 종목 키 (티커 또는 종목명)
    pub key: String,
    /// 비중 (%)
    pub weight: Percent,
    /// 적용된 변동률 (%)
    pub move_pct: Percent,
    /// 비중 × 변동률 (스케일 없음)
    pub contribution_bps: Decimal,
    /// 펀드 수익률 기여도 (%)
    pub contribution_pct: Percent,
}

/// 시나리오 계산 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    /// 비중 내림차순 행
    pub rows: Vec<ScenarioRow>,
    /// 가중 수익률 합계 (%)
    pub total_return_pct: Percent,
    /// 기준 NAV (스냅샷 NAV, 없으면 가정 NAV)
    pub base_nav: Option<Price>,
    /// 예상 NAV
    pub projected_nav: Option<Price>,
    /// 행 키 기준
    pub basis: WeightBasis,
    /// 비중 정규화 여부
    pub normalized: bool,
}

impl Projection {
    /// 예상 NAV - 기준 NAV.
    pub fn nav_delta(&self) -> Option<Price> {
        match (self.projected_nav, self.base_nav) {
            (Some(projected), Some(base)) => Some(projected.saturating_sub(base)),
            _ => None,
        }
    }

    /// 행 비중 합계.
    pub fn total_weight(&self) -> Percent {
        self.rows
            .iter()
            .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.weight))
    }

    /// 키로 행을 찾습니다 (대소문자 무시).
    pub fn row(&self, key: &str) -> Option<&ScenarioRow> {
        let key = normalize_key(key);
        self.rows.iter().find(|r| normalize_key(&r.key) == key)
    }
}

/// 시나리오 엔진.
///
/// 변환기는 생성 시 주입되며 이후 변경되지 않습니다. 계산은 동기식이고
/// 부작용이 없으므로 입력이 바뀔 때마다 다시 호출하면 됩니다.
#[derive(Debug, Clone)]
pub struct ScenarioEngine {
    resolver: Arc<IdentityResolver>,
}

impl ScenarioEngine {
    /// 새 엔진을 생성합니다.
    pub fn new(resolver: Arc<IdentityResolver>) -> Self {
        Self { resolver }
    }

    /// 주입된 변환기.
    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    /// 시나리오를 계산합니다.
    ///
    /// # Arguments
    /// * `snapshot` - 보유 종목 스냅샷
    /// * `bumps` - 키별 변동률
    /// * `assumed_nav` - 스냅샷에 NAV가 없을 때 사용할 NAV
    /// * `use_normalized` - 비중을 합계 100으로 재조정할지 여부
    pub fn project(
        &self,
        snapshot: &HoldingsSnapshot,
        bumps: &BumpSet,
        assumed_nav: Option<Price>,
        use_normalized: bool,
    ) -> Projection {
        let (working, basis) = if snapshot.holdings_by_ticker.is_empty() {
            (&snapshot.holdings_by_name, WeightBasis::Name)
        } else {
            (&snapshot.holdings_by_ticker, WeightBasis::Ticker)
        };

        let weights = if use_normalized {
            normalize(working)
        } else {
            working.clone()
        };

        let mut rows: Vec<ScenarioRow> = weights
            .into_iter()
            .map(|(key, weight)| {
                let move_pct = self.move_for(&key, bumps);
                let contribution_bps = weight.checked_mul(move_pct).unwrap_or_else(|| {
                    tracing::warn!(
                        key = %key,
                        weight = %weight,
                        move_pct = %move_pct,
                        "기여도가 표현 범위를 넘어 극값으로 고정합니다"
                    );
                    weight.saturating_mul(move_pct)
                });
                ScenarioRow {
                    key,
                    weight,
                    move_pct,
                    contribution_bps,
                    contribution_pct: contribution_bps / HUNDRED,
                }
            })
            .collect();

        rows.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.key.cmp(&b.key)));

        let total_return_pct: Percent = rows
            .iter()
            .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.contribution_pct));
        let base_nav = snapshot.nav.or(assumed_nav);
        let growth = Decimal::ONE.saturating_add(total_return_pct / HUNDRED);
        let projected_nav = base_nav.map(|nav| {
            nav.checked_mul(growth).unwrap_or_else(|| {
                tracing::warn!(nav = %nav, total_return_pct = %total_return_pct, "예상 NAV가 표현 범위를 넘었습니다");
                nav.saturating_mul(growth)
            })
        });

        tracing::debug!(
            rows = rows.len(),
            basis = %basis,
            total_return_pct = %total_return_pct,
            "시나리오 계산 완료"
        );

        Projection {
            rows,
            total_return_pct,
            base_nav,
            projected_nav,
            basis,
            normalized: use_normalized,
        }
    }

    /// 키에 적용할 변동률.
    ///
    /// 우선순위: 정확한 키 → 변환된 티커 → `ALL` → 0.
    fn move_for(&self, key: &str, bumps: &BumpSet) -> Percent {
        if let Some(m) = bumps.get(key) {
            return m;
        }
        if let Some(m) = self.resolver.resolve(key).and_then(|t| bumps.get(t)) {
            return m;
        }
        bumps.wildcard().unwrap_or(Decimal::ZERO)
    }
}

impl Default for ScenarioEngine {
    fn default() -> Self {
        Self::new(Arc::new(IdentityResolver::mag7()))
    }
}

/// 변동 후 비중 (합계 100으로 재정규화).
///
/// 각 종목의 비중을 `w × (1 + move / 100)`로 움직인 뒤 정규화합니다.
pub fn project_weights(projection: &Projection) -> BTreeMap<String, Percent> {
    let moved: BTreeMap<String, Percent> = projection
        .rows
        .iter()
        .map(|r| {
            (
                r.key.clone(),
                r.weight
                    .saturating_mul(Decimal::ONE.saturating_add(r.move_pct / HUNDRED)),
            )
        })
        .collect();
    normalize(&moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::snapshot::RawHolding;
    use rust_decimal_macros::dec;

    fn snapshot_with(pairs: &[(&str, Decimal)], nav: Option<Decimal>) -> HoldingsSnapshot {
        HoldingsSnapshot {
            holdings_by_ticker: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            holdings_by_name: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            nav,
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_key_beats_wildcard() {
        let engine = ScenarioEngine::default();
        let snapshot = snapshot_with(&[("NVDA", dec!(10))], None);
        let bumps = BumpSet::new().with("NVDA", dec!(5)).with("ALL", dec!(1));

        let p = engine.project(&snapshot, &bumps, None, false);
        assert_eq!(p.rows[0].move_pct, dec!(5));
        assert_eq!(p.rows[0].contribution_bps, dec!(50));
        assert_eq!(p.total_return_pct, dec!(0.5));
    }

    #[test]
    fn test_wildcard_and_default_zero() {
        let engine = ScenarioEngine::default();
        let snapshot = snapshot_with(&[("AAPL", dec!(20))], None);

        let p = engine.project(&snapshot, &BumpSet::new().with("all", dec!(-2)), None, false);
        assert_eq!(p.rows[0].move_pct, dec!(-2));

        let p = engine.project(&snapshot, &BumpSet::new(), None, false);
        assert_eq!(p.rows[0].move_pct, Decimal::ZERO);
        assert_eq!(p.total_return_pct, Decimal::ZERO);
    }

    #[test]
    fn test_name_basis_uses_resolver_for_bumps() {
        let engine = ScenarioEngine::default();
        let snapshot = HoldingsSnapshot::from_holdings(
            &[
                RawHolding::named("First American Treasury", dec!(30)),
                RawHolding::named("Bitcoin Trust", dec!(10)),
            ],
            engine.resolver(),
        );
        assert!(snapshot.holdings_by_ticker.is_empty());

        let mut name_only = snapshot.clone();
        name_only
            .holdings_by_name
            .insert("Meta Platforms".to_string(), dec!(12));
        let bumps = BumpSet::new().with("META", dec!(3));

        let p = engine.project(&name_only, &bumps, None, false);
        assert_eq!(p.basis, WeightBasis::Name);
        assert_eq!(p.row("meta platforms").map(|r| r.move_pct), Some(dec!(3)));
        assert_eq!(p.row("Bitcoin Trust").map(|r| r.move_pct), Some(dec!(0)));
    }

    #[test]
    fn test_projected_nav_and_delta() {
        let engine = ScenarioEngine::default();
        let snapshot = snapshot_with(&[("NVDA", dec!(14.28))], Some(dec!(100)));
        let bumps = BumpSet::new().with("NVDA", dec!(2));

        let p = engine.project(&snapshot, &bumps, Some(dec!(50)), false);
        assert_eq!(p.rows[0].contribution_bps, dec!(28.56));
        assert_eq!(p.rows[0].contribution_pct, dec!(0.2856));
        assert_eq!(p.base_nav, Some(dec!(100)));
        assert_eq!(p.projected_nav, Some(dec!(100.2856)));
        assert_eq!(p.nav_delta(), Some(dec!(0.2856)));
    }

    #[test]
    fn test_assumed_nav_only_when_missing() {
        let engine = ScenarioEngine::default();
        let snapshot = snapshot_with(&[("TSLA", dec!(50))], None);
        let bumps = BumpSet::new().with("TSLA", dec!(10));

        let p = engine.project(&snapshot, &bumps, None, false);
        assert!(p.base_nav.is_none());
        assert!(p.projected_nav.is_none());
        assert!(p.nav_delta().is_none());

        let p = engine.project(&snapshot, &bumps, Some(dec!(40)), false);
        assert_eq!(p.projected_nav, Some(dec!(42)));
    }

    #[test]
    fn test_rows_sorted_by_weight_then_key() {
        let engine = ScenarioEngine::default();
        let snapshot = snapshot_with(
            &[("AAPL", dec!(10)), ("MSFT", dec!(15)), ("AMZN", dec!(10))],
            None,
        );
        let p = engine.project(&snapshot, &BumpSet::new(), None, false);
        let keys: Vec<&str> = p.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["MSFT", "AAPL", "AMZN"]);
    }

    #[test]
    fn test_normalized_projection() {
        let engine = ScenarioEngine::default();
        let snapshot = snapshot_with(&[("NVDA", dec!(10)), ("AAPL", dec!(30))], None);
        let bumps = BumpSet::new().with("ALL", dec!(4));

        let p = engine.project(&snapshot, &bumps, None, true);
        assert!(p.normalized);
        assert_eq!(p.total_weight(), dec!(100));
        assert_eq!(p.total_return_pct, dec!(4));
    }

    #[test]
    fn test_project_weights_shift_towards_winners() {
        let engine = ScenarioEngine::default();
        let snapshot = snapshot_with(&[("NVDA", dec!(50)), ("AAPL", dec!(50))], None);
        let bumps = BumpSet::new().with("NVDA", dec!(50)).with("AAPL", dec!(-50));

        let p = engine.project(&snapshot, &bumps, None, false);
        let w = project_weights(&p);
        assert_eq!(w["NVDA"], dec!(75));
        assert_eq!(w["AAPL"], dec!(25));
    }

    #[test]
    fn test_extreme_moves_saturate_instead_of_overflowing() {
        let engine = ScenarioEngine::default();
        let snapshot = snapshot_with(&[("NVDA", dec!(50)), ("AAPL", dec!(50))], Some(dec!(100)));
        let bumps = BumpSet::new()
            .with("NVDA", Decimal::MAX)
            .with("AAPL", Decimal::MIN);

        let p = engine.project(&snapshot, &bumps, None, false);
        assert_eq!(p.row("NVDA").map(|r| r.contribution_bps), Some(Decimal::MAX));
        assert_eq!(p.row("AAPL").map(|r| r.contribution_bps), Some(Decimal::MIN));
        assert!(p.projected_nav.is_some());
        assert!(p.nav_delta().is_some());

        let w = project_weights(&p);
        assert_eq!(w.len(), 2);

        let p = engine.project(&snapshot, &bumps, None, true);
        assert!(p.normalized);
        assert_eq!(p.total_weight(), dec!(100));
    }
}
