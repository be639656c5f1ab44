//! 비중 정규화.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{Percent, HUNDRED};

/// 초과 배분 경고 허용 오차 (퍼센트 포인트).
const OVER_ALLOCATION_TOLERANCE: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// 비중 합계가 100이 되도록 재조정합니다.
///
/// 합계가 정확히 0이면 1로 취급합니다. 이 경우 결과는 입력값 그대로이며
/// (빈 입력, 전부 0인 입력), 0으로 나누는 일은 없습니다.
/// 입력은 변경하지 않습니다.
pub fn normalize<K>(weights: &BTreeMap<K, Percent>) -> BTreeMap<K, Percent>
where
    K: Ord + Clone,
{
    let mut total = saturating_sum(weights.values().copied());
    if total.is_zero() {
        total = Decimal::ONE;
    }

    weights
        .iter()
        .map(|(k, v)| (k.clone(), share_of(*v, total)))
        .collect()
}

/// 합계가 표현 범위를 넘으면 최대/최소값에 고정합니다.
fn saturating_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// `value × 100 / total`. 중간값이 넘치면 먼저 나누고, 그래도 넘치면 부호에 맞는 극값.
fn share_of(value: Decimal, total: Decimal) -> Percent {
    value
        .checked_mul(HUNDRED)
        .and_then(|scaled| scaled.checked_div(total))
        .or_else(|| value.checked_div(total).map(|r| r.saturating_mul(HUNDRED)))
        .unwrap_or_else(|| {
            if value.is_sign_negative() == total.is_sign_negative() {
                Decimal::MAX
            } else {
                Decimal::MIN
            }
        })
}

/// 비중 합계 요약.
///
/// MAGS는 주식/스왑 외에 현금·단기국채를 보유하므로 합계가 100 미만인
/// 것이 정상입니다. 나머지는 비주식 비중으로 봅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeightSummary {
    /// 비중 합계
    pub total: Percent,
    /// 100 - 합계 (현금/국채 등)
    pub residual: Percent,
    /// 항목 수
    pub count: usize,
}

impl WeightSummary {
    /// 비중 맵에서 요약을 계산합니다.
    pub fn of<K>(weights: &BTreeMap<K, Percent>) -> Self {
        let total = saturating_sum(weights.values().copied());
        Self {
            total,
            residual: HUNDRED.saturating_sub(total),
            count: weights.len(),
        }
    }

    /// 합계가 허용 오차를 넘어 100을 초과하는지 확인합니다.
    pub fn is_over_allocated(&self) -> bool {
        self.total > HUNDRED + OVER_ALLOCATION_TOLERANCE
    }
}
