//! 퍼센트 및 가격 계산을 위한 Decimal 유틸리티.
//!
//! 비중과 변동률은 모두 "퍼센트 단위 숫자"로 표현합니다.
//! `14.28`은 14.28%를 의미하며 0.1428이 아닙니다.

use rust_decimal::Decimal;
use std::str::FromStr;

/// 퍼센트 값 (14.28 = 14.28%).
pub type Percent = Decimal;

/// 가격/NAV 타입.
pub type Price = Decimal;

/// 퍼센트 ↔ 배율 변환 상수.
pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Decimal 표시/반올림을 위한 확장 트레이트.
pub trait DecimalExt {
    /// 부호가 포함된 퍼센트 문자열로 변환합니다 (예: "+2.50%").
    fn to_signed_percent_string(&self, dp: u32) -> String;

    /// 부호가 포함된 문자열로 변환합니다 (예: "-0.2856").
    fn to_signed_string(&self, dp: u32) -> String;

    /// 지정된 소수점 자릿수로 반올림합니다 (0.5는 0에서 멀어지는 방향).
    fn round_half_up(&self, dp: u32) -> Decimal;
}

impl DecimalExt for Decimal {
    fn to_signed_percent_string(&self, dp: u32) -> String {
        format!("{}%", self.to_signed_string(dp))
    }

    fn to_signed_string(&self, dp: u32) -> String {
        let rounded = self.round_half_up(dp);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            format!("{:.*}", dp as usize, rounded)
        } else {
            format!("+{:.*}", dp as usize, rounded.abs())
        }
    }

    fn round_half_up(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
    }
}

/// 부호가 있는 소수 문자열을 Decimal로 파싱합니다.
///
/// 앞의 `+` 부호와 천 단위 쉼표를 허용합니다.
pub fn parse_signed_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim().replace(',', "");
    let unsigned = trimmed.strip_prefix('+').unwrap_or(&trimmed);
    if unsigned.is_empty() {
        return None;
    }
    Decimal::from_str(unsigned).ok()
}
