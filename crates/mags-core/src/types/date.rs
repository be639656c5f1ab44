//! 보유 종목/NAV 기준일 타입.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// 공시 데이터의 기준일.
///
/// 어떤 소스에서도 날짜를 알 수 없으면 `Unknown`입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AsOfDate {
    /// 확인된 기준일
    Date(NaiveDate),
    /// 알 수 없음
    #[default]
    Unknown,
}

impl AsOfDate {
    /// 날짜 값을 반환합니다.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::Unknown => None,
        }
    }

    /// 기준일이 알려져 있는지 확인합니다.
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Date(_))
    }
}

impl From<NaiveDate> for AsOfDate {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<Option<NaiveDate>> for AsOfDate {
    fn from(date: Option<NaiveDate>) -> Self {
        date.map(Self::Date).unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for AsOfDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", format_us_date(*d)),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

impl Serialize for AsOfDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Date(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            Self::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for AsOfDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("unknown") {
            return Ok(Self::Unknown);
        }
        NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Self::Date)
            .map_err(serde::de::Error::custom)
    }
}

/// 미국식 날짜 표기 (앞자리 0 없음, 예: "3/7/2025").
pub fn format_us_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// 주어진 날짜 또는 그 이전의 가장 가까운 평일.
pub fn last_weekday(today: NaiveDate) -> NaiveDate {
    let mut d = today;
    while matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
        d -= Duration::days(1);
    }
    d
}
