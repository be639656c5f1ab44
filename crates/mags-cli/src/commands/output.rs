//! 출력 형식과 표 렌더링 도우미.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;

use mags_core::DecimalExt;

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(anyhow::anyhow!(
                "Invalid format: {}. Use: table, csv, json",
                s
            )),
        }
    }
}

/// JSON 형식 출력.
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize to JSON")
}

/// 문자열 자르기 (UTF-8 안전).
pub fn truncate(s: &str, max_len: usize) -> String {
    // 문자 수로 계산 (바이트가 아님)
    let char_count = s.chars().count();

    if char_count <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// CSV 이스케이프 (콤마나 따옴표 포함 시 따옴표로 감싸기).
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// 가격 표시 (없으면 "-").
pub fn price_cell(value: Option<Decimal>) -> String {
    value
        .map(|v| format!("${:.2}", v.round_half_up(2)))
        .unwrap_or_else(|| "-".to_string())
}

/// 부호 있는 값 표시 (없으면 "-").
pub fn signed_cell(value: Option<Decimal>, dp: u32) -> String {
    value
        .map(|v| v.to_signed_string(dp))
        .unwrap_or_else(|| "-".to_string())
}

/// 부호 있는 퍼센트 표시 (없으면 "-").
pub fn signed_percent_cell(value: Option<Decimal>, dp: u32) -> String {
    value
        .map(|v| v.to_signed_percent_string(dp))
        .unwrap_or_else(|| "-".to_string())
}

/// 비중 표시 (없으면 "-").
pub fn weight_cell(value: Option<Decimal>) -> String {
    value
        .map(|v| format!("{:.2}%", v.round_half_up(2)))
        .unwrap_or_else(|| "-".to_string())
}

/// CSV용 선택 값 (없으면 빈 칸).
pub fn csv_value(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
