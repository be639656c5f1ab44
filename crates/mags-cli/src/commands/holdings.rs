//! 보유 종목 조회 기능.

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use mags_core::{
    AsOfDate, HoldingsSnapshot, IdentityResolver, Percent, Price, WeightBasis, WeightSummary,
};
use mags_data::SourceKind;

use super::context::AppContext;
use super::output::{escape_csv, format_json, price_cell, truncate, weight_cell, OutputFormat};

/// 보유 종목 조회 설정.
#[derive(Debug)]
pub struct HoldingsConfig {
    /// 먼저 시도할 소스
    pub source: Option<SourceKind>,
    /// 출력 형식
    pub format: OutputFormat,
    /// 캐시 무시
    pub refresh: bool,
}

/// 보유 종목 한 줄.
#[derive(Debug, Clone, Serialize)]
pub struct HoldingRow {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub weight: Percent,
}

/// 출력용 보유 종목 보고서.
#[derive(Debug, Clone, Serialize)]
pub struct HoldingsReport {
    pub source: Option<String>,
    pub nav: Option<Price>,
    pub as_of: AsOfDate,
    pub basis: WeightBasis,
    pub holdings: Vec<HoldingRow>,
    pub summary: WeightSummary,
}

impl HoldingsReport {
    /// 스냅샷에서 보고서를 만듭니다. 티커 기준이 있으면 티커 기준을 사용합니다.
    pub fn from_snapshot(snapshot: &HoldingsSnapshot, resolver: &IdentityResolver) -> Self {
        let (weights, basis): (&BTreeMap<String, Percent>, _) =
            if snapshot.holdings_by_ticker.is_empty() {
                (&snapshot.holdings_by_name, WeightBasis::Name)
            } else {
                (&snapshot.holdings_by_ticker, WeightBasis::Ticker)
            };

        let holdings = snapshot
            .sorted_holdings()
            .into_iter()
            .map(|(key, weight)| HoldingRow {
                key: key.to_string(),
                name: match basis {
                    WeightBasis::Ticker => resolver.display_name(key).map(str::to_string),
                    WeightBasis::Name => None,
                },
                weight,
            })
            .collect();

        Self {
            source: snapshot.source.clone(),
            nav: snapshot.nav,
            as_of: snapshot.as_of,
            basis,
            holdings,
            summary: WeightSummary::of(weights),
        }
    }
}

/// 보유 종목 조회.
pub async fn show_holdings(ctx: &AppContext, config: HoldingsConfig) -> Result<usize> {
    let snapshot = ctx.fetch_snapshot(config.source, config.refresh).await?;
    let report = HoldingsReport::from_snapshot(&snapshot, &ctx.resolver);

    if report.summary.is_over_allocated() {
        warn!(total = %report.summary.total, "비중 합계가 100%를 초과합니다");
    }

    let content = match config.format {
        OutputFormat::Table => format_table(&report),
        OutputFormat::Csv => format_csv(&report),
        OutputFormat::Json => format_json(&report)?,
    };
    println!("{}", content);

    Ok(report.holdings.len())
}

/// 테이블 형식 출력.
fn format_table(report: &HoldingsReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "MAGS 보유 종목 (소스: {})\n",
        report.source.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!("NAV: {}\n", price_cell(report.nav)));
    output.push_str(&format!("기준일: {}\n", report.as_of));
    output.push_str(&format!(
        "종목 수: {} ({} 기준)\n\n",
        report.holdings.len(),
        report.basis
    ));

    // 헤더
    output.push_str(&format!("{:<32} {:<20} {:>9}\n", "KEY", "NAME", "WEIGHT"));
    output.push_str(&"-".repeat(63));
    output.push('\n');

    for row in &report.holdings {
        output.push_str(&format!(
            "{:<32} {:<20} {:>9}\n",
            truncate(&row.key, 32),
            truncate(row.name.as_deref().unwrap_or("-"), 20),
            weight_cell(Some(row.weight))
        ));
    }

    // 요약
    output.push('\n');
    output.push_str(&format!("합계: {}\n", weight_cell(Some(report.summary.total))));
    output.push_str(&format!(
        "기타 (현금/국채 등): {}",
        weight_cell(Some(report.summary.residual))
    ));
    if report.summary.is_over_allocated() {
        output.push_str("\n경고: 비중 합계가 100%를 초과합니다");
    }

    output
}

/// CSV 형식 출력.
fn format_csv(report: &HoldingsReport) -> String {
    let mut output = String::from("key,name,weight\n");
    for row in &report.holdings {
        output.push_str(&format!(
            "{},{},{}\n",
            escape_csv(&row.key),
            escape_csv(row.name.as_deref().unwrap_or("")),
            row.weight
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use mags_core::RawHolding;
    use rust_decimal_macros::dec;

    fn snapshot() -> HoldingsSnapshot {
        let rows = vec![
            RawHolding::named("Meta Platforms", dec!(14.51)),
            RawHolding::named("Meta Platforms Inc Swap", dec!(0.49)),
            RawHolding::named("NVIDIA", dec!(13.9)),
        ];
        HoldingsSnapshot::from_holdings(&rows, &IdentityResolver::mag7())
            .with_nav(Some(dec!(61.25)))
            .with_source("roundhill")
    }

    #[test]
    fn test_report_uses_ticker_basis() {
        let report = HoldingsReport::from_snapshot(&snapshot(), &IdentityResolver::mag7());
        assert_eq!(report.basis, WeightBasis::Ticker);
        assert_eq!(report.holdings.len(), 2);
        assert_eq!(report.holdings[0].key, "META");
        assert_eq!(report.holdings[0].weight, dec!(15.00));
        assert_eq!(report.holdings[0].name.as_deref(), Some("Meta Platforms"));
        assert_eq!(report.summary.total, dec!(28.90));
        assert_eq!(report.summary.residual, dec!(71.10));
    }

    #[test]
    fn test_report_falls_back_to_names() {
        let rows = vec![RawHolding::named("Broadcom", dec!(5))];
        let snapshot = HoldingsSnapshot::from_holdings(&rows, &IdentityResolver::mag7());
        let report = HoldingsReport::from_snapshot(&snapshot, &IdentityResolver::mag7());
        assert_eq!(report.basis, WeightBasis::Name);
        assert_eq!(report.holdings[0].key, "Broadcom");
        assert!(report.holdings[0].name.is_none());
    }

    #[test]
    fn test_table_and_csv() {
        let report = HoldingsReport::from_snapshot(&snapshot(), &IdentityResolver::mag7());

        let table = format_table(&report);
        assert!(table.contains("소스: roundhill"));
        assert!(table.contains("NAV: $61.25"));
        assert!(table.contains("15.00%"));
        assert!(!table.contains("경고"));

        let csv = format_csv(&report);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "key,name,weight");
        assert_eq!(lines[1], "META,Meta Platforms,15.00");
    }
}
