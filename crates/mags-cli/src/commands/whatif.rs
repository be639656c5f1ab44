//! 가격 변동 시나리오(what-if) 기능.
//!
//! 범프 적용 순서: 실시간 시세 변동률 위에 수동 입력(파일 → `-b` 순)을 덮어씁니다.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

use mags_core::{
    parse_bumps_text, project_weights, BumpParseOutcome, BumpSet, DecimalExt, Percent,
    Projection,
};
use mags_data::SourceKind;

use super::context::{validate_nav, AppContext};
use super::output::{
    escape_csv, format_json, price_cell, signed_cell, truncate, weight_cell, OutputFormat,
};

/// 시나리오 설정.
#[derive(Debug, Default)]
pub struct WhatIfConfig {
    /// `-b KEY:VAL` 항목들
    pub bumps: Vec<String>,
    /// 범프 텍스트 파일
    pub bumps_file: Option<PathBuf>,
    /// 실시간 변동률을 기본 범프로 사용
    pub live_bumps: bool,
    /// 비중 정규화 강제
    pub normalize: bool,
    /// 조회된 NAV 대신 사용할 NAV
    pub nav: Option<Decimal>,
    /// NAV를 찾지 못했을 때 사용할 NAV
    pub assume_nav: Option<Decimal>,
    /// 먼저 시도할 소스
    pub source: Option<SourceKind>,
    /// 변동 후 비중 표시
    pub show_weights: bool,
    /// 출력 형식
    pub format: OutputFormat,
}

/// 출력용 시나리오 보고서.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub projection: Projection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav_delta: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected_weights: Option<BTreeMap<String, Percent>>,
    pub bumps: BumpSet,
    pub warnings: Vec<String>,
}

impl ScenarioReport {
    pub fn new(
        projection: Projection,
        bumps: BumpSet,
        show_weights: bool,
        warnings: Vec<String>,
    ) -> Self {
        let projected_weights = show_weights.then(|| project_weights(&projection));
        Self {
            nav_delta: projection.nav_delta(),
            projection,
            projected_weights,
            bumps,
            warnings,
        }
    }
}

/// 수동 범프 텍스트를 합쳐 파싱합니다.
///
/// 파일 내용이 먼저, `-b` 항목이 나중에 파싱되므로 같은 키는 `-b`가 이깁니다.
pub fn collect_manual_bumps(entries: &[String], file_text: Option<&str>) -> BumpParseOutcome {
    let mut block = String::new();
    if let Some(text) = file_text {
        block.push_str(text);
        block.push('\n');
    }
    block.push_str(&entries.join("\n"));
    parse_bumps_text(&block)
}

/// 실시간 범프 위에 수동 범프를 얹습니다.
pub fn compose_bumps(live: Option<&BumpSet>, manual: &BumpSet) -> BumpSet {
    match live {
        Some(live) => live.clone().merged_with(manual),
        None => manual.clone(),
    }
}

/// 시나리오 실행.
pub async fn run_whatif(ctx: &AppContext, config: WhatIfConfig) -> Result<()> {
    let nav_override = validate_nav(config.nav, "--nav")?;
    let assumed_nav = validate_nav(config.assume_nav, "--assume-nav")?
        .or(ctx.config.scenario.assumed_nav);

    let file_text = match &config.bumps_file {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read bumps file: {}", path.display()))?,
        ),
        None => None,
    };
    let manual = collect_manual_bumps(&config.bumps, file_text.as_deref());
    for warning in &manual.warnings {
        eprintln!("경고: {}", warning);
    }

    let live = if config.live_bumps {
        let board = ctx.service.quotes().await;
        if board.known_count() == 0 {
            warn!("실시간 변동률을 가져오지 못했습니다. 수동 범프만 사용합니다");
        }
        Some(board.live_bumps())
    } else {
        None
    };
    let bumps = compose_bumps(live.as_ref(), &manual.bumps);

    let mut snapshot = ctx.fetch_snapshot(config.source, false).await?;
    if nav_override.is_some() {
        snapshot = snapshot.with_nav(nav_override);
    }

    let normalize = config.normalize || ctx.config.scenario.normalize_weights;
    let projection = ctx.engine.project(&snapshot, &bumps, assumed_nav, normalize);
    info!(
        bumps = bumps.len(),
        total_return_pct = %projection.total_return_pct,
        "시나리오 계산"
    );

    let report = ScenarioReport::new(
        projection,
        bumps,
        config.show_weights,
        manual.warnings.iter().map(ToString::to_string).collect(),
    );
    println!("{}", render_report(&report, config.format)?);

    Ok(())
}

/// 형식에 맞춰 보고서를 렌더링합니다.
pub fn render_report(report: &ScenarioReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Table => format_table(report),
        OutputFormat::Csv => format_csv(report),
        OutputFormat::Json => format_json(report)?,
    })
}

/// 테이블 형식 출력.
fn format_table(report: &ScenarioReport) -> String {
    let projection = &report.projection;
    let weights = report.projected_weights.as_ref();
    let mut output = String::new();

    output.push_str(&format!(
        "비중 기준: {} | 정규화: {}\n\n",
        projection.basis,
        if projection.normalized { "예" } else { "아니오" }
    ));

    output.push_str(&format!(
        "{:<28} {:>9} {:>9} {:>12} {:>11}",
        "KEY", "WEIGHT", "MOVE", "CONTRIB bps", "CONTRIB %"
    ));
    if weights.is_some() {
        output.push_str(&format!(" {:>9}", "NEW W%"));
    }
    output.push('\n');
    output.push_str(&"-".repeat(if weights.is_some() { 83 } else { 73 }));
    output.push('\n');

    for row in &projection.rows {
        output.push_str(&format!(
            "{:<28} {:>9} {:>9} {:>12} {:>11}",
            truncate(&row.key, 28),
            weight_cell(Some(row.weight)),
            row.move_pct.to_signed_percent_string(2),
            row.contribution_bps.to_signed_string(2),
            row.contribution_pct.to_signed_percent_string(4)
        ));
        if let Some(weights) = weights {
            output.push_str(&format!(" {:>9}", weight_cell(weights.get(&row.key).copied())));
        }
        output.push('\n');
    }

    output.push('\n');
    output.push_str(&format!(
        "가중 수익률: {}\n",
        projection.total_return_pct.to_signed_percent_string(4)
    ));

    match projection.base_nav {
        Some(nav) => {
            output.push_str(&format!("기준 NAV: {}\n", price_cell(Some(nav))));
            output.push_str(&format!(
                "예상 NAV: {} ({})",
                price_cell(projection.projected_nav),
                signed_cell(report.nav_delta, 2)
            ));
        }
        None => {
            output.push_str("기준 NAV: - (NAV를 찾지 못했습니다. --assume-nav 로 지정하세요)\n");
            output.push_str("예상 NAV: -");
        }
    }

    output
}

/// CSV 형식 출력 (행 단위, 합계는 포함하지 않음).
fn format_csv(report: &ScenarioReport) -> String {
    let weights = report.projected_weights.as_ref();
    let mut output = String::from("key,weight,move_pct,contribution_bps,contribution_pct");
    if weights.is_some() {
        output.push_str(",projected_weight");
    }
    output.push('\n');

    for row in &report.projection.rows {
        output.push_str(&format!(
            "{},{},{},{},{}",
            escape_csv(&row.key),
            row.weight,
            row.move_pct,
            row.contribution_bps,
            row.contribution_pct
        ));
        if let Some(weights) = weights {
            output.push_str(&format!(
                ",{}",
                weights.get(&row.key).map(|w| w.to_string()).unwrap_or_default()
            ));
        }
        output.push('\n');
    }

    output
}
