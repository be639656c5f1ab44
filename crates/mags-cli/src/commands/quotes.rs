//! MAG7 실시간 시세 조회 기능.

use anyhow::Result;
use serde::Serialize;
use tracing::warn;

use mags_core::{HoldingsSnapshot, Percent, Price, QuoteBoard};
use mags_data::SourceKind;

use super::context::AppContext;
use super::output::{
    csv_value, format_json, price_cell, signed_cell, signed_percent_cell, weight_cell,
    OutputFormat,
};

/// 시세 조회 설정.
#[derive(Debug)]
pub struct QuotesConfig {
    /// 펀드 비중을 가져올 소스
    pub source: Option<SourceKind>,
    /// 출력 형식
    pub format: OutputFormat,
    /// 캐시 무시
    pub refresh: bool,
}

/// 시세 한 줄.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteRow {
    pub ticker: String,
    pub last: Option<Price>,
    pub change: Option<Price>,
    pub change_pct: Option<Percent>,
    /// MAGS 내 비중
    pub fund_weight: Option<Percent>,
}

/// 시세판과 (있다면) 스냅샷 비중을 합칩니다.
pub fn build_quote_rows(board: &QuoteBoard, snapshot: Option<&HoldingsSnapshot>) -> Vec<QuoteRow> {
    board
        .iter()
        .map(|q| QuoteRow {
            ticker: q.ticker.clone(),
            last: q.last,
            change: q.change,
            change_pct: q.change_pct,
            fund_weight: snapshot.and_then(|s| s.holdings_by_ticker.get(&q.ticker).copied()),
        })
        .collect()
}

/// MAG7 시세 조회.
///
/// 비중 열을 위해 보유 종목도 조회하지만, 실패해도 시세는 출력합니다.
pub async fn show_quotes(ctx: &AppContext, config: QuotesConfig) -> Result<usize> {
    if config.refresh {
        ctx.service.clear_cache().await;
    }

    let (board, report) = tokio::join!(ctx.service.quotes(), ctx.service.snapshot(config.source));
    let snapshot = match report.into_result() {
        Ok((snapshot, _)) => Some(snapshot),
        Err(e) => {
            warn!(error = %e, "보유 종목 조회 실패, 비중 없이 시세만 출력");
            None
        }
    };

    if board.known_count() == 0 {
        warn!("모든 종목의 시세 조회에 실패했습니다");
    }

    let rows = build_quote_rows(&board, snapshot.as_ref());
    let content = match config.format {
        OutputFormat::Table => format_table(&rows),
        OutputFormat::Csv => format_csv(&rows),
        OutputFormat::Json => format_json(&rows)?,
    };
    println!("{}", content);

    Ok(rows.len())
}

/// 테이블 형식 출력.
fn format_table(rows: &[QuoteRow]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<8} {:>12} {:>10} {:>10} {:>10}\n",
        "TICKER", "LAST", "CHG $", "CHG %", "MAGS W%"
    ));
    output.push_str(&"-".repeat(54));
    output.push('\n');

    for row in rows {
        output.push_str(&format!(
            "{:<8} {:>12} {:>10} {:>10} {:>10}\n",
            row.ticker,
            price_cell(row.last),
            signed_cell(row.change, 2),
            signed_percent_cell(row.change_pct, 2),
            weight_cell(row.fund_weight)
        ));
    }

    output
}

/// CSV 형식 출력.
fn format_csv(rows: &[QuoteRow]) -> String {
    let mut output = String::from("ticker,last,change,change_pct,fund_weight\n");
    for row in rows {
        output.push_str(&format!(
            "{},{},{},{},{}\n",
            row.ticker,
            csv_value(row.last),
            csv_value(row.change),
            csv_value(row.change_pct),
            csv_value(row.fund_weight)
        ));
    }
    output
}
