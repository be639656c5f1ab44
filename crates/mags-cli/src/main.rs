//! MAGS ETF 노출 분석 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 현재 보유 종목과 NAV (기본 소스 순서)
//! mags holdings
//!
//! # Roundhill 공식 페이지를 먼저 시도, 캐시 무시, JSON 출력
//! mags holdings --source roundhill --refresh --format json
//!
//! # MAG7 실시간 시세
//! mags quotes
//!
//! # NVDA +2%, 나머지 전체 -0.5% 시나리오
//! mags whatif -b NVDA:+2 -b ALL:-0.5
//!
//! # 실시간 변동률 위에 파일 범프를 얹고, 변동 후 비중까지 표시
//! mags whatif --live-bumps --bumps-file bumps.txt --show-weights
//!
//! # 대화형 모드
//! mags interactive --normalize
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{error, info};

use mags_cli::commands::context::{parse_source, AppContext};
use mags_cli::commands::holdings::{show_holdings, HoldingsConfig};
use mags_cli::commands::interactive::{run_interactive, InteractiveConfig};
use mags_cli::commands::output::OutputFormat;
use mags_cli::commands::quotes::{show_quotes, QuotesConfig};
use mags_cli::commands::whatif::{run_whatif, WhatIfConfig};
use mags_core::{init_logging, AppConfig, LogConfig, LogFormat};

#[derive(Parser)]
#[command(name = "mags")]
#[command(about = "MAGS ETF CLI - MAG7 노출 분석 및 NAV 시나리오 계산", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로 (없으면 기본값 + 환경 변수)
    #[arg(long, global = true, default_value = "config/default.toml")]
    config: PathBuf,

    /// 로그 형식 (pretty, json, compact)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 보유 종목, NAV, 기준일 조회 (StockAnalysis → Yahoo → Roundhill fallback)
    Holdings {
        /// 먼저 시도할 소스 (stockanalysis, yahoo, roundhill)
        #[arg(short, long)]
        source: Option<String>,

        /// 출력 형식 (table, csv, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// 캐시를 무시하고 다시 조회
        #[arg(long, default_value = "false")]
        refresh: bool,
    },

    /// MAG7 실시간 시세와 펀드 내 비중
    Quotes {
        /// 비중을 가져올 소스
        #[arg(short, long)]
        source: Option<String>,

        /// 출력 형식 (table, csv, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// 캐시를 무시하고 다시 조회
        #[arg(long, default_value = "false")]
        refresh: bool,
    },

    /// 가격 변동 시나리오로 예상 NAV 계산
    Whatif {
        /// 범프 항목 (예: NVDA:+2, AAPL=-1.5%, ALL:+0.25). 여러 번 지정 가능
        #[arg(short, long = "bump")]
        bumps: Vec<String>,

        /// 범프 텍스트 파일 (줄/쉼표/세미콜론 구분)
        #[arg(long)]
        bumps_file: Option<PathBuf>,

        /// 실시간 변동률을 기본 범프로 사용 (수동 입력이 우선)
        #[arg(long, default_value = "false")]
        live_bumps: bool,

        /// 비중 합계를 100%로 정규화
        #[arg(long, default_value = "false")]
        normalize: bool,

        /// 조회된 NAV 대신 사용할 NAV
        #[arg(long, allow_negative_numbers = true)]
        nav: Option<Decimal>,

        /// NAV를 찾지 못했을 때 사용할 NAV
        #[arg(long, allow_negative_numbers = true)]
        assume_nav: Option<Decimal>,

        /// 먼저 시도할 소스
        #[arg(short, long)]
        source: Option<String>,

        /// 변동 후 비중 표시
        #[arg(long, default_value = "false")]
        show_weights: bool,

        /// 출력 형식 (table, csv, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// 대화형 시나리오 모드 (stdin에서 범프 입력)
    Interactive {
        /// 먼저 시도할 소스
        #[arg(short, long)]
        source: Option<String>,

        /// 비중 합계를 100%로 정규화
        #[arg(long, default_value = "false")]
        normalize: bool,

        /// 실시간 변동률을 기본 범프로 사용
        #[arg(long, default_value = "false")]
        live_bumps: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{:#}", e);
        eprintln!("오류: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // .env 파일은 없어도 됨
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;

    let mut log_config = LogConfig::from_settings(&config.logging);
    if let Some(format) = cli.log_format.as_deref() {
        log_config = log_config.with_format(
            format
                .parse::<LogFormat>()
                .map_err(|e| anyhow::anyhow!(e))?,
        );
    }
    init_logging(log_config).map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(config = %cli.config.display(), "MAGS CLI 시작");
    let ctx = AppContext::build(config)?;

    match cli.command {
        Commands::Holdings {
            source,
            format,
            refresh,
        } => {
            let config = HoldingsConfig {
                source: parse_source(source.as_deref())?,
                format: OutputFormat::parse(&format)?,
                refresh,
            };
            let count = show_holdings(&ctx, config).await?;
            info!(count, "보유 종목 출력 완료");
        }
        Commands::Quotes {
            source,
            format,
            refresh,
        } => {
            let config = QuotesConfig {
                source: parse_source(source.as_deref())?,
                format: OutputFormat::parse(&format)?,
                refresh,
            };
            let count = show_quotes(&ctx, config).await?;
            info!(count, "시세 출력 완료");
        }
        Commands::Whatif {
            bumps,
            bumps_file,
            live_bumps,
            normalize,
            nav,
            assume_nav,
            source,
            show_weights,
            format,
        } => {
            let config = WhatIfConfig {
                bumps,
                bumps_file,
                live_bumps,
                normalize,
                nav,
                assume_nav,
                source: parse_source(source.as_deref())?,
                show_weights,
                format: OutputFormat::parse(&format)?,
            };
            run_whatif(&ctx, config).await?;
        }
        Commands::Interactive {
            source,
            normalize,
            live_bumps,
        } => {
            let config = InteractiveConfig {
                source: parse_source(source.as_deref())?,
                normalize,
                live_bumps,
            };
            run_interactive(&ctx, config).await?;
        }
    }

    Ok(())
}
