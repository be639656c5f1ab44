//! 대화형 시나리오 모드.
//!
//! 표준 입력에서 범프 줄을 읽을 때마다 시나리오를 다시 계산하여 출력합니다.
//! 입력된 범프는 누적되며, 다음 명령을 지원합니다:
//!
//! ```text
//! :refresh    캐시를 비우고 보유 종목/시세를 다시 조회
//! :reset      누적된 범프 삭제
//! :normalize  비중 정규화 전환
//! :quit       종료
//! ```

use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use mags_core::{parse_bumps_text, BumpSet, BumpWarning, HoldingsSnapshot};
use mags_data::SourceKind;

use super::context::AppContext;
use super::output::OutputFormat;
use super::whatif::{compose_bumps, render_report, ScenarioReport};

/// 대화형 모드 설정.
#[derive(Debug)]
pub struct InteractiveConfig {
    pub source: Option<SourceKind>,
    pub normalize: bool,
    pub live_bumps: bool,
}

/// 입력 한 줄의 해석 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// 아무것도 하지 않음 (빈 줄)
    Noop,
    Quit,
    Refresh,
    Reset,
    ToggleNormalize,
    /// 범프 입력 (파싱 경고 포함)
    Bumps {
        bumps: BumpSet,
        warnings: Vec<BumpWarning>,
    },
    /// 알 수 없는 `:` 명령
    Unknown(String),
}

/// 입력 줄을 해석합니다.
pub fn parse_line(line: &str) -> Action {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Action::Noop;
    }

    if let Some(command) = trimmed.strip_prefix(':') {
        return match command.trim().to_lowercase().as_str() {
            "quit" | "q" | "exit" => Action::Quit,
            "refresh" => Action::Refresh,
            "reset" => Action::Reset,
            "normalize" => Action::ToggleNormalize,
            other => Action::Unknown(other.to_string()),
        };
    }

    let outcome = parse_bumps_text(trimmed);
    Action::Bumps {
        bumps: outcome.bumps,
        warnings: outcome.warnings,
    }
}

/// 대화형 세션 상태.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// 누적된 수동 범프
    pub manual: BumpSet,
    /// 실시간 범프 (사용 시)
    pub live: Option<BumpSet>,
    pub normalize: bool,
}

impl Session {
    /// 데이터 조회가 필요 없는 동작을 적용합니다. `Quit`/`Refresh`는 호출자가 처리합니다.
    pub fn apply(&mut self, action: &Action) {
        match action {
            Action::Reset => self.manual.clear(),
            Action::ToggleNormalize => self.normalize = !self.normalize,
            Action::Bumps { bumps, .. } => self.manual.overlay(bumps),
            Action::Noop | Action::Quit | Action::Refresh | Action::Unknown(_) => {}
        }
    }

    /// 적용할 전체 범프.
    pub fn effective_bumps(&self) -> BumpSet {
        compose_bumps(self.live.as_ref(), &self.manual)
    }
}

/// 대화형 모드 실행.
pub async fn run_interactive(ctx: &AppContext, config: InteractiveConfig) -> Result<()> {
    let mut session = Session {
        normalize: config.normalize || ctx.config.scenario.normalize_weights,
        ..Default::default()
    };

    let mut snapshot = load(ctx, &config, &mut session).await?;

    println!("범프를 입력하세요 (예: NVDA:+2, ALL=-1). 명령: :refresh :reset :normalize :quit");
    print_projection(ctx, &snapshot, &session)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };

        let action = parse_line(&line);
        match &action {
            Action::Quit => break,
            Action::Noop => continue,
            Action::Unknown(command) => {
                eprintln!("알 수 없는 명령: :{}", command);
                continue;
            }
            Action::Refresh => {
                ctx.service.clear_cache().await;
                match load(ctx, &config, &mut session).await {
                    Ok(fresh) => snapshot = fresh,
                    // 이전 스냅샷으로 계속
                    Err(e) => eprintln!("새로 고침 실패: {:#}", e),
                }
            }
            Action::Bumps { warnings, .. } => {
                for warning in warnings {
                    eprintln!("경고: {}", warning);
                }
            }
            Action::Reset | Action::ToggleNormalize => {}
        }

        session.apply(&action);
        print_projection(ctx, &snapshot, &session)?;
    }

    info!("대화형 모드 종료");
    Ok(())
}

/// 스냅샷과 (설정 시) 실시간 범프를 조회합니다.
async fn load(
    ctx: &AppContext,
    config: &InteractiveConfig,
    session: &mut Session,
) -> Result<HoldingsSnapshot> {
    if config.live_bumps {
        session.live = Some(ctx.service.quotes().await.live_bumps());
    }
    ctx.fetch_snapshot(config.source, false).await
}

fn print_projection(ctx: &AppContext, snapshot: &HoldingsSnapshot, session: &Session) -> Result<()> {
    let bumps = session.effective_bumps();
    let projection = ctx.engine.project(
        snapshot,
        &bumps,
        ctx.config.scenario.assumed_nav,
        session.normalize,
    );
    let report = ScenarioReport::new(projection, bumps, false, Vec::new());
    println!("{}\n", render_report(&report, OutputFormat::Table)?);
    Ok(())
}
