//! 로깅 초기화.
//!
//! CLI는 표/CSV/JSON 결과를 stdout에 쓰므로 로그는 항상 stderr로 보냅니다.
//! 형식은 `pretty`, `json`, `compact` 중 하나이며 기본값은 `compact`입니다.
//! 레벨은 `[logging].level` 설정을 따르되 `RUST_LOG`가 있으면 그쪽이 우선합니다.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 여러 줄, 색상 포함 (디버깅용)
    Pretty,
    /// 한 줄 JSON (수집기로 넘길 때)
    Json,
    /// 한 줄 텍스트
    #[default]
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 필터 지시어 (예: "warn", "mags_data=debug")
    pub level: String,
    pub format: LogFormat,
    /// span 진입/종료 이벤트 출력 (소스별 조회 구간 확인용)
    pub with_span_events: bool,
    /// 파일명/줄 번호 출력
    pub with_file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            with_span_events: false,
            with_file: false,
        }
    }
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.with_span_events = enabled;
        self
    }

    /// `[logging]` 설정 섹션에서 생성합니다. 알 수 없는 형식은 기본 형식으로 대체합니다.
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        Self {
            level: settings.level.clone(),
            format: settings.format.parse().unwrap_or_default(),
            ..Default::default()
        }
    }

    /// `RUST_LOG`(레벨)와 `LOG_FORMAT`(형식) 환경 변수에서 생성합니다.
    pub fn from_env() -> Self {
        Self {
            level: std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()),
            format: std::env::var("LOG_FORMAT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// 전역 subscriber를 설치합니다. 프로세스당 한 번만 성공합니다.
///
/// ```no_run
/// use mags_core::logging::{init_logging, LogConfig, LogFormat};
///
/// init_logging(LogConfig::new("mags_data=debug").with_format(LogFormat::Json)).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let span_events = if config.with_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.with_file)
        .with_line_number(config.with_file)
        .with_span_events(span_events);

    let fmt_layer = match config.format {
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Json => base.json().boxed(),
        LogFormat::Compact => base.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()?;

    tracing::debug!(format = ?config.format, level = %config.level, "로깅 초기화 완료");
    Ok(())
}

/// 환경 변수만으로 로깅을 초기화합니다.
pub fn init_logging_from_env() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogConfig::from_env())
}

/// 펀드 심볼과 (선택적으로) 데이터 소스 필드를 가진 `info` span.
///
/// span 이름은 문자열 리터럴이어야 합니다.
#[macro_export]
macro_rules! fund_span {
    ($name:expr, $fund:expr) => {
        tracing::info_span!($name, fund = %$fund)
    };
    ($name:expr, $fund:expr, $source:expr) => {
        tracing::info_span!($name, fund = %$fund, source = %$source)
    };
}
