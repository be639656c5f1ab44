//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 소스 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// HTTP 요청 실패
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// 성공이 아닌 HTTP 상태
    #[error("Unexpected HTTP status {status} from {url}")]
    StatusError { url: String, status: u16 },

    /// 요청 한도 초과 (HTTP 429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// HTML/JSON 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 응답은 받았지만 사용할 데이터가 없음
    #[error("No data: {0}")]
    NoData(String),

    /// 외부 서비스 연결 오류
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// 심볼 단위 API 오류
    #[error("API error ({symbol}): {message}")]
    ApiError { symbol: String, message: String },

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 모든 소스 실패
    #[error("All holdings sources failed: {}", .0.join("; "))]
    AllSourcesFailed(Vec<String>),
}

impl DataError {
    /// 재시도(다른 시점에 다시 요청)로 해결될 수 있는 오류인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        match self {
            DataError::HttpError(e) => e.is_timeout() || e.is_connect(),
            DataError::StatusError { status, .. } => *status >= 500,
            DataError::RateLimited(_) | DataError::ConnectionError(_) => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}

impl From<DataError> for mags_core::MagsError {
    fn from(err: DataError) -> Self {
        if err.is_retryable() {
            mags_core::MagsError::Network(err.to_string())
        } else {
            mags_core::MagsError::Data(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
