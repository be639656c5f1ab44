//! MAGS 도구의 에러 타입.
//!
//! 이 모듈은 핵심 크레이트와 CLI에서 공유하는 에러 타입을 정의합니다.
//! 시나리오 엔진 자체는 에러를 반환하지 않습니다. 누락된 데이터는
//! 문서화된 기본값으로 대체됩니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum MagsError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 파싱 에러
    #[error("파싱 에러: {0}")]
    Parse(String),

    /// 데이터 에러 (외부 소스)
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type MagsResult<T> = Result<T, MagsError>;

impl MagsError {
    /// 재시도 가능한 에러인지 확인합니다.
    ///
    /// 데이터 형식/내용 오류는 다시 요청해도 같은 결과이므로 제외합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MagsError::Network(_))
    }
}

impl From<serde_json::Error> for MagsError {
    fn from(err: serde_json::Error) -> Self {
        MagsError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for MagsError {
    fn from(err: config::ConfigError) -> Self {
        MagsError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        let network_err = MagsError::Network("timeout".to_string());
        assert!(network_err.is_retryable());

        let input_err = MagsError::InvalidInput("nav must be positive".to_string());
        assert!(!input_err.is_retryable());

        let data_err = MagsError::Data("holdings table missing".to_string());
        assert!(!data_err.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = MagsError::InvalidInput("NAV".to_string());
        assert_eq!(err.to_string(), "잘못된 입력: NAV");
    }
}
