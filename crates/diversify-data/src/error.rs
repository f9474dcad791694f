//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터 가져오기 오류 (외부 소스)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 요청 한도 초과
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// 타임아웃 오류
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// 종목을 찾을 수 없음
    #[error("Not found: {0}")]
    NotFound(String),

    /// 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 잘못된 데이터 형식
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 파일 입출력 오류
    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DataError::Timeout(err.to_string())
        } else {
            DataError::FetchError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => DataError::NotFound(err.to_string()),
            _ => DataError::IoError(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
