//! 분석 파이프라인의 에러 타입.
//!
//! 종목 단위 에러(`SeriesUnusable`, `Retrieval`)는 항상 해당 종목에서 복구되며,
//! 실행 전체를 중단시키는 것은 `EmptyPanel`과 `InsufficientAssets`뿐입니다.

use thiserror::Error;

use crate::domain::RejectReason;

/// 핵심 분석 에러.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// 종목 데이터 사용 불가 (빈 결과, 스키마 불일치, 관측치 부족)
    #[error("사용할 수 없는 시계열 ({ticker}): {reason}")]
    SeriesUnusable { ticker: String, reason: RejectReason },

    /// 모든 입력 시계열이 거부됨
    #[error("사용 가능한 데이터가 없습니다: 모든 종목이 거부되었습니다")]
    EmptyPanel,

    /// 포트폴리오를 구성할 종목 수 부족
    #[error("종목 수 부족: {available}개 사용 가능, 최소 {required}개 필요")]
    InsufficientAssets { available: usize, required: usize },

    /// 변동성을 계산할 관측치 부족
    #[error("관측치 부족: {0}")]
    InsufficientObservations(String),

    /// 외부 데이터 수집 에러
    #[error("데이터 수집 에러 ({ticker}): {message}")]
    Retrieval { ticker: String, message: String },

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),
}

/// 분석 작업을 위한 Result 타입.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

impl AnalysisError {
    /// 종목 단위로 복구 가능한 에러인지 확인합니다.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AnalysisError::SeriesUnusable { .. } | AnalysisError::Retrieval { .. }
        )
    }

    /// 실행 전체를 중단시키는 에러인지 확인합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AnalysisError::EmptyPanel | AnalysisError::InsufficientAssets { .. }
        )
    }
}

impl From<config::ConfigError> for AnalysisError {
    fn from(err: config::ConfigError) -> Self {
        AnalysisError::Config(err.to_string())
    }
}
