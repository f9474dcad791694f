//! 종목별 처리 결과.
//!
//! 수집 단계의 실패를 예외 흐름 대신 종목 단위의 타입 있는 결과로 표현합니다.
//! 한 종목의 실패는 다른 종목 처리에 영향을 주지 않습니다.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AnalysisError;
use crate::types::AssetSeries;

/// 시계열 거부 사유.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    /// 데이터 소스가 빈 결과를 반환
    EmptySource,
    /// 인식 가능한 날짜 컬럼 없음
    MissingDateColumn,
    /// 인식 가능한 가격 컬럼 없음
    MissingPriceColumn,
    /// 관측치 수가 최소 기준 이하
    TooFewObservations { observations: usize, minimum: usize },
    /// 데이터 수집 에러 (요청 한도, 알 수 없는 종목, 네트워크 등)
    Retrieval { message: String },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySource => write!(f, "빈 데이터 반환"),
            Self::MissingDateColumn => write!(f, "날짜 컬럼 없음"),
            Self::MissingPriceColumn => write!(f, "가격 컬럼 없음"),
            Self::TooFewObservations {
                observations,
                minimum,
            } => write!(f, "데이터 부족 ({}일, {}일 초과 필요)", observations, minimum),
            Self::Retrieval { message } => write!(f, "수집 에러 ({})", message),
        }
    }
}

/// 거부된 종목과 사유.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRejection {
    pub ticker: String,
    pub reason: RejectReason,
}

impl SeriesRejection {
    pub fn new(ticker: impl Into<String>, reason: RejectReason) -> Self {
        Self {
            ticker: ticker.into(),
            reason,
        }
    }

    /// 수집 에러로 인한 거부.
    pub fn retrieval(ticker: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ticker,
            RejectReason::Retrieval {
                message: message.into(),
            },
        )
    }
}

impl From<SeriesRejection> for AnalysisError {
    fn from(rejection: SeriesRejection) -> Self {
        match rejection.reason {
            RejectReason::Retrieval { message } => AnalysisError::Retrieval {
                ticker: rejection.ticker,
                message,
            },
            reason => AnalysisError::SeriesUnusable {
                ticker: rejection.ticker,
                reason,
            },
        }
    }
}

/// 종목 하나의 수집 결과.
pub type FetchedSeries = Result<AssetSeries, SeriesRejection>;

/// 정렬 단계에서 기록되는 종목별 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SeriesOutcome {
    /// 패널에 병합됨
    Accepted { ticker: String, observations: usize },
    /// 제외됨
    Rejected { ticker: String, reason: RejectReason },
}

impl SeriesOutcome {
    pub fn ticker(&self) -> &str {
        match self {
            Self::Accepted { ticker, .. } | Self::Rejected { ticker, .. } => ticker,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

impl From<SeriesRejection> for SeriesOutcome {
    fn from(rejection: SeriesRejection) -> Self {
        Self::Rejected {
            ticker: rejection.ticker,
            reason: rejection.reason,
        }
    }
}

impl fmt::Display for SeriesOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted {
                ticker,
                observations,
            } => write!(f, "{}: 수집 완료 ({}일)", ticker, observations),
            Self::Rejected { ticker, reason } => write!(f, "{}: 제외 - {}", ticker, reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_display() {
        let accepted = SeriesOutcome::Accepted {
            ticker: "AAA".to_string(),
            observations: 60,
        };
        assert_eq!(accepted.to_string(), "AAA: 수집 완료 (60일)");

        let rejected: SeriesOutcome = SeriesRejection::new(
            "BBB",
            RejectReason::TooFewObservations {
                observations: 12,
                minimum: 30,
            },
        )
        .into();
        assert!(!rejected.is_accepted());
        assert_eq!(rejected.ticker(), "BBB");
        assert!(rejected.to_string().contains("12일"));
    }

    #[test]
    fn test_rejection_into_error() {
        let err: AnalysisError = SeriesRejection::retrieval("CCC", "timeout").into();
        assert!(matches!(err, AnalysisError::Retrieval { .. }));

        let err: AnalysisError = SeriesRejection::new("DDD", RejectReason::EmptySource).into();
        assert!(matches!(err, AnalysisError::SeriesUnusable { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome: SeriesOutcome = SeriesRejection::new("EEE", RejectReason::MissingPriceColumn).into();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["reason"]["kind"], "missing_price_column");
    }
}
