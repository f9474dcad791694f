//! # Diversify Core
//!
//! 분산 투자 리스크 분석의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 분석 파이프라인 전반에서 사용되는 기본 타입을 제공합니다:
//! - 종목별 가격 시계열 (`AssetSeries`)
//! - 날짜 정렬 가격 패널 및 수익률 패널
//! - 포트폴리오 크기별 리스크 추정 결과
//! - 종목별 수집/거부 결과
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
