//! 분석 도메인 모델.
//!
//! - `alignment`: 정렬 패널과 종목별 결과
//! - `outcome`: 종목별 수집/채택/거부 결과
//! - `estimate`: 포트폴리오 크기별 리스크 추정 곡선

pub mod alignment;
pub mod estimate;
pub mod outcome;

pub use alignment::Alignment;
pub use estimate::{RiskEstimate, RiskPoint};
pub use outcome::{FetchedSeries, RejectReason, SeriesOutcome, SeriesRejection};
