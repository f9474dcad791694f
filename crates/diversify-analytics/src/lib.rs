//! 분산 투자 효과 분석 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 종목별 가격 시계열의 날짜 정렬 및 전방 채움 (`SeriesAligner`)
//! - 일간 수익률 계산 (`compute_returns`)
//! - 무작위 부분 포트폴리오 몬테카를로 리스크 추정 (`PortfolioRiskSampler`)
//! - 포트폴리오 크기별 리스크 곡선 (`DiversificationCurveBuilder`)
//! - 수집부터 곡선까지의 전체 파이프라인 (`DiversificationAnalysis`)
//!
//! # 예시
//!
//! ```rust,ignore
//! use diversify_analytics::{compute_returns, DiversificationCurveBuilder, SeriesAligner};
//! use rand::SeedableRng;
//!
//! let alignment = SeriesAligner::new(30).align(series)?;
//! let returns = compute_returns(&alignment.panel);
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let estimate = DiversificationCurveBuilder::default().build_curve(&returns, 15, 100, &mut rng)?;
//! println!("체계적 위험: {:?}", estimate.asymptotic_risk());
//! ```

pub mod alignment;
pub mod curve;
pub mod pipeline;
pub mod returns;
pub mod sampler;

pub use alignment::SeriesAligner;
pub use curve::DiversificationCurveBuilder;
pub use pipeline::{AnalysisReport, AnalysisRequest, DiversificationAnalysis};
pub use returns::compute_returns;
pub use sampler::PortfolioRiskSampler;
