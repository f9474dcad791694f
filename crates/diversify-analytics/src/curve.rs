//! 포트폴리오 크기별 리스크 곡선 생성.

use rand::Rng;
use tracing::{debug, info};

use diversify_core::{analysis_span, AnalysisResult, ReturnPanel, RiskEstimate};

use crate::sampler::PortfolioRiskSampler;

/// 분산 효과 곡선 생성기.
///
/// 크기 1부터 `min(max_size, 종목 수)`까지 크기마다 샘플러를 한 번씩 호출합니다.
/// 평활화나 재시도는 하지 않습니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiversificationCurveBuilder {
    sampler: PortfolioRiskSampler,
}

impl DiversificationCurveBuilder {
    pub fn new(sampler: PortfolioRiskSampler) -> Self {
        Self { sampler }
    }

    pub fn sampler(&self) -> &PortfolioRiskSampler {
        &self.sampler
    }

    /// 리스크 곡선 계산.
    pub fn build_curve<R>(
        &self,
        returns: &ReturnPanel,
        max_size: usize,
        trials: usize,
        rng: &mut R,
    ) -> AnalysisResult<RiskEstimate>
    where
        R: Rng + ?Sized,
    {
        self.build_curve_with_progress(returns, max_size, trials, rng, |_, _| {})
    }

    /// 진행 상황 콜백과 함께 곡선 계산.
    ///
    /// 콜백 인자: (방금 계산한 크기, 마지막 크기)
    pub fn build_curve_with_progress<R, F>(
        &self,
        returns: &ReturnPanel,
        max_size: usize,
        trials: usize,
        rng: &mut R,
        mut on_progress: F,
    ) -> AnalysisResult<RiskEstimate>
    where
        R: Rng + ?Sized,
        F: FnMut(usize, usize),
    {
        let last_size = max_size.min(returns.n_columns());
        let span = analysis_span!("build_curve", returns.n_columns(), last_size);
        let _guard = span.enter();

        let mut estimate = RiskEstimate::new();
        for size in 1..=last_size {
            let risk = self.sampler.estimate_risk(returns, size, trials, rng)?;
            debug!(size, risk, "Portfolio size evaluated");
            estimate.push(size, risk)?;
            on_progress(size, last_size);
        }

        if let Some(risk) = estimate.asymptotic_risk() {
            info!(
                sizes = estimate.len(),
                asymptotic_risk = risk,
                "리스크 곡선 계산 완료"
            );
        }

        Ok(estimate)
    }
}
