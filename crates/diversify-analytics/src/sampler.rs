//! 무작위 부분 포트폴리오 몬테카를로 리스크 추정.
//!
//! 한 번의 시행(trial)은 다음과 같습니다:
//! 1. 전체 종목 중 `portfolio_size`개를 비복원 균등 추출
//! 2. 행마다 선택된 종목 중 값이 있는 셀만 평균하여 동일가중 포트폴리오 수익률 계산
//! 3. 수익률 흐름의 표본 표준편차(ddof = 1)에 `sqrt(연간 거래일 수)`를 곱해 연환산
//!
//! 추정치는 시행별 변동성의 산술 평균입니다.
//!
//! 각 시행은 주입된 난수 생성기에서 뽑은 시드로 독립적인 `StdRng`를 만들어
//! 사용합니다. 따라서 순차 실행과 rayon 병렬 실행의 결과가 같습니다.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use diversify_core::{
    AnalysisError, AnalysisResult, ReturnPanel, DEFAULT_TRADING_DAYS_PER_YEAR,
};

/// 포트폴리오 리스크 샘플러.
#[derive(Debug, Clone, Copy)]
pub struct PortfolioRiskSampler {
    trading_days_per_year: u32,
    parallel: bool,
}

impl Default for PortfolioRiskSampler {
    fn default() -> Self {
        Self {
            trading_days_per_year: DEFAULT_TRADING_DAYS_PER_YEAR,
            parallel: false,
        }
    }
}

impl PortfolioRiskSampler {
    pub fn new(trading_days_per_year: u32) -> Self {
        Self {
            trading_days_per_year,
            ..Self::default()
        }
    }

    /// 시행을 rayon 스레드 풀에서 실행.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn trading_days_per_year(&self) -> u32 {
        self.trading_days_per_year
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// 주어진 크기의 무작위 포트폴리오 평균 연환산 변동성.
    ///
    /// - 종목이 없으면 [`AnalysisError::InsufficientAssets`]
    /// - `portfolio_size`는 `[1, 종목 수]`로 제한되고, `trials`가 0이면 1로 취급
    /// - 유효한 행이 2개 미만인 시행은 변동성을 만들지 않으며, 모든 시행이
    ///   그렇다면 [`AnalysisError::InsufficientObservations`]
    pub fn estimate_risk<R>(
        &self,
        returns: &ReturnPanel,
        portfolio_size: usize,
        trials: usize,
        rng: &mut R,
    ) -> AnalysisResult<f64>
    where
        R: Rng + ?Sized,
    {
        let n_assets = returns.n_columns();
        if n_assets == 0 {
            return Err(AnalysisError::InsufficientAssets {
                available: 0,
                required: 1,
            });
        }

        let size = portfolio_size.clamp(1, n_assets);
        let trials = trials.max(1);
        let seeds: Vec<u64> = (0..trials).map(|_| rng.gen()).collect();

        let run = |seed: &u64| self.run_trial(returns, size, *seed);
        let volatilities: Vec<Option<f64>> = if self.parallel {
            seeds.par_iter().map(run).collect()
        } else {
            seeds.iter().map(run).collect()
        };

        let (sum, count) = volatilities
            .iter()
            .flatten()
            .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));

        debug!(
            portfolio_size = size,
            trials,
            usable = count,
            "Sampled portfolio volatility"
        );

        if count == 0 {
            return Err(AnalysisError::InsufficientObservations(format!(
                "크기 {} 포트폴리오: 수익률 행이 2개 이상인 시행이 없습니다",
                size
            )));
        }

        Ok(sum / count as f64)
    }

    fn run_trial(&self, returns: &ReturnPanel, size: usize, seed: u64) -> Option<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut cols = index::sample(&mut rng, returns.n_columns(), size).into_vec();
        // 합산 순서를 고정하여 같은 종목 집합이면 같은 결과
        cols.sort_unstable();

        let stream: Vec<f64> = (0..returns.n_rows())
            .filter_map(|row| returns.row_mean(row, &cols))
            .collect();

        sample_std(&stream).map(|std| std * f64::from(self.trading_days_per_year).sqrt())
    }
}

/// 표본 표준편차 (ddof = 1). 값이 2개 미만이면 `None`.
fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

    Some(variance.sqrt())
}
