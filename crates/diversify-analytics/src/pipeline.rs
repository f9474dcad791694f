//! 수집부터 리스크 곡선까지의 전체 분석 파이프라인.
//!
//! 1. Provider에서 종목별 가격 이력 수집 (순차)
//! 2. 날짜 정렬 및 전방 채움 (캐시가 있으면 재사용)
//! 3. 일간 수익률 계산
//! 4. 포트폴리오 크기별 몬테카를로 리스크 추정
//!
//! 일부 종목이 제외되어도 남은 종목이 2개 이상이면 분석은 성공하며,
//! 제외된 종목은 보고서의 결과 목록에 남습니다.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use diversify_core::{
    analysis_span, AnalysisConfig, AnalysisError, AnalysisResult, RiskEstimate, SeriesOutcome,
    DEFAULT_MAX_PORTFOLIO_SIZE, DEFAULT_MIN_OBSERVATIONS, DEFAULT_TRADING_DAYS_PER_YEAR,
    DEFAULT_TRIALS, MIN_PORTFOLIO_ASSETS,
};
use diversify_data::{parse_start_date, PanelCache, PanelKey, PriceHistoryProvider, SeriesCollector};

use crate::alignment::SeriesAligner;
use crate::curve::DiversificationCurveBuilder;
use crate::returns::compute_returns;
use crate::sampler::PortfolioRiskSampler;

/// 분석 요청.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// 분석 대상 종목
    pub tickers: Vec<String>,
    /// 수집 시작일 (그레고리력)
    pub start: NaiveDate,
    /// 크기별 시행 횟수
    pub trials: usize,
    /// 최대 포트폴리오 크기
    pub max_portfolio_size: usize,
    /// 종목 채택 최소 관측치 (이 값 초과 필요)
    pub min_observations: usize,
    /// 연환산 거래일 수
    pub trading_days_per_year: u32,
    /// 난수 시드 (없으면 엔트로피에서 생성)
    pub seed: Option<u64>,
    /// 시행 병렬 실행 여부
    pub parallel: bool,
}

impl AnalysisRequest {
    pub fn new(tickers: Vec<String>, start: NaiveDate) -> Self {
        Self {
            tickers,
            start,
            trials: DEFAULT_TRIALS,
            max_portfolio_size: DEFAULT_MAX_PORTFOLIO_SIZE,
            min_observations: DEFAULT_MIN_OBSERVATIONS,
            trading_days_per_year: DEFAULT_TRADING_DAYS_PER_YEAR,
            seed: None,
            parallel: false,
        }
    }

    /// 설정에서 요청 생성. 시작일은 이란력/그레고리력 모두 허용합니다.
    pub fn from_config(config: &AnalysisConfig) -> AnalysisResult<Self> {
        config.validate()?;
        let start = parse_start_date(&config.start_date)
            .map_err(|e| AnalysisError::InvalidInput(e.to_string()))?;

        Ok(Self {
            tickers: config.tickers.clone(),
            start,
            trials: config.trials,
            max_portfolio_size: config.max_portfolio_size,
            min_observations: config.min_observations,
            trading_days_per_year: config.trading_days_per_year,
            seed: config.seed,
            parallel: config.parallel,
        })
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_max_portfolio_size(mut self, size: usize) -> Self {
        self.max_portfolio_size = size;
        self
    }

    pub fn with_min_observations(mut self, min_observations: usize) -> Self {
        self.min_observations = min_observations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn check(&self) -> AnalysisResult<()> {
        if self.tickers.iter().all(|t| t.trim().is_empty()) {
            return Err(AnalysisError::InvalidInput(
                "종목 목록이 비어 있습니다".to_string(),
            ));
        }
        if self.max_portfolio_size == 0 {
            return Err(AnalysisError::InvalidInput(
                "max_portfolio_size는 1 이상이어야 합니다".to_string(),
            ));
        }
        if self.trading_days_per_year == 0 {
            return Err(AnalysisError::InvalidInput(
                "trading_days_per_year는 1 이상이어야 합니다".to_string(),
            ));
        }
        Ok(())
    }
}

/// 분석 결과 보고서.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// 크기별 리스크 곡선
    pub estimate: RiskEstimate,
    /// 체계적 위험 근사치 (최대 크기에서의 리스크)
    pub asymptotic_risk: f64,
    /// 단일 종목 평균 리스크
    pub single_asset_risk: f64,
    /// 단일 종목 대비 리스크 감소율 (%)
    pub risk_reduction_pct: Option<f64>,
    /// 요청 순서대로의 종목별 처리 결과
    pub outcomes: Vec<SeriesOutcome>,
    /// 분석에 사용된 종목
    pub tickers_used: Vec<String>,
    /// 수익률 관측일 수
    pub return_observations: usize,
}

impl AnalysisReport {
    pub fn rejected(&self) -> impl Iterator<Item = &SeriesOutcome> {
        self.outcomes.iter().filter(|o| !o.is_accepted())
    }
}

/// 분산 효과 분석기.
pub struct DiversificationAnalysis {
    provider: Arc<dyn PriceHistoryProvider>,
    cache: Option<Arc<PanelCache>>,
    error_backoff: Option<Duration>,
}

impl DiversificationAnalysis {
    pub fn new(provider: Arc<dyn PriceHistoryProvider>) -> Self {
        Self {
            provider,
            cache: None,
            error_backoff: None,
        }
    }

    /// 정렬 결과 캐시 사용.
    pub fn with_cache(mut self, cache: Arc<PanelCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// 수집 에러 후 대기 시간 변경.
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = Some(backoff);
        self
    }

    /// 분석 실행.
    pub async fn run(&self, request: &AnalysisRequest) -> AnalysisResult<AnalysisReport> {
        self.run_with_progress(request, |_, _, _| {}, |_, _| {}).await
    }

    /// 진행 상황 콜백과 함께 분석 실행.
    ///
    /// - `on_fetch`: (완료 종목 수, 전체 종목 수, 종목)
    /// - `on_size`: (계산한 크기, 마지막 크기)
    pub async fn run_with_progress<F, G>(
        &self,
        request: &AnalysisRequest,
        on_fetch: F,
        on_size: G,
    ) -> AnalysisResult<AnalysisReport>
    where
        F: FnMut(usize, usize, &str),
        G: FnMut(usize, usize),
    {
        request.check()?;

        let key = PanelKey::new(&request.tickers, request.start, request.min_observations);
        let cached = match &self.cache {
            Some(cache) => cache.get(&key).await,
            None => None,
        };

        let alignment = match cached {
            Some(alignment) => {
                info!("캐시된 정렬 결과 사용");
                alignment
            }
            None => {
                let mut collector = SeriesCollector::new(self.provider.as_ref());
                if let Some(backoff) = self.error_backoff {
                    collector = collector.with_error_backoff(backoff);
                }
                let fetched = collector
                    .collect_with_progress(&request.tickers, request.start, on_fetch)
                    .await;

                let alignment =
                    SeriesAligner::new(request.min_observations).align_fetched(fetched)?;

                match &self.cache {
                    Some(cache) => cache.insert(key, alignment).await,
                    None => Arc::new(alignment),
                }
            }
        };

        let returns = compute_returns(&alignment.panel);
        if returns.n_columns() < MIN_PORTFOLIO_ASSETS {
            warn!(
                available = returns.n_columns(),
                "분석 가능한 종목이 부족합니다"
            );
            return Err(AnalysisError::InsufficientAssets {
                available: returns.n_columns(),
                required: MIN_PORTFOLIO_ASSETS,
            });
        }

        let span = analysis_span!("diversification", returns.n_columns());
        let _guard = span.enter();

        info!(
            assets = returns.n_columns(),
            observations = returns.n_rows(),
            trials = request.trials,
            "리스크 곡선 계산 시작"
        );

        let mut rng = match request.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let sampler = PortfolioRiskSampler::new(request.trading_days_per_year)
            .with_parallel(request.parallel);
        let estimate = DiversificationCurveBuilder::new(sampler).build_curve_with_progress(
            &returns,
            request.max_portfolio_size,
            request.trials,
            &mut rng,
            on_size,
        )?;

        let (single_asset_risk, asymptotic_risk) = estimate
            .single_asset_risk()
            .zip(estimate.asymptotic_risk())
            .ok_or_else(|| {
                AnalysisError::InsufficientObservations("리스크 곡선이 비어 있습니다".to_string())
            })?;

        Ok(AnalysisReport {
            asymptotic_risk,
            single_asset_risk,
            risk_reduction_pct: estimate.risk_reduction_pct(),
            estimate,
            outcomes: alignment.outcomes.clone(),
            tickers_used: returns.tickers.clone(),
            return_observations: returns.n_rows(),
        })
    }
}
