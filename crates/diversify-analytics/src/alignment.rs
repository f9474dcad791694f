//! 가격 시계열 날짜 정렬.
//!
//! 종목별 시계열을 하나의 날짜 축 위에 올립니다. 날짜 축은 채택된 모든
//! 시계열 날짜의 합집합이며, 병합이 끝난 뒤에만 열별 전방 채움을 적용합니다.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use tracing::{info, warn};

use diversify_core::{
    AlignedPanel, Alignment, AnalysisError, AnalysisResult, AssetSeries, FetchedSeries,
    RejectReason, SeriesOutcome, SeriesRejection, DEFAULT_MIN_OBSERVATIONS,
};

/// 시계열 정렬기.
#[derive(Debug, Clone, Copy)]
pub struct SeriesAligner {
    /// 이 값 이하의 관측치를 가진 시계열은 제외
    min_observations: usize,
}

impl Default for SeriesAligner {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_OBSERVATIONS)
    }
}

impl SeriesAligner {
    pub fn new(min_observations: usize) -> Self {
        Self { min_observations }
    }

    pub fn min_observations(&self) -> usize {
        self.min_observations
    }

    /// 시계열 목록 정렬.
    pub fn align(&self, series: Vec<AssetSeries>) -> AnalysisResult<Alignment> {
        self.align_fetched(series.into_iter().map(Ok).collect())
    }

    /// 수집 결과 목록 정렬.
    ///
    /// 수집 단계에서 이미 거부된 종목은 입력 순서 그대로 결과 목록에 남습니다.
    /// 모든 종목이 거부되면 [`AnalysisError::EmptyPanel`]을 반환합니다.
    pub fn align_fetched(&self, fetched: Vec<FetchedSeries>) -> AnalysisResult<Alignment> {
        let mut outcomes = Vec::with_capacity(fetched.len());
        let mut accepted: Vec<AssetSeries> = Vec::new();

        for item in fetched {
            match item.and_then(|series| self.screen(series)) {
                Ok(series) => {
                    info!(
                        ticker = %series.ticker,
                        observations = series.len(),
                        "✅ 수집 완료 ({}일)",
                        series.len()
                    );
                    outcomes.push(SeriesOutcome::Accepted {
                        ticker: series.ticker.clone(),
                        observations: series.len(),
                    });
                    accepted.push(series);
                }
                Err(rejection) => {
                    warn!(
                        ticker = %rejection.ticker,
                        reason = %rejection.reason,
                        "종목 제외"
                    );
                    outcomes.push(SeriesOutcome::from(rejection));
                }
            }
        }

        if accepted.is_empty() {
            return Err(AnalysisError::EmptyPanel);
        }

        let mut panel = merge_outer(&accepted)?;
        panel.forward_fill();

        Ok(Alignment { panel, outcomes })
    }

    /// 정규화 후 관측치 수 기준 적용.
    fn screen(&self, series: AssetSeries) -> Result<AssetSeries, SeriesRejection> {
        let series = series.normalize();

        if series.is_empty() {
            return Err(SeriesRejection::new(
                series.ticker,
                RejectReason::EmptySource,
            ));
        }
        if series.len() <= self.min_observations {
            let observations = series.len();
            return Err(SeriesRejection::new(
                series.ticker,
                RejectReason::TooFewObservations {
                    observations,
                    minimum: self.min_observations,
                },
            ));
        }

        Ok(series)
    }
}

/// 날짜 합집합 위의 외부 조인.
///
/// 같은 종목 코드가 두 번 들어오면 열 이름 충돌을 막기 위해 뒤쪽 열에
/// 순번 접미사를 붙입니다.
fn merge_outer(series: &[AssetSeries]) -> AnalysisResult<AlignedPanel> {
    let dates: Vec<NaiveDate> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let row_of: HashMap<NaiveDate, usize> =
        dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

    let mut tickers: Vec<String> = Vec::with_capacity(series.len());
    let mut columns = Vec::with_capacity(series.len());

    for s in series {
        let mut column = vec![None; dates.len()];
        for point in &s.points {
            if let Some(&row) = row_of.get(&point.date) {
                column[row] = Some(point.price);
            }
        }

        let mut name = s.ticker.clone();
        let mut suffix = 2;
        while tickers.contains(&name) {
            name = format!("{}#{}", s.ticker, suffix);
            suffix += 1;
        }

        tickers.push(name);
        columns.push(column);
    }

    AlignedPanel::from_columns(dates, tickers, columns)
}
