//! 종목별 가격 이력 수집.
//!
//! 요청한 종목을 순서대로 Provider에서 가져와 스키마를 인식하고,
//! 각 종목의 결과를 [`FetchedSeries`]로 모읍니다. 한 종목의 실패가
//! 수집 전체를 중단시키지 않습니다.

use chrono::NaiveDate;
use std::time::Duration;
use tracing::{debug, info, warn};

use diversify_core::{AssetSeries, FetchedSeries, RejectReason, SeriesRejection};

use crate::provider::PriceHistoryProvider;
use crate::schema::recognize_series;
use crate::table::RawPriceTable;

/// 수집 에러 후 다음 요청까지의 기본 대기 시간.
const DEFAULT_ERROR_BACKOFF: Duration = Duration::from_millis(500);

/// 순차 수집기.
pub struct SeriesCollector<'a> {
    provider: &'a dyn PriceHistoryProvider,
    error_backoff: Duration,
}

impl<'a> SeriesCollector<'a> {
    pub fn new(provider: &'a dyn PriceHistoryProvider) -> Self {
        Self {
            provider,
            error_backoff: DEFAULT_ERROR_BACKOFF,
        }
    }

    /// 수집 에러 후 대기 시간 설정 (요청 한도 회피용).
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    /// 모든 종목 수집.
    pub async fn collect(&self, tickers: &[String], start: NaiveDate) -> Vec<FetchedSeries> {
        self.collect_with_progress(tickers, start, |_, _, _| {}).await
    }

    /// 진행 상황 콜백과 함께 수집.
    ///
    /// 콜백 인자: (완료 수, 전체 수, 방금 처리한 종목)
    pub async fn collect_with_progress<F>(
        &self,
        tickers: &[String],
        start: NaiveDate,
        mut on_progress: F,
    ) -> Vec<FetchedSeries>
    where
        F: FnMut(usize, usize, &str),
    {
        let tickers: Vec<&str> = tickers
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        let total = tickers.len();
        let mut results = Vec::with_capacity(total);

        info!(
            provider = self.provider.name(),
            tickers = total,
            %start,
            "가격 이력 수집 시작"
        );

        for (i, ticker) in tickers.into_iter().enumerate() {
            debug!(ticker, "Processing");

            let result = match self.provider.fetch_history(ticker, start).await {
                Ok(table) => {
                    log_sample(ticker, &table);
                    recognize_series(ticker, &table).and_then(|series| since(series, start))
                }
                Err(e) => {
                    warn!(ticker, error = %e, "가격 이력 수집 실패");
                    if !self.error_backoff.is_zero() {
                        tokio::time::sleep(self.error_backoff).await;
                    }
                    Err(SeriesRejection::retrieval(ticker, e.to_string()))
                }
            };

            results.push(result);
            on_progress(i + 1, total, ticker);
        }

        results
    }
}

/// 시작일 이전 관측치 제거.
///
/// CSV와 고정 데이터 Provider는 파일 전체를 반환하므로 결과에는 항상
/// 시작일 이후만 남도록 여기서 자릅니다.
fn since(mut series: AssetSeries, start: NaiveDate) -> FetchedSeries {
    let before = series.len();
    series.points.retain(|p| p.date >= start);

    if series.len() < before {
        debug!(
            ticker = %series.ticker,
            dropped = before - series.len(),
            %start,
            "Dropped observations before start date"
        );
    }
    if series.is_empty() {
        return Err(SeriesRejection::new(series.ticker, RejectReason::EmptySource));
    }

    Ok(series)
}

fn log_sample(ticker: &str, table: &RawPriceTable) {
    if tracing::enabled!(tracing::Level::TRACE) {
        match serde_json::to_string(&table.head(3)) {
            Ok(sample) => tracing::trace!(ticker, %sample, "Raw data sample"),
            Err(e) => tracing::trace!(ticker, error = %e, "Raw data sample unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticProvider;

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn test_collect_keeps_per_ticker_results() {
        let provider = StaticProvider::new()
            .with_prices("AAA", &[(ymd(2), 100.0), (ymd(3), 101.0)])
            .with_empty("BBB")
            .with_error("CCC", "rate limited");

        let tickers = vec![
            "AAA".to_string(),
            " BBB ".to_string(),
            "".to_string(),
            "CCC".to_string(),
            "DDD".to_string(),
        ];

        let mut progress = Vec::new();
        let results = SeriesCollector::new(&provider)
            .with_error_backoff(Duration::ZERO)
            .collect_with_progress(&tickers, ymd(1), |done, total, ticker| {
                progress.push((done, total, ticker.to_string()));
            })
            .await;

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().len(), 2);
        assert_eq!(
            results[1].as_ref().unwrap_err().reason,
            RejectReason::EmptySource
        );
        assert!(matches!(
            results[2].as_ref().unwrap_err().reason,
            RejectReason::Retrieval { .. }
        ));
        assert_eq!(results[3].as_ref().unwrap_err().ticker, "DDD");

        assert_eq!(progress.len(), 4);
        assert_eq!(progress[3], (4, 4, "DDD".to_string()));
    }

    #[tokio::test]
    async fn test_observations_before_start_dropped() {
        let provider = StaticProvider::new()
            .with_prices(
                "AAA",
                &[(ymd(2), 100.0), (ymd(3), 101.0), (ymd(20), 102.0), (ymd(21), 103.0)],
            )
            .with_prices("OLD", &[(ymd(2), 50.0), (ymd(3), 51.0)]);

        let tickers = vec!["AAA".to_string(), "OLD".to_string()];
        let results = SeriesCollector::new(&provider).collect(&tickers, ymd(10)).await;

        let aaa = results[0].as_ref().unwrap();
        assert_eq!(aaa.len(), 2);
        assert_eq!(aaa.first_date(), Some(ymd(20)));

        // 시작일 당일은 포함
        let results = SeriesCollector::new(&provider).collect(&tickers, ymd(3)).await;
        assert_eq!(results[0].as_ref().unwrap().first_date(), Some(ymd(3)));

        let old = SeriesCollector::new(&provider).collect(&tickers, ymd(10)).await;
        assert_eq!(old[1].as_ref().unwrap_err().reason, RejectReason::EmptySource);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_backoff_waits() {
        let provider = StaticProvider::new().with_error("AAA", "network down");
        let started = tokio::time::Instant::now();

        let results = SeriesCollector::new(&provider)
            .collect(&["AAA".to_string()], ymd(1))
            .await;

        assert!(results[0].is_err());
        assert!(started.elapsed() >= DEFAULT_ERROR_BACKOFF);
    }
}
