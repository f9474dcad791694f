//! 분산 효과 분석 시나리오 테스트
//!
//! 정렬 → 수익률 → 몬테카를로 추정 → 곡선 전체 흐름의 성질을 확인합니다.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use diversify_analytics::{
    compute_returns, AnalysisRequest, DiversificationAnalysis, DiversificationCurveBuilder,
    PortfolioRiskSampler, SeriesAligner,
};
use diversify_core::{AnalysisError, AssetSeries, RejectReason, SeriesOutcome};
use diversify_data::StaticProvider;

fn day(offset: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + chrono::Duration::days(offset as i64)
}

/// 시드 고정 랜덤 워크 가격.
fn random_walk(seed: u64, days: usize) -> Vec<(NaiveDate, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut price = 100.0;
    (0..days)
        .map(|i| {
            price *= 1.0 + rng.gen_range(-0.03..0.03);
            (day(i), price)
        })
        .collect()
}

fn start() -> NaiveDate {
    day(0)
}

#[test]
fn test_gap_is_forward_filled() {
    let gapped = AssetSeries::from_pairs("GAP", [(day(0), 100.0), (day(3), 103.0)]);
    let full = AssetSeries::from_pairs("FULL", (0..4).map(|i| (day(i), 50.0 + i as f64)));

    let alignment = SeriesAligner::new(1).align(vec![gapped, full]).unwrap();

    assert_eq!(
        alignment.panel.column("GAP").unwrap(),
        &[Some(100.0), Some(100.0), Some(100.0), Some(103.0)]
    );
}

#[test]
fn test_returns_have_no_all_empty_rows() {
    let series: Vec<AssetSeries> = (0..4)
        .map(|s| {
            let points: Vec<_> = random_walk(s, 80)
                .into_iter()
                .enumerate()
                // 종목마다 다른 날짜를 비움
                .filter(|(i, _)| (i + s as usize) % 5 != 0)
                .map(|(_, p)| p)
                .collect();
            AssetSeries::from_pairs(format!("S{}", s), points)
        })
        .collect();

    let alignment = SeriesAligner::new(30).align(series).unwrap();
    let returns = compute_returns(&alignment.panel);

    assert!(!returns.has_empty_row());
    assert!(returns.n_rows() > 0);
}

#[test]
fn test_align_is_idempotent() {
    let series: Vec<AssetSeries> = (0..3)
        .map(|s| {
            let skip = 10 * s as usize;
            AssetSeries::from_pairs(format!("S{}", s), random_walk(s, 50).into_iter().skip(skip))
        })
        .collect();

    let aligner = SeriesAligner::new(10);
    let first = aligner.align(series).unwrap();

    let again: Vec<AssetSeries> = first
        .panel
        .tickers
        .iter()
        .zip(&first.panel.columns)
        .map(|(ticker, column)| {
            AssetSeries::from_pairs(
                ticker.clone(),
                first
                    .panel
                    .dates
                    .iter()
                    .zip(column)
                    .filter_map(|(d, v)| v.map(|v| (*d, v))),
            )
        })
        .collect();
    let second = aligner.align(again).unwrap();

    assert_eq!(first.panel, second.panel);
}

#[test]
fn test_full_size_estimate_independent_of_trials() {
    let series: Vec<AssetSeries> = (0..5)
        .map(|s| AssetSeries::from_pairs(format!("S{}", s), random_walk(s + 10, 60)))
        .collect();
    let returns = compute_returns(&SeriesAligner::new(30).align(series).unwrap().panel);
    let sampler = PortfolioRiskSampler::default();

    let one = sampler
        .estimate_risk(&returns, 5, 1, &mut StdRng::seed_from_u64(1))
        .unwrap();
    let many = sampler
        .estimate_risk(&returns, 5, 200, &mut StdRng::seed_from_u64(2))
        .unwrap();

    assert!((one - many).abs() <= one * 1e-12);
}

#[test]
fn test_curve_is_non_increasing_within_tolerance() {
    let series: Vec<AssetSeries> = (0..8)
        .map(|s| AssetSeries::from_pairs(format!("S{}", s), random_walk(s + 100, 250)))
        .collect();
    let returns = compute_returns(&SeriesAligner::new(30).align(series).unwrap().panel);

    let estimate = DiversificationCurveBuilder::default()
        .build_curve(&returns, 8, 1000, &mut StdRng::seed_from_u64(2024))
        .unwrap();

    for pair in estimate.points().windows(2) {
        assert!(
            pair[1].annual_risk <= pair[0].annual_risk * 1.05,
            "risk rose from size {} to {}: {} -> {}",
            pair[0].portfolio_size,
            pair[1].portfolio_size,
            pair[0].annual_risk,
            pair[1].annual_risk
        );
    }
}

#[tokio::test]
async fn test_five_assets_with_gap_end_to_end() {
    let mut provider = StaticProvider::new();
    let mut tickers = Vec::new();
    for s in 0..5u64 {
        let mut prices = random_walk(s + 7, 60);
        if s == 2 {
            prices.drain(20..30);
        }
        let ticker = format!("A{}", s);
        provider = provider.with_prices(ticker.clone(), &prices);
        tickers.push(ticker);
    }

    let request = AnalysisRequest::new(tickers, start())
        .with_trials(200)
        .with_seed(42);
    let report = DiversificationAnalysis::new(Arc::new(provider))
        .run(&request)
        .await
        .unwrap();

    assert_eq!(report.estimate.len(), 5);
    assert!(report.single_asset_risk > report.asymptotic_risk);
    assert!(report
        .estimate
        .points()
        .iter()
        .all(|p| p.annual_risk.is_finite() && p.annual_risk >= 0.0));
    assert!(report.outcomes.iter().all(SeriesOutcome::is_accepted));
    assert!(report.risk_reduction_pct.unwrap() > 0.0);
}

#[tokio::test]
async fn test_two_empty_of_three_is_insufficient() {
    let provider = StaticProvider::new()
        .with_prices("GOOD", &random_walk(1, 60))
        .with_empty("EMPTY1")
        .with_empty("EMPTY2");

    let request = AnalysisRequest::new(
        vec!["GOOD".into(), "EMPTY1".into(), "EMPTY2".into()],
        start(),
    );
    let err = DiversificationAnalysis::new(Arc::new(provider))
        .run(&request)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AnalysisError::InsufficientAssets {
            available: 1,
            required: 2
        }
    ));
}

#[tokio::test]
async fn test_all_retrieval_errors_is_empty_panel() {
    let provider = StaticProvider::new()
        .with_error("X", "rate limited")
        .with_error("Y", "unknown symbol");

    let request = AnalysisRequest::new(vec!["X".into(), "Y".into(), "Z".into()], start());
    let err = DiversificationAnalysis::new(Arc::new(provider))
        .with_error_backoff(Duration::ZERO)
        .run(&request)
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::EmptyPanel));
}

#[tokio::test]
async fn test_rejections_listed_in_successful_report() {
    let provider = StaticProvider::new()
        .with_prices("A", &random_walk(1, 60))
        .with_prices("B", &random_walk(2, 60))
        .with_prices("SHORT", &random_walk(3, 20));

    let request =
        AnalysisRequest::new(vec!["A".into(), "SHORT".into(), "B".into()], start()).with_seed(3);
    let report = DiversificationAnalysis::new(Arc::new(provider))
        .run(&request)
        .await
        .unwrap();

    assert_eq!(report.tickers_used, vec!["A", "B"]);
    assert_eq!(
        report.outcomes[1],
        SeriesOutcome::Rejected {
            ticker: "SHORT".into(),
            reason: RejectReason::TooFewObservations {
                observations: 20,
                minimum: 30
            }
        }
    );
}

#[tokio::test]
async fn test_parallel_and_serial_reports_match() {
    let mut provider = StaticProvider::new();
    let tickers: Vec<String> = (0..6).map(|s| format!("P{}", s)).collect();
    for (s, ticker) in tickers.iter().enumerate() {
        provider = provider.with_prices(ticker.clone(), &random_walk(s as u64 + 50, 90));
    }
    let analysis = DiversificationAnalysis::new(Arc::new(provider));

    let request = AnalysisRequest::new(tickers, start())
        .with_trials(150)
        .with_seed(8);
    let serial = analysis.run(&request).await.unwrap();
    let parallel = analysis
        .run(&request.clone().with_parallel(true))
        .await
        .unwrap();

    assert_eq!(serial.estimate, parallel.estimate);
}
