//! 분산 효과 분석 명령.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use diversify_analytics::{AnalysisRequest, DiversificationAnalysis};
use diversify_core::{AppConfig, DataConfig, DataSource};
use diversify_data::{build_provider, PanelCache};

use super::render::{render, write_output, OutputFormat};

/// `analyze` 명령 인자. 지정한 값만 설정 파일 값을 덮어씁니다.
#[derive(Debug, Clone, Default, Args)]
pub struct AnalyzeArgs {
    /// 종목 목록 (쉼표로 구분, 예: SPY,QQQ,IWM)
    #[arg(short, long, value_delimiter = ',')]
    pub tickers: Vec<String>,

    /// 시작 날짜 (YYYY-MM-DD, 연도가 1700 미만이면 이란력)
    #[arg(short, long)]
    pub start: Option<String>,

    /// 포트폴리오 크기별 시행 횟수 (권장: 50~500)
    #[arg(short = 'n', long)]
    pub trials: Option<usize>,

    /// 최대 포트폴리오 크기 (권장: 2~20)
    #[arg(short, long)]
    pub max_size: Option<usize>,

    /// 종목 채택 최소 관측일 수 (이 값 초과 필요)
    #[arg(long)]
    pub min_observations: Option<usize>,

    /// 난수 시드 (재현 가능한 결과)
    #[arg(long)]
    pub seed: Option<u64>,

    /// 시행 병렬 실행
    #[arg(long)]
    pub parallel: bool,

    /// 데이터 소스 (yahoo, csv)
    #[arg(long)]
    pub source: Option<String>,

    /// CSV 소스 디렉토리
    #[arg(long)]
    pub csv_dir: Option<String>,

    /// 출력 형식 (table, json, csv)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// 출력 파일 경로 (지정하지 않으면 stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// 진행률 표시줄 숨김
    #[arg(long)]
    pub no_progress: bool,
}

impl AnalyzeArgs {
    /// 명령줄 값을 설정에 반영.
    pub fn apply(&self, config: &mut AppConfig) -> Result<()> {
        let tickers: Vec<String> = self
            .tickers
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if !tickers.is_empty() {
            config.analysis.tickers = tickers;
        }
        if let Some(start) = &self.start {
            config.analysis.start_date = start.clone();
        }
        if let Some(trials) = self.trials {
            config.analysis.trials = trials;
        }
        if let Some(max_size) = self.max_size {
            config.analysis.max_portfolio_size = max_size;
        }
        if let Some(min_observations) = self.min_observations {
            config.analysis.min_observations = min_observations;
        }
        if self.seed.is_some() {
            config.analysis.seed = self.seed;
        }
        if self.parallel {
            config.analysis.parallel = true;
        }
        if let Some(source) = &self.source {
            config.data.source = source
                .parse::<DataSource>()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        if let Some(dir) = &self.csv_dir {
            config.data.csv_dir = dir.clone();
        }
        Ok(())
    }
}

/// 분석 실행 후 결과 출력.
pub async fn run_analyze(mut config: AppConfig, args: AnalyzeArgs) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    args.apply(&mut config)?;

    let request =
        AnalysisRequest::from_config(&config.analysis).context("Invalid analysis settings")?;
    let provider = build_provider(&config.data).context("Failed to create data provider")?;

    info!(
        source = ?config.data.source,
        tickers = request.tickers.len(),
        start = %request.start,
        trials = request.trials,
        max_size = request.max_portfolio_size,
        "분석 시작"
    );

    let fetch_pb = progress_bar(request.tickers.len() as u64, args.no_progress)?;
    let size_pb = progress_bar(0, args.no_progress)?;

    let cache = panel_cache(&config.data);
    let analysis =
        DiversificationAnalysis::new(Arc::from(provider)).with_cache(Arc::clone(&cache));
    let result = analysis
        .run_with_progress(
            &request,
            |done, total, ticker| {
                fetch_pb.set_length(total as u64);
                fetch_pb.set_position(done as u64);
                fetch_pb.set_message(format!("수집 {}", ticker));
                if done == total {
                    fetch_pb.finish_and_clear();
                }
            },
            |size, last| {
                size_pb.set_length(last as u64);
                size_pb.set_position(size as u64);
                size_pb.set_message(format!("포트폴리오 크기 {}", size));
                if size == last {
                    size_pb.finish_and_clear();
                }
            },
        )
        .await;

    fetch_pb.finish_and_clear();
    size_pb.finish_and_clear();

    let stats = cache.stats().await;
    debug!(
        hits = stats.hits,
        misses = stats.misses,
        entries = stats.entries,
        "Panel cache stats"
    );

    let report = result.context("Analysis failed")?;

    for outcome in report.rejected() {
        warn!("{}", outcome);
    }

    let content = render(&report, format)?;
    write_output(&content, args.output.as_deref())?;

    info!(
        asymptotic_risk = report.asymptotic_risk,
        assets = report.tickers_used.len(),
        "✅ 분석 완료"
    );

    Ok(())
}

/// `[data] cache_ttl_secs` 수명의 패널 캐시.
fn panel_cache(data: &DataConfig) -> Arc<PanelCache> {
    Arc::new(PanelCache::new(Duration::from_secs(data.cache_ttl_secs)))
}

fn progress_bar(len: u64, hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress template")?
            .progress_chars("=>-"),
    );
    Ok(pb)
}
