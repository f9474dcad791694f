//! 분산 투자 리스크 분석 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 미국 ETF 5종, 시행 200회
//! diversify analyze -t SPY,QQQ,IWM,EFA,TLT -s 2020-01-01 -n 200 --seed 42
//!
//! # 로컬 CSV 디렉토리 (data/<TICKER>.csv), 이란력 시작일
//! diversify analyze --source csv --csv-dir data -t FOLD,KHODRO,SHASTA -s 1400-01-01
//!
//! # JSON 결과 저장
//! diversify analyze -t SPY,QQQ -f json -o report.json
//!
//! # 유효 설정 확인
//! diversify config
//!
//! # 이란력 날짜 변환
//! diversify jalali 1400-01-01
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

use diversify_cli::commands::analyze::{run_analyze, AnalyzeArgs};
use diversify_cli::commands::show_config::show_config;
use diversify_core::{init_logging, AppConfig};
use diversify_data::parse_jalali;

#[derive(Parser)]
#[command(name = "diversify")]
#[command(about = "Portfolio diversification risk analysis - 무작위 포트폴리오 몬테카를로 분석", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로 (기본: config/default.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 포트폴리오 크기별 리스크 곡선 계산
    Analyze(AnalyzeArgs),

    /// 유효 설정 출력 (파일 + 환경 변수)
    Config,

    /// 이란력(Jalali) 날짜를 그레고리력으로 변환
    Jalali {
        /// 이란력 날짜 (YYYY-MM-DD 또는 YYYY/MM/DD)
        date: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(Some(path.as_path())),
        None => AppConfig::load_default(),
    }
    .context("Failed to load configuration")?;

    init_logging(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Analyze(args) => {
            if let Err(e) = run_analyze(config, args).await {
                error!("Analysis failed: {:#}", e);
                return Err(e);
            }
        }

        Commands::Config => show_config(&config)?,

        Commands::Jalali { date } => {
            let gregorian = parse_jalali(&date)
                .with_context(|| format!("Invalid Jalali date: {}", date))?;
            println!("{} → {}", date, gregorian);
        }
    }

    Ok(())
}
