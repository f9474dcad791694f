//! 설정 관리.
//!
//! 분석 파라미터(종목 목록, 시작일, 시뮬레이션 횟수 등)와 데이터 소스,
//! 로깅 설정을 정의합니다. 설정은 TOML 파일과 `DIVERSIFY__` 접두사의
//! 환경 변수에서 로드되며, CLI 인자가 마지막으로 덮어씁니다.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::error::{AnalysisError, AnalysisResult};

/// 연간 거래일 수 (연환산 변동성 계산용).
pub const DEFAULT_TRADING_DAYS_PER_YEAR: u32 = 242;
/// 시계열을 채택하기 위한 최소 관측치 수 (이 값 이하이면 거부).
pub const DEFAULT_MIN_OBSERVATIONS: usize = 30;
/// 기본 몬테카를로 시뮬레이션 횟수.
pub const DEFAULT_TRIALS: usize = 100;
/// 기본 최대 포트폴리오 크기.
pub const DEFAULT_MAX_PORTFOLIO_SIZE: usize = 15;
/// 정렬 패널 캐시 유효 기간 (12시간).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 12 * 60 * 60;
/// 포트폴리오 분석에 필요한 최소 종목 수.
pub const MIN_PORTFOLIO_ASSETS: usize = 2;

/// 권장 시뮬레이션 횟수 범위.
pub const RECOMMENDED_TRIALS: (usize, usize) = (50, 500);
/// 권장 최대 포트폴리오 크기 범위.
pub const RECOMMENDED_MAX_PORTFOLIO_SIZE: (usize, usize) = (2, 20);

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 분석 파라미터
    pub analysis: AnalysisConfig,
    /// 데이터 소스 설정
    pub data: DataConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// 분석 파라미터.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 분석할 종목 목록
    pub tickers: Vec<String>,
    /// 데이터 시작일 (그레고리력 `YYYY-MM-DD` 또는 이란력 `1400-01-01`)
    pub start_date: String,
    /// 포트폴리오 크기별 몬테카를로 시뮬레이션 횟수
    pub trials: usize,
    /// 평가할 최대 포트폴리오 크기
    pub max_portfolio_size: usize,
    /// 시계열 채택을 위한 최소 관측치 수
    pub min_observations: usize,
    /// 연환산에 사용할 연간 거래일 수
    pub trading_days_per_year: u32,
    /// 난수 시드 (없으면 실행마다 다른 결과)
    pub seed: Option<u64>,
    /// rayon 스레드 풀에서 시뮬레이션 병렬 실행
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tickers: Vec::new(),
            start_date: "1400-01-01".to_string(),
            trials: DEFAULT_TRIALS,
            max_portfolio_size: DEFAULT_MAX_PORTFOLIO_SIZE,
            min_observations: DEFAULT_MIN_OBSERVATIONS,
            trading_days_per_year: DEFAULT_TRADING_DAYS_PER_YEAR,
            seed: None,
            parallel: false,
        }
    }
}

impl AnalysisConfig {
    /// 설정 값을 검증합니다.
    ///
    /// 권장 범위를 벗어난 값은 경고만 남기고, 분석이 불가능한 값은 에러를 반환합니다.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.tickers.is_empty() {
            return Err(AnalysisError::Config("종목 목록이 비어 있습니다".to_string()));
        }
        if self.trials == 0 {
            return Err(AnalysisError::Config(
                "trials는 1 이상이어야 합니다".to_string(),
            ));
        }
        if self.max_portfolio_size == 0 {
            return Err(AnalysisError::Config(
                "max_portfolio_size는 1 이상이어야 합니다".to_string(),
            ));
        }
        if self.trading_days_per_year == 0 {
            return Err(AnalysisError::Config(
                "trading_days_per_year는 1 이상이어야 합니다".to_string(),
            ));
        }

        let (min_trials, max_trials) = RECOMMENDED_TRIALS;
        if !(min_trials..=max_trials).contains(&self.trials) {
            warn!(
                trials = self.trials,
                "Trial count outside the recommended range {}-{}",
                min_trials,
                max_trials
            );
        }
        let (min_size, max_size) = RECOMMENDED_MAX_PORTFOLIO_SIZE;
        if !(min_size..=max_size).contains(&self.max_portfolio_size) {
            warn!(
                max_portfolio_size = self.max_portfolio_size,
                "Max portfolio size outside the recommended range {}-{}",
                min_size,
                max_size
            );
        }

        Ok(())
    }
}

/// 가격 데이터 소스 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Yahoo Finance 차트 API
    #[default]
    Yahoo,
    /// 로컬 CSV 디렉토리 (`<dir>/<TICKER>.csv`)
    Csv,
}

impl std::str::FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yahoo" => Ok(Self::Yahoo),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("Unknown data source: {}. Supported: yahoo, csv", s)),
        }
    }
}

/// 데이터 소스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// 가격 데이터 소스
    pub source: DataSource,
    /// CSV 소스 디렉토리
    pub csv_dir: String,
    /// Yahoo Finance API 기본 URL
    pub yahoo_base_url: String,
    /// 정렬 패널 캐시 TTL (초)
    pub cache_ttl_secs: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: DataSource::Yahoo,
            csv_dir: "data".to_string(),
            yahoo_base_url: "https://query1.finance.yahoo.com".to_string(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl AppConfig {
    /// 파일(선택)과 환경 변수에서 설정을 로드합니다.
    ///
    /// 환경 변수 예: `DIVERSIFY__ANALYSIS__TRIALS=200`,
    /// `DIVERSIFY__ANALYSIS__TICKERS=AAA,BBB`.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("DIVERSIFY")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("analysis.tickers")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// 기본 경로(`config/default.toml`)가 있으면 로드하고, 없으면 환경 변수만 사용합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        let path = Path::new("config/default.toml");
        if path.exists() {
            Self::load(Some(path))
        } else {
            Self::load(None)
        }
    }
}
