//! 분석 실행 로그 초기화.
//!
//! 분석 결과(표, JSON, CSV)는 stdout으로 나가므로 로그는 항상 stderr로
//! 보냅니다. `RUST_LOG`가 설정되어 있으면 설정 파일의 레벨보다 우선합니다.

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 한 줄 형식
    #[default]
    Compact,
    /// 여러 줄로 풀어 쓴 형식
    Pretty,
    /// 로그 수집기용 JSON
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(LoggingError::Format(s.to_string())),
        }
    }
}

/// 로깅 초기화 에러.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("알 수 없는 로그 형식: {0} (compact, pretty, json)")]
    Format(String),

    #[error("잘못된 로그 레벨 필터: {0}")]
    Filter(String),

    #[error("로깅 초기화 실패: {0}")]
    Init(String),
}

/// 설정의 `[logging]` 섹션으로 전역 subscriber를 설치합니다.
///
/// 적용된 형식을 반환합니다.
pub fn init_logging(config: &LoggingConfig) -> Result<LogFormat, LoggingError> {
    let format: LogFormat = config.format.parse()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| LoggingError::Filter(e.to_string()))?;

    let base = fmt::layer().with_writer(std::io::stderr);
    let layer = match format {
        LogFormat::Compact => base.compact().boxed(),
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Json => base.json().with_current_span(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    tracing::debug!(?format, level = %config.level, "Logging initialized");
    Ok(format)
}

/// 분석 컨텍스트 필드가 포함된 span을 생성하는 매크로.
#[macro_export]
macro_rules! analysis_span {
    ($name:expr, $assets:expr) => {
        tracing::info_span!($name, assets = $assets)
    };
    ($name:expr, $assets:expr, $portfolio_size:expr) => {
        tracing::info_span!($name, assets = $assets, portfolio_size = $portfolio_size)
    };
}
