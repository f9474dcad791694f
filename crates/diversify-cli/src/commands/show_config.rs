//! 유효 설정 출력.

use anyhow::{Context, Result};

use diversify_core::AppConfig;

/// 파일과 환경 변수가 반영된 최종 설정을 JSON으로 변환.
pub fn format_config(config: &AppConfig) -> Result<String> {
    serde_json::to_string_pretty(config).context("Failed to serialize configuration")
}

/// 유효 설정을 출력하고 권장 범위를 점검합니다.
pub fn show_config(config: &AppConfig) -> Result<()> {
    println!("{}", format_config(config)?);

    if config.analysis.tickers.is_empty() {
        println!("\n⚠️  종목 목록이 비어 있습니다 (--tickers 또는 DIVERSIFY__ANALYSIS__TICKERS)");
    } else if let Err(e) = config.analysis.validate() {
        println!("\n⚠️  {}", e);
    }

    Ok(())
}
