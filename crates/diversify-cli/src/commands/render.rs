//! 분석 결과 출력.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use tracing::info;

use diversify_analytics::AnalysisReport;

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(anyhow::anyhow!(
                "Invalid format: {}. Use: table, csv, json",
                s
            )),
        }
    }
}

/// 보고서를 지정한 형식의 문자열로 변환.
pub fn render(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format_table(report)),
        OutputFormat::Csv => Ok(format_csv(report)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("Failed to serialize report")
        }
    }
}

/// 파일 또는 stdout에 출력.
pub fn write_output(content: &str, output_path: Option<&str>) -> Result<()> {
    if let Some(path) = output_path {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path))?;
        file.write_all(content.as_bytes())
            .context("Failed to write to file")?;
        info!("Output written to: {}", path);
    } else {
        println!("{}", content);
    }

    Ok(())
}

/// 테이블 형식.
fn format_table(report: &AnalysisReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("{:>6}  {:>12}  {:>9}\n", "SIZE", "ANNUAL_RISK", "PERCENT"));
    output.push_str(&"-".repeat(31));
    output.push('\n');

    for point in report.estimate.points() {
        output.push_str(&format!(
            "{:>6}  {:>12.6}  {:>8.2}%\n",
            point.portfolio_size,
            point.annual_risk,
            point.annual_risk * 100.0
        ));
    }

    output.push('\n');
    output.push_str(&format!(
        "체계적 위험 (근사): {:.6} ({:.2}%)\n",
        report.asymptotic_risk,
        report.asymptotic_risk * 100.0
    ));
    output.push_str(&format!(
        "단일 종목 평균 위험: {:.6} ({:.2}%)\n",
        report.single_asset_risk,
        report.single_asset_risk * 100.0
    ));
    if let Some(pct) = report.risk_reduction_pct {
        output.push_str(&format!("분산 투자로 인한 위험 감소: {:.2}%\n", pct));
    }
    output.push_str(&format!(
        "사용 종목 ({}개, 수익률 {}일): {}\n",
        report.tickers_used.len(),
        report.return_observations,
        report.tickers_used.join(", ")
    ));

    let rejected: Vec<String> = report.rejected().map(|o| format!("  {}", o)).collect();
    if !rejected.is_empty() {
        output.push_str(&format!("\n제외 종목 ({}개):\n", rejected.len()));
        output.push_str(&rejected.join("\n"));
        output.push('\n');
    }

    output
}

/// CSV 형식. 크기별 곡선 뒤에 `asymptotic` 요약 행을 붙입니다.
fn format_csv(report: &AnalysisReport) -> String {
    let mut output = String::from("portfolio_size,annual_risk\n");
    for point in report.estimate.points() {
        output.push_str(&format!("{},{}\n", point.portfolio_size, point.annual_risk));
    }
    output.push_str(&format!("asymptotic,{}\n", report.asymptotic_risk));
    output
}
