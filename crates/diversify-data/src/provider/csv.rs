//! CSV 디렉토리 Provider.
//!
//! `<dir>/<TICKER>.csv` 파일을 읽습니다. 첫 줄은 헤더이며 `download`
//! 명령이 저장하는 `date,open,high,low,close,volume` 형식이나
//! `Date,Close` 형식 모두 스키마 인식 단계에서 처리됩니다.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::PriceHistoryProvider;
use crate::error::{DataError, Result};
use crate::table::RawPriceTable;

/// CSV 파일 기반 Provider.
pub struct CsvDirectoryProvider {
    dir: PathBuf,
}

impl CsvDirectoryProvider {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// 종목의 CSV 파일 경로.
    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", ticker))
    }

    fn parse_cell(raw: &str) -> Value {
        if raw.is_empty() {
            Value::Null
        } else if let Ok(number) = raw.parse::<f64>() {
            json!(number)
        } else {
            json!(raw)
        }
    }

    /// CSV 본문을 원시 테이블로 변환.
    ///
    /// 따옴표로 감싼 필드(`"1,020.5"`)는 하나의 셀로 읽고, 숫자 해석은
    /// 스키마 인식 단계에 맡깁니다. 열 수가 헤더와 다른 행은 에러입니다.
    pub fn parse_csv(content: &str) -> Result<RawPriceTable> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(content.trim_start_matches('\u{feff}').as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| DataError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .clone();
        if headers.is_empty() {
            return Ok(RawPriceTable::default());
        }

        let mut table = RawPriceTable::new(headers.iter());
        for record in reader.records() {
            let record = record.map_err(|e| DataError::ParseError(e.to_string()))?;
            table.push_row(record.iter().map(Self::parse_cell).collect())?;
        }

        Ok(table)
    }
}

#[async_trait]
impl PriceHistoryProvider for CsvDirectoryProvider {
    fn name(&self) -> &str {
        "csv"
    }

    /// 파일 전체를 반환합니다. 시작일 이전 행은 수집기가 제거합니다.
    async fn fetch_history(&self, ticker: &str, _start: NaiveDate) -> Result<RawPriceTable> {
        let path = self.path_for(ticker);
        debug!(ticker, path = %path.display(), "Reading CSV price history");

        let content = tokio::fs::read_to_string(&path).await?;
        Self::parse_csv(&content)
    }
}
