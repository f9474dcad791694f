//! 메모리 고정 데이터 Provider.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use std::collections::HashMap;

use super::PriceHistoryProvider;
use crate::error::{DataError, Result};
use crate::table::RawPriceTable;

#[derive(Debug, Clone)]
enum Entry {
    Table(RawPriceTable),
    Error(String),
}

/// 종목별로 미리 정해 둔 테이블이나 에러를 반환하는 Provider.
///
/// 등록되지 않은 종목은 `NotFound` 에러를 반환합니다.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    entries: HashMap<String, Entry>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 원시 테이블 등록.
    pub fn with_table(mut self, ticker: impl Into<String>, table: RawPriceTable) -> Self {
        self.entries.insert(ticker.into(), Entry::Table(table));
        self
    }

    /// (날짜, 종가) 목록으로 `Date` / `Close` 테이블 등록.
    pub fn with_prices(mut self, ticker: impl Into<String>, prices: &[(NaiveDate, f64)]) -> Self {
        let mut table = RawPriceTable::new(["Date", "Close"]);
        table.rows = prices
            .iter()
            .map(|(date, price)| vec![json!(date.format("%Y-%m-%d").to_string()), json!(price)])
            .collect();
        self.entries.insert(ticker.into(), Entry::Table(table));
        self
    }

    /// 빈 결과 등록.
    pub fn with_empty(self, ticker: impl Into<String>) -> Self {
        self.with_table(ticker, RawPriceTable::new(["Date", "Close"]))
    }

    /// 수집 에러 등록.
    pub fn with_error(mut self, ticker: impl Into<String>, message: impl Into<String>) -> Self {
        self.entries
            .insert(ticker.into(), Entry::Error(message.into()));
        self
    }
}

#[async_trait]
impl PriceHistoryProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_history(&self, ticker: &str, _start: NaiveDate) -> Result<RawPriceTable> {
        match self.entries.get(ticker) {
            Some(Entry::Table(table)) => Ok(table.clone()),
            Some(Entry::Error(message)) => Err(DataError::FetchError(message.clone())),
            None => Err(DataError::NotFound(ticker.to_string())),
        }
    }
}
