//! Yahoo Finance 차트 API Provider.
//!
//! v8 차트 엔드포인트에서 일봉을 받아 `Date` / `Close` 두 컬럼의 테이블로
//! 변환합니다. 조정 종가가 있으면 `Close`에 조정 종가를 넣습니다.

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::PriceHistoryProvider;
use crate::error::{DataError, Result};
use crate::table::RawPriceTable;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo Finance API v8 응답 구조
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
    #[serde(rename = "adjclose")]
    adj_close: Option<Vec<YahooAdjClose>>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct YahooAdjClose {
    #[serde(rename = "adjclose")]
    adj_close: Option<Vec<Option<f64>>>,
}

/// Yahoo Finance 일봉 Provider.
pub struct YahooChartProvider {
    client: Client,
    base_url: String,
}

impl YahooChartProvider {
    /// 새 Provider 생성.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// API 기본 URL 변경 (프록시, 테스트 서버).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// 차트 요청 URL. 종목 코드는 경로 세그먼트 하나로 인코딩됩니다.
    fn chart_url(&self, ticker: &str, start: NaiveDate) -> Result<Url> {
        let start_ts = Utc
            .from_utc_datetime(&start.and_time(chrono::NaiveTime::MIN))
            .timestamp();
        let end_ts = Utc::now().timestamp();

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| DataError::InvalidData(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| DataError::InvalidData(format!("Not a base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", ticker]);
        url.query_pairs_mut()
            .append_pair("period1", &start_ts.to_string())
            .append_pair("period2", &end_ts.to_string())
            .append_pair("interval", "1d")
            .append_pair("events", "history");

        Ok(url)
    }

    /// 응답 본문을 원시 테이블로 변환.
    fn parse_chart(ticker: &str, body: &str) -> Result<RawPriceTable> {
        let response: YahooChartResponse = serde_json::from_str(body)?;

        if let Some(error) = response.chart.error {
            return Err(DataError::FetchError(format!(
                "{}: {} - {}",
                ticker, error.code, error.description
            )));
        }

        let mut table = RawPriceTable::new(["Date", "Close"]);

        let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(table);
        };

        let timestamps = result.timestamp.unwrap_or_default();
        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .and_then(|q| q.close)
            .unwrap_or_default();
        let adj_closes = result
            .indicators
            .adj_close
            .and_then(|ac| ac.into_iter().next())
            .and_then(|ac| ac.adj_close);

        for (i, ts) in timestamps.iter().enumerate() {
            let close = adj_closes
                .as_ref()
                .and_then(|ac| ac.get(i).copied().flatten())
                .or_else(|| closes.get(i).copied().flatten());

            let date = chrono::DateTime::from_timestamp(*ts, 0)
                .map(|dt| dt.format("%Y-%m-%d").to_string());

            if let Some(date) = date {
                let price = close.map(|c| json!(c)).unwrap_or(Value::Null);
                table.push_row(vec![json!(date), price])?;
            }
        }

        Ok(table)
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooChartProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_history(&self, ticker: &str, start: NaiveDate) -> Result<RawPriceTable> {
        let url = self.chart_url(ticker, start)?;
        debug!(ticker, %url, "Fetching from Yahoo Finance");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(DataError::RateLimited(ticker.to_string()));
            }
            StatusCode::NOT_FOUND => {
                return Err(DataError::NotFound(ticker.to_string()));
            }
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(DataError::FetchError(format!(
                    "Yahoo Finance API error: {} - {}",
                    s, body
                )));
            }
            _ => {}
        }

        let body = response.text().await?;
        debug!(ticker, bytes = body.len(), "Yahoo Finance response received");

        Self::parse_chart(ticker, &body)
    }
}
