//! 가격 이력 Provider 모듈.
//!
//! 분석 코어가 외부 데이터 소스에 요구하는 인터페이스를 정의합니다.
//! Provider는 종목 하나에 대해 원시 테이블을 반환하거나 에러를 반환하며,
//! 타임아웃/재시도 정책은 각 Provider가 책임집니다.
//!
//! - `YahooChartProvider`: Yahoo Finance v8 차트 API
//! - `CsvDirectoryProvider`: `<dir>/<TICKER>.csv` 파일
//! - `StaticProvider`: 메모리에 올린 고정 데이터 (테스트/데모)

pub mod csv;
pub mod fixture;
pub mod yahoo;

use async_trait::async_trait;
use chrono::NaiveDate;

use diversify_core::{DataConfig, DataSource};

use crate::error::Result;
use crate::table::RawPriceTable;

pub use self::csv::CsvDirectoryProvider;
pub use fixture::StaticProvider;
pub use yahoo::YahooChartProvider;

/// 종목별 가격 이력 제공자 trait.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// 로그에 표시할 Provider 이름.
    fn name(&self) -> &str;

    /// 시작일 이후의 가격 이력 조회.
    ///
    /// # 인자
    /// * `ticker` - 종목 코드/심볼
    /// * `start` - 시작일 (그레고리력)
    async fn fetch_history(&self, ticker: &str, start: NaiveDate) -> Result<RawPriceTable>;
}

/// 설정에 맞는 Provider 생성.
pub fn build_provider(config: &DataConfig) -> Result<Box<dyn PriceHistoryProvider>> {
    match config.source {
        DataSource::Yahoo => Ok(Box::new(
            YahooChartProvider::new()?.with_base_url(&config.yahoo_base_url),
        )),
        DataSource::Csv => Ok(Box::new(CsvDirectoryProvider::new(&config.csv_dir))),
    }
}
