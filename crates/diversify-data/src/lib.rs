//! 시장 데이터 수집 및 정규화.
//!
//! 이 crate는 다음을 제공합니다:
//! - 종목별 원시 가격 테이블 (`RawPriceTable`)
//! - 날짜/가격 컬럼 인식 및 이란력(Jalali) 날짜 변환
//! - 가격 이력 Provider (Yahoo Finance, CSV 디렉토리, 메모리 고정 데이터)
//! - 종목별 타입 있는 수집 결과 (`FetchedSeries`)
//! - 정렬 패널 메모이제이션 캐시

pub mod cache;
pub mod calendar;
pub mod collector;
pub mod error;
pub mod provider;
pub mod schema;
pub mod table;

pub use cache::{CacheStats, PanelCache, PanelKey};
pub use calendar::{jalali_to_gregorian, parse_jalali, parse_start_date};
pub use collector::SeriesCollector;
pub use error::{DataError, Result};
pub use provider::{
    build_provider, CsvDirectoryProvider, PriceHistoryProvider, StaticProvider,
    YahooChartProvider,
};
pub use schema::{recognize_series, PRICE_COLUMN_ALIASES};
pub use table::RawPriceTable;
