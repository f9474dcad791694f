//! 종목별 가격 시계열.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 하루치 가격 관측치.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// 거래일
    pub date: NaiveDate,
    /// 종가 (조정 종가 우선)
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// 한 종목의 가격 시계열.
///
/// 외부 데이터 소스가 만들어내며, 정렬 전에는 날짜 순서나 중복이
/// 보장되지 않습니다. [`AssetSeries::normalize`]를 거친 뒤에는 날짜가
/// 엄격하게 증가합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSeries {
    /// 종목 코드/심볼
    pub ticker: String,
    /// (날짜, 가격) 관측치
    pub points: Vec<PricePoint>,
}

impl AssetSeries {
    /// 새 시계열을 생성합니다.
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            ticker: ticker.into(),
            points,
        }
    }

    /// (날짜, 가격) 쌍에서 시계열을 생성합니다.
    pub fn from_pairs<I>(ticker: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let points = pairs
            .into_iter()
            .map(|(date, price)| PricePoint::new(date, price))
            .collect();
        Self::new(ticker, points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 날짜가 엄격하게 증가하는지 확인합니다.
    pub fn is_normalized(&self) -> bool {
        self.points.windows(2).all(|w| w[0].date < w[1].date)
    }

    /// 날짜순 정렬 및 중복 제거.
    ///
    /// - 같은 날짜가 여러 번 나오면 먼저 들어온 값을 유지합니다.
    /// - 유한하지 않거나 0 이하인 가격은 관측치로 보지 않습니다.
    pub fn normalize(mut self) -> Self {
        self.points
            .retain(|p| p.price.is_finite() && p.price > 0.0);

        if !self.is_normalized() {
            // 안정 정렬이므로 같은 날짜 사이에서는 입력 순서가 유지됨
            self.points.sort_by_key(|p| p.date);
            self.points.dedup_by_key(|p| p.date);
        }

        self
    }

    /// 첫 관측일.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    /// 마지막 관측일.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}
