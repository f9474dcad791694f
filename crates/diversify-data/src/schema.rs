//! 원시 테이블 스키마 인식.
//!
//! 데이터 소스마다 컬럼 이름이 다르므로 알려진 별칭 목록에서 날짜 컬럼과
//! 종가 컬럼을 찾아 [`AssetSeries`]로 변환합니다.
//!
//! - 날짜: `Date`(그레고리력)가 있으면 우선 사용, 없으면 `J-DATE`(이란력)
//! - 종가: `Close` → `Adj Close` → `PDrCotVal` → `Final` 순서로 첫 번째 일치

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use tracing::debug;

use diversify_core::{AssetSeries, FetchedSeries, PricePoint, RejectReason, SeriesRejection};

use crate::calendar::parse_jalali;
use crate::table::RawPriceTable;

/// 그레고리력 날짜 컬럼 이름.
pub const GREGORIAN_DATE_COLUMN: &str = "Date";
/// 이란력 날짜 컬럼 이름.
pub const JALALI_DATE_COLUMN: &str = "J-DATE";
/// 종가 컬럼 별칭 (우선순위 순).
pub const PRICE_COLUMN_ALIASES: [&str; 4] = ["Close", "Adj Close", "PDrCotVal", "Final"];

/// 인식된 날짜 축.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateAxis {
    Gregorian(usize),
    Jalali(usize),
}

fn find_column(table: &RawPriceTable, name: &str) -> Option<usize> {
    table
        .column_index(name)
        .or_else(|| table.column_index_loose(name))
}

fn find_date_axis(table: &RawPriceTable) -> Option<DateAxis> {
    find_column(table, GREGORIAN_DATE_COLUMN)
        .map(DateAxis::Gregorian)
        .or_else(|| find_column(table, JALALI_DATE_COLUMN).map(DateAxis::Jalali))
}

fn find_price_column(table: &RawPriceTable) -> Option<usize> {
    // 정확한 이름을 먼저 모두 확인한 뒤 느슨한 비교
    PRICE_COLUMN_ALIASES
        .iter()
        .find_map(|alias| table.column_index(alias))
        .or_else(|| {
            PRICE_COLUMN_ALIASES
                .iter()
                .find_map(|alias| table.column_index_loose(alias))
        })
}

/// 그레고리력 날짜 셀 파싱.
///
/// 문자열(`2024-01-02`, `2024/01/02`, `20240102`, RFC 3339) 또는
/// UNIX 타임스탬프(초)를 받습니다.
fn parse_gregorian_cell(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"]
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .or_else(|| {
                    DateTime::parse_from_rfc3339(s)
                        .ok()
                        .map(|dt| dt.date_naive())
                })
                .or_else(|| {
                    // "2024-01-02 00:00:00" 같은 날짜+시간 문자열
                    s.get(..10)
                        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
                })
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.date_naive()),
        _ => None,
    }
}

fn parse_jalali_cell(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_jalali(s),
        // 14000101 형태의 정수
        Value::Number(n) => n.as_u64().and_then(|v| {
            let year = (v / 10_000) as i32;
            let month = ((v / 100) % 100) as u32;
            let day = (v % 100) as u32;
            crate::calendar::jalali_to_gregorian(year, month, day)
        }),
        _ => None,
    }
}

fn parse_price_cell(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
}

/// 원시 테이블을 정규화된 시계열로 변환합니다.
///
/// 날짜나 가격을 해석할 수 없는 행은 건너뜁니다. 결과 시계열은 날짜순으로
/// 정렬되고 중복 날짜는 먼저 나온 값만 남습니다. 관측치 수 기준은 여기서
/// 적용하지 않으며 정렬 단계가 판단합니다.
pub fn recognize_series(ticker: &str, table: &RawPriceTable) -> FetchedSeries {
    if table.is_empty() {
        return Err(SeriesRejection::new(ticker, RejectReason::EmptySource));
    }

    let axis = find_date_axis(table).ok_or_else(|| {
        debug!(ticker, columns = ?table.columns, "Date column not found");
        SeriesRejection::new(ticker, RejectReason::MissingDateColumn)
    })?;

    let price_col = find_price_column(table).ok_or_else(|| {
        debug!(ticker, columns = ?table.columns, "Price column not found");
        SeriesRejection::new(ticker, RejectReason::MissingPriceColumn)
    })?;

    let mut skipped = 0usize;
    let points: Vec<PricePoint> = table
        .rows
        .iter()
        .filter_map(|row| {
            let date = match axis {
                DateAxis::Gregorian(col) => parse_gregorian_cell(&row[col]),
                DateAxis::Jalali(col) => parse_jalali_cell(&row[col]),
            };
            let point = date
                .zip(parse_price_cell(&row[price_col]))
                .map(|(date, price)| PricePoint::new(date, price));
            if point.is_none() {
                skipped += 1;
            }
            point
        })
        .collect();

    if skipped > 0 {
        debug!(ticker, skipped, "Skipped unparseable rows");
    }

    let series = AssetSeries::new(ticker, points).normalize();
    if series.is_empty() {
        return Err(SeriesRejection::new(ticker, RejectReason::EmptySource));
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_gregorian_close() {
        let mut table = RawPriceTable::new(["Date", "Open", "Close"]);
        table
            .push_row(vec![json!("2024-01-03"), json!(1.0), json!(103.0)])
            .unwrap();
        table
            .push_row(vec![json!("2024-01-02"), json!(1.0), json!("1,020.5")])
            .unwrap();

        let series = recognize_series("AAA", &table).unwrap();
        assert_eq!(series.ticker, "AAA");
        assert_eq!(series.points[0], PricePoint::new(ymd(2024, 1, 2), 1020.5));
        assert_eq!(series.points[1], PricePoint::new(ymd(2024, 1, 3), 103.0));
    }

    #[test]
    fn test_gregorian_preferred_over_jalali() {
        let mut table = RawPriceTable::new(["J-DATE", "Date", "Final"]);
        table
            .push_row(vec![json!("1300-01-01"), json!("2024-01-02"), json!(10.0)])
            .unwrap();

        let series = recognize_series("AAA", &table).unwrap();
        assert_eq!(series.first_date(), Some(ymd(2024, 1, 2)));
    }

    #[test]
    fn test_jalali_date_column() {
        let mut table = RawPriceTable::new(["J-DATE", "PDrCotVal"]);
        table
            .push_row(vec![json!("1400/01/01"), json!(5000)])
            .unwrap();
        table.push_row(vec![json!(14000102), json!(5100)]).unwrap();

        let series = recognize_series("فولاد", &table).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first_date(), Some(ymd(2021, 3, 21)));
        assert_eq!(series.last_date(), Some(ymd(2021, 3, 22)));
    }

    #[test]
    fn test_price_alias_priority() {
        let mut table = RawPriceTable::new(["Date", "Final", "Adj Close", "Close"]);
        table
            .push_row(vec![json!("2024-01-02"), json!(1.0), json!(2.0), json!(3.0)])
            .unwrap();

        let series = recognize_series("AAA", &table).unwrap();
        assert_eq!(series.points[0].price, 3.0);
    }

    #[test]
    fn test_loose_column_names() {
        let mut table = RawPriceTable::new(["date", "adj close"]);
        table
            .push_row(vec![json!(1_704_153_600), json!(42.0)])
            .unwrap();

        let series = recognize_series("AAA", &table).unwrap();
        assert_eq!(series.first_date(), Some(ymd(2024, 1, 2)));
    }

    #[test]
    fn test_rejections() {
        let empty = RawPriceTable::new(["Date", "Close"]);
        assert_eq!(
            recognize_series("A", &empty).unwrap_err().reason,
            RejectReason::EmptySource
        );

        let mut no_date = RawPriceTable::new(["Day", "Close"]);
        no_date.push_row(vec![json!("x"), json!(1.0)]).unwrap();
        assert_eq!(
            recognize_series("B", &no_date).unwrap_err().reason,
            RejectReason::MissingDateColumn
        );

        let mut no_price = RawPriceTable::new(["Date", "Volume"]);
        no_price
            .push_row(vec![json!("2024-01-02"), json!(1000)])
            .unwrap();
        assert_eq!(
            recognize_series("C", &no_price).unwrap_err().reason,
            RejectReason::MissingPriceColumn
        );

        let mut unparseable = RawPriceTable::new(["Date", "Close"]);
        unparseable
            .push_row(vec![json!("garbage"), json!(null)])
            .unwrap();
        assert_eq!(
            recognize_series("D", &unparseable).unwrap_err().reason,
            RejectReason::EmptySource
        );
    }
}
