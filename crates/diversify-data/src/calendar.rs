//! 이란력(Jalali) ↔ 그레고리력 변환.
//!
//! 테헤란 증권거래소 데이터는 `J-DATE` 컬럼에 이란력 날짜를 담아 오며,
//! 분석 시작일도 보통 이란력(예: `1400-01-01`)으로 지정합니다.

use chrono::{Duration, NaiveDate};

use crate::error::{DataError, Result};

/// 이 연도보다 작으면 이란력 날짜로 해석합니다.
const JALALI_YEAR_CUTOFF: i32 = 1700;

/// 누적 일수 → 그레고리력 날짜 (검증 없음).
fn jalali_days_to_gregorian(jy: i64, jm: i64, jd: i64) -> Option<NaiveDate> {
    let jy = jy + 1595;
    let month_offset = if jm < 7 {
        (jm - 1) * 31
    } else {
        (jm - 7) * 30 + 186
    };
    let mut days =
        -355_668 + 365 * jy + (jy / 33) * 8 + ((jy % 33) + 3) / 4 + jd + month_offset;

    let mut gy = 400 * (days / 146_097);
    days %= 146_097;
    if days > 36_524 {
        days -= 1;
        gy += 100 * (days / 36_524);
        days %= 36_524;
        if days >= 365 {
            days += 1;
        }
    }
    gy += 4 * (days / 1_461);
    days %= 1_461;
    if days > 365 {
        gy += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    let first = NaiveDate::from_ymd_opt(i32::try_from(gy).ok()?, 1, 1)?;
    first.checked_add_signed(Duration::days(days))
}

/// 이란력 날짜를 그레고리력으로 변환합니다.
///
/// 월 1~6은 31일, 7~11은 30일, 12월(Esfand)은 평년 29일 / 윤년 30일입니다.
/// 범위를 벗어나면 `None`.
pub fn jalali_to_gregorian(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if year < 1 || !(1..=12).contains(&month) || day < 1 {
        return None;
    }
    let max_day = if month <= 6 { 31 } else { 30 };
    if day > max_day {
        return None;
    }

    let date = jalali_days_to_gregorian(year as i64, month as i64, day as i64)?;

    // Esfand 30일은 윤년에만 존재: 다음 해 첫날의 전날이어야 함
    if month == 12 && day == 30 {
        let next_new_year = jalali_days_to_gregorian(year as i64 + 1, 1, 1)?;
        if next_new_year.pred_opt()? != date {
            return None;
        }
    }

    Some(date)
}

fn split_ymd(s: &str) -> Option<(i32, u32, u32)> {
    let normalized = s.trim().replace('/', "-");
    let mut parts = normalized.split('-');
    let year = parts.next()?.trim().parse().ok()?;
    let month = parts.next()?.trim().parse().ok()?;
    let day = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((year, month, day))
}

/// `1400-01-01` 또는 `1400/01/01` 형식의 이란력 날짜 파싱.
pub fn parse_jalali(s: &str) -> Option<NaiveDate> {
    let (year, month, day) = split_ymd(s)?;
    jalali_to_gregorian(year, month, day)
}

/// 분석 시작일 파싱.
///
/// 연도가 1700 미만이면 이란력, 그 외에는 그레고리력 `YYYY-MM-DD`로 해석합니다.
pub fn parse_start_date(s: &str) -> Result<NaiveDate> {
    let (year, month, day) = split_ymd(s).ok_or_else(|| {
        DataError::ParseError(format!("Invalid date format: {}. Expected YYYY-MM-DD", s))
    })?;

    let date = if year < JALALI_YEAR_CUTOFF {
        jalali_to_gregorian(year, month, day)
    } else {
        NaiveDate::from_ymd_opt(year, month, day)
    };

    date.ok_or_else(|| DataError::ParseError(format!("Date out of range: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_nowruz_dates() {
        assert_eq!(jalali_to_gregorian(1398, 1, 1), Some(ymd(2019, 3, 21)));
        assert_eq!(jalali_to_gregorian(1399, 1, 1), Some(ymd(2020, 3, 20)));
        assert_eq!(jalali_to_gregorian(1400, 1, 1), Some(ymd(2021, 3, 21)));
        assert_eq!(jalali_to_gregorian(1402, 1, 1), Some(ymd(2023, 3, 21)));
    }

    #[test]
    fn test_second_half_of_year() {
        assert_eq!(jalali_to_gregorian(1401, 7, 1), Some(ymd(2022, 9, 23)));
    }

    #[test]
    fn test_esfand_leap_day() {
        // 1399, 1403은 윤년
        assert_eq!(jalali_to_gregorian(1399, 12, 30), Some(ymd(2021, 3, 20)));
        assert_eq!(jalali_to_gregorian(1403, 12, 30), Some(ymd(2025, 3, 20)));
        // 1400은 평년
        assert_eq!(jalali_to_gregorian(1400, 12, 30), None);
        assert_eq!(jalali_to_gregorian(1398, 12, 29), Some(ymd(2020, 3, 19)));
    }

    #[test]
    fn test_invalid_components() {
        assert_eq!(jalali_to_gregorian(1400, 13, 1), None);
        assert_eq!(jalali_to_gregorian(1400, 7, 31), None);
        assert_eq!(jalali_to_gregorian(1400, 1, 0), None);
    }

    #[test]
    fn test_parse_jalali_separators() {
        assert_eq!(parse_jalali("1400/01/01"), Some(ymd(2021, 3, 21)));
        assert_eq!(parse_jalali("1400-01-01"), Some(ymd(2021, 3, 21)));
        assert_eq!(parse_jalali("1400-01"), None);
        assert_eq!(parse_jalali("not a date"), None);
    }

    #[test]
    fn test_parse_start_date() {
        assert_eq!(parse_start_date("1400-01-01").unwrap(), ymd(2021, 3, 21));
        assert_eq!(parse_start_date("2024-01-15").unwrap(), ymd(2024, 1, 15));
        assert!(parse_start_date("2024-02-30").is_err());
        assert!(parse_start_date("yesterday").is_err());
    }
}
