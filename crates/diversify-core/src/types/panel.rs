//! 날짜 × 종목 패널.
//!
//! 열(종목) 단위로 저장합니다. 정렬, 전방 채움, 수익률 계산, 포트폴리오
//! 평균이 모두 열을 따라 진행되기 때문입니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

fn check_shape(
    dates: &[NaiveDate],
    tickers: &[String],
    columns: &[Vec<Option<f64>>],
) -> AnalysisResult<()> {
    if tickers.len() != columns.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "종목 수({})와 열 수({})가 다릅니다",
            tickers.len(),
            columns.len()
        )));
    }
    if let Some((idx, column)) = columns
        .iter()
        .enumerate()
        .find(|(_, c)| c.len() != dates.len())
    {
        return Err(AnalysisError::InvalidInput(format!(
            "{} 열의 길이({})가 날짜 수({})와 다릅니다",
            tickers[idx],
            column.len(),
            dates.len()
        )));
    }
    if dates.windows(2).any(|w| w[0] >= w[1]) {
        return Err(AnalysisError::InvalidInput(
            "날짜 축은 엄격하게 증가해야 합니다".to_string(),
        ));
    }
    Ok(())
}

/// 날짜 정렬 가격 패널.
///
/// 행은 모든 입력 날짜의 합집합(오름차순), 열은 채택된 종목입니다.
/// 셀이 `None`이면 해당 날짜에 가격이 없다는 뜻입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedPanel {
    /// 날짜 축 (오름차순, 중복 없음)
    pub dates: Vec<NaiveDate>,
    /// 열 순서의 종목 목록
    pub tickers: Vec<String>,
    /// 열 단위 가격 (`columns[col][row]`)
    pub columns: Vec<Vec<Option<f64>>>,
}

impl AlignedPanel {
    /// 모양을 검증하여 패널을 생성합니다.
    pub fn from_columns(
        dates: Vec<NaiveDate>,
        tickers: Vec<String>,
        columns: Vec<Vec<Option<f64>>>,
    ) -> AnalysisResult<Self> {
        check_shape(&dates, &tickers, &columns)?;
        Ok(Self {
            dates,
            tickers,
            columns,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.dates.len()
    }

    pub fn n_columns(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty() || self.dates.is_empty()
    }

    /// 종목 코드로 열 조회.
    pub fn column(&self, ticker: &str) -> Option<&[Option<f64>]> {
        self.tickers
            .iter()
            .position(|t| t == ticker)
            .map(|idx| self.columns[idx].as_slice())
    }

    /// 열의 값이 있는 셀 수.
    pub fn observations(&self, col: usize) -> usize {
        self.columns
            .get(col)
            .map(|c| c.iter().filter(|v| v.is_some()).count())
            .unwrap_or(0)
    }

    /// 열별 전방 채움 (제자리 수정).
    ///
    /// 각 열에서 마지막으로 관측된 가격을 이후의 빈 셀로 전파합니다.
    /// 첫 관측 이전의 빈 셀은 그대로 두며, 다른 열의 값은 사용하지 않습니다.
    pub fn forward_fill(&mut self) {
        for column in &mut self.columns {
            let mut last = None;
            for cell in column.iter_mut() {
                match cell {
                    Some(value) => last = Some(*value),
                    None => *cell = last,
                }
            }
        }
    }
}

/// 일간 수익률 패널.
///
/// [`AlignedPanel`]과 같은 열 구성이며, 모든 열이 비어 있는 행은 포함하지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnPanel {
    /// 날짜 축
    pub dates: Vec<NaiveDate>,
    /// 열 순서의 종목 목록
    pub tickers: Vec<String>,
    /// 열 단위 수익률 (`columns[col][row]`)
    pub columns: Vec<Vec<Option<f64>>>,
}

impl ReturnPanel {
    /// 모양을 검증하여 패널을 생성합니다.
    pub fn from_columns(
        dates: Vec<NaiveDate>,
        tickers: Vec<String>,
        columns: Vec<Vec<Option<f64>>>,
    ) -> AnalysisResult<Self> {
        check_shape(&dates, &tickers, &columns)?;
        Ok(Self {
            dates,
            tickers,
            columns,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.dates.len()
    }

    pub fn n_columns(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty() || self.dates.is_empty()
    }

    /// 지정한 열들의 행 평균 (값이 없는 셀은 제외).
    ///
    /// 선택한 열 모두 값이 없으면 `None`을 반환합니다. 빈 셀을 0 수익률로
    /// 취급하지 않습니다.
    pub fn row_mean(&self, row: usize, cols: &[usize]) -> Option<f64> {
        let mut sum = 0.0;
        let mut count = 0usize;
        for &col in cols {
            if let Some(value) = self.columns[col][row] {
                sum += value;
                count += 1;
            }
        }
        (count > 0).then(|| sum / count as f64)
    }

    /// 모든 열이 비어 있는 행이 있는지 확인.
    pub fn has_empty_row(&self) -> bool {
        (0..self.n_rows()).any(|row| self.columns.iter().all(|c| c[row].is_none()))
    }
}
