//! 원시 가격 테이블.
//!
//! 데이터 소스가 반환하는 행 단위 테이블입니다. 컬럼 이름과 셀 타입은
//! 소스마다 다르므로 셀은 `serde_json::Value`로 보관하고, 해석은
//! [`crate::schema`]에서 합니다.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DataError, Result};

/// 행 단위 원시 가격 테이블.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPriceTable {
    /// 컬럼 이름
    pub columns: Vec<String>,
    /// 행 데이터 (각 행의 길이는 컬럼 수와 같음)
    pub rows: Vec<Vec<Value>>,
}

impl RawPriceTable {
    /// 빈 테이블 생성.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// 행 추가.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(DataError::InvalidData(format!(
                "row has {} cells, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 이름이 정확히 일치하는 컬럼의 인덱스.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// 대소문자와 앞뒤 공백을 무시한 컬럼 인덱스.
    pub fn column_index_loose(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.trim().eq_ignore_ascii_case(name))
    }

    /// 한 컬럼의 셀 반복자.
    pub fn cells(&self, col: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| &row[col])
    }

    /// 컬럼 구조 확인용 앞부분 샘플.
    pub fn head(&self, n: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}
