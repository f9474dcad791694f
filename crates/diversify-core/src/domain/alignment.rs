//! 정렬 결과.

use serde::{Deserialize, Serialize};

use super::outcome::SeriesOutcome;
use crate::types::AlignedPanel;

/// 정렬 단계의 산출물: 전방 채움이 끝난 가격 패널과 종목별 처리 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub panel: AlignedPanel,
    /// 입력 순서대로의 종목별 결과
    pub outcomes: Vec<SeriesOutcome>,
}

impl Alignment {
    /// 제외된 종목 결과만 반환.
    pub fn rejected(&self) -> impl Iterator<Item = &SeriesOutcome> {
        self.outcomes.iter().filter(|o| !o.is_accepted())
    }

    pub fn accepted_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_accepted()).count()
    }
}
