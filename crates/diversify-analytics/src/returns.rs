//! 일간 수익률 계산.

use diversify_core::{AlignedPanel, ReturnPanel};

/// 가격 패널을 일간 단순 수익률 패널로 변환합니다.
///
/// 셀 값은 `p_t / p_{t-1} - 1`이며 두 가격 중 하나라도 없으면 비어 있습니다.
/// 모든 열이 비어 있는 행(항상 첫 행 포함)은 결과에서 제외됩니다.
pub fn compute_returns(panel: &AlignedPanel) -> ReturnPanel {
    let n_rows = panel.n_rows();

    let raw: Vec<Vec<Option<f64>>> = panel
        .columns
        .iter()
        .map(|column| {
            (0..n_rows)
                .map(|row| {
                    if row == 0 {
                        return None;
                    }
                    match (column[row - 1], column[row]) {
                        (Some(prev), Some(curr)) if prev != 0.0 => Some(curr / prev - 1.0),
                        _ => None,
                    }
                })
                .collect()
        })
        .collect();

    let keep: Vec<usize> = (0..n_rows)
        .filter(|&row| raw.iter().any(|c| c[row].is_some()))
        .collect();

    ReturnPanel {
        dates: keep.iter().map(|&row| panel.dates[row]).collect(),
        tickers: panel.tickers.clone(),
        columns: raw
            .into_iter()
            .map(|c| keep.iter().map(|&row| c[row]).collect())
            .collect(),
    }
}
