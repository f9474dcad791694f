//! 포트폴리오 크기별 리스크 추정 곡선.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

/// 곡선 위의 한 점.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskPoint {
    /// 포트폴리오 종목 수
    pub portfolio_size: usize,
    /// 연환산 변동성 추정치
    pub annual_risk: f64,
}

/// 분산 효과 곡선.
///
/// 포트폴리오 크기는 1부터 시작하여 엄격하게 증가합니다.
/// 실행마다 새로 계산되며 저장되지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskEstimate {
    points: Vec<RiskPoint>,
}

impl RiskEstimate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 다음 크기의 추정치를 추가합니다.
    ///
    /// 첫 점의 크기는 1이어야 하고, 이후에는 직전 크기보다 커야 합니다.
    pub fn push(&mut self, portfolio_size: usize, annual_risk: f64) -> AnalysisResult<()> {
        let valid = match self.points.last() {
            None => portfolio_size == 1,
            Some(last) => portfolio_size > last.portfolio_size,
        };
        if !valid {
            return Err(AnalysisError::InvalidInput(format!(
                "포트폴리오 크기 순서 위반: {}",
                portfolio_size
            )));
        }

        self.points.push(RiskPoint {
            portfolio_size,
            annual_risk,
        });
        Ok(())
    }

    pub fn points(&self) -> &[RiskPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 체계적 위험 근사치: 가장 큰 크기에서의 리스크.
    pub fn asymptotic_risk(&self) -> Option<f64> {
        self.points.last().map(|p| p.annual_risk)
    }

    /// 단일 종목 평균 리스크.
    pub fn single_asset_risk(&self) -> Option<f64> {
        self.points.first().map(|p| p.annual_risk)
    }

    /// 단일 종목 대비 최대 크기에서의 리스크 감소율 (%).
    pub fn risk_reduction_pct(&self) -> Option<f64> {
        let first = self.single_asset_risk()?;
        let last = self.asymptotic_risk()?;
        (first > 0.0).then(|| (first - last) / first * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_enforces_ordering() {
        let mut estimate = RiskEstimate::new();
        assert!(estimate.push(2, 0.3).is_err(), "must start at size 1");

        estimate.push(1, 0.40).unwrap();
        estimate.push(2, 0.30).unwrap();
        assert!(estimate.push(2, 0.25).is_err());
        estimate.push(3, 0.25).unwrap();

        assert_eq!(estimate.len(), 3);
    }

    #[test]
    fn test_summary_values() {
        let mut estimate = RiskEstimate::new();
        assert!(estimate.asymptotic_risk().is_none());

        estimate.push(1, 0.40).unwrap();
        estimate.push(2, 0.30).unwrap();
        estimate.push(3, 0.20).unwrap();

        assert_eq!(estimate.single_asset_risk(), Some(0.40));
        assert_eq!(estimate.asymptotic_risk(), Some(0.20));
        assert!((estimate.risk_reduction_pct().unwrap() - 50.0).abs() < 1e-9);
    }
}
