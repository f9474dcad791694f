//! 핵심 데이터 타입.

pub mod panel;
pub mod series;

pub use panel::{AlignedPanel, ReturnPanel};
pub use series::{AssetSeries, PricePoint};
