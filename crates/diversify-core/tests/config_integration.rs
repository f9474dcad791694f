//! 설정 로드 통합 테스트
//!
//! 파일과 환경 변수를 함께 사용할 때 환경 변수가 우선하는지 확인합니다.

use std::io::Write;

use diversify_core::{AppConfig, DataSource};

#[test]
fn test_env_overrides_file() {
    let dir = std::env::temp_dir().join(format!("diversify-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("analysis.toml");

    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        r#"
[analysis]
tickers = ["AAA", "BBB", "CCC"]
trials = 80
max_portfolio_size = 3

[data]
source = "csv"
csv_dir = "prices"
"#
    )
    .unwrap();

    std::env::set_var("DIVERSIFY__ANALYSIS__TRIALS", "300");
    std::env::set_var("DIVERSIFY__ANALYSIS__TICKERS", "XXX,YYY");

    let config = AppConfig::load(Some(path.as_path())).unwrap();

    std::env::remove_var("DIVERSIFY__ANALYSIS__TRIALS");
    std::env::remove_var("DIVERSIFY__ANALYSIS__TICKERS");
    std::fs::remove_dir_all(&dir).ok();

    assert_eq!(config.analysis.trials, 300);
    assert_eq!(config.analysis.tickers, vec!["XXX", "YYY"]);
    assert_eq!(config.analysis.max_portfolio_size, 3);
    assert_eq!(config.analysis.trading_days_per_year, 242);
    assert_eq!(config.data.source, DataSource::Csv);
    assert_eq!(config.data.csv_dir, "prices");
    assert!(config.analysis.validate().is_ok());
}
