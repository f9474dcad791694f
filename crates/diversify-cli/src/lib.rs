//! 분산 투자 리스크 분석 CLI.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 분석 실행 및 결과 출력 (table, json, csv)
//! - 유효 설정 확인
//! - 이란력 날짜 변환

pub mod commands;
