//! 정렬 패널 메모이제이션 캐시.
//!
//! 같은 (종목 목록, 시작일, 최소 관측치) 요청이 유효 기간 안에 반복되면
//! 데이터 소스를 다시 호출하지 않고 이전 정렬 결과를 재사용합니다.
//! 분석 코어는 캐시를 알지 못하며, 파이프라인이 명시적으로 사용합니다.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use diversify_core::{Alignment, DEFAULT_CACHE_TTL_SECS};

/// 캐시 키.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PanelKey {
    /// 공백 제거한 종목 목록 (요청 순서, 중복 포함)
    ///
    /// 패널의 열 순서와 결과 목록 순서가 요청 순서를 따르므로 키도 순서를 구분합니다.
    tickers: Vec<String>,
    start: NaiveDate,
    min_observations: usize,
}

impl PanelKey {
    pub fn new(tickers: &[String], start: NaiveDate, min_observations: usize) -> Self {
        let tickers: Vec<String> = tickers
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            tickers,
            start,
            min_observations,
        }
    }
}

struct Entry {
    value: Arc<Alignment>,
    inserted_at: Instant,
}

/// 캐시 통계.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// 적중률 (0.0 ~ 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// TTL 기반 정렬 패널 캐시.
pub struct PanelCache {
    entries: RwLock<HashMap<PanelKey, Entry>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for PanelCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }
}

impl PanelCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 유효한 항목 조회.
    pub async fn get(&self, key: &PanelKey) -> Option<Arc<Alignment>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(tickers = key.tickers.len(), "Panel cache hit");
                Some(Arc::clone(&entry.value))
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// 항목 저장 (같은 키는 덮어씀).
    pub async fn insert(&self, key: PanelKey, value: Alignment) -> Arc<Alignment> {
        let value = Arc::new(value);
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            Entry {
                value: Arc::clone(&value),
                inserted_at: Instant::now(),
            },
        );
        value
    }

    /// 만료된 항목 제거. 제거한 항목 수를 반환합니다.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);
        before - entries.len()
    }

    /// 모든 항목 제거.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.read().await.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diversify_core::{AlignedPanel, SeriesOutcome};

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn alignment() -> Alignment {
        Alignment {
            panel: AlignedPanel::from_columns(
                vec![ymd(1), ymd(2)],
                vec!["AAA".to_string()],
                vec![vec![Some(1.0), Some(2.0)]],
            )
            .unwrap(),
            outcomes: vec![SeriesOutcome::Accepted {
                ticker: "AAA".to_string(),
                observations: 2,
            }],
        }
    }

    #[test]
    fn test_key_follows_request_shape() {
        let key = |tickers: &[&str], start| {
            let tickers: Vec<String> = tickers.iter().map(|t| t.to_string()).collect();
            PanelKey::new(&tickers, start, 30)
        };

        // 공백과 빈 항목만 무시
        assert_eq!(key(&["AAA", " BBB", ""], ymd(1)), key(&["AAA", "BBB"], ymd(1)));

        // 순서, 중복, 시작일이 다르면 다른 패널
        assert_ne!(key(&["AAA", "BBB"], ymd(1)), key(&["BBB", "AAA"], ymd(1)));
        assert_ne!(key(&["AAA", "AAA", "BBB"], ymd(1)), key(&["AAA", "BBB"], ymd(1)));
        assert_ne!(key(&["AAA", "BBB"], ymd(1)), key(&["AAA", "BBB"], ymd(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let cache = PanelCache::new(Duration::from_secs(60));
        let key = PanelKey::new(&["AAA".to_string()], ymd(1), 30);

        assert!(cache.get(&key).await.is_none());
        cache.insert(key.clone(), alignment()).await;
        assert!(cache.get(&key).await.is_some());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(cache.get(&key).await.is_none());
        assert_eq!(cache.purge_expired().await, 1);

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.entries, 0);
        assert!((stats.hit_rate() - 1.0 / 3.0).abs() < 1e-9);
    }
}
