//! Integration tests for the template registry using counting/stalling
//! mock sources.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use delve_content::{EnemyKind, PropKind};
use delve_level::RoomType;
use delve_template::{
    FetchError, StaticSource, TemplateData, TemplateError, TemplateKind,
    TemplateRegistry, TemplateSource,
};

// =========================================================================
// Mock sources
// =========================================================================

/// Counts fetches and optionally stalls them, so tests can prove
/// single-flight behavior.
struct CountingSource {
    fetches: Arc<AtomicUsize>,
    delay: Duration,
}

impl CountingSource {
    fn new(delay: Duration) -> (Self, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        (
            Self {
                fetches: Arc::clone(&fetches),
                delay,
            },
            fetches,
        )
    }
}

impl TemplateSource for CountingSource {
    async fn fetch(&self, kind: TemplateKind) -> Result<TemplateData, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(StaticSource::entry(&kind.to_string(), "mock"))
    }
}

/// Fails every fetch, to exercise the retry-after-failure path.
struct FlakySource {
    fetches: Arc<AtomicUsize>,
    fail_first: usize,
}

impl TemplateSource for FlakySource {
    async fn fetch(&self, kind: TemplateKind) -> Result<TemplateData, FetchError> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_first {
            Err(FetchError::Unavailable("store offline".into()))
        } else {
            Ok(StaticSource::entry(&kind.to_string(), "mock"))
        }
    }
}

fn slime() -> TemplateKind {
    TemplateKind::Enemy(EnemyKind::Slime)
}

// =========================================================================
// Registry tests
// =========================================================================

#[tokio::test]
async fn test_get_loads_once_then_caches() {
    let (source, fetches) = CountingSource::new(Duration::ZERO);
    let registry = TemplateRegistry::new(source);

    let a = registry.get(slime()).await.unwrap();
    let b = registry.get(slime()).await.unwrap();

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&a, &b), "cache must hand out the same template");
    assert!(registry.is_cached(slime()).await);
}

#[tokio::test]
async fn test_concurrent_gets_share_one_fetch() {
    let (source, fetches) = CountingSource::new(Duration::from_millis(30));
    let registry = TemplateRegistry::new(source);

    let (a, b, c) = tokio::join!(
        registry.get(slime()),
        registry.get(slime()),
        registry.get(slime()),
    );

    assert_eq!(
        fetches.load(Ordering::SeqCst),
        1,
        "single-flight: overlapping gets must not duplicate the fetch"
    );
    assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    assert!(c.is_ok());
}

#[tokio::test]
async fn test_distinct_kinds_fetch_independently() {
    let (source, fetches) = CountingSource::new(Duration::ZERO);
    let registry = TemplateRegistry::new(source);

    registry.get(TemplateKind::Room(RoomType::Boss)).await.unwrap();
    registry.get(TemplateKind::Prop(PropKind::Crate)).await.unwrap();
    registry.get(slime()).await.unwrap();

    assert_eq!(fetches.load(Ordering::SeqCst), 3);
    assert_eq!(registry.cached_count().await, 3);
}

#[tokio::test]
async fn test_missing_kind_fails_with_missing_template() {
    let registry = TemplateRegistry::new(StaticSource::default());

    let err = registry.get(slime()).await.unwrap_err();
    assert_eq!(err, TemplateError::MissingTemplate(slime()));
    assert!(!registry.is_cached(slime()).await);
}

#[tokio::test]
async fn test_failed_load_is_retried_later() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let registry = TemplateRegistry::new(FlakySource {
        fetches: Arc::clone(&fetches),
        fail_first: 1,
    });

    let first = registry.get(slime()).await;
    assert!(matches!(first, Err(TemplateError::SourceFailed { .. })));

    // The failed flight must not poison the cache.
    let second = registry.get(slime()).await;
    assert!(second.is_ok());
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_clones_share_the_cache() {
    let (source, fetches) = CountingSource::new(Duration::ZERO);
    let registry = TemplateRegistry::new(source);
    let clone = registry.clone();

    registry.get(slime()).await.unwrap();
    clone.get(slime()).await.unwrap();

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_static_source_catalog() {
    let source = StaticSource::default()
        .with(slime(), StaticSource::entry("Slime", "enemies/slime"));
    let registry = TemplateRegistry::new(source);

    let template = registry.get(slime()).await.unwrap();
    assert_eq!(template.data().display_name, "Slime");
    assert_eq!(template.kind(), slime());
}
