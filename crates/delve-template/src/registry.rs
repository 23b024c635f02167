//! The template registry: lazy, cached, single-flight.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::sync::Mutex;

use crate::error::TemplateError;
use crate::source::{FetchError, TemplateSource};
use crate::template::{Template, TemplateKind};

/// A load in flight, shareable by every caller that asked for the same
/// kind before the first fetch settled.
type LoadFuture = Shared<BoxFuture<'static, Result<Arc<Template>, TemplateError>>>;

enum CacheEntry {
    Ready(Arc<Template>),
    Loading(LoadFuture),
}

/// Lazily loads and permanently caches one [`Template`] per kind.
///
/// Safe to call concurrently for the same kind: the first call starts the
/// backing fetch, overlapping calls await the same shared future, and
/// everything after completion is a cache hit. Failed loads are removed
/// from the cache so a later call can retry; successful loads are never
/// evicted — template cost is amortized over the whole run.
///
/// Cheap to clone; clones share the same cache.
pub struct TemplateRegistry<S: TemplateSource> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    source: S,
    cache: Mutex<HashMap<TemplateKind, CacheEntry>>,
}

impl<S: TemplateSource> Clone for TemplateRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: TemplateSource> TemplateRegistry<S> {
    pub fn new(source: S) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                cache: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Resolves the template for `kind`, fetching it on first use.
    ///
    /// Fails with [`TemplateError::MissingTemplate`] if the backing store
    /// has no entry for the kind.
    pub async fn get(&self, kind: TemplateKind) -> Result<Arc<Template>, TemplateError> {
        let load = {
            let mut cache = self.inner.cache.lock().await;
            match cache.get(&kind) {
                Some(CacheEntry::Ready(template)) => {
                    return Ok(Arc::clone(template));
                }
                // Someone is already fetching this kind — piggyback.
                Some(CacheEntry::Loading(fut)) => fut.clone(),
                None => {
                    let fut: LoadFuture =
                        load_template(Arc::clone(&self.inner), kind)
                            .boxed()
                            .shared();
                    cache.insert(kind, CacheEntry::Loading(fut.clone()));
                    fut
                }
            }
            // Lock released here; the fetch itself runs unlocked.
        };
        load.await
    }

    /// Number of fully loaded templates.
    pub async fn cached_count(&self) -> usize {
        self.inner
            .cache
            .lock()
            .await
            .values()
            .filter(|e| matches!(e, CacheEntry::Ready(_)))
            .count()
    }

    /// Whether `kind` has finished loading.
    pub async fn is_cached(&self, kind: TemplateKind) -> bool {
        matches!(
            self.inner.cache.lock().await.get(&kind),
            Some(CacheEntry::Ready(_))
        )
    }
}

/// The single underlying load for one kind: fetch, wrap, write back.
///
/// Exactly one of these runs per kind per flight, no matter how many
/// callers await it.
async fn load_template<S: TemplateSource>(
    inner: Arc<Inner<S>>,
    kind: TemplateKind,
) -> Result<Arc<Template>, TemplateError> {
    tracing::debug!(template = %kind, "fetching template");

    let result = inner
        .source
        .fetch(kind)
        .await
        .map(|data| Arc::new(Template::new(kind, data)))
        .map_err(|e| match e {
            FetchError::NotFound(k) => TemplateError::MissingTemplate(k),
            FetchError::Unavailable(reason) => {
                TemplateError::SourceFailed { kind, reason }
            }
        });

    let mut cache = inner.cache.lock().await;
    match &result {
        Ok(template) => {
            cache.insert(kind, CacheEntry::Ready(Arc::clone(template)));
            tracing::info!(template = %kind, "template cached");
        }
        Err(error) => {
            // Drop the in-flight entry so a later call can retry.
            cache.remove(&kind);
            tracing::warn!(template = %kind, %error, "template load failed");
        }
    }
    result
}
