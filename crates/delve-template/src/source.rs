//! The backing-store port the registry fetches template data from.

use std::collections::HashMap;
use std::future::Future;

use crate::template::{TemplateData, TemplateKind};

/// Errors a backing store can report.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// No data exists for the requested kind.
    #[error("no template data for {0}")]
    NotFound(TemplateKind),

    /// The store itself failed (I/O, decode, remote endpoint down).
    #[error("template store unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous backing store for template data.
///
/// Implementations live outside this crate — an asset pipeline, a pak
/// file reader, a network service. [`StaticSource`] covers tests and
/// demos.
/// Declared as `-> impl Future + Send` (not `async fn`) so the registry
/// can box in-flight loads and move them across tasks; implementations
/// can still just write `async fn fetch`.
pub trait TemplateSource: Send + Sync + 'static {
    /// Fetches raw template data for `kind`.
    fn fetch(
        &self,
        kind: TemplateKind,
    ) -> impl Future<Output = Result<TemplateData, FetchError>> + Send;
}

/// An in-memory source backed by a fixed catalog.
///
/// Kinds absent from the catalog fetch as [`FetchError::NotFound`], which
/// makes this source double as the "missing template" fixture in tests.
#[derive(Debug, Default)]
pub struct StaticSource {
    catalog: HashMap<TemplateKind, TemplateData>,
}

impl StaticSource {
    pub fn new(catalog: HashMap<TemplateKind, TemplateData>) -> Self {
        Self { catalog }
    }

    /// Adds or replaces one catalog entry (builder style).
    pub fn with(mut self, kind: TemplateKind, data: TemplateData) -> Self {
        self.catalog.insert(kind, data);
        self
    }

    /// A minimal entry, enough for tests and demos.
    pub fn entry(name: &str, archetype: &str) -> TemplateData {
        TemplateData {
            display_name: name.to_string(),
            archetype: archetype.to_string(),
            hit_points: 0,
            footprint: 1.0,
        }
    }
}

impl TemplateSource for StaticSource {
    async fn fetch(&self, kind: TemplateKind) -> Result<TemplateData, FetchError> {
        self.catalog
            .get(&kind)
            .cloned()
            .ok_or(FetchError::NotFound(kind))
    }
}
