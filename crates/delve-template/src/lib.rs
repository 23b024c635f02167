//! Lazy, single-flight template registry for Delve.
//!
//! A [`Template`] is an immutable prototype — one per room type, prop
//! kind, or enemy kind — loaded once from a [`TemplateSource`] and shared
//! read-only for the rest of the process. Rooms never own templates; they
//! own [`TemplateInstance`]s produced by [`Template::instantiate`].
//!
//! The registry guarantees single-flight loading: concurrent `get` calls
//! for the same kind share one underlying fetch, and every later call
//! hits the cache. Templates are never evicted.

mod error;
mod registry;
mod source;
mod template;

pub use error::TemplateError;
pub use registry::TemplateRegistry;
pub use source::{FetchError, StaticSource, TemplateSource};
pub use template::{Template, TemplateData, TemplateInstance, TemplateKind};
