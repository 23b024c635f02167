//! Error types for the template layer.

use crate::template::TemplateKind;

/// Errors that can occur while resolving a template.
///
/// `Clone` because a single failed load is replayed to every caller that
/// piggybacked on the same in-flight fetch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemplateError {
    /// The backing store has no template for this kind.
    #[error("missing template for {0}")]
    MissingTemplate(TemplateKind),

    /// The backing store failed for a reason other than a missing entry.
    #[error("template source failed for {kind}: {reason}")]
    SourceFailed { kind: TemplateKind, reason: String },
}
