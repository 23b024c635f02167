//! Unified error type for the Delve stack.

use delve_level::LevelError;
use delve_stream::StreamError;
use delve_template::TemplateError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `delve` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DelveError {
    /// A level-generation error (invalid config).
    #[error(transparent)]
    Level(#[from] LevelError),

    /// A template error (missing entry, backing store failure).
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A streaming error (no level, unknown room, aborted load).
    #[error(transparent)]
    Stream(#[from] StreamError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_level::{RoomId, RoomType};
    use delve_template::TemplateKind;

    #[test]
    fn test_from_level_error() {
        let err = LevelError::InvalidParameters("too few rooms".into());
        let delve_err: DelveError = err.into();
        assert!(matches!(delve_err, DelveError::Level(_)));
        assert!(delve_err.to_string().contains("too few rooms"));
    }

    #[test]
    fn test_from_template_error() {
        let err = TemplateError::MissingTemplate(TemplateKind::Room(RoomType::Boss));
        let delve_err: DelveError = err.into();
        assert!(matches!(delve_err, DelveError::Template(_)));
        assert!(delve_err.to_string().contains("room/boss"));
    }

    #[test]
    fn test_from_stream_error() {
        let err = StreamError::RoomNotFound(RoomId::new("room_9"));
        let delve_err: DelveError = err.into();
        assert!(matches!(delve_err, DelveError::Stream(_)));
        assert!(delve_err.to_string().contains("room_9"));
    }
}
