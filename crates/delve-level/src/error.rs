//! Error types for level generation.

/// Errors that can occur while generating a level.
///
/// `Clone` because generation errors are replayed to every caller that
/// awaited the same streaming operation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LevelError {
    /// The generation config is unusable (too few rooms, branching factor
    /// outside `[0, 1]`). The call fails; no level is produced.
    #[error("invalid level parameters: {0}")]
    InvalidParameters(String),
}
