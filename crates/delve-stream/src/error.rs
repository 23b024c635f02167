//! Error types for the streaming layer.

use delve_level::{LevelError, RoomId};
use delve_template::TemplateError;

/// Errors that can occur during streaming operations.
///
/// `Clone` because a failed load is replayed to every activation that
/// awaited the same in-flight task. Every failure leaves the controller
/// in its last fully-consistent state — the previous active room stays
/// active (or no room does, if none ever loaded).
#[derive(Debug, Clone, thiserror::Error)]
pub enum StreamError {
    /// An operation needs a level, but none is loaded.
    #[error("no level loaded")]
    NoLevelLoaded,

    /// The id does not name a room of the current level.
    #[error("room {0} not found in current level")]
    RoomNotFound(RoomId),

    /// Level generation rejected the config.
    #[error(transparent)]
    InvalidParameters(#[from] LevelError),

    /// A template could not be resolved; the activation aborts.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The presentation tree refused an attachment during a room load.
    #[error("scene attach failed for {room}: {reason}")]
    SceneAttach { room: RoomId, reason: String },
}
