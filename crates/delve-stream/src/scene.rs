//! The presentation-tree port.
//!
//! The streaming core never renders anything; it only tells some scene
//! implementation "this exists now" / "this is gone". Handles are opaque
//! and meaningless outside the port that issued them.

use std::fmt;

use delve_level::Position;

/// Opaque handle to an attached scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub u64);

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N-{}", self.0)
    }
}

/// Description of a node being attached: the room shell or one
/// instantiated prop/enemy.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Diagnostic label, e.g. `room:entrance` or `enemy/slime@room_1`.
    pub label: String,
    /// Presentation-side asset identifier from the template.
    pub archetype: String,
    /// World position.
    pub position: Position,
}

/// Errors the presentation tree can report.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SceneError {
    /// The handle is unknown or was already detached.
    #[error("unknown scene handle {0}")]
    UnknownHandle(NodeHandle),

    /// The scene refused the node.
    #[error("scene rejected node: {0}")]
    Rejected(String),
}

/// Presentation-tree attachment, implemented by the rendering layer.
///
/// Calls are synchronous and expected to be cheap (bookkeeping, not GPU
/// work). Detach failures during disposal are logged and swallowed by
/// the caller — partial cleanup must never block streaming progress.
pub trait ScenePort: Send + Sync + 'static {
    /// Attaches a node, returning its handle.
    fn attach(&self, node: SceneNode) -> Result<NodeHandle, SceneError>;

    /// Detaches a previously attached node.
    fn detach(&self, handle: NodeHandle) -> Result<(), SceneError>;
}

/// Lets callers keep a handle to the scene they hand the controller.
impl<P: ScenePort> ScenePort for std::sync::Arc<P> {
    fn attach(&self, node: SceneNode) -> Result<NodeHandle, SceneError> {
        (**self).attach(node)
    }

    fn detach(&self, handle: NodeHandle) -> Result<(), SceneError> {
        (**self).detach(handle)
    }
}
