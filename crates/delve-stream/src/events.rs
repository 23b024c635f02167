//! Notifications the streaming layer emits toward game logic.

use delve_level::RoomId;

/// Events delivered to subscribers over an unbounded channel.
///
/// Delivery is best-effort: a dropped receiver just stops getting events,
/// it never blocks or fails streaming operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A room became the active room. Emitted once per successful
    /// activation (not for the already-active no-op).
    RoomActivated(RoomId),

    /// A room was marked cleared for the first time.
    RoomCleared(RoomId),

    /// Enemy instances were removed from a loaded room as part of
    /// clearing it.
    EnemiesRemoved { room_id: RoomId, count: usize },
}
