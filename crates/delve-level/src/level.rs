//! The `Level` and `Room` data model, plus the generation config.

use serde::{Deserialize, Serialize};

use crate::types::{Direction, Position, RoomId, RoomType};

// ---------------------------------------------------------------------------
// LevelConfig
// ---------------------------------------------------------------------------

/// Parameters for generating a level.
///
/// The seed (together with the generator's fixed rules) fully determines
/// the output — this config is the only durable state a save system needs
/// to capture to reproduce a run exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Master seed. Every room derives its own sub-seed from this.
    pub seed: u64,

    /// Total number of rooms, entrance and boss included. Must be >= 2.
    pub room_count: usize,

    /// Probability in `[0, 1]` of adding an extra edge between two rooms
    /// that happen to sit on adjacent grid cells. 0 keeps the minimal
    /// spine; 1 connects every adjacent pair.
    pub branching_factor: f32,

    /// Difficulty rating carried into content generation.
    pub difficulty: u32,

    /// Human-readable level name.
    pub name: String,

    /// Visual/content theme tag (e.g. "catacombs").
    pub theme: String,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            room_count: 8,
            branching_factor: 0.25,
            difficulty: 1,
            name: "Delve".to_string(),
            theme: "catacombs".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A single node in the level graph.
///
/// Topology (`connections`) and identity are fixed at generation time;
/// `is_cleared` is the only field that mutates afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique id within the level.
    pub id: RoomId,

    /// Gameplay category, drives content composition.
    pub room_type: RoomType,

    /// Room center in world units.
    pub position: Position,

    /// Per-room sub-seed. Content generation is a pure function of
    /// `(room_type, seed)`, so reloading a room reproduces it exactly.
    pub seed: u64,

    /// Outgoing edges. Invariant: symmetric — if this room has
    /// `(dir, other)`, then `other` has `(dir.opposite(), this)`.
    pub connections: Vec<(Direction, RoomId)>,

    /// Whether this is the level's entrance (exactly one per level).
    pub is_entrance: bool,

    /// Set once the player defeats this room's enemies. Cleared rooms
    /// never respawn enemies, even across unload/reload.
    pub is_cleared: bool,
}

impl Room {
    /// Ids of all directly connected rooms.
    pub fn neighbor_ids(&self) -> impl Iterator<Item = &RoomId> {
        self.connections.iter().map(|(_, id)| id)
    }

    /// Returns the connection toward `other`, if one exists.
    pub fn connection_to(&self, other: &RoomId) -> Option<Direction> {
        self.connections
            .iter()
            .find(|(_, id)| id == other)
            .map(|(dir, _)| *dir)
    }
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// An immutable graph of rooms.
///
/// Room order is generation order — deterministic, but not otherwise
/// meaningful. Lookups go through [`Level::room`]; levels are small
/// (tens of rooms), so a linear scan beats carrying an index map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// Level id (the generation seed — ids are reproducible too).
    pub id: u64,
    pub name: String,
    pub theme: String,
    pub difficulty: u32,
    pub rooms: Vec<Room>,
}

impl Level {
    /// Looks up a room by id.
    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| &r.id == id)
    }

    /// Mutable lookup, used only to flip per-room runtime flags.
    pub fn room_mut(&mut self, id: &RoomId) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| &r.id == id)
    }

    /// The entrance room.
    ///
    /// Generation guarantees exactly one; a level without one is a
    /// construction bug, so this is not an `Option` for callers to
    /// second-guess.
    pub fn entrance(&self) -> &Room {
        self.rooms
            .iter()
            .find(|r| r.is_entrance)
            .expect("generated level always has an entrance")
    }

    /// Ids of the rooms directly connected to `id`.
    ///
    /// Returns an empty vec for an unknown id; callers that care
    /// validate existence first.
    pub fn neighbors(&self, id: &RoomId) -> Vec<RoomId> {
        self.room(id)
            .map(|r| r.neighbor_ids().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether a room with this id exists.
    pub fn contains(&self, id: &RoomId) -> bool {
        self.room(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str) -> Room {
        Room {
            id: RoomId::new(id),
            room_type: RoomType::Normal,
            position: Position::default(),
            seed: 1,
            connections: Vec::new(),
            is_entrance: false,
            is_cleared: false,
        }
    }

    #[test]
    fn test_room_lookup() {
        let mut a = room("a");
        a.is_entrance = true;
        let level = Level {
            id: 0,
            name: "t".into(),
            theme: "t".into(),
            difficulty: 1,
            rooms: vec![a, room("b")],
        };

        assert!(level.contains(&"a".into()));
        assert!(!level.contains(&"z".into()));
        assert_eq!(level.entrance().id, RoomId::new("a"));
    }

    #[test]
    fn test_neighbors_of_unknown_room_is_empty() {
        let level = Level {
            id: 0,
            name: "t".into(),
            theme: "t".into(),
            difficulty: 1,
            rooms: vec![room("a")],
        };
        assert!(level.neighbors(&"nope".into()).is_empty());
    }

    #[test]
    fn test_connection_to() {
        let mut a = room("a");
        a.connections.push((Direction::East, RoomId::new("b")));
        assert_eq!(a.connection_to(&"b".into()), Some(Direction::East));
        assert_eq!(a.connection_to(&"c".into()), None);
    }
}
