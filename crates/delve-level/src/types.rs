//! Core identity and geometry types for the level graph.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomId
// ---------------------------------------------------------------------------

/// A unique identifier for a room within a level.
///
/// Newtype over `String` so a room id can't be confused with a room name
/// or a template key. Generated ids follow the pattern `entrance`,
/// `room_1` … `room_N`, `boss`.
///
/// `#[serde(transparent)]` serializes this as the bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Creates a room id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// A cardinal direction along which two rooms connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All four directions in a fixed order.
    ///
    /// Generation iterates this array; the order is part of the
    /// determinism contract, so don't reorder it.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// The direction pointing back the other way.
    ///
    /// Connection symmetry relies on this: if room A connects to B via
    /// `dir`, B connects to A via `dir.opposite()`.
    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Unit offset on the generation grid.
    pub(crate) fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A room's position in world units (the center of the room).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise translation, used when content spawns are laid out
    /// relative to a room center.
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomType
// ---------------------------------------------------------------------------

/// The gameplay category of a room.
///
/// Drives content composition (enemy tiers, prop density) and template
/// selection. The entrance is a `Normal` room with `Room::is_entrance`
/// set — being the entrance is a role, not a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Normal,
    Elite,
    Treasure,
    Boss,
    Shop,
    Secret,
}

/// Display = the serde snake_case name; used in template keys and logs.
impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoomType::Normal => "normal",
            RoomType::Elite => "elite",
            RoomType::Treasure => "treasure",
            RoomType::Boss => "boss",
            RoomType::Shop => "shop",
            RoomType::Secret => "secret",
        };
        write!(f, "{s}")
    }
}
