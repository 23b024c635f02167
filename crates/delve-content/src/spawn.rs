//! Spawn descriptors: what content generation tells the streaming layer
//! to instantiate into a room.

use std::fmt;

use delve_level::Position;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Props
// ---------------------------------------------------------------------------

/// Kinds of decorative/interactive props.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropKind {
    Crate,
    Barrel,
    Torch,
    Rubble,
    Chest,
    Altar,
}

impl fmt::Display for PropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PropKind::Crate => "crate",
            PropKind::Barrel => "barrel",
            PropKind::Torch => "torch",
            PropKind::Rubble => "rubble",
            PropKind::Chest => "chest",
            PropKind::Altar => "altar",
        };
        write!(f, "{s}")
    }
}

/// One prop to instantiate, at an absolute world position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropSpawn {
    pub kind: PropKind,
    pub position: Position,
}

// ---------------------------------------------------------------------------
// Enemies
// ---------------------------------------------------------------------------

/// Threat tier of an enemy kind. Fixed per kind — tier is a property of
/// the species, not of the spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyTier {
    Minion,
    Elite,
    Boss,
}

/// Kinds of enemies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Slime,
    Skeleton,
    Cultist,
    Knight,
    Wraith,
    DungeonLord,
}

impl EnemyKind {
    /// The tier this species fights at.
    pub fn tier(self) -> EnemyTier {
        match self {
            EnemyKind::Slime | EnemyKind::Skeleton | EnemyKind::Cultist => {
                EnemyTier::Minion
            }
            EnemyKind::Knight | EnemyKind::Wraith => EnemyTier::Elite,
            EnemyKind::DungeonLord => EnemyTier::Boss,
        }
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EnemyKind::Slime => "slime",
            EnemyKind::Skeleton => "skeleton",
            EnemyKind::Cultist => "cultist",
            EnemyKind::Knight => "knight",
            EnemyKind::Wraith => "wraith",
            EnemyKind::DungeonLord => "dungeon_lord",
        };
        write!(f, "{s}")
    }
}

/// One enemy to instantiate, at an absolute world position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub tier: EnemyTier,
    pub position: Position,
}

impl EnemySpawn {
    /// Builds a spawn with the tier implied by the kind.
    pub fn new(kind: EnemyKind, position: Position) -> Self {
        Self {
            kind,
            tier: kind.tier(),
            position,
        }
    }
}
