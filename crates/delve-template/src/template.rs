//! Template prototypes and the instances cloned from them.

use std::fmt;

use delve_content::{EnemyKind, PropKind};
use delve_level::{Position, RoomType};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TemplateKind
// ---------------------------------------------------------------------------

/// Identifies a template: one per room type, prop kind, or enemy kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Room(RoomType),
    Prop(PropKind),
    Enemy(EnemyKind),
}

/// Template keys as they appear in catalogs and logs: `room/boss`,
/// `prop/crate`, `enemy/slime`.
impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::Room(t) => write!(f, "room/{t}"),
            TemplateKind::Prop(p) => write!(f, "prop/{p}"),
            TemplateKind::Enemy(e) => write!(f, "enemy/{e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// TemplateData
// ---------------------------------------------------------------------------

/// The raw data a backing store returns for one template.
///
/// Serde because catalogs ship as data files; the presentation layer
/// resolves `archetype` to whatever mesh/prefab it uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateData {
    /// Human-readable name, for logs and UI.
    pub display_name: String,
    /// Presentation-side asset identifier.
    pub archetype: String,
    /// Hit points for entities; 0 for props and room shells.
    #[serde(default)]
    pub hit_points: u32,
    /// Rough footprint radius in world units.
    #[serde(default = "default_footprint")]
    pub footprint: f32,
}

fn default_footprint() -> f32 {
    1.0
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// An immutable, shareable prototype.
///
/// Created once per kind by the registry and handed out as
/// `Arc<Template>`. Never mutated; instantiation clones the data into an
/// owned [`TemplateInstance`], which makes the clone-vs-share boundary
/// explicit at the type level.
#[derive(Debug)]
pub struct Template {
    kind: TemplateKind,
    data: TemplateData,
}

impl Template {
    pub fn new(kind: TemplateKind, data: TemplateData) -> Self {
        Self { kind, data }
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    pub fn data(&self) -> &TemplateData {
        &self.data
    }

    /// Clones this prototype into an owned instance at `position`.
    pub fn instantiate(&self, position: Position) -> TemplateInstance {
        TemplateInstance {
            kind: self.kind,
            data: self.data.clone(),
            position,
        }
    }
}

/// An owned copy of a template, placed in the world.
///
/// Instances belong to exactly one room resource; disposing the room
/// drops them.
#[derive(Debug, Clone)]
pub struct TemplateInstance {
    pub kind: TemplateKind,
    pub data: TemplateData,
    pub position: Position,
}
