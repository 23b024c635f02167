//! Level graph data model and seeded generation for Delve.
//!
//! A [`Level`] is an immutable graph of [`Room`]s produced by
//! [`LevelGenerator`]. Topology never changes after generation; the only
//! runtime-mutable field is each room's `is_cleared` flag.
//!
//! # Key types
//!
//! - [`Level`] / [`Room`] — the graph and its nodes
//! - [`LevelConfig`] — generation parameters (seed, room count, branching)
//! - [`LevelGenerator`] — deterministic seed → graph construction
//! - [`Direction`] — the four cardinal edges, with [`Direction::opposite`]

mod error;
mod generator;
mod level;
mod types;

pub use error::LevelError;
pub use generator::LevelGenerator;
pub use level::{Level, LevelConfig, Room};
pub use types::{Direction, Position, RoomId, RoomType};
