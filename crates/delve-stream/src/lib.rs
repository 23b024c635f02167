//! Room streaming and resource lifecycle for Delve.
//!
//! The [`StreamingController`] keeps exactly the active room plus its
//! immediate neighbors materialized: it asynchronously loads rooms as the
//! player moves, deduplicates concurrent loads for the same room
//! (single-flight), and synchronously disposes rooms that fall out of the
//! retained set.
//!
//! # Key types
//!
//! - [`StreamingController`] — the orchestrating state machine
//! - [`RoomResource`] — owns everything instantiated for one loaded room
//! - [`ScenePort`] — the presentation-tree attachment port
//! - [`StreamEvent`] — notifications for the game-logic layer
//!
//! # Room lifecycle
//!
//! ```text
//! Unloaded → Loading → Loaded{Active | Inactive} → Unloaded
//! ```
//!
//! All transitions run through controller operations; nothing else
//! touches the loaded-room set or the pending-load registry.

mod controller;
mod error;
mod events;
mod resource;
mod scene;

pub use controller::{ActivationOutcome, StreamingController};
pub use error::StreamError;
pub use events::StreamEvent;
pub use resource::{EnemyInstance, PropInstance, RoomResource};
pub use scene::{NodeHandle, SceneError, SceneNode, ScenePort};
