//! # Delve
//!
//! Seeded level streaming for roguelike dungeons.
//!
//! Delve generates a deterministic level graph from a single seed, keeps
//! exactly the active room and its neighbors materialized while the
//! player moves, and lazily loads shared templates for everything it
//! instantiates. The game supplies two ports: a [`ScenePort`] for the
//! presentation tree and a [`TemplateSource`] for template data.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use delve::prelude::*;
//!
//! // Implement ScenePort and TemplateSource for your engine, then:
//! // let session = DelveSession::builder().build(scene, source);
//! // let level = session.load_level(&LevelConfig { seed: 42, ..Default::default() }).await?;
//! // session.activate_room(&level.neighbors(&level.entrance().id)[0]).await?;
//! ```
//!
//! [`ScenePort`]: delve_stream::ScenePort
//! [`TemplateSource`]: delve_template::TemplateSource

mod error;
mod session;

pub use error::DelveError;
pub use session::{DelveSession, DelveSessionBuilder};

pub mod prelude {
    pub use crate::{DelveError, DelveSession, DelveSessionBuilder};
    pub use delve_content::{
        ContentGenerator, EnemyKind, EnemySpawn, EnemyTier, GradientNoise, Noise2D,
        PropKind, PropSpawn,
    };
    pub use delve_level::{
        Direction, Level, LevelConfig, LevelGenerator, Position, Room, RoomId, RoomType,
    };
    pub use delve_stream::{
        ActivationOutcome, NodeHandle, SceneError, SceneNode, ScenePort, StreamEvent,
        StreamingController,
    };
    pub use delve_template::{
        FetchError, StaticSource, Template, TemplateData, TemplateInstance, TemplateKind,
        TemplateRegistry, TemplateSource,
    };
}
