//! `DelveSession` builder and facade.
//!
//! This is the entry point for embedding Delve in a game. It ties
//! together all the layers: level generation → content derivation →
//! templates → streaming.

use delve_content::{ContentGenerator, GradientNoise};
use delve_level::{Level, LevelConfig, Room, RoomId};
use delve_stream::{ActivationOutcome, ScenePort, StreamEvent, StreamingController};
use delve_template::{TemplateRegistry, TemplateSource};
use tokio::sync::mpsc;

use crate::DelveError;

/// Builder for configuring a [`DelveSession`].
///
/// # Example
///
/// ```rust,ignore
/// use delve::prelude::*;
///
/// let session = DelveSession::builder()
///     .noise_seed(1337)
///     .build(my_scene, my_template_source);
/// let level = session.load_level(&LevelConfig::default()).await?;
/// ```
pub struct DelveSessionBuilder {
    noise_seed: u64,
}

impl DelveSessionBuilder {
    pub fn new() -> Self {
        Self { noise_seed: 0 }
    }

    /// Seed for the placement-noise field. Independent of level seeds:
    /// the same level config with a different noise seed keeps its
    /// topology and spawn lists but shifts spawn positions.
    pub fn noise_seed(mut self, seed: u64) -> Self {
        self.noise_seed = seed;
        self
    }

    /// Builds the session around a presentation port and a template
    /// backing store.
    pub fn build<S, T>(self, scene: S, source: T) -> DelveSession<S, T>
    where
        S: ScenePort,
        T: TemplateSource,
    {
        let registry = TemplateRegistry::new(source);
        let content = ContentGenerator::new(GradientNoise::new(self.noise_seed));
        tracing::info!(noise_seed = self.noise_seed, "session built");
        DelveSession {
            controller: StreamingController::new(scene, registry, content),
        }
    }
}

impl Default for DelveSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One dungeon run: a level, its streamed rooms, and their resources.
///
/// Thin facade over [`StreamingController`] with the unified
/// [`DelveError`]. Cheap to clone; clones share all state.
pub struct DelveSession<S: ScenePort, T: TemplateSource> {
    controller: StreamingController<S, T, GradientNoise>,
}

impl<S: ScenePort, T: TemplateSource> Clone for DelveSession<S, T> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
        }
    }
}

impl<S: ScenePort, T: TemplateSource> DelveSession<S, T> {
    pub fn builder() -> DelveSessionBuilder {
        DelveSessionBuilder::new()
    }

    /// Generates a level and activates its entrance.
    pub async fn load_level(&self, config: &LevelConfig) -> Result<Level, DelveError> {
        Ok(self.controller.load_level(config).await?)
    }

    /// Moves the player to `room_id`, streaming rooms in and out.
    pub async fn activate_room(
        &self,
        room_id: &RoomId,
    ) -> Result<ActivationOutcome, DelveError> {
        Ok(self.controller.activate_room(room_id).await?)
    }

    /// Marks a room cleared; its enemies are gone for the rest of the
    /// run. Returns the number of enemy instances removed right now.
    pub async fn mark_room_cleared(&self, room_id: &RoomId) -> Result<usize, DelveError> {
        Ok(self.controller.mark_room_cleared(room_id).await?)
    }

    /// A snapshot of the currently active room, if a level is loaded.
    pub async fn active_room(&self) -> Option<Room> {
        self.controller.active_room().await
    }

    /// The id of the currently active room.
    pub async fn active_room_id(&self) -> Option<RoomId> {
        self.controller.active_room_id().await
    }

    /// A snapshot of one room of the current level.
    pub async fn room(&self, room_id: &RoomId) -> Option<Room> {
        self.controller.room(room_id).await
    }

    /// Ids of every currently loaded room.
    pub async fn loaded_rooms(&self) -> Vec<RoomId> {
        self.controller.loaded_rooms().await
    }

    /// Subscribes to streaming events.
    pub async fn subscribe(&self) -> mpsc::UnboundedReceiver<StreamEvent> {
        self.controller.subscribe().await
    }

    /// The underlying controller, for callers that need the full API.
    pub fn controller(&self) -> &StreamingController<S, T, GradientNoise> {
        &self.controller
    }
}
