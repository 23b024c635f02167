//! `RoomResource`: the owned bundle of everything instantiated for one
//! loaded room.
//!
//! Ownership is arena-style: every instance handle is recorded at
//! instantiation time and released by iterating the list — no scene-graph
//! walking at disposal time. Templates are never owned here, only the
//! instances cloned from them.

use delve_template::TemplateInstance;
use delve_level::RoomId;

use crate::scene::{NodeHandle, ScenePort};

/// One instantiated prop, attached to the presentation tree.
#[derive(Debug)]
pub struct PropInstance {
    pub instance: TemplateInstance,
    pub(crate) handle: NodeHandle,
}

/// One instantiated enemy, attached to the presentation tree.
#[derive(Debug)]
pub struct EnemyInstance {
    pub instance: TemplateInstance,
    pub(crate) handle: NodeHandle,
}

/// Everything materialized for one loaded room.
///
/// Created when a room finishes loading, destroyed when it leaves the
/// retain set. Exclusively owned by the streaming controller; instances
/// are exclusively owned here.
#[derive(Debug)]
pub struct RoomResource {
    pub room_id: RoomId,
    /// The room shell's attachment to the presentation tree.
    pub(crate) attachment: NodeHandle,
    pub(crate) props: Vec<PropInstance>,
    pub(crate) enemies: Vec<EnemyInstance>,
    /// Exactly one loaded room is active at a time.
    pub is_active: bool,
}

impl RoomResource {
    pub(crate) fn new(
        room_id: RoomId,
        attachment: NodeHandle,
        props: Vec<PropInstance>,
        enemies: Vec<EnemyInstance>,
    ) -> Self {
        Self {
            room_id,
            attachment,
            props,
            enemies,
            is_active: false,
        }
    }

    pub fn prop_count(&self) -> usize {
        self.props.len()
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Releases every enemy instance, leaving props intact.
    ///
    /// Returns the number of instances removed. Per-instance detach
    /// errors are logged and skipped — partial cleanup never aborts.
    pub(crate) fn clear_enemies<S: ScenePort>(&mut self, scene: &S) -> usize {
        let mut removed = 0;
        for enemy in self.enemies.drain(..) {
            if let Err(error) = scene.detach(enemy.handle) {
                tracing::warn!(
                    room = %self.room_id,
                    enemy = %enemy.instance.kind,
                    %error,
                    "enemy instance detach failed during clear"
                );
            }
            removed += 1;
        }
        removed
    }

    /// Disposes the whole resource: detach the room shell from the
    /// presentation tree first, then release every owned instance, then
    /// drop. Errors are logged, never escalated.
    pub(crate) fn dispose<S: ScenePort>(mut self, scene: &S) {
        if let Err(error) = scene.detach(self.attachment) {
            tracing::warn!(
                room = %self.room_id,
                %error,
                "room shell detach failed during dispose"
            );
        }

        for prop in self.props.drain(..) {
            if let Err(error) = scene.detach(prop.handle) {
                tracing::warn!(
                    room = %self.room_id,
                    prop = %prop.instance.kind,
                    %error,
                    "prop instance detach failed during dispose"
                );
            }
        }
        for enemy in self.enemies.drain(..) {
            if let Err(error) = scene.detach(enemy.handle) {
                tracing::warn!(
                    room = %self.room_id,
                    enemy = %enemy.instance.kind,
                    %error,
                    "enemy instance detach failed during dispose"
                );
            }
        }

        tracing::debug!(room = %self.room_id, "room resource disposed");
    }
}
