//! The streaming controller.
//!
//! One state machine owns the loaded-room set: on activation it computes
//! the retain set (active room plus immediate neighbors), synchronously
//! disposes everything outside it, and asynchronously loads everything
//! missing from it. Concurrent loads for the same room share one flight,
//! and a newer activation supersedes an older one still awaiting loads.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use delve_content::{ContentGenerator, Noise2D};
use delve_level::{Level, LevelConfig, LevelGenerator, Room, RoomId};
use delve_template::{TemplateKind, TemplateRegistry, TemplateSource};

use crate::error::StreamError;
use crate::events::StreamEvent;
use crate::resource::{EnemyInstance, PropInstance, RoomResource};
use crate::scene::{NodeHandle, SceneNode, ScenePort};

/// A room load in flight. Shared so overlapping activations that both
/// retain the room await the same underlying work.
type PendingLoad = Shared<BoxFuture<'static, Result<(), StreamError>>>;

/// What a successful [`StreamingController::activate_room`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// The room is now active and its retain set is loaded.
    Activated,
    /// The room was already active; nothing changed.
    AlreadyActive,
    /// A newer activation arrived while this one awaited its loads; the
    /// newer one won. The controller state reflects the newer target.
    Superseded,
}

/// Everything behind the state lock. Single-writer: only controller
/// operations and the tail of a load task touch these maps.
struct StreamState {
    level: Option<Level>,
    active: Option<RoomId>,
    /// Rooms that should currently be loaded: active plus neighbors.
    retained: HashSet<RoomId>,
    /// Bumped on every activation; an older activation that sees a newer
    /// epoch after awaiting its loads yields instead of committing.
    epoch: u64,
    /// Bumped on every level (re)load; loads for an older level dispose
    /// their result instead of inserting it.
    level_gen: u64,
    loaded: HashMap<RoomId, RoomResource>,
    /// In-flight loads, tagged with the level generation they belong to.
    pending: HashMap<RoomId, (u64, PendingLoad)>,
}

struct Inner<S, T: TemplateSource, N: Noise2D> {
    scene: S,
    registry: TemplateRegistry<T>,
    content: ContentGenerator<N>,
    state: Mutex<StreamState>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<StreamEvent>>>,
}

/// Orchestrates room loading, activation, and disposal.
///
/// Cheap to clone; clones share all state. Every operation is safe to
/// call concurrently — overlapping activations resolve by supersession,
/// never by corrupting the loaded set.
pub struct StreamingController<S, T, N>
where
    S: ScenePort,
    T: TemplateSource,
    N: Noise2D + 'static,
{
    inner: Arc<Inner<S, T, N>>,
}

impl<S, T, N> Clone for StreamingController<S, T, N>
where
    S: ScenePort,
    T: TemplateSource,
    N: Noise2D + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, T, N> StreamingController<S, T, N>
where
    S: ScenePort,
    T: TemplateSource,
    N: Noise2D + 'static,
{
    pub fn new(scene: S, registry: TemplateRegistry<T>, content: ContentGenerator<N>) -> Self {
        Self {
            inner: Arc::new(Inner {
                scene,
                registry,
                content,
                state: Mutex::new(StreamState {
                    level: None,
                    active: None,
                    retained: HashSet::new(),
                    epoch: 0,
                    level_gen: 0,
                    loaded: HashMap::new(),
                    pending: HashMap::new(),
                }),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Generates a level from `config`, replaces any current level, and
    /// activates its entrance.
    ///
    /// Generation failures leave the controller untouched, current level
    /// included. On success every resource of the previous level is
    /// disposed before the new entrance loads.
    pub async fn load_level(&self, config: &LevelConfig) -> Result<Level, StreamError> {
        let level = LevelGenerator::generate(config)?;
        let entrance_id = level.entrance().id.clone();

        {
            let mut st = self.inner.state.lock().await;
            st.level_gen += 1;
            st.epoch += 1;
            st.retained.clear();
            st.pending.clear();
            st.active = None;
            for (_, resource) in st.loaded.drain() {
                resource.dispose(&self.inner.scene);
            }
            st.level = Some(level.clone());
            info!(
                level = level.id,
                rooms = level.rooms.len(),
                theme = %level.theme,
                "level loaded"
            );
        }

        self.activate_room(&entrance_id).await?;
        Ok(level)
    }

    /// Makes `room_id` the active room.
    ///
    /// Synchronously disposes loaded rooms outside the new retain set,
    /// then awaits loads for retained rooms not yet loaded. If a newer
    /// activation starts while this one is awaiting, this one returns
    /// [`ActivationOutcome::Superseded`] without committing. If any load
    /// fails, the previous active room stays active, its retain set is
    /// restored, and rooms the failed cycle evicted are re-loaded on a
    /// best-effort basis.
    pub async fn activate_room(&self, room_id: &RoomId) -> Result<ActivationOutcome, StreamError> {
        // Phase 1: validate, dispose, and kick off loads under the lock.
        let (my_epoch, prev_retained, loads) = {
            let mut guard = self.inner.state.lock().await;
            let st = &mut *guard;
            let level = st.level.as_ref().ok_or(StreamError::NoLevelLoaded)?;
            if !level.contains(room_id) {
                return Err(StreamError::RoomNotFound(room_id.clone()));
            }
            if st.active.as_ref() == Some(room_id) {
                return Ok(ActivationOutcome::AlreadyActive);
            }

            st.epoch += 1;
            let my_epoch = st.epoch;
            let level_gen = st.level_gen;

            let mut retain: HashSet<RoomId> =
                level.neighbors(room_id).into_iter().collect();
            retain.insert(room_id.clone());
            let rooms: Vec<Room> = retain
                .iter()
                .filter(|id| !st.loaded.contains_key(*id))
                .filter_map(|id| level.room(id).cloned())
                .collect();

            let prev_retained = std::mem::replace(&mut st.retained, retain);
            sweep_unretained(st, &self.inner.scene);

            let loads = start_loads(&self.inner, st, rooms, level_gen);

            debug!(
                room = %room_id,
                epoch = my_epoch,
                loads = loads.len(),
                "activation started"
            );
            (my_epoch, prev_retained, loads)
        };

        // Phase 2: await the loads with the lock released, so other
        // operations (and the load tails themselves) can run.
        let mut failure: Option<StreamError> = None;
        for result in futures_util::future::join_all(loads).await {
            if let Err(error) = result {
                failure.get_or_insert(error);
            }
        }

        // Phase 3: commit, yield to a newer activation, or roll back.
        let mut st = self.inner.state.lock().await;
        if st.epoch != my_epoch {
            sweep_unretained(&mut st, &self.inner.scene);
            debug!(room = %room_id, "activation superseded");
            return Ok(ActivationOutcome::Superseded);
        }
        if let Some(error) = failure {
            st.retained = prev_retained;
            sweep_unretained(&mut st, &self.inner.scene);
            // Best effort: re-materialize rooms of the previous retain
            // set that this cycle evicted, so the still-active room does
            // not linger without resources.
            let recover = {
                let st = &mut *st;
                let rooms: Vec<Room> = match st.level.as_ref() {
                    Some(level) => st
                        .retained
                        .iter()
                        .filter(|id| !st.loaded.contains_key(*id))
                        .filter_map(|id| level.room(id).cloned())
                        .collect(),
                    None => Vec::new(),
                };
                let level_gen = st.level_gen;
                start_loads(&self.inner, st, rooms, level_gen)
            };
            drop(st);
            if !recover.is_empty() {
                // Recovery failures are already logged by the loads.
                let _ = futures_util::future::join_all(recover).await;
            }
            warn!(room = %room_id, %error, "activation aborted");
            return Err(error);
        }

        sweep_unretained(&mut st, &self.inner.scene);
        st.active = Some(room_id.clone());
        for (id, resource) in st.loaded.iter_mut() {
            resource.is_active = id == room_id;
        }
        info!(room = %room_id, "room activated");
        drop(st);

        self.emit(StreamEvent::RoomActivated(room_id.clone())).await;
        Ok(ActivationOutcome::Activated)
    }

    /// Marks a room cleared, permanently.
    ///
    /// If the room is currently loaded its enemy instances are released
    /// immediately; either way, reloads of the room never respawn
    /// enemies. Idempotent: clearing a cleared room does nothing and
    /// emits nothing. Returns the number of enemy instances removed.
    pub async fn mark_room_cleared(&self, room_id: &RoomId) -> Result<usize, StreamError> {
        let removed = {
            let mut st = self.inner.state.lock().await;
            let level = st.level.as_mut().ok_or(StreamError::NoLevelLoaded)?;
            let room = level
                .room_mut(room_id)
                .ok_or_else(|| StreamError::RoomNotFound(room_id.clone()))?;
            if room.is_cleared {
                return Ok(0);
            }
            room.is_cleared = true;

            match st.loaded.get_mut(room_id) {
                Some(resource) => resource.clear_enemies(&self.inner.scene),
                None => 0,
            }
        };

        info!(room = %room_id, removed, "room cleared");
        self.emit(StreamEvent::RoomCleared(room_id.clone())).await;
        if removed > 0 {
            self.emit(StreamEvent::EnemiesRemoved {
                room_id: room_id.clone(),
                count: removed,
            })
            .await;
        }
        Ok(removed)
    }

    /// A snapshot of the currently active room, if any.
    pub async fn active_room(&self) -> Option<Room> {
        let st = self.inner.state.lock().await;
        let id = st.active.as_ref()?;
        st.level.as_ref().and_then(|level| level.room(id).cloned())
    }

    /// The id of the currently active room.
    pub async fn active_room_id(&self) -> Option<RoomId> {
        self.inner.state.lock().await.active.clone()
    }

    /// Ids of every fully loaded room, in no particular order.
    pub async fn loaded_rooms(&self) -> Vec<RoomId> {
        self.inner
            .state
            .lock()
            .await
            .loaded
            .keys()
            .cloned()
            .collect()
    }

    /// Whether `room_id` has a materialized [`RoomResource`].
    pub async fn is_loaded(&self, room_id: &RoomId) -> bool {
        self.inner.state.lock().await.loaded.contains_key(room_id)
    }

    /// Number of loads currently in flight.
    pub async fn pending_count(&self) -> usize {
        self.inner.state.lock().await.pending.len()
    }

    /// A snapshot of the room as the current level sees it.
    pub async fn room(&self, room_id: &RoomId) -> Option<Room> {
        self.inner
            .state
            .lock()
            .await
            .level
            .as_ref()
            .and_then(|level| level.room(room_id).cloned())
    }

    /// Prop and enemy instance counts for a loaded room.
    pub async fn resource_counts(&self, room_id: &RoomId) -> Option<(usize, usize)> {
        self.inner
            .state
            .lock()
            .await
            .loaded
            .get(room_id)
            .map(|r| (r.prop_count(), r.enemy_count()))
    }

    /// Subscribes to [`StreamEvent`]s. Each subscriber gets every event
    /// emitted after this call; dropping the receiver unsubscribes.
    pub async fn subscribe(&self) -> mpsc::UnboundedReceiver<StreamEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.subscribers.lock().await.push(tx);
        rx
    }

    async fn emit(&self, event: StreamEvent) {
        let mut subscribers = self.inner.subscribers.lock().await;
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Starts (or reuses, single-flight) one load per room, returning the
/// futures to await.
fn start_loads<S, T, N>(
    inner: &Arc<Inner<S, T, N>>,
    st: &mut StreamState,
    rooms: Vec<Room>,
    level_gen: u64,
) -> Vec<PendingLoad>
where
    S: ScenePort,
    T: TemplateSource,
    N: Noise2D + 'static,
{
    let mut loads = Vec::with_capacity(rooms.len());
    for room in rooms {
        let id = room.id.clone();
        let fut = match st.pending.get(&id) {
            Some((_, pending)) => pending.clone(),
            None => {
                let fut: PendingLoad = load_room(Arc::clone(inner), room, level_gen)
                    .boxed()
                    .shared();
                st.pending.insert(id, (level_gen, fut.clone()));
                // Drive the load to completion even if every awaiting
                // activation is superseded or dropped.
                tokio::spawn(fut.clone().map(|_| ()));
                fut
            }
        };
        loads.push(fut);
    }
    loads
}

/// Disposes every loaded room that is no longer retained.
fn sweep_unretained<S: ScenePort>(st: &mut StreamState, scene: &S) {
    let stale: Vec<RoomId> = st
        .loaded
        .keys()
        .filter(|id| !st.retained.contains(*id))
        .cloned()
        .collect();
    for id in stale {
        if let Some(resource) = st.loaded.remove(&id) {
            debug!(room = %id, "room unloaded");
            resource.dispose(scene);
        }
    }
}

/// The single underlying load for one room: resolve templates, derive
/// content, attach everything, then hand the resource to the controller
/// state. Exactly one of these runs per room per flight.
async fn load_room<S, T, N>(
    inner: Arc<Inner<S, T, N>>,
    room: Room,
    level_gen: u64,
) -> Result<(), StreamError>
where
    S: ScenePort,
    T: TemplateSource,
    N: Noise2D + 'static,
{
    let room_id = room.id.clone();
    debug!(room = %room_id, "room load started");

    let result = materialize(&inner, &room).await;

    let mut st = inner.state.lock().await;
    // Only remove the pending entry if it is still ours; a level reload
    // may have registered a new flight under the same room id.
    if st.pending.get(&room_id).map(|(g, _)| *g) == Some(level_gen) {
        st.pending.remove(&room_id);
    }

    let mut resource = result?;

    if st.level_gen != level_gen {
        // The level was replaced while this room was loading.
        debug!(room = %room_id, "discarding load for replaced level");
        resource.dispose(&inner.scene);
        return Ok(());
    }
    if !st.retained.contains(&room_id) {
        // Fell out of every retain set while loading.
        debug!(room = %room_id, "discarding load for unretained room");
        resource.dispose(&inner.scene);
        return Ok(());
    }

    // The room may have been cleared between snapshot and settle.
    let cleared_meanwhile = st
        .level
        .as_ref()
        .and_then(|level| level.room(&room_id))
        .is_some_and(|r| r.is_cleared);
    if cleared_meanwhile && resource.enemy_count() > 0 {
        resource.clear_enemies(&inner.scene);
    }

    debug!(
        room = %room_id,
        props = resource.prop_count(),
        enemies = resource.enemy_count(),
        "room loaded"
    );
    st.loaded.insert(room_id, resource);
    Ok(())
}

/// Resolves templates, generates content, and attaches every node for
/// one room. On any failure, everything attached so far is rolled back.
async fn materialize<S, T, N>(
    inner: &Arc<Inner<S, T, N>>,
    room: &Room,
) -> Result<RoomResource, StreamError>
where
    S: ScenePort,
    T: TemplateSource,
    N: Noise2D + 'static,
{
    let room_template = inner
        .registry
        .get(TemplateKind::Room(room.room_type))
        .await?;

    let prop_spawns = inner.content.generate_props(room);
    let enemy_spawns = inner.content.generate_enemies(room);

    // Resolve every template before attaching anything, so a missing
    // template aborts with zero presentation-side work to undo.
    let mut prop_templates = Vec::with_capacity(prop_spawns.len());
    for spawn in &prop_spawns {
        prop_templates.push(inner.registry.get(TemplateKind::Prop(spawn.kind)).await?);
    }
    let mut enemy_templates = Vec::with_capacity(enemy_spawns.len());
    for spawn in &enemy_spawns {
        enemy_templates.push(inner.registry.get(TemplateKind::Enemy(spawn.kind)).await?);
    }

    let mut attached: Vec<NodeHandle> = Vec::new();
    let scene = &inner.scene;
    let attach = |node: SceneNode| -> Result<NodeHandle, StreamError> {
        scene.attach(node).map_err(|e| StreamError::SceneAttach {
            room: room.id.clone(),
            reason: e.to_string(),
        })
    };

    let shell = attach(SceneNode {
        label: format!("room:{}", room.id),
        archetype: room_template.data().archetype.clone(),
        position: room.position,
    })?;
    attached.push(shell);

    let mut props = Vec::with_capacity(prop_spawns.len());
    let mut enemies = Vec::with_capacity(enemy_spawns.len());
    let attach_result: Result<(), StreamError> = (|| {
        for (spawn, template) in prop_spawns.iter().zip(&prop_templates) {
            let instance = template.instantiate(spawn.position);
            let handle = attach(SceneNode {
                label: format!("prop/{}@{}", spawn.kind, room.id),
                archetype: instance.data.archetype.clone(),
                position: instance.position,
            })?;
            attached.push(handle);
            props.push(PropInstance { instance, handle });
        }
        for (spawn, template) in enemy_spawns.iter().zip(&enemy_templates) {
            let instance = template.instantiate(spawn.position);
            let handle = attach(SceneNode {
                label: format!("enemy/{}@{}", spawn.kind, room.id),
                archetype: instance.data.archetype.clone(),
                position: instance.position,
            })?;
            attached.push(handle);
            enemies.push(EnemyInstance { instance, handle });
        }
        Ok(())
    })();

    if let Err(error) = attach_result {
        // Roll back partial attachment; detach errors here are already
        // a failure path, so they are only logged.
        for handle in attached {
            if let Err(detach_error) = scene.detach(handle) {
                warn!(
                    room = %room.id,
                    %detach_error,
                    "rollback detach failed"
                );
            }
        }
        return Err(error);
    }

    Ok(RoomResource::new(room.id.clone(), shell, props, enemies))
}
