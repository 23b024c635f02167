//! End-to-end test of the session facade: generate, stream, clear.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicU64, Ordering};

use delve::prelude::*;

#[derive(Default)]
struct RecordingScene {
    next: AtomicU64,
    live: StdMutex<HashMap<u64, String>>,
}

impl ScenePort for RecordingScene {
    fn attach(&self, node: SceneNode) -> Result<NodeHandle, SceneError> {
        let id = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        self.live.lock().unwrap().insert(id, node.label);
        Ok(NodeHandle(id))
    }

    fn detach(&self, handle: NodeHandle) -> Result<(), SceneError> {
        self.live
            .lock()
            .unwrap()
            .remove(&handle.0)
            .map(|_| ())
            .ok_or(SceneError::UnknownHandle(handle))
    }
}

fn catalog() -> StaticSource {
    let mut source = StaticSource::default();
    for room_type in [
        RoomType::Normal,
        RoomType::Elite,
        RoomType::Treasure,
        RoomType::Boss,
        RoomType::Shop,
        RoomType::Secret,
    ] {
        source = source.with(
            TemplateKind::Room(room_type),
            StaticSource::entry(&room_type.to_string(), &format!("rooms/{room_type}")),
        );
    }
    for prop in [
        PropKind::Crate,
        PropKind::Barrel,
        PropKind::Torch,
        PropKind::Rubble,
        PropKind::Chest,
        PropKind::Altar,
    ] {
        source = source.with(
            TemplateKind::Prop(prop),
            StaticSource::entry(&prop.to_string(), &format!("props/{prop}")),
        );
    }
    for enemy in [
        EnemyKind::Slime,
        EnemyKind::Skeleton,
        EnemyKind::Cultist,
        EnemyKind::Knight,
        EnemyKind::Wraith,
        EnemyKind::DungeonLord,
    ] {
        source = source.with(
            TemplateKind::Enemy(enemy),
            StaticSource::entry(&enemy.to_string(), &format!("enemies/{enemy}")),
        );
    }
    source
}

#[tokio::test]
async fn test_full_run_from_entrance_to_boss() {
    let scene = Arc::new(RecordingScene::default());
    let session = DelveSessionBuilder::new()
        .noise_seed(99)
        .build(Arc::clone(&scene), catalog());
    let mut events = session.subscribe().await;

    let config = LevelConfig {
        seed: 2024,
        room_count: 10,
        ..LevelConfig::default()
    };
    let level = session.load_level(&config).await.unwrap();
    let entrance = level.entrance().id.clone();
    let active = session.active_room().await.unwrap();
    assert_eq!(active.id, entrance);
    assert!(active.is_entrance);
    assert_eq!(
        events.try_recv().unwrap(),
        StreamEvent::RoomActivated(entrance.clone())
    );

    // Walk a shortest path entrance -> boss, clearing each room.
    let boss = RoomId::new("boss");
    let path = shortest_path(&level, &entrance, &boss);
    assert!(path.len() >= 2, "boss reachable from entrance");

    for room_id in path.iter().skip(1) {
        let here = session.active_room_id().await.unwrap();
        session.mark_room_cleared(&here).await.unwrap();
        let outcome = session.activate_room(room_id).await.unwrap();
        assert_eq!(outcome, ActivationOutcome::Activated);
    }
    assert_eq!(session.active_room_id().await, Some(boss.clone()));

    // Cleared rooms along the way stay cleared in the level snapshot.
    for room_id in path.iter().take(path.len() - 1) {
        assert!(session.room(room_id).await.unwrap().is_cleared);
    }

    // Exactly the boss wing is materialized at the end.
    let mut loaded = session.loaded_rooms().await;
    loaded.sort();
    let mut expected = level.neighbors(&boss);
    expected.push(boss.clone());
    expected.sort();
    assert_eq!(loaded, expected);
}

#[tokio::test]
async fn test_same_seed_same_run() {
    let config = LevelConfig {
        seed: 7,
        room_count: 8,
        ..LevelConfig::default()
    };

    let mut snapshots = Vec::new();
    for _ in 0..2 {
        let scene = Arc::new(RecordingScene::default());
        let session = DelveSessionBuilder::new().build(Arc::clone(&scene), catalog());
        session.load_level(&config).await.unwrap();

        let mut labels: Vec<String> =
            scene.live.lock().unwrap().values().cloned().collect();
        labels.sort();
        snapshots.push(labels);
    }
    assert_eq!(snapshots[0], snapshots[1]);
}

/// BFS over room connections.
fn shortest_path(level: &Level, from: &RoomId, to: &RoomId) -> Vec<RoomId> {
    use std::collections::VecDeque;
    let mut prev: HashMap<RoomId, RoomId> = HashMap::new();
    let mut queue = VecDeque::from([from.clone()]);
    while let Some(id) = queue.pop_front() {
        if id == *to {
            break;
        }
        for next in level.neighbors(&id) {
            if next != *from && !prev.contains_key(&next) {
                prev.insert(next.clone(), id.clone());
                queue.push_back(next);
            }
        }
    }
    let mut path = vec![to.clone()];
    while let Some(p) = prev.get(path.last().unwrap()) {
        path.push(p.clone());
    }
    path.reverse();
    assert_eq!(path.first(), Some(from));
    path
}
