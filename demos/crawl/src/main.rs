//! A console dungeon crawl: generate a level from a seed, walk from the
//! entrance to the boss, and watch rooms stream in and out.
//!
//! ```text
//! cargo run -p crawl -- <seed>
//! RUST_LOG=delve_stream=debug cargo run -p crawl -- 42
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use delve::prelude::*;

// ---------------------------------------------------------------------------
// Scene: an in-memory presentation tree that just counts nodes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryScene {
    next: AtomicU64,
    nodes: Mutex<HashMap<u64, String>>,
}

impl MemoryScene {
    fn node_count(&self) -> usize {
        self.nodes.lock().unwrap().len()
    }
}

impl ScenePort for MemoryScene {
    fn attach(&self, node: SceneNode) -> Result<NodeHandle, SceneError> {
        let id = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(label = %node.label, "attach");
        self.nodes.lock().unwrap().insert(id, node.label);
        Ok(NodeHandle(id))
    }

    fn detach(&self, handle: NodeHandle) -> Result<(), SceneError> {
        self.nodes
            .lock()
            .unwrap()
            .remove(&handle.0)
            .map(|_| ())
            .ok_or(SceneError::UnknownHandle(handle))
    }
}

// ---------------------------------------------------------------------------
// Templates: a JSON catalog, the way a real game would ship one
// ---------------------------------------------------------------------------

const CATALOG: &str = r#"{
  "room/normal":      { "display_name": "Chamber",       "archetype": "rooms/chamber" },
  "room/elite":       { "display_name": "Guard Post",    "archetype": "rooms/guard_post" },
  "room/treasure":    { "display_name": "Vault",         "archetype": "rooms/vault" },
  "room/boss":        { "display_name": "Throne Room",   "archetype": "rooms/throne" },
  "room/shop":        { "display_name": "Bazaar",        "archetype": "rooms/bazaar" },
  "room/secret":      { "display_name": "Hidden Shrine", "archetype": "rooms/shrine" },
  "prop/crate":       { "display_name": "Crate",         "archetype": "props/crate" },
  "prop/barrel":      { "display_name": "Barrel",        "archetype": "props/barrel" },
  "prop/torch":       { "display_name": "Torch",         "archetype": "props/torch" },
  "prop/rubble":      { "display_name": "Rubble",        "archetype": "props/rubble" },
  "prop/chest":       { "display_name": "Chest",         "archetype": "props/chest" },
  "prop/altar":       { "display_name": "Altar",         "archetype": "props/altar" },
  "enemy/slime":      { "display_name": "Slime",         "archetype": "enemies/slime",    "hit_points": 10 },
  "enemy/skeleton":   { "display_name": "Skeleton",      "archetype": "enemies/skeleton", "hit_points": 20 },
  "enemy/cultist":    { "display_name": "Cultist",       "archetype": "enemies/cultist",  "hit_points": 25 },
  "enemy/knight":     { "display_name": "Hollow Knight", "archetype": "enemies/knight",   "hit_points": 80 },
  "enemy/wraith":     { "display_name": "Wraith",        "archetype": "enemies/wraith",   "hit_points": 60 },
  "enemy/dungeon_lord": { "display_name": "Dungeon Lord", "archetype": "enemies/lord",    "hit_points": 400 }
}"#;

/// Serves templates from a parsed JSON catalog, keyed by the display
/// form of [`TemplateKind`] (`room/boss`, `enemy/slime`, ...).
struct CatalogSource {
    entries: HashMap<String, TemplateData>,
}

impl CatalogSource {
    fn from_json(json: &str) -> serde_json::Result<Self> {
        Ok(Self {
            entries: serde_json::from_str(json)?,
        })
    }
}

impl TemplateSource for CatalogSource {
    async fn fetch(&self, kind: TemplateKind) -> Result<TemplateData, FetchError> {
        self.entries
            .get(&kind.to_string())
            .cloned()
            .ok_or(FetchError::NotFound(kind))
    }
}

// ---------------------------------------------------------------------------
// The crawl
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let seed: u64 = std::env::args()
        .nth(1)
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or(42);

    let scene = std::sync::Arc::new(MemoryScene::default());
    let session = DelveSessionBuilder::new()
        .noise_seed(seed)
        .build(std::sync::Arc::clone(&scene), CatalogSource::from_json(CATALOG)?);
    let mut events = session.subscribe().await;

    let config = LevelConfig {
        seed,
        room_count: 10,
        branching_factor: 0.3,
        ..LevelConfig::default()
    };
    let level = session.load_level(&config).await?;
    println!("=== {} (seed {seed}, {} rooms) ===", level.name, level.rooms.len());
    for room in &level.rooms {
        let doors: Vec<String> = room
            .connections
            .iter()
            .map(|(dir, to)| format!("{dir:?}->{to}"))
            .collect();
        println!("  {:<10} {:<8} [{}]", room.id, room.room_type, doors.join(", "));
    }

    // Walk a shortest path to the boss, clearing rooms as we go.
    let entrance = level.entrance().id.clone();
    let boss = RoomId::new("boss");
    let path = shortest_path(&level, &entrance, &boss);
    println!(
        "\npath to the boss: {}",
        path.iter()
            .map(RoomId::as_str)
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    for step in path.iter().skip(1) {
        let here = session
            .active_room_id()
            .await
            .ok_or("no active room mid-crawl")?;
        session.mark_room_cleared(&here).await?;
        session.activate_room(step).await?;

        let loaded = session.loaded_rooms().await.len();
        println!(
            "entered {step:<8} ({loaded} rooms resident, {} scene nodes)",
            scene.node_count()
        );
        while let Ok(event) = events.try_recv() {
            match event {
                StreamEvent::RoomActivated(id) => println!("  * activated {id}"),
                StreamEvent::RoomCleared(id) => println!("  * cleared {id}"),
                StreamEvent::EnemiesRemoved { room_id, count } => {
                    println!("  * {count} enemies fell in {room_id}")
                }
            }
        }
    }

    session.mark_room_cleared(&boss).await?;
    println!("\nthe Dungeon Lord is dead. long live the Dungeon Lord.");
    Ok(())
}

/// BFS over room connections; panics only if `to` is unreachable, which
/// generation guarantees not to happen.
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
    path
}
