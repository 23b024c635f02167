//! Integration tests for the content generation determinism contract:
//! the same `(room_type, seed)` must reproduce identical spawn lists.

use delve_content::{ContentGenerator, GradientNoise, Noise2D};
use delve_level::{LevelConfig, LevelGenerator, Position, Room, RoomId, RoomType};

fn room(room_type: RoomType, seed: u64) -> Room {
    Room {
        id: RoomId::new("test"),
        room_type,
        position: Position::new(48.0, 24.0),
        seed,
        connections: Vec::new(),
        is_entrance: false,
        is_cleared: false,
    }
}

fn generator() -> ContentGenerator<GradientNoise> {
    ContentGenerator::new(GradientNoise::new(1000))
}

#[test]
fn test_props_are_reproducible() {
    let g = generator();
    for seed in [0_u64, 1, 42, u64::MAX] {
        for room_type in [
            RoomType::Normal,
            RoomType::Elite,
            RoomType::Treasure,
            RoomType::Boss,
            RoomType::Shop,
            RoomType::Secret,
        ] {
            let r = room(room_type, seed);
            assert_eq!(
                g.generate_props(&r),
                g.generate_props(&r),
                "props diverged for {room_type:?} seed {seed}"
            );
        }
    }
}

#[test]
fn test_enemies_are_reproducible() {
    let g = generator();
    for seed in [0_u64, 7, 99, 12_345_678] {
        let r = room(RoomType::Normal, seed);
        assert_eq!(g.generate_enemies(&r), g.generate_enemies(&r));
    }
}

#[test]
fn test_two_generator_instances_agree() {
    // Reproducibility must survive process restarts; two independently
    // constructed generators with the same noise seed stand in for that.
    let a = ContentGenerator::new(GradientNoise::new(1000));
    let b = ContentGenerator::new(GradientNoise::new(1000));
    let r = room(RoomType::Elite, 777);
    assert_eq!(a.generate_enemies(&r), b.generate_enemies(&r));
    assert_eq!(a.generate_props(&r), b.generate_props(&r));
}

#[test]
fn test_different_seeds_give_different_content() {
    let g = generator();
    let a = g.generate_props(&room(RoomType::Normal, 1));
    let b = g.generate_props(&room(RoomType::Normal, 2));
    assert_ne!(a, b, "distinct seeds should not collide on identical props");
}

#[test]
fn test_cleared_flag_beats_everything() {
    let g = generator();
    for room_type in [RoomType::Normal, RoomType::Elite, RoomType::Boss] {
        let mut r = room(room_type, 5);
        r.is_cleared = true;
        assert!(
            g.generate_enemies(&r).is_empty(),
            "{room_type:?} spawned enemies despite being cleared"
        );
    }
}

#[test]
fn test_content_for_generated_level_rooms() {
    // End-to-end determinism: generate a level, then content for every
    // room, twice, and compare.
    let config = LevelConfig {
        seed: 2024,
        room_count: 10,
        branching_factor: 0.5,
        ..LevelConfig::default()
    };
    let level = LevelGenerator::generate(&config).unwrap();
    let g = generator();

    for r in &level.rooms {
        assert_eq!(g.generate_props(r), g.generate_props(r));
        assert_eq!(g.generate_enemies(r), g.generate_enemies(r));
        if r.room_type == RoomType::Boss {
            assert_eq!(g.generate_enemies(r).len(), 1);
        }
    }
}

#[test]
fn test_custom_noise_port_is_honored() {
    // A constant-field noise impl keeps every spawn on the unperturbed
    // ring radius, which proves the port is actually consulted.
    struct Flat;
    impl Noise2D for Flat {
        fn sample(&self, _x: f64, _y: f64) -> f64 {
            0.0
        }
    }

    let g = ContentGenerator::new(Flat);
    let r = room(RoomType::Treasure, 3);
    let props = g.generate_props(&r);
    for p in &props {
        let dx = f64::from(p.position.x - 48.0);
        let dy = f64::from(p.position.y - 24.0);
        let dist = (dx * dx + dy * dy).sqrt();
        assert!((dist - 7.5).abs() < 1e-3, "expected flat ring, got {dist}");
    }
}
