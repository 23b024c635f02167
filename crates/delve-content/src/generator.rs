//! Room content derivation.
//!
//! `generate_props` and `generate_enemies` are pure in `(room_type,
//! seed)`: each call builds its own `ChaCha8Rng` from the room seed, so
//! repeated calls — including after the room was unloaded and reloaded —
//! produce identical lists.

use delve_level::{Position, Room, RoomType};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::noise::Noise2D;
use crate::spawn::{EnemyKind, EnemySpawn, PropKind, PropSpawn};

/// Golden angle in radians. Successive spawn points step by this, which
/// spreads them around the room center without visible alignment.
const ANGLE_STEP: f64 = 2.399_963_229_728_653;

/// Base placement radii, in world units.
const PROP_RADIUS: f64 = 7.5;
const ENEMY_RADIUS: f64 = 4.5;

/// How strongly noise perturbs the placement radius (fraction of base).
const RADIUS_WOBBLE: f64 = 0.35;

/// Stream separators so props and enemies of the same room don't draw
/// from identical rng sequences.
const PROP_STREAM: u64 = 0x50524F50; // "PROP"
const ENEMY_STREAM: u64 = 0x464F4553; // "FOES"

/// Minion species available to normal/elite/secret rooms.
const MINIONS: [EnemyKind; 3] =
    [EnemyKind::Slime, EnemyKind::Skeleton, EnemyKind::Cultist];

/// Elite-tier species leading an elite room.
const ELITES: [EnemyKind; 2] = [EnemyKind::Knight, EnemyKind::Wraith];

/// Derives prop and enemy spawn lists from a room's type and seed.
pub struct ContentGenerator<N: Noise2D> {
    noise: N,
}

impl<N: Noise2D> ContentGenerator<N> {
    pub fn new(noise: N) -> Self {
        Self { noise }
    }

    /// Prop spawns for a room. Density follows the room type: boss rooms
    /// are the most dressed, treasure rooms the sparsest (but always
    /// contain a chest).
    pub fn generate_props(&self, room: &Room) -> Vec<PropSpawn> {
        let mut rng = room_rng(room.seed, PROP_STREAM);

        let (count, lead, pool): (usize, Option<PropKind>, &[PropKind]) =
            match room.room_type {
                RoomType::Boss => (
                    rng.random_range(8..=10),
                    None,
                    &[PropKind::Torch, PropKind::Rubble, PropKind::Altar],
                ),
                RoomType::Elite => (
                    rng.random_range(5..=6),
                    None,
                    &[PropKind::Torch, PropKind::Rubble, PropKind::Barrel],
                ),
                RoomType::Treasure => (
                    3,
                    Some(PropKind::Chest),
                    &[PropKind::Torch, PropKind::Crate],
                ),
                RoomType::Shop => (
                    4,
                    None,
                    &[PropKind::Crate, PropKind::Barrel, PropKind::Torch],
                ),
                RoomType::Secret => (
                    4,
                    Some(PropKind::Altar),
                    &[PropKind::Torch, PropKind::Rubble],
                ),
                RoomType::Normal => (
                    rng.random_range(4..=5),
                    None,
                    &[
                        PropKind::Crate,
                        PropKind::Barrel,
                        PropKind::Torch,
                        PropKind::Rubble,
                    ],
                ),
            };

        let mut spawns = Vec::with_capacity(count);
        for i in 0..count {
            let kind = match (i, lead) {
                (0, Some(k)) => k,
                _ => pool[rng.random_range(0..pool.len())],
            };
            spawns.push(PropSpawn {
                kind,
                position: self.ring_position(room, i, PROP_RADIUS),
            });
        }

        tracing::trace!(room = %room.id, count = spawns.len(), "props generated");
        spawns
    }

    /// Enemy spawns for a room.
    ///
    /// Cleared rooms always yield an empty list — clearing is permanent,
    /// reloads never respawn. Treasure and shop rooms are safe by design.
    pub fn generate_enemies(&self, room: &Room) -> Vec<EnemySpawn> {
        if room.is_cleared {
            return Vec::new();
        }

        let mut rng = room_rng(room.seed, ENEMY_STREAM);

        let kinds: Vec<EnemyKind> = match room.room_type {
            RoomType::Boss => vec![EnemyKind::DungeonLord],
            RoomType::Elite => {
                let mut k = vec![ELITES[rng.random_range(0..ELITES.len())]];
                for _ in 0..rng.random_range(2..=3) {
                    k.push(MINIONS[rng.random_range(0..MINIONS.len())]);
                }
                k
            }
            RoomType::Normal => (0..rng.random_range(2..=4))
                .map(|_| MINIONS[rng.random_range(0..MINIONS.len())])
                .collect(),
            RoomType::Secret => {
                vec![MINIONS[rng.random_range(0..MINIONS.len())]]
            }
            RoomType::Treasure | RoomType::Shop => Vec::new(),
        };

        let spawns: Vec<EnemySpawn> = kinds
            .into_iter()
            .enumerate()
            .map(|(i, kind)| {
                EnemySpawn::new(kind, self.ring_position(room, i, ENEMY_RADIUS))
            })
            .collect();

        tracing::trace!(room = %room.id, count = spawns.len(), "enemies generated");
        spawns
    }

    /// Places the `index`-th spawn on a ring around the room center.
    ///
    /// The radius is perturbed by noise sampled at
    /// `(cos(angle) * s, sin(angle) * s)` where `s` projects the room seed
    /// onto the noise domain — organic-looking, exactly reproducible.
    fn ring_position(&self, room: &Room, index: usize, base_radius: f64) -> Position {
        let angle = index as f64 * ANGLE_STEP;
        let s = seed_projection(room.seed);
        let wobble = self.noise.sample(angle.cos() * s, angle.sin() * s);
        let radius = base_radius * (1.0 + RADIUS_WOBBLE * wobble);
        room.position
            .offset((angle.cos() * radius) as f32, (angle.sin() * radius) as f32)
    }
}

/// One rng per call, decorrelated per use by a stream constant.
fn room_rng(seed: u64, stream: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Projects a 64-bit seed onto a small float range usable as noise
/// coordinates (large magnitudes would alias the lattice).
fn seed_projection(seed: u64) -> f64 {
    (seed % 8192) as f64 / 64.0
}

#[cfg(test)]
mod tests {
    use delve_level::RoomId;

    use super::*;
    use crate::noise::GradientNoise;

    fn room(room_type: RoomType, seed: u64) -> Room {
        Room {
            id: RoomId::new("r"),
            room_type,
            position: Position::new(10.0, -4.0),
            seed,
            connections: Vec::new(),
            is_entrance: false,
            is_cleared: false,
        }
    }

    fn generator() -> ContentGenerator<GradientNoise> {
        ContentGenerator::new(GradientNoise::new(7))
    }

    #[test]
    fn test_boss_room_has_single_boss() {
        let enemies = generator().generate_enemies(&room(RoomType::Boss, 5));
        assert_eq!(enemies.len(), 1);
        assert_eq!(enemies[0].kind, EnemyKind::DungeonLord);
        assert_eq!(enemies[0].tier, crate::EnemyTier::Boss);
    }

    #[test]
    fn test_elite_room_has_one_elite_plus_minions() {
        let enemies = generator().generate_enemies(&room(RoomType::Elite, 5));
        let elites = enemies
            .iter()
            .filter(|e| e.tier == crate::EnemyTier::Elite)
            .count();
        let minions = enemies
            .iter()
            .filter(|e| e.tier == crate::EnemyTier::Minion)
            .count();
        assert_eq!(elites, 1);
        assert!((2..=3).contains(&minions));
    }

    #[test]
    fn test_treasure_room_is_safe_and_has_chest() {
        let g = generator();
        let r = room(RoomType::Treasure, 5);
        assert!(g.generate_enemies(&r).is_empty());
        let props = g.generate_props(&r);
        assert_eq!(props.len(), 3);
        assert_eq!(props[0].kind, PropKind::Chest);
    }

    #[test]
    fn test_cleared_room_spawns_no_enemies() {
        let mut r = room(RoomType::Normal, 5);
        r.is_cleared = true;
        assert!(generator().generate_enemies(&r).is_empty());
        // Props are unaffected by clearing.
        assert!(!generator().generate_props(&r).is_empty());
    }

    #[test]
    fn test_positions_offset_from_room_center() {
        let props = generator().generate_props(&room(RoomType::Normal, 9));
        for p in &props {
            let dx = f64::from(p.position.x - 10.0);
            let dy = f64::from(p.position.y - -4.0);
            let dist = (dx * dx + dy * dy).sqrt();
            let max = PROP_RADIUS * (1.0 + RADIUS_WOBBLE) + 1e-3;
            assert!(dist <= max, "prop {dist} beyond max radius {max}");
            assert!(dist > 0.1, "prop stacked on room center");
        }
    }
}
