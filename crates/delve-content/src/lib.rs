//! Deterministic per-room content generation for Delve.
//!
//! Spawn lists are pure functions of `(room_type, room seed)`: generating
//! the same room twice — including after an unload/reload cycle — yields
//! byte-identical output. All randomness comes from a `ChaCha8Rng` seeded
//! with the room's own seed, and placement wobble comes from a seeded
//! [`Noise2D`] implementation.
//!
//! # Key types
//!
//! - [`ContentGenerator`] — `Room` → prop/enemy spawn lists
//! - [`Noise2D`] / [`GradientNoise`] — the deterministic noise port and
//!   the built-in implementation
//! - [`PropSpawn`] / [`EnemySpawn`] — what gets instantiated into a room

mod generator;
mod noise;
mod spawn;

pub use generator::ContentGenerator;
pub use noise::{GradientNoise, Noise2D};
pub use spawn::{EnemyKind, EnemySpawn, EnemyTier, PropKind, PropSpawn};
