//! Core deterministic primitives.
//!
//! Hashing and commit-reveal randomness. Nothing here touches game rules.

pub mod hash;
pub mod rng;

// Re-export core types
pub use hash::{StateHash, StateHasher, ZERO_HASH};
pub use rng::{PlayerSeed, RandomValue, commit_seed, mix, draw_index};
