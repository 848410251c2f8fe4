//! Commit-Reveal Draw Randomness
//!
//! Each player commits to a private seed at join time by publishing
//! `H(domain || seed)`. A draw mixes the ledger's unpredictable value for the
//! current anchor with that seed:
//!
//! ```text
//! random_value = SHA256("VEILED_DUEL_DRAW_MIX_V1" || ledger_value || seed)
//! draw_index   = random_value mod deck_size
//! ```
//!
//! The ledger value alone does not reveal the result (the seed is private)
//! and the seed alone does not predict it (the ledger value does not exist
//! until the anchor is produced). Only the draw proof ever sees the seed.

use std::fmt;

use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

use super::hash::StateHash;

/// Domain separator for seed commitments.
const SEED_COMMIT_DOMAIN: &[u8] = b"VEILED_DUEL_SEED_COMMIT_V1";

/// Domain separator for the draw mix.
const DRAW_MIX_DOMAIN: &[u8] = b"VEILED_DUEL_DRAW_MIX_V1";

/// A player's private seed.
///
/// Never placed on the ledger. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSeed([u8; 32]);

impl PlayerSeed {
    /// Wrap raw seed bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive a seed from arbitrary secret material.
    pub fn from_secret(material: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"VEILED_DUEL_SEED_V1");
        hasher.update(material);
        Self(hasher.finalize().into())
    }

    /// Raw seed bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The public commitment to this seed.
    pub fn commitment(&self) -> StateHash {
        commit_seed(self)
    }
}

impl fmt::Debug for PlayerSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlayerSeed(..)")
    }
}

/// 256-bit mixed draw value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomValue(pub StateHash);

impl RandomValue {
    /// Reduce the value modulo `modulus`, reading it as a big-endian integer.
    ///
    /// Returns `None` for a zero modulus.
    pub fn reduce(&self, modulus: u32) -> Option<u32> {
        if modulus == 0 {
            return None;
        }
        let m = modulus as u64;
        // acc < m <= 2^32, so acc << 8 stays below 2^40
        let rem = self.0.iter().fold(0u64, |acc, byte| ((acc << 8) | *byte as u64) % m);
        Some(rem as u32)
    }
}

/// Compute the public commitment `H(domain || seed)`.
pub fn commit_seed(seed: &PlayerSeed) -> StateHash {
    let mut hasher = Sha256::new();
    hasher.update(SEED_COMMIT_DOMAIN);
    hasher.update(seed.0);
    hasher.finalize().into()
}

/// Check a seed against a published commitment.
pub fn seed_matches(seed: &PlayerSeed, commitment: &StateHash) -> bool {
    commit_seed(seed) == *commitment
}

/// One-way combination of the ledger value and the private seed.
pub fn mix(ledger_value: &StateHash, seed: &PlayerSeed) -> RandomValue {
    let mut hasher = Sha256::new();
    hasher.update(DRAW_MIX_DOMAIN);
    hasher.update(ledger_value);
    hasher.update(seed.0);
    RandomValue(hasher.finalize().into())
}

/// Index of the card drawn from a deck of `deck_size` cards.
///
/// Returns `None` when the deck is empty.
pub fn draw_index(ledger_value: &StateHash, seed: &PlayerSeed, deck_size: u32) -> Option<u32> {
    mix(ledger_value, seed).reduce(deck_size)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::RngCore;

    fn random_seed() -> PlayerSeed {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        PlayerSeed::new(bytes)
    }

    #[test]
    fn test_mix_determinism() {
        let seed = PlayerSeed::new([3; 32]);
        let ledger_value = [9; 32];

        assert_eq!(mix(&ledger_value, &seed), mix(&ledger_value, &seed));
    }

    #[test]
    fn test_different_seeds_different_values() {
        let ledger_value = [1; 32];
        let a = random_seed();
        let b = random_seed();

        assert_ne!(a, b);
        assert_ne!(mix(&ledger_value, &a), mix(&ledger_value, &b));
    }

    #[test]
    fn test_ledger_value_changes_result() {
        let seed = PlayerSeed::new([3; 32]);
        assert_ne!(mix(&[1; 32], &seed), mix(&[2; 32], &seed));
    }

    #[test]
    fn test_mix_differs_from_commitment() {
        // Knowing the public commitment must not give away the mix.
        let seed = PlayerSeed::new([5; 32]);
        let commitment = seed.commitment();
        assert_ne!(mix(&commitment, &seed).0, commitment);
    }

    #[test]
    fn test_seed_commitment() {
        let seed = PlayerSeed::from_secret(b"alice");
        let commitment = commit_seed(&seed);

        assert!(seed_matches(&seed, &commitment));
        assert!(!seed_matches(&PlayerSeed::from_secret(b"bob"), &commitment));
    }

    #[test]
    fn test_reduce_big_endian() {
        let mut value = [0u8; 32];
        value[30] = 0x01; // 256
        let value = RandomValue(value);

        assert_eq!(value.reduce(7), Some(256 % 7));
        assert_eq!(value.reduce(1), Some(0));
        assert_eq!(value.reduce(0), None);
    }

    #[test]
    fn test_reduce_max_value() {
        // 2^256 - 1 is divisible by 3, 5 and 17.
        let value = RandomValue([0xff; 32]);
        assert_eq!(value.reduce(3), Some(0));
        assert_eq!(value.reduce(5), Some(0));
        assert_eq!(value.reduce(17), Some(0));
    }

    #[test]
    fn test_empty_deck_has_no_index() {
        let seed = PlayerSeed::new([1; 32]);
        assert_eq!(draw_index(&[0; 32], &seed, 0), None);
    }

    #[test]
    fn test_seed_debug_redacted() {
        let seed = PlayerSeed::new([0xaa; 32]);
        assert_eq!(format!("{:?}", seed), "PlayerSeed(..)");
    }

    proptest! {
        #[test]
        fn prop_draw_index_in_range(
            ledger_value in any::<[u8; 32]>(),
            seed in any::<[u8; 32]>(),
            deck_size in 1u32..=10_000,
        ) {
            let seed = PlayerSeed::new(seed);
            let index = draw_index(&ledger_value, &seed, deck_size).unwrap();
            prop_assert!(index < deck_size);
            prop_assert_eq!(Some(index), draw_index(&ledger_value, &seed, deck_size));
        }
    }
}
