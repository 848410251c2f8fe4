//! Domain-Separated Hashing
//!
//! SHA-256 helpers shared by the commitment store, the randomness adapter
//! and public state hashing. Every digest in the crate is produced through
//! a domain separator so values computed for one purpose can never be
//! replayed as another.

use sha2::{Sha256, Digest};

/// Hash output type (256 bits / 32 bytes).
pub type StateHash = [u8; 32];

/// The all-zero digest, used for roots that have not been committed yet.
pub const ZERO_HASH: StateHash = [0; 32];

/// Deterministic hasher for ledger-visible state.
///
/// Wraps SHA-256 with typed update helpers.
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for public game state.
    pub fn for_game_state() -> Self {
        Self::new(b"VEILED_DUEL_STATE_V1")
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Update with a 16-byte identifier.
    #[inline]
    pub fn update_id(&mut self, id: &[u8; 16]) {
        self.hasher.update(id);
    }

    /// Update with another digest.
    #[inline]
    pub fn update_hash(&mut self, hash: &StateHash) {
        self.hasher.update(hash);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute a simple hash of arbitrary data.
pub fn hash_bytes(data: &[u8]) -> StateHash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute hash with domain separator.
pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> StateHash {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    hasher.finalize().into()
}

/// Short hex prefix of a digest for log lines.
pub fn short_hex(hash: &StateHash) -> String {
    hex::encode(&hash[..4])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_hasher_determinism() {
        let make_hash = || {
            let mut hasher = StateHasher::for_game_state();
            hasher.update_u32(100);
            hasher.update_u64(12345);
            hasher.update_id(&[7; 16]);
            hasher.update_bool(true);
            hasher.finalize()
        };

        assert_eq!(make_hash(), make_hash());
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(1);
            h.update_u32(2);
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(2);
            h.update_u32(1);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_domain_separation() {
        let data = [1u8, 2, 3, 4];

        let hash1 = hash_with_domain(b"DOMAIN_A", &data);
        let hash2 = hash_with_domain(b"DOMAIN_B", &data);

        assert_ne!(hash1, hash2);
        assert_ne!(hash1, hash_bytes(&data));
    }

    #[test]
    fn test_short_hex() {
        let mut hash = ZERO_HASH;
        hash[0] = 0xab;
        hash[3] = 0x01;
        assert_eq!(short_hex(&hash), "ab000001");
    }
}
