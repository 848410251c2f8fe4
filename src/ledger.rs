//! Ledger Execution Context
//!
//! The engine consumes two things from the ledger it runs on: a monotonically
//! advancing anchor (block height, round number) and an unpredictable value
//! bound to each anchor. Caller identity is passed to the engine explicitly
//! with every action.

use std::fmt;

use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, StateHasher};

/// Reference to a ledger position whose unpredictable value feeds draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RandomnessAnchor(pub u64);

impl RandomnessAnchor {
    /// The anchor one position later.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for RandomnessAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Capability supplied by the ledger execution context.
pub trait Ledger {
    /// Most recent anchor available to the executing transaction.
    fn latest_anchor(&self) -> RandomnessAnchor;

    /// Unpredictable value tied to `anchor`.
    ///
    /// `None` when the ledger cannot (or can no longer) supply it.
    fn unpredictable_value(&self, anchor: RandomnessAnchor) -> Option<StateHash>;
}

impl<L: Ledger + ?Sized> Ledger for &L {
    fn latest_anchor(&self) -> RandomnessAnchor {
        (**self).latest_anchor()
    }

    fn unpredictable_value(&self, anchor: RandomnessAnchor) -> Option<StateHash> {
        (**self).unpredictable_value(anchor)
    }
}

/// Hash-chained in-memory ledger for local play and tests.
///
/// Block `n` carries `H(domain || n || value(n - 1))`, starting from a genesis
/// value derived from the chain seed. With a retention window only the most
/// recent blocks answer `unpredictable_value`, like a chain that serves a
/// bounded number of past block hashes.
#[derive(Clone, Debug)]
pub struct InMemoryLedger {
    values: Vec<StateHash>,
    retention: Option<u64>,
}

impl InMemoryLedger {
    /// Create a ledger at height 0 that keeps every value.
    pub fn new(chain_seed: &[u8]) -> Self {
        let mut hasher = StateHasher::new(b"VEILED_DUEL_GENESIS_V1");
        hasher.update_bytes(chain_seed);
        Self {
            values: vec![hasher.finalize()],
            retention: None,
        }
    }

    /// Create a ledger that only serves the `blocks` most recent values.
    pub fn with_retention(chain_seed: &[u8], blocks: u64) -> Self {
        Self {
            retention: Some(blocks),
            ..Self::new(chain_seed)
        }
    }

    /// Produce the next block and return its anchor.
    pub fn advance(&mut self) -> RandomnessAnchor {
        let height = self.values.len() as u64;
        let mut hasher = StateHasher::new(b"VEILED_DUEL_BLOCK_V1");
        hasher.update_u64(height);
        if let Some(prev) = self.values.last() {
            hasher.update_hash(prev);
        }
        self.values.push(hasher.finalize());
        RandomnessAnchor(height)
    }

    /// Current height.
    pub fn height(&self) -> u64 {
        self.values.len() as u64 - 1
    }
}

impl Ledger for InMemoryLedger {
    fn latest_anchor(&self) -> RandomnessAnchor {
        RandomnessAnchor(self.height())
    }

    fn unpredictable_value(&self, anchor: RandomnessAnchor) -> Option<StateHash> {
        if let Some(blocks) = self.retention {
            if self.height().saturating_sub(anchor.0) >= blocks {
                return None;
            }
        }
        usize::try_from(anchor.0)
            .ok()
            .and_then(|index| self.values.get(index))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_advances() {
        let mut ledger = InMemoryLedger::new(b"test");
        assert_eq!(ledger.latest_anchor(), RandomnessAnchor(0));

        let anchor = ledger.advance();
        assert_eq!(anchor, RandomnessAnchor(1));
        assert_eq!(ledger.latest_anchor(), anchor);
    }

    #[test]
    fn test_values_are_distinct_and_stable() {
        let mut ledger = InMemoryLedger::new(b"test");
        ledger.advance();
        ledger.advance();

        let v0 = ledger.unpredictable_value(RandomnessAnchor(0)).unwrap();
        let v1 = ledger.unpredictable_value(RandomnessAnchor(1)).unwrap();
        let v2 = ledger.unpredictable_value(RandomnessAnchor(2)).unwrap();
        assert_ne!(v0, v1);
        assert_ne!(v1, v2);

        ledger.advance();
        assert_eq!(ledger.unpredictable_value(RandomnessAnchor(1)), Some(v1));
    }

    #[test]
    fn test_future_anchor_unavailable() {
        let ledger = InMemoryLedger::new(b"test");
        assert!(ledger.unpredictable_value(RandomnessAnchor(5)).is_none());
    }

    #[test]
    fn test_next_anchor_has_no_value_yet() {
        let mut ledger = InMemoryLedger::new(b"test");
        let pending = ledger.latest_anchor().next();
        assert!(ledger.unpredictable_value(pending).is_none());

        ledger.advance();
        assert!(ledger.unpredictable_value(pending).is_some());
    }

    #[test]
    fn test_retention_drops_old_values() {
        let mut ledger = InMemoryLedger::with_retention(b"test", 2);
        for _ in 0..3 {
            ledger.advance();
        }

        assert!(ledger.unpredictable_value(RandomnessAnchor(1)).is_none());
        assert!(ledger.unpredictable_value(RandomnessAnchor(2)).is_some());
        assert!(ledger.unpredictable_value(RandomnessAnchor(3)).is_some());
        assert!(ledger.unpredictable_value(RandomnessAnchor(0)).is_none());
    }

    #[test]
    fn test_chain_seed_matters() {
        let a = InMemoryLedger::new(b"a");
        let b = InMemoryLedger::new(b"b");
        assert_ne!(
            a.unpredictable_value(RandomnessAnchor(0)),
            b.unpredictable_value(RandomnessAnchor(0)),
        );
    }
}
