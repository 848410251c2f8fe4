//! Commitment Store
//!
//! The public half of a player's private state: hand and deck roots plus the
//! collection sizes. Updates come only from an [`AcceptedTransition`] minted
//! by the proof gate.

use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, StateHasher, ZERO_HASH};
use crate::proof::gate::AcceptedTransition;

/// Committed roots and public sizes of one player's hand and deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitments {
    hand_root: StateHash,
    deck_root: StateHash,
    hand_size: u32,
    deck_size: u32,
}

impl Default for Commitments {
    fn default() -> Self {
        Self::new(ZERO_HASH, ZERO_HASH, 0, 0)
    }
}

impl Commitments {
    /// Describe a set of roots. Building a value does not install it.
    pub const fn new(hand_root: StateHash, deck_root: StateHash, hand_size: u32, deck_size: u32) -> Self {
        Self { hand_root, deck_root, hand_size, deck_size }
    }

    /// Root of the committed hand.
    pub fn hand_root(&self) -> StateHash {
        self.hand_root
    }

    /// Root of the committed deck.
    pub fn deck_root(&self) -> StateHash {
        self.deck_root
    }

    /// Cards in hand.
    pub fn hand_size(&self) -> u32 {
        self.hand_size
    }

    /// Cards left in the deck.
    pub fn deck_size(&self) -> u32 {
        self.deck_size
    }

    /// Roots after one card (at a private index) moved from deck to hand.
    pub fn after_draw(&self, new_hand_root: StateHash, new_deck_root: StateHash) -> Self {
        Self::new(
            new_hand_root,
            new_deck_root,
            self.hand_size.saturating_add(1),
            self.deck_size.saturating_sub(1),
        )
    }

    /// Roots after one card left the hand for the board.
    pub fn after_play(&self, new_hand_root: StateHash) -> Self {
        Self::new(
            new_hand_root,
            self.deck_root,
            self.hand_size.saturating_sub(1),
            self.deck_size,
        )
    }

    /// Install the roots attested by an accepted proof.
    pub(crate) fn apply(&mut self, accepted: &AcceptedTransition) {
        *self = accepted.next();
    }

    /// Hash into public state.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_hash(&self.hand_root);
        hasher.update_hash(&self.deck_root);
        hasher.update_u32(self.hand_size);
        hasher.update_u32(self.deck_size);
    }
}
