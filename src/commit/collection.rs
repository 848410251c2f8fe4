//! Committed Card Collections
//!
//! A hand or deck is an ordered list of card ids. Its commitment is a Merkle
//! root over salted, position-tagged leaves, wrapped with the collection kind
//! and length:
//!
//! ```text
//! salt   = SHA256("VEILED_DUEL_SALT_V1" || seed || kind)
//! leaf_i = salt || i (u32 LE) || card_id (u32 LE)
//! root   = SHA256("VEILED_DUEL_ROOT_V1" || kind || len (u32 LE) || merkle_root)
//! ```
//!
//! The salt is derived from the player's private seed, so a small hand cannot
//! be recovered by enumerating candidate contents.

use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

use crate::commit::merkle::MerkleTree;
use crate::core::hash::StateHash;
use crate::core::rng::PlayerSeed;
use crate::game::card::CardId;

const SALT_DOMAIN: &[u8] = b"VEILED_DUEL_SALT_V1";
const ROOT_DOMAIN: &[u8] = b"VEILED_DUEL_ROOT_V1";

/// Which private collection a root commits to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CollectionKind {
    /// Cards held in hand.
    Hand = 0,
    /// Cards remaining in the deck.
    Deck = 1,
}

/// A private, ordered collection of cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCollection {
    kind: CollectionKind,
    cards: Vec<CardId>,
}

impl CardCollection {
    /// Create a collection.
    pub fn new(kind: CollectionKind, cards: Vec<CardId>) -> Self {
        Self { kind, cards }
    }

    /// Empty collection of the given kind.
    pub fn empty(kind: CollectionKind) -> Self {
        Self::new(kind, Vec::new())
    }

    /// Collection kind.
    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Cards in slot order.
    pub fn cards(&self) -> &[CardId] {
        &self.cards
    }

    /// Logical length.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Logical length as committed on the ledger.
    pub fn size(&self) -> u32 {
        self.cards.len() as u32
    }

    /// First slot holding `card`.
    pub fn position(&self, card: CardId) -> Option<usize> {
        self.cards.iter().position(|c| *c == card)
    }

    /// Append a card at the end.
    pub fn push(&mut self, card: CardId) {
        self.cards.push(card);
    }

    /// Remove the card at `index`: the last slot moves into its place and the
    /// length shrinks by one.
    pub fn swap_remove(&mut self, index: usize) -> Option<CardId> {
        if index < self.cards.len() {
            Some(self.cards.swap_remove(index))
        } else {
            None
        }
    }

    /// Commitment root under the given seed.
    pub fn root(&self, seed: &PlayerSeed) -> StateHash {
        collection_root(self.kind, seed, &self.cards)
    }
}

/// Per-collection salt derived from the private seed.
fn collection_salt(kind: CollectionKind, seed: &PlayerSeed) -> StateHash {
    let mut hasher = Sha256::new();
    hasher.update(SALT_DOMAIN);
    hasher.update(seed.as_bytes());
    hasher.update([kind as u8]);
    hasher.finalize().into()
}

/// Commitment root of an ordered card list.
pub fn collection_root(kind: CollectionKind, seed: &PlayerSeed, cards: &[CardId]) -> StateHash {
    let salt = collection_salt(kind, seed);
    let leaves: Vec<Vec<u8>> = cards.iter()
        .enumerate()
        .map(|(index, card)| {
            let mut bytes = Vec::with_capacity(40);
            bytes.extend_from_slice(&salt);
            bytes.extend_from_slice(&(index as u32).to_le_bytes());
            bytes.extend_from_slice(&card.0.to_le_bytes());
            bytes
        })
        .collect();
    let tree = MerkleTree::from_leaves(&leaves);

    let mut hasher = Sha256::new();
    hasher.update(ROOT_DOMAIN);
    hasher.update([kind as u8]);
    hasher.update((cards.len() as u32).to_le_bytes());
    hasher.update(tree.root());
    hasher.finalize().into()
}
