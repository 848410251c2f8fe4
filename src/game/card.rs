//! Card Data
//!
//! Public card definitions and the declared deck listing supplied by the
//! inventory service at join time.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Deserialize};

use crate::error::IllegalAction;

/// Identifier of a card kind. Repeats freely within a listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card:{}", self.0)
    }
}

/// Combat values of a card once it is on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardStats {
    /// Damage dealt in combat.
    pub attack: u32,
    /// Damage absorbed before dying.
    pub defense: u32,
}

impl CardStats {
    /// Create stats.
    pub const fn new(attack: u32, defense: u32) -> Self {
        Self { attack, defense }
    }
}

/// One slot of a declared deck listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Card kind.
    pub id: CardId,
    /// Public stats of that kind.
    pub stats: CardStats,
}

/// A player's full declared deck, in listing order.
///
/// Public input to the initial-draw statement. Legality (counts, costs) is
/// the inventory service's business; only structural consistency is checked
/// here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckListing {
    cards: Vec<CardDefinition>,
}

impl DeckListing {
    /// Create a listing.
    pub fn new(cards: Vec<CardDefinition>) -> Self {
        Self { cards }
    }

    /// Listing with `copies` of a single card kind.
    pub fn uniform(id: CardId, stats: CardStats, copies: usize) -> Self {
        Self::new(vec![CardDefinition { id, stats }; copies])
    }

    /// All definitions in listing order.
    pub fn cards(&self) -> &[CardDefinition] {
        &self.cards
    }

    /// Number of cards in the listing.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True when the listing holds no cards.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Card ids in listing order.
    pub fn card_ids(&self) -> Vec<CardId> {
        self.cards.iter().map(|def| def.id).collect()
    }

    /// Stats of a card kind, if it is part of this listing.
    pub fn stats_of(&self, id: CardId) -> Option<CardStats> {
        self.cards.iter().find(|def| def.id == id).map(|def| def.stats)
    }

    /// Count of every card kind.
    pub fn multiset(&self) -> BTreeMap<CardId, u32> {
        count_cards(self.cards.iter().map(|def| def.id))
    }

    /// Structural checks performed before a player may join.
    pub fn validate(&self, initial_hand_size: u32) -> Result<(), IllegalAction> {
        if self.cards.is_empty() {
            return Err(IllegalAction::EmptyListing);
        }
        if self.cards.len() < initial_hand_size as usize {
            return Err(IllegalAction::ListingTooSmall {
                len: self.cards.len(),
                required: initial_hand_size,
            });
        }

        let mut seen: BTreeMap<CardId, CardStats> = BTreeMap::new();
        for def in &self.cards {
            match seen.get(&def.id) {
                Some(stats) if *stats != def.stats => {
                    return Err(IllegalAction::InconsistentCard { card: def.id });
                }
                Some(_) => {}
                None => {
                    seen.insert(def.id, def.stats);
                }
            }
        }
        Ok(())
    }
}

/// Count occurrences of each card id.
pub fn count_cards<I: IntoIterator<Item = CardId>>(cards: I) -> BTreeMap<CardId, u32> {
    let mut counts = BTreeMap::new();
    for card in cards {
        *counts.entry(card).or_insert(0) += 1;
    }
    counts
}
