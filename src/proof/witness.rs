//! Private Witnesses
//!
//! The private inputs behind each statement. A prover holds them; with the
//! transparent verifier the `bincode` encoding of a witness is the proof
//! artifact itself.

use serde::{Serialize, Deserialize};

use crate::core::rng::PlayerSeed;
use crate::game::card::CardId;

/// Private inputs for one statement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Witness {
    /// Partition of the listing.
    InitialDraw {
        /// Player seed.
        seed: PlayerSeed,
        /// Dealt hand, slot order.
        hand: Vec<CardId>,
        /// Remaining deck, slot order.
        deck: Vec<CardId>,
    },
    /// Collections before the draw.
    Draw {
        /// Player seed.
        seed: PlayerSeed,
        /// Hand before drawing.
        hand: Vec<CardId>,
        /// Deck before drawing.
        deck: Vec<CardId>,
    },
    /// Hand before the play and the slot that was played.
    Play {
        /// Player seed.
        seed: PlayerSeed,
        /// Hand before playing.
        hand: Vec<CardId>,
        /// Private slot of the revealed card.
        slot: u32,
    },
}

impl Witness {
    /// Encode as a proof artifact.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decode a proof artifact.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}
