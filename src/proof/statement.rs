//! Proof Statements
//!
//! What a proof must attest for each commitment update. The public inputs
//! handed to the verifier are the canonical `bincode` encoding of the
//! statement; every statement is bound to its game and seat so a proof cannot
//! be replayed elsewhere.

use std::fmt;

use serde::{Serialize, Deserialize};

use crate::commit::store::Commitments;
use crate::core::hash::StateHash;
use crate::game::card::{CardId, CardStats, DeckListing};
use crate::game::state::{GameId, PlayerId};

/// The three statement kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    /// Partition of the declared listing into initial hand and deck.
    InitialDraw,
    /// Seed-randomized move of one card from deck to hand.
    Draw,
    /// Removal of one revealed card from the hand.
    Play,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatementKind::InitialDraw => "initial-draw",
            StatementKind::Draw => "draw",
            StatementKind::Play => "play",
        })
    }
}

/// `hand_root`/`deck_root` commit to a partition of `listing`:
/// - multiset(hand ∪ deck) == multiset(listing)
/// - |hand| == initial_hand_size
/// - both roots are salted by the seed behind `secret_commitment`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialDrawStatement {
    /// Game the statement belongs to.
    pub game_id: GameId,
    /// Joining player.
    pub player: PlayerId,
    /// Published seed commitment.
    pub secret_commitment: StateHash,
    /// Declared listing.
    pub listing: DeckListing,
    /// Cards dealt to the hand.
    pub initial_hand_size: u32,
    /// Committed initial hand.
    pub hand_root: StateHash,
    /// Committed remaining deck.
    pub deck_root: StateHash,
}

/// With `seed` such that `H(seed) == secret_commitment`, the old roots open
/// to `hand`/`deck` of the public sizes; `i = mix(ledger_value, seed) mod
/// deck_size`; `deck.swap_remove(i)` is pushed onto the hand; the new roots
/// open to the results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawStatement {
    /// Game the statement belongs to.
    pub game_id: GameId,
    /// Drawing player.
    pub player: PlayerId,
    /// Published seed commitment.
    pub secret_commitment: StateHash,
    /// Ledger value of the game's last randomness anchor.
    pub ledger_value: StateHash,
    /// Roots and sizes before the draw.
    pub before: Commitments,
    /// Claimed hand root after the draw.
    pub new_hand_root: StateHash,
    /// Claimed deck root after the draw.
    pub new_deck_root: StateHash,
}

/// With `seed` such that `H(seed) == secret_commitment`, the old hand root
/// opens to a hand of `before.hand_size()` cards holding `card` at some
/// private slot; swap-removing that slot yields `new_hand_root`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayStatement {
    /// Game the statement belongs to.
    pub game_id: GameId,
    /// Playing player.
    pub player: PlayerId,
    /// Published seed commitment.
    pub secret_commitment: StateHash,
    /// Roots and sizes before the play.
    pub before: Commitments,
    /// Revealed card.
    pub card: CardId,
    /// Its public stats, taken from the listing.
    pub stats: CardStats,
    /// Claimed hand root after the play.
    pub new_hand_root: StateHash,
}

/// A claimed commitment transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    /// Join-time deal.
    InitialDraw(InitialDrawStatement),
    /// Turn draw.
    Draw(DrawStatement),
    /// Card play.
    Play(PlayStatement),
}

impl Statement {
    /// Kind of this statement.
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::InitialDraw(_) => StatementKind::InitialDraw,
            Statement::Draw(_) => StatementKind::Draw,
            Statement::Play(_) => StatementKind::Play,
        }
    }

    /// Player the statement is about.
    pub fn player(&self) -> PlayerId {
        match self {
            Statement::InitialDraw(s) => s.player,
            Statement::Draw(s) => s.player,
            Statement::Play(s) => s.player,
        }
    }

    /// Roots and sizes that hold if the statement is true.
    pub fn next_commitments(&self) -> Commitments {
        match self {
            Statement::InitialDraw(s) => {
                let total = s.listing.len() as u32;
                Commitments::new(
                    s.hand_root,
                    s.deck_root,
                    s.initial_hand_size,
                    total.saturating_sub(s.initial_hand_size),
                )
            }
            Statement::Draw(s) => s.before.after_draw(s.new_hand_root, s.new_deck_root),
            Statement::Play(s) => s.before.after_play(s.new_hand_root),
        }
    }

    /// Canonical public-input encoding handed to the verifier.
    pub fn public_inputs(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decode public inputs back into a statement.
    pub fn from_public_inputs(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw_statement() -> Statement {
        Statement::Draw(DrawStatement {
            game_id: GameId::new([1; 16]),
            player: PlayerId::new([2; 16]),
            secret_commitment: [3; 32],
            ledger_value: [4; 32],
            before: Commitments::new([5; 32], [6; 32], 2, 8),
            new_hand_root: [7; 32],
            new_deck_root: [8; 32],
        })
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(StatementKind::InitialDraw.to_string(), "initial-draw");
        assert_eq!(draw_statement().kind(), StatementKind::Draw);
    }

    #[test]
    fn test_draw_next_commitments() {
        let next = draw_statement().next_commitments();
        assert_eq!(next, Commitments::new([7; 32], [8; 32], 3, 7));
    }

    #[test]
    fn test_initial_draw_next_commitments() {
        let statement = Statement::InitialDraw(InitialDrawStatement {
            game_id: GameId::new([1; 16]),
            player: PlayerId::new([2; 16]),
            secret_commitment: [3; 32],
            listing: DeckListing::uniform(CardId(1), CardStats::new(1, 1), 10),
            initial_hand_size: 4,
            hand_root: [9; 32],
            deck_root: [10; 32],
        });
        assert_eq!(statement.next_commitments(), Commitments::new([9; 32], [10; 32], 4, 6));
    }

    #[test]
    fn test_public_inputs_decode() {
        let statement = draw_statement();
        let bytes = statement.public_inputs().unwrap();
        assert_eq!(Statement::from_public_inputs(&bytes).unwrap(), statement);
    }

    #[test]
    fn test_public_inputs_bind_game() {
        let a = draw_statement();
        let mut b = draw_statement();
        if let Statement::Draw(s) = &mut b {
            s.game_id = GameId::new([9; 16]);
        }
        assert_ne!(a.public_inputs().unwrap(), b.public_inputs().unwrap());
    }
}
