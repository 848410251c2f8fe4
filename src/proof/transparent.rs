//! Transparent Verifier
//!
//! Reference verifier for the statement contract. The proof artifact is the
//! encoded [`Witness`]; verification re-executes the statement in the
//! clear. This reveals the witness to whoever verifies, so it is only
//! suitable for local play and tests.

use thiserror::Error;
use tracing::debug;

use crate::commit::collection::{collection_root, CollectionKind};
use crate::core::hash::StateHash;
use crate::core::rng::{draw_index, seed_matches, PlayerSeed};
use crate::game::card::{count_cards, CardId};
use crate::proof::gate::{ProofVerificationError, ProofVerifier};
use crate::proof::statement::{
    DrawStatement, InitialDrawStatement, PlayStatement, Statement, StatementKind,
};
use crate::proof::witness::Witness;

/// A statement constraint the witness does not satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintViolation {
    /// Witness belongs to another statement kind.
    #[error("witness is for a different statement")]
    KindMismatch,
    /// `H(seed) != secret_commitment`.
    #[error("seed does not match the commitment")]
    SeedMismatch,
    /// Hand and deck are not a partition of the listing.
    #[error("hand and deck do not partition the listing")]
    NotAPartition,
    /// Initial hand has the wrong size.
    #[error("initial hand has {got} cards, expected {expected}")]
    InitialHandSize {
        /// Required size.
        expected: u32,
        /// Witness size.
        got: u32,
    },
    /// A witness collection does not open the committed root.
    #[error("{0:?} root does not open to the witness")]
    RootMismatch(CollectionKind),
    /// A witness collection has a different size than committed.
    #[error("{0:?} size differs from the committed size")]
    SizeMismatch(CollectionKind),
    /// Draw from an empty deck.
    #[error("deck is empty")]
    EmptyDeck,
    /// Played slot does not exist or holds another card.
    #[error("slot {slot} does not hold {card}")]
    WrongSlot {
        /// Claimed slot.
        slot: u32,
        /// Revealed card.
        card: CardId,
    },
    /// Claimed new root differs from the recomputed one.
    #[error("claimed new {0:?} root is wrong")]
    NewRootMismatch(CollectionKind),
}

/// Re-executes statements against their witnesses.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransparentVerifier;

impl TransparentVerifier {
    /// Check a decoded statement against a decoded witness.
    pub fn check(statement: &Statement, witness: &Witness) -> Result<(), ConstraintViolation> {
        match (statement, witness) {
            (Statement::InitialDraw(s), Witness::InitialDraw { seed, hand, deck }) => {
                check_initial_draw(s, seed, hand, deck)
            }
            (Statement::Draw(s), Witness::Draw { seed, hand, deck }) => {
                check_draw(s, seed, hand, deck)
            }
            (Statement::Play(s), Witness::Play { seed, hand, slot }) => {
                check_play(s, seed, hand, *slot)
            }
            _ => Err(ConstraintViolation::KindMismatch),
        }
    }
}

impl ProofVerifier for TransparentVerifier {
    fn verify(
        &self,
        kind: StatementKind,
        public_inputs: &[u8],
        proof: &[u8],
    ) -> Result<bool, ProofVerificationError> {
        let statement = Statement::from_public_inputs(public_inputs)
            .map_err(|_| ProofVerificationError::PublicInputMismatch)?;
        if statement.kind() != kind {
            return Err(ProofVerificationError::PublicInputMismatch);
        }
        let witness = Witness::from_bytes(proof)
            .map_err(|_| ProofVerificationError::InvalidProofFormat)?;
        if witness_kind(&witness) != kind {
            return Err(ProofVerificationError::InvalidProofFormat);
        }

        match Self::check(&statement, &witness) {
            Ok(()) => Ok(true),
            Err(violation) => {
                debug!("{} witness rejected: {}", kind, violation);
                Err(ProofVerificationError::VerificationFailed(violation.to_string()))
            }
        }
    }
}

fn witness_kind(witness: &Witness) -> StatementKind {
    match witness {
        Witness::InitialDraw { .. } => StatementKind::InitialDraw,
        Witness::Draw { .. } => StatementKind::Draw,
        Witness::Play { .. } => StatementKind::Play,
    }
}

fn check_seed(seed: &PlayerSeed, commitment: &StateHash) -> Result<(), ConstraintViolation> {
    if seed_matches(seed, commitment) {
        Ok(())
    } else {
        Err(ConstraintViolation::SeedMismatch)
    }
}

/// Does `cards` open the committed root at the committed size?
fn check_opening(
    kind: CollectionKind,
    seed: &PlayerSeed,
    cards: &[CardId],
    root: StateHash,
    size: u32,
) -> Result<(), ConstraintViolation> {
    if cards.len() != size as usize {
        return Err(ConstraintViolation::SizeMismatch(kind));
    }
    if collection_root(kind, seed, cards) != root {
        return Err(ConstraintViolation::RootMismatch(kind));
    }
    Ok(())
}

fn check_new_root(
    kind: CollectionKind,
    seed: &PlayerSeed,
    cards: &[CardId],
    claimed: StateHash,
) -> Result<(), ConstraintViolation> {
    if collection_root(kind, seed, cards) != claimed {
        return Err(ConstraintViolation::NewRootMismatch(kind));
    }
    Ok(())
}

fn check_initial_draw(
    s: &InitialDrawStatement,
    seed: &PlayerSeed,
    hand: &[CardId],
    deck: &[CardId],
) -> Result<(), ConstraintViolation> {
    check_seed(seed, &s.secret_commitment)?;

    let dealt = count_cards(hand.iter().chain(deck.iter()).copied());
    if dealt != s.listing.multiset() {
        return Err(ConstraintViolation::NotAPartition);
    }
    if hand.len() != s.initial_hand_size as usize {
        return Err(ConstraintViolation::InitialHandSize {
            expected: s.initial_hand_size,
            got: hand.len() as u32,
        });
    }

    check_new_root(CollectionKind::Hand, seed, hand, s.hand_root)?;
    check_new_root(CollectionKind::Deck, seed, deck, s.deck_root)
}

fn check_draw(
    s: &DrawStatement,
    seed: &PlayerSeed,
    hand: &[CardId],
    deck: &[CardId],
) -> Result<(), ConstraintViolation> {
    check_seed(seed, &s.secret_commitment)?;
    check_opening(CollectionKind::Hand, seed, hand, s.before.hand_root(), s.before.hand_size())?;
    check_opening(CollectionKind::Deck, seed, deck, s.before.deck_root(), s.before.deck_size())?;

    let index = draw_index(&s.ledger_value, seed, deck.len() as u32)
        .ok_or(ConstraintViolation::EmptyDeck)? as usize;

    let mut new_deck = deck.to_vec();
    let drawn = new_deck.swap_remove(index);
    let mut new_hand = hand.to_vec();
    new_hand.push(drawn);

    check_new_root(CollectionKind::Hand, seed, &new_hand, s.new_hand_root)?;
    check_new_root(CollectionKind::Deck, seed, &new_deck, s.new_deck_root)
}

fn check_play(
    s: &PlayStatement,
    seed: &PlayerSeed,
    hand: &[CardId],
    slot: u32,
) -> Result<(), ConstraintViolation> {
    check_seed(seed, &s.secret_commitment)?;
    check_opening(CollectionKind::Hand, seed, hand, s.before.hand_root(), s.before.hand_size())?;

    let slot_index = slot as usize;
    if hand.get(slot_index) != Some(&s.card) {
        return Err(ConstraintViolation::WrongSlot { slot, card: s.card });
    }

    let mut new_hand = hand.to_vec();
    new_hand.swap_remove(slot_index);
    check_new_root(CollectionKind::Hand, seed, &new_hand, s.new_hand_root)
}
