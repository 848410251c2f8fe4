//! Local Prover
//!
//! Client-side holder of a player's private state. Prepares the payloads
//! (new roots plus proof artifact) for joins, draws and plays. Preparing
//! never mutates the prover: each call returns the state that holds once the
//! engine accepts the action, and the caller adopts it only then.
//!
//! Artifacts are encoded [`Witness`]es, i.e. proofs for the
//! [`TransparentVerifier`](crate::proof::transparent::TransparentVerifier).

use thiserror::Error;

use crate::commit::collection::{CardCollection, CollectionKind};
use crate::core::hash::{StateHash, StateHasher};
use crate::core::rng::{draw_index, PlayerSeed};
use crate::game::action::{Action, JoinRequest};
use crate::game::card::{CardId, DeckListing};
use crate::proof::witness::Witness;

/// Domain for the seed-derived initial deal.
const DEAL_DOMAIN: &[u8] = b"VEILED_DUEL_DEAL_V1";

/// Errors while preparing a payload.
#[derive(Debug, Error)]
pub enum ProverError {
    /// Nothing left to draw.
    #[error("deck is empty")]
    DeckEmpty,
    /// The requested card is not in hand.
    #[error("{0} is not in hand")]
    CardNotInHand(CardId),
    /// Listing cannot fill the initial hand.
    #[error("listing has {len} cards, initial hand needs {required}")]
    ListingTooSmall {
        /// Listing length.
        len: usize,
        /// Initial hand size.
        required: u32,
    },
    /// Witness could not be encoded.
    #[error("witness encoding failed: {0}")]
    Encoding(#[from] bincode::Error),
}

/// A player's private hand, deck and seed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalProver {
    seed: PlayerSeed,
    hand: CardCollection,
    deck: CardCollection,
}

impl LocalProver {
    /// Deal the initial hand from `listing` and prepare the join request.
    ///
    /// The hand is chosen by `initial_hand_size` seed-derived swap-remove
    /// draws, so it cannot be reconstructed from the public listing.
    ///
    /// No ledger value enters the deal, so the opening hand is a function of
    /// listing and seed alone. A player may grind seeds offline until one
    /// deals a hand they like; the initial-draw statement only demands a
    /// valid committed partition and does not rule this out.
    pub fn deal(
        seed: PlayerSeed,
        listing: &DeckListing,
        initial_hand_size: u32,
    ) -> Result<(Self, JoinRequest), ProverError> {
        if listing.len() < initial_hand_size as usize {
            return Err(ProverError::ListingTooSmall {
                len: listing.len(),
                required: initial_hand_size,
            });
        }

        let mut deck = CardCollection::new(CollectionKind::Deck, listing.card_ids());
        let mut hand = CardCollection::empty(CollectionKind::Hand);
        for round in 0..initial_hand_size {
            let key = deal_key(listing, round);
            let index = draw_index(&key, &seed, deck.size()).ok_or(ProverError::DeckEmpty)?;
            let card = deck.swap_remove(index as usize).ok_or(ProverError::DeckEmpty)?;
            hand.push(card);
        }

        let witness = Witness::InitialDraw {
            seed: seed.clone(),
            hand: hand.cards().to_vec(),
            deck: deck.cards().to_vec(),
        };
        let request = JoinRequest {
            secret_commitment: seed.commitment(),
            listing: listing.clone(),
            hand_root: hand.root(&seed),
            deck_root: deck.root(&seed),
            proof: witness.to_bytes()?,
        };
        Ok((Self { seed, hand, deck }, request))
    }

    /// Prepare a draw against the ledger value of the game's current anchor.
    pub fn prepare_draw(&self, ledger_value: &StateHash) -> Result<(Action, Self), ProverError> {
        let index = draw_index(ledger_value, &self.seed, self.deck.size())
            .ok_or(ProverError::DeckEmpty)?;

        let mut next = self.clone();
        let card = next.deck.swap_remove(index as usize).ok_or(ProverError::DeckEmpty)?;
        next.hand.push(card);

        let witness = Witness::Draw {
            seed: self.seed.clone(),
            hand: self.hand.cards().to_vec(),
            deck: self.deck.cards().to_vec(),
        };
        let action = Action::Draw {
            new_hand_root: next.hand.root(&self.seed),
            new_deck_root: next.deck.root(&self.seed),
            proof: witness.to_bytes()?,
        };
        Ok((action, next))
    }

    /// Prepare playing the first copy of `card` in hand.
    pub fn prepare_play(&self, card: CardId) -> Result<(Action, Self), ProverError> {
        let slot = self.hand.position(card).ok_or(ProverError::CardNotInHand(card))?;

        let mut next = self.clone();
        next.hand.swap_remove(slot).ok_or(ProverError::CardNotInHand(card))?;

        let witness = Witness::Play {
            seed: self.seed.clone(),
            hand: self.hand.cards().to_vec(),
            slot: slot as u32,
        };
        let action = Action::Play {
            card,
            new_hand_root: next.hand.root(&self.seed),
            new_deck_root: self.deck.root(&self.seed),
            proof: witness.to_bytes()?,
        };
        Ok((action, next))
    }

    /// Cards in hand.
    pub fn hand(&self) -> &[CardId] {
        self.hand.cards()
    }

    /// Cards left in the deck.
    pub fn deck(&self) -> &[CardId] {
        self.deck.cards()
    }

    /// Current hand root.
    pub fn hand_root(&self) -> StateHash {
        self.hand.root(&self.seed)
    }

    /// Current deck root.
    pub fn deck_root(&self) -> StateHash {
        self.deck.root(&self.seed)
    }

    /// Published seed commitment.
    pub fn secret_commitment(&self) -> StateHash {
        self.seed.commitment()
    }
}

/// Per-round deal key. Public; only the seed makes the index private.
fn deal_key(listing: &DeckListing, round: u32) -> StateHash {
    let mut hasher = StateHasher::new(DEAL_DOMAIN);
    hasher.update_u32(listing.len() as u32);
    for card in listing.cards() {
        hasher.update_u32(card.id.0);
    }
    hasher.update_u32(round);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::store::Commitments;
    use crate::game::card::{count_cards, CardDefinition, CardStats};
    use crate::game::state::{GameId, PlayerId};
    use crate::proof::gate::ProofVerifier;
    use crate::proof::statement::{DrawStatement, PlayStatement, Statement, StatementKind};
    use crate::proof::transparent::TransparentVerifier;

    fn listing() -> DeckListing {
        DeckListing::new(
            (1..=8)
                .map(|id| CardDefinition { id: CardId(id), stats: CardStats::new(id, id) })
                .collect(),
        )
    }

    fn commitments(prover: &LocalProver) -> Commitments {
        Commitments::new(
            prover.hand_root(),
            prover.deck_root(),
            prover.hand().len() as u32,
            prover.deck().len() as u32,
        )
    }

    fn proof_of(action: &Action) -> &[u8] {
        match action {
            Action::Draw { proof, .. } | Action::Play { proof, .. } => proof.as_slice(),
            _ => &[],
        }
    }

    #[test]
    fn test_deal_partitions_listing() {
        let (prover, request) = LocalProver::deal(PlayerSeed::from_secret(b"p"), &listing(), 3).unwrap();

        assert_eq!(prover.hand().len(), 3);
        assert_eq!(prover.deck().len(), 5);
        let all = count_cards(prover.hand().iter().chain(prover.deck()).copied());
        assert_eq!(all, listing().multiset());
        assert_eq!(request.hand_root, prover.hand_root());
        assert_eq!(request.deck_root, prover.deck_root());
        assert_eq!(request.secret_commitment, prover.secret_commitment());
    }

    #[test]
    fn test_deal_depends_on_seed() {
        let hands: Vec<Vec<CardId>> = (0u8..8)
            .map(|i| {
                let (prover, _) = LocalProver::deal(PlayerSeed::new([i; 32]), &listing(), 3).unwrap();
                prover.hand().to_vec()
            })
            .collect();
        assert!(hands.iter().any(|h| *h != hands[0]));
    }

    #[test]
    fn test_deal_rejects_short_listing() {
        let result = LocalProver::deal(PlayerSeed::new([1; 32]), &listing(), 9);
        assert!(matches!(result, Err(ProverError::ListingTooSmall { len: 8, required: 9 })));
    }

    #[test]
    fn test_prepare_draw_does_not_mutate() {
        let (prover, _) = LocalProver::deal(PlayerSeed::new([4; 32]), &listing(), 2).unwrap();
        let before = prover.clone();

        let (_, next) = prover.prepare_draw(&[1; 32]).unwrap();
        assert_eq!(prover, before);
        assert_eq!(next.hand().len(), 3);
        assert_eq!(next.deck().len(), 5);
    }

    #[test]
    fn test_prepared_draw_verifies() {
        let seed = PlayerSeed::new([4; 32]);
        let (prover, _) = LocalProver::deal(seed.clone(), &listing(), 2).unwrap();
        let ledger_value = [1; 32];
        let (action, _) = prover.prepare_draw(&ledger_value).unwrap();

        let (new_hand_root, new_deck_root) = match &action {
            Action::Draw { new_hand_root, new_deck_root, .. } => (*new_hand_root, *new_deck_root),
            other => panic!("unexpected {:?}", other),
        };
        let statement = Statement::Draw(DrawStatement {
            game_id: GameId::new([0; 16]),
            player: PlayerId::new([1; 16]),
            secret_commitment: seed.commitment(),
            ledger_value,
            before: commitments(&prover),
            new_hand_root,
            new_deck_root,
        });

        let verdict = TransparentVerifier.verify(
            StatementKind::Draw,
            &statement.public_inputs().unwrap(),
            proof_of(&action),
        );
        assert_eq!(verdict, Ok(true));
    }

    #[test]
    fn test_prepared_play_verifies() {
        let seed = PlayerSeed::new([6; 32]);
        let (prover, _) = LocalProver::deal(seed.clone(), &listing(), 3).unwrap();
        let card = prover.hand()[1];
        let (action, next) = prover.prepare_play(card).unwrap();

        let new_hand_root = match &action {
            Action::Play { new_hand_root, new_deck_root, .. } => {
                assert_eq!(*new_deck_root, prover.deck_root());
                *new_hand_root
            }
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(new_hand_root, next.hand_root());
        assert_eq!(next.hand().len(), 2);

        let statement = Statement::Play(PlayStatement {
            game_id: GameId::new([0; 16]),
            player: PlayerId::new([1; 16]),
            secret_commitment: seed.commitment(),
            before: commitments(&prover),
            card,
            stats: CardStats::new(card.0, card.0),
            new_hand_root,
        });
        let verdict = TransparentVerifier.verify(
            StatementKind::Play,
            &statement.public_inputs().unwrap(),
            proof_of(&action),
        );
        assert_eq!(verdict, Ok(true));
    }

    #[test]
    fn test_play_requires_card_in_hand() {
        let (prover, _) = LocalProver::deal(PlayerSeed::new([6; 32]), &listing(), 0).unwrap();
        assert!(matches!(prover.prepare_play(CardId(1)), Err(ProverError::CardNotInHand(_))));
    }

    #[test]
    fn test_draw_from_empty_deck() {
        let small = DeckListing::uniform(CardId(1), CardStats::new(1, 1), 2);
        let (prover, _) = LocalProver::deal(PlayerSeed::new([6; 32]), &small, 2).unwrap();
        assert!(matches!(prover.prepare_draw(&[0; 32]), Err(ProverError::DeckEmpty)));
    }
}
