//! Engine Errors
//!
//! Every error aborts the attempted action only; the engine never leaves a
//! game partially updated.

use thiserror::Error;

use crate::game::action::{ActionKind, Step};
use crate::game::card::CardId;
use crate::game::state::{CreatureId, GameId, PlayerId};
use crate::ledger::RandomnessAnchor;
use crate::proof::statement::StatementKind;

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors returned by the game engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Wrong step, wrong actor, or malformed payload.
    #[error("illegal action: {0}")]
    IllegalAction(#[from] IllegalAction),

    /// The proof gate rejected the statement.
    #[error("{kind} proof rejected: {reason}")]
    ProofRejected {
        /// Statement the proof was submitted for.
        kind: StatementKind,
        /// Verifier-provided reason.
        reason: String,
    },

    /// Draw attempted on an empty deck.
    #[error("deck exhausted for player {player}")]
    DeckExhausted {
        /// Player whose deck is empty.
        player: PlayerId,
    },

    /// The game has already finished.
    #[error("game over, winner {winner}")]
    GameOver {
        /// Winner of the finished game.
        winner: PlayerId,
    },

    /// No game with this identifier.
    #[error("unknown game {0}")]
    UnknownGame(GameId),

    /// A game with this identifier already exists.
    #[error("game {0} already exists")]
    GameExists(GameId),

    /// The ledger no longer supplies the unpredictable value for the anchor.
    #[error("ledger has no unpredictable value for anchor {0}")]
    AnchorUnavailable(RandomnessAnchor),

    /// The anchor's block has not been produced yet; retry once it has.
    #[error("anchor {anchor} not reached yet, ledger at {latest}")]
    AnchorPending {
        /// Anchor the draw must use.
        anchor: RandomnessAnchor,
        /// Latest anchor the ledger has.
        latest: RandomnessAnchor,
    },

    /// No creature id is left to allocate in this game.
    #[error("creature ids exhausted")]
    CreatureIdsExhausted,
}

/// Why an action was refused before any proof was consulted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IllegalAction {
    /// Both seats of a game must belong to different players.
    #[error("a game needs two distinct players")]
    DuplicatePlayers,

    /// Caller is not seated in this game.
    #[error("{caller} is not a player in this game")]
    NotAPlayer {
        /// Offending caller.
        caller: PlayerId,
    },

    /// Caller already joined.
    #[error("{player} already joined")]
    AlreadyJoined {
        /// Player that joined twice.
        player: PlayerId,
    },

    /// Turn actions before both players joined.
    #[error("game has not started")]
    GameNotStarted,

    /// The current step does not accept this action.
    #[error("{action:?} is not allowed during the {step:?} step")]
    WrongStep {
        /// Current step.
        step: Step,
        /// Submitted action label.
        action: ActionKind,
    },

    /// Someone other than the current player acted.
    #[error("expected {expected} to act, got {caller}")]
    NotYourTurn {
        /// Player whose move it is.
        expected: PlayerId,
        /// Player who submitted.
        caller: PlayerId,
    },

    /// Listing has no cards.
    #[error("deck listing is empty")]
    EmptyListing,

    /// Listing cannot fill the initial hand.
    #[error("deck listing has {len} cards, initial hand needs {required}")]
    ListingTooSmall {
        /// Listing length.
        len: usize,
        /// Initial hand size.
        required: u32,
    },

    /// Same card kind listed with different stats.
    #[error("{card} is listed with conflicting stats")]
    InconsistentCard {
        /// Card kind.
        card: CardId,
    },

    /// Played card is not in the player's declared listing.
    #[error("{card} is not in the player's listing")]
    CardNotInListing {
        /// Card kind.
        card: CardId,
    },

    /// Play with an empty hand.
    #[error("hand is empty")]
    EmptyHand,

    /// A play must leave the deck root untouched.
    #[error("play must not change the deck root")]
    DeckRootChanged,

    /// Creature reference does not exist.
    #[error("unknown creature {creature}")]
    UnknownCreature {
        /// Referenced creature.
        creature: CreatureId,
    },

    /// Creature is in a graveyard.
    #[error("creature {creature} is dead")]
    CreatureDead {
        /// Referenced creature.
        creature: CreatureId,
    },

    /// Creature belongs to the other player.
    #[error("creature {creature} is not owned by the acting player")]
    NotOwner {
        /// Referenced creature.
        creature: CreatureId,
    },

    /// Same creature declared twice as attacker.
    #[error("creature {creature} declared twice")]
    DuplicateAttacker {
        /// Referenced creature.
        creature: CreatureId,
    },

    /// Block references a creature that is not attacking.
    #[error("creature {creature} is not attacking")]
    NotAttacking {
        /// Referenced creature.
        creature: CreatureId,
    },

    /// An attacker was assigned two blockers.
    #[error("attacker {attacker} is blocked more than once")]
    AttackerBlockedTwice {
        /// Attacking creature.
        attacker: CreatureId,
    },

    /// A defender was assigned to two attackers.
    #[error("defender {defender} is used more than once")]
    DefenderReused {
        /// Defending creature.
        defender: CreatureId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illegal_action_converts() {
        let err: EngineError = IllegalAction::EmptyHand.into();
        assert_eq!(err, EngineError::IllegalAction(IllegalAction::EmptyHand));
        assert_eq!(err.to_string(), "illegal action: hand is empty");
    }

    #[test]
    fn test_proof_rejected_message_names_statement() {
        let err = EngineError::ProofRejected {
            kind: StatementKind::Draw,
            reason: "bad root".to_string(),
        };
        assert_eq!(err.to_string(), "draw proof rejected: bad root");
    }
}
