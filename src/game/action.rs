//! Steps, Actions and the Transition Table
//!
//! `Step` is where a player currently is; `Action` is what they submitted.
//! The two are deliberately separate types. Every legal move is a row of
//! [`TRANSITIONS`]: the engine classifies an accepted action into an
//! [`Edge`] and looks up the next step and actor here, and
//! [`Step::permits`] is derived from the same rows.

use serde::{Serialize, Deserialize};

use crate::core::hash::StateHash;
use crate::game::card::{CardId, DeckListing};
use crate::game::state::CreatureId;

/// Turn step expected from the current player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Step {
    /// Must draw.
    Draw = 0,
    /// May play, attack or pass.
    Play = 1,
    /// May attack or pass; nothing can be played.
    Attack = 2,
    /// The attacked player must assign blockers.
    Defend = 3,
}

impl Step {
    /// Does this step accept actions with the given label?
    pub fn permits(self, kind: ActionKind) -> bool {
        TRANSITIONS.iter().any(|row| row.from == self && row.edge.kind() == kind)
    }
}

/// Label of a submitted action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Draw a card.
    Draw,
    /// Play a card from hand.
    Play,
    /// Declare attackers.
    Attack,
    /// Assign blockers.
    Defend,
    /// End the turn.
    Pass,
}

/// One player's move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Move the card at the private random index from deck to hand.
    Draw {
        /// Hand root after the draw.
        new_hand_root: StateHash,
        /// Deck root after the draw.
        new_deck_root: StateHash,
        /// Proof artifact for the draw statement.
        proof: Vec<u8>,
    },
    /// Reveal a card from hand and put it on the board.
    Play {
        /// Card kind being revealed.
        card: CardId,
        /// Hand root after removing the card.
        new_hand_root: StateHash,
        /// Deck root; must equal the current one.
        new_deck_root: StateHash,
        /// Proof artifact for the play statement.
        proof: Vec<u8>,
    },
    /// Declare attacking creatures (may be empty).
    Attack {
        /// Creatures of the acting player.
        attackers: Vec<CreatureId>,
    },
    /// Assign defenders to declared attackers (may be empty).
    Defend {
        /// (attacker, defender) pairs.
        blocks: Vec<(CreatureId, CreatureId)>,
    },
    /// End the turn.
    Pass,
}

/// A player's entry into a waiting game, carrying its initial-draw proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    /// `H(seed)`, fixed for the whole game.
    pub secret_commitment: StateHash,
    /// Listing supplied by the inventory service.
    pub listing: DeckListing,
    /// Committed initial hand.
    pub hand_root: StateHash,
    /// Committed remaining deck.
    pub deck_root: StateHash,
    /// Proof artifact for the initial-draw statement.
    pub proof: Vec<u8>,
}

impl Action {
    /// Label of this action.
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Draw { .. } => ActionKind::Draw,
            Action::Play { .. } => ActionKind::Play,
            Action::Attack { .. } => ActionKind::Attack,
            Action::Defend { .. } => ActionKind::Defend,
            Action::Pass => ActionKind::Pass,
        }
    }
}

/// Classified outcome of an accepted action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// A card was drawn.
    Drew,
    /// Deck exhausted, draw skipped; the hand still has cards.
    DrawSkipped,
    /// Deck exhausted, draw skipped, and nothing in hand to play.
    DrawSkippedEmptyHand,
    /// Anchor expired on the ledger; a fresh one was recorded instead.
    Reanchored,
    /// A card was played.
    Played,
    /// Attackers declared and the defender can block.
    AttackContested,
    /// No attackers, or no possible blocker; combat resolved on the spot.
    AttackUncontested,
    /// Turn ended.
    Passed,
    /// Blockers assigned and combat resolved.
    Defended,
}

impl Edge {
    /// Action label that produces this edge.
    pub fn kind(self) -> ActionKind {
        match self {
            Edge::Drew | Edge::DrawSkipped | Edge::DrawSkippedEmptyHand | Edge::Reanchored => {
                ActionKind::Draw
            }
            Edge::Played => ActionKind::Play,
            Edge::AttackContested | Edge::AttackUncontested => ActionKind::Attack,
            Edge::Passed => ActionKind::Pass,
            Edge::Defended => ActionKind::Defend,
        }
    }
}

/// Who acts after a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Actor {
    /// The player who just acted.
    Same,
    /// The other seat.
    Opponent,
}

/// One row of the transition table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionRow {
    /// Step before the action.
    pub from: Step,
    /// Classified action.
    pub edge: Edge,
    /// Step after the action.
    pub to: Step,
    /// Seat that acts next.
    pub actor: Actor,
}

const fn row(from: Step, edge: Edge, to: Step, actor: Actor) -> TransitionRow {
    TransitionRow { from, edge, to, actor }
}

/// Every legal transition.
pub const TRANSITIONS: &[TransitionRow] = &[
    row(Step::Draw, Edge::Drew, Step::Play, Actor::Same),
    row(Step::Draw, Edge::DrawSkipped, Step::Play, Actor::Same),
    row(Step::Draw, Edge::DrawSkippedEmptyHand, Step::Attack, Actor::Same),
    row(Step::Draw, Edge::Reanchored, Step::Draw, Actor::Same),
    row(Step::Play, Edge::Played, Step::Play, Actor::Same),
    row(Step::Play, Edge::AttackContested, Step::Defend, Actor::Opponent),
    row(Step::Play, Edge::AttackUncontested, Step::Draw, Actor::Opponent),
    row(Step::Play, Edge::Passed, Step::Draw, Actor::Opponent),
    row(Step::Attack, Edge::AttackContested, Step::Defend, Actor::Opponent),
    row(Step::Attack, Edge::AttackUncontested, Step::Draw, Actor::Opponent),
    row(Step::Attack, Edge::Passed, Step::Draw, Actor::Opponent),
    // The defender already holds the seat, and keeps it for its own turn.
    row(Step::Defend, Edge::Defended, Step::Draw, Actor::Same),
];

/// Look up the next step and actor.
pub fn transition(from: Step, edge: Edge) -> Option<(Step, Actor)> {
    TRANSITIONS.iter()
        .find(|row| row.from == from && row.edge == edge)
        .map(|row| (row.to, row.actor))
}
