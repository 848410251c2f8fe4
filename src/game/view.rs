//! Read Views
//!
//! Flattened, JSON-friendly snapshot of a game for clients and indexers.
//! Exposes roots and sizes only; hand and deck contents never leave the
//! players' provers.

use serde::{Serialize, Deserialize};

use crate::game::action::Step;
use crate::game::state::{Creature, Game, GameStatus, PlayerState};

/// Public view of one seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Player identity (UUID form).
    pub id: String,
    /// Whether the player has joined.
    pub joined: bool,
    /// Remaining health.
    pub health: u32,
    /// Hand root (hex).
    pub hand_root: String,
    /// Deck root (hex).
    pub deck_root: String,
    /// Cards in hand.
    pub hand_size: u32,
    /// Cards left in the deck.
    pub deck_size: u32,
    /// Seed commitment (hex).
    pub secret_commitment: String,
    /// Live creatures, ascending id.
    pub board: Vec<Creature>,
    /// Dead creatures, in order of death.
    pub graveyard: Vec<Creature>,
}

impl PlayerView {
    fn joined(state: &PlayerState) -> Self {
        let commitments = state.commitments();
        Self {
            id: state.id.to_uuid_string(),
            joined: true,
            health: state.health,
            hand_root: hex::encode(commitments.hand_root()),
            deck_root: hex::encode(commitments.deck_root()),
            hand_size: commitments.hand_size(),
            deck_size: commitments.deck_size(),
            secret_commitment: hex::encode(state.secret_commitment),
            board: state.board.values().copied().collect(),
            graveyard: state.graveyard.clone(),
        }
    }

    fn waiting(id: String) -> Self {
        Self {
            id,
            joined: false,
            health: 0,
            hand_root: String::new(),
            deck_root: String::new(),
            hand_size: 0,
            deck_size: 0,
            secret_commitment: String::new(),
            board: Vec::new(),
            graveyard: Vec::new(),
        }
    }
}

/// Public view of a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    /// Game identifier (UUID form).
    pub id: String,
    /// Lifecycle.
    pub status: GameStatus,
    /// Winner (UUID form), once finished.
    pub winner: Option<String>,
    /// Turn counter.
    pub turn: u32,
    /// Player expected to act (UUID form).
    pub current_player: String,
    /// Step that player is in.
    pub current_step: Step,
    /// Anchor that feeds the next draw.
    pub last_randomness_anchor: u64,
    /// Declared attackers, ascending.
    pub attackers: Vec<u32>,
    /// Both seats in turn order.
    pub players: Vec<PlayerView>,
    /// Public state digest (hex).
    pub state_hash: String,
}

impl GameView {
    /// Snapshot a game.
    pub fn from_game(game: &Game) -> Self {
        let players = (0..2)
            .map(|seat| match game.player_at(seat) {
                Some(state) => PlayerView::joined(state),
                None => PlayerView::waiting(game.players[seat].to_uuid_string()),
            })
            .collect();

        Self {
            id: game.id.to_string(),
            status: game.status,
            winner: game.winner().map(|w| w.to_uuid_string()),
            turn: game.turn,
            current_player: game.current_player().to_uuid_string(),
            current_step: game.current_step,
            last_randomness_anchor: game.last_randomness_anchor.0,
            attackers: game.attackers.iter().map(|id| id.0).collect(),
            players,
            state_hash: hex::encode(game.compute_hash()),
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{GameId, PlayerId};
    use crate::ledger::RandomnessAnchor;

    #[test]
    fn test_waiting_game_view() {
        let a = PlayerId::new([1; 16]);
        let b = PlayerId::new([2; 16]);
        let game = Game::new(GameId::new([5; 16]), [a, b], RandomnessAnchor(4));
        let view = GameView::from_game(&game);

        assert_eq!(view.status, GameStatus::WaitingForPlayers);
        assert_eq!(view.players.len(), 2);
        assert!(!view.players[0].joined);
        assert_eq!(view.players[1].id, b.to_uuid_string());
        assert_eq!(view.last_randomness_anchor, 4);
        assert_eq!(view.state_hash, hex::encode(game.compute_hash()));
    }

    #[test]
    fn test_view_json() {
        let game = Game::new(
            GameId::new([5; 16]),
            [PlayerId::new([1; 16]), PlayerId::new([2; 16])],
            RandomnessAnchor(0),
        );
        let view = GameView::from_game(&game);
        let json = view.to_json().unwrap();

        assert!(json.contains("\"current_step\":\"Draw\""));
        assert_eq!(GameView::from_json(&json).unwrap(), view);
    }
}
