//! Game Events
//!
//! Emitted for every successful join or action, in the order the effects
//! happened. Events never carry private hand or deck contents.

use serde::{Serialize, Deserialize};

use crate::game::card::CardId;
use crate::game::state::{CreatureId, PlayerId};
use crate::ledger::RandomnessAnchor;

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Player joined with an accepted initial draw.
    PlayerJoined {
        player: PlayerId,
    },

    /// Both players joined; `first` takes the first turn.
    GameStarted {
        first: PlayerId,
    },

    /// Player drew one card (which one stays private).
    CardDrawn {
        player: PlayerId,
    },

    /// Draw skipped on an exhausted deck.
    DrawSkipped {
        player: PlayerId,
    },

    /// Draw anchor expired on the ledger; a fresh one was recorded.
    AnchorExpired {
        player: PlayerId,
        anchor: RandomnessAnchor,
    },

    /// Player revealed a card and put it into play.
    CardPlayed {
        player: PlayerId,
        card: CardId,
        creature: CreatureId,
    },

    /// Player declared attackers (possibly none).
    PlayerAttacked {
        player: PlayerId,
        attackers: Vec<CreatureId>,
    },

    /// Player assigned blockers as (attacker, defender) pairs.
    PlayerDefended {
        player: PlayerId,
        blocks: Vec<(CreatureId, CreatureId)>,
    },

    /// Player ended the turn.
    PlayerPassed {
        player: PlayerId,
    },

    /// Creature died in combat.
    CreatureDied {
        owner: PlayerId,
        creature: CreatureId,
    },

    /// Player took unblocked damage.
    PlayerDamaged {
        player: PlayerId,
        amount: u32,
        health: u32,
    },

    /// Game finished.
    GameEnded {
        winner: PlayerId,
    },
}

/// A game event stamped with the turn it happened in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Turn number when the event occurred.
    pub turn: u32,

    /// Event data.
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(turn: u32, data: GameEventData) -> Self {
        Self { turn, data }
    }

    /// Player the event is primarily about.
    pub fn player(&self) -> PlayerId {
        match &self.data {
            GameEventData::PlayerJoined { player }
            | GameEventData::CardDrawn { player }
            | GameEventData::DrawSkipped { player }
            | GameEventData::AnchorExpired { player, .. }
            | GameEventData::CardPlayed { player, .. }
            | GameEventData::PlayerAttacked { player, .. }
            | GameEventData::PlayerDefended { player, .. }
            | GameEventData::PlayerPassed { player }
            | GameEventData::PlayerDamaged { player, .. } => *player,
            GameEventData::GameStarted { first } => *first,
            GameEventData::CreatureDied { owner, .. } => *owner,
            GameEventData::GameEnded { winner } => *winner,
        }
    }

    /// Create game ended event.
    pub fn game_ended(turn: u32, winner: PlayerId) -> Self {
        Self::new(turn, GameEventData::GameEnded { winner })
    }

    /// Is this the terminal event?
    pub fn is_game_end(&self) -> bool {
        matches!(self.data, GameEventData::GameEnded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_player() {
        let p = PlayerId::new([1; 16]);
        let event = GameEvent::new(3, GameEventData::CreatureDied { owner: p, creature: CreatureId(2) });
        assert_eq!(event.player(), p);
        assert_eq!(event.turn, 3);
        assert!(!event.is_game_end());
        assert!(GameEvent::game_ended(4, p).is_game_end());
    }

    #[test]
    fn test_events_serialize_to_json() {
        let event = GameEvent::new(1, GameEventData::CardDrawn { player: PlayerId::new([2; 16]) });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("CardDrawn"));
        assert!(json.contains("\"turn\":1"));
    }
}
