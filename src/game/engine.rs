//! Game Engine
//!
//! Owns every game by identifier and runs each request through the
//! transition function. A request works on a clone of the game; the clone
//! replaces the stored game only when every check, proof and effect
//! succeeded, so a failed request leaves nothing behind.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, IllegalAction};
use crate::game::action::{Action, JoinRequest};
use crate::game::events::GameEvent;
use crate::game::machine::Machine;
use crate::game::state::{Game, GameId, PlayerId};
use crate::game::view::GameView;
use crate::ledger::Ledger;
use crate::proof::gate::{ProofGate, ProofVerifier};

/// Authoritative store of games.
pub struct GameEngine<V> {
    config: EngineConfig,
    gate: ProofGate<V>,
    games: BTreeMap<GameId, Game>,
}

impl<V: ProofVerifier> GameEngine<V> {
    /// Create an engine with the given rules and verifier.
    pub fn new(config: EngineConfig, verifier: V) -> Self {
        Self {
            config,
            gate: ProofGate::new(verifier),
            games: BTreeMap::new(),
        }
    }

    /// Active rules.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open a game for two players. Nobody is seated until they join.
    #[instrument(skip(self, ledger), fields(game = %id))]
    pub fn create_game<L: Ledger + ?Sized>(
        &mut self,
        ledger: &L,
        id: GameId,
        players: [PlayerId; 2],
    ) -> EngineResult<&Game> {
        if players[0] == players[1] {
            return Err(IllegalAction::DuplicatePlayers.into());
        }
        if self.games.contains_key(&id) {
            return Err(EngineError::GameExists(id));
        }

        let game = Game::new(id, players, ledger.latest_anchor().next());
        info!("created game {} for {} and {}", id, players[0], players[1]);
        Ok(self.games.entry(id).or_insert(game))
    }

    /// Seat `caller` with its initial-draw proof.
    #[instrument(skip(self, ledger, request), fields(game = %id, caller = %caller))]
    pub fn join<L: Ledger + ?Sized>(
        &mut self,
        ledger: &L,
        id: GameId,
        caller: PlayerId,
        request: &JoinRequest,
    ) -> EngineResult<Vec<GameEvent>> {
        let mut next = self.games.get(&id).ok_or(EngineError::UnknownGame(id))?.clone();
        let machine = Machine::new(&self.config, &self.gate);

        match machine.join(&mut next, ledger.latest_anchor(), caller, request) {
            Ok(events) => {
                self.games.insert(id, next);
                Ok(events)
            }
            Err(e) => {
                debug!("join refused: {}", e);
                Err(e)
            }
        }
    }

    /// Apply a turn action from `caller`.
    #[instrument(skip(self, ledger, action), fields(game = %id, caller = %caller, action = ?action.kind()))]
    pub fn submit<L: Ledger + ?Sized>(
        &mut self,
        ledger: &L,
        id: GameId,
        caller: PlayerId,
        action: &Action,
    ) -> EngineResult<Vec<GameEvent>> {
        let mut next = self.games.get(&id).ok_or(EngineError::UnknownGame(id))?.clone();
        let machine = Machine::new(&self.config, &self.gate);

        match machine.apply(&mut next, ledger, caller, action) {
            Ok(events) => {
                debug!("accepted, {} events, state {}", events.len(), hex::encode(&next.compute_hash()[..4]));
                self.games.insert(id, next);
                Ok(events)
            }
            Err(e) => {
                debug!("refused: {}", e);
                Err(e)
            }
        }
    }

    /// Stored game.
    pub fn game(&self, id: &GameId) -> Option<&Game> {
        self.games.get(id)
    }

    /// Public snapshot of a game.
    pub fn view(&self, id: &GameId) -> Option<GameView> {
        self.games.get(id).map(GameView::from_game)
    }

    /// All games in identifier order.
    pub fn games(&self) -> impl Iterator<Item = &Game> {
        self.games.values()
    }
}

// =============================================================================
// TESTS
// =============================================================================
