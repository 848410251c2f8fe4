//! Turn/Step Transition Function
//!
//! One call per request: legality → proof → effects → next step. Every
//! check runs against the game passed in; callers hand over a scratch copy
//! and keep it only on `Ok`.
//!
//! Validation order for turn actions:
//! 0. game not finished (`GameOver`) and started
//! 1. current step permits the action label
//! 2. caller is the current player
//! 3. payload constraints, then the proof (draw/play only)
//!
//! Every accepted request records the anchor one past the ledger's latest,
//! so nobody can know the value a future draw consumes when submitting the
//! request that fixes it.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::config::{DeckExhaustion, EngineConfig, StaleAnchor};
use crate::core::hash::{short_hex, StateHash};
use crate::error::{EngineError, EngineResult, IllegalAction};
use crate::game::action::{transition, Action, Actor, Edge, JoinRequest, Step};
use crate::game::card::CardId;
use crate::game::combat::resolve_combat;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::state::{
    Creature, CreatureId, CreatureLookup, Game, GameStatus, PlayerId, PlayerState,
};
use crate::ledger::{Ledger, RandomnessAnchor};
use crate::proof::gate::{AcceptedTransition, GateOutcome, ProofGate, ProofVerifier};
use crate::proof::statement::{DrawStatement, InitialDrawStatement, PlayStatement, Statement};

/// Rules and proof gate bound together for one transition.
pub struct Machine<'a, V> {
    config: &'a EngineConfig,
    gate: &'a ProofGate<V>,
}

impl<'a, V: ProofVerifier> Machine<'a, V> {
    /// Bind rules and gate.
    pub fn new(config: &'a EngineConfig, gate: &'a ProofGate<V>) -> Self {
        Self { config, gate }
    }

    // =========================================================================
    // JOIN
    // =========================================================================

    /// Seat `caller` with an accepted initial draw. Starts the game once both
    /// seats are filled.
    pub fn join(
        &self,
        game: &mut Game,
        latest: RandomnessAnchor,
        caller: PlayerId,
        request: &JoinRequest,
    ) -> EngineResult<Vec<GameEvent>> {
        if let Some(winner) = game.winner() {
            return Err(EngineError::GameOver { winner });
        }
        let seat = game.seat_of(&caller).ok_or(IllegalAction::NotAPlayer { caller })?;
        if game.is_seated(seat) {
            return Err(IllegalAction::AlreadyJoined { player: caller }.into());
        }
        request.listing.validate(self.config.initial_hand_size)?;

        let statement = Statement::InitialDraw(InitialDrawStatement {
            game_id: game.id,
            player: caller,
            secret_commitment: request.secret_commitment,
            listing: request.listing.clone(),
            initial_hand_size: self.config.initial_hand_size,
            hand_root: request.hand_root,
            deck_root: request.deck_root,
        });
        let accepted = self.prove(&statement, &request.proof)?;

        let mut state = PlayerState::new(
            caller,
            request.secret_commitment,
            request.listing.clone(),
            self.config.starting_health,
        );
        state.apply_proof(&accepted);
        game.seat(seat, state);

        let mut events = vec![GameEvent::new(game.turn, GameEventData::PlayerJoined { player: caller })];
        debug!("{} joined game {} in seat {}", caller, game.id, seat);

        if game.is_seated(0) && game.is_seated(1) {
            game.status = GameStatus::InProgress;
            game.current_player_index = 0;
            game.current_step = Step::Draw;
            game.turn = 1;
            let first = game.players[0];
            info!("game {} started, {} to act", game.id, first);
            events.push(GameEvent::new(game.turn, GameEventData::GameStarted { first }));
        }

        // The next draw resolves against a block that does not exist yet.
        game.last_randomness_anchor = latest.next();
        Ok(events)
    }

    // =========================================================================
    // TURN ACTIONS
    // =========================================================================

    /// Apply one turn action.
    pub fn apply<L: Ledger + ?Sized>(
        &self,
        game: &mut Game,
        ledger: &L,
        caller: PlayerId,
        action: &Action,
    ) -> EngineResult<Vec<GameEvent>> {
        if let Some(winner) = game.winner() {
            return Err(EngineError::GameOver { winner });
        }
        if game.status == GameStatus::WaitingForPlayers {
            return Err(IllegalAction::GameNotStarted.into());
        }

        let step = game.current_step;
        let kind = action.kind();
        if !step.permits(kind) {
            return Err(IllegalAction::WrongStep { step, action: kind }.into());
        }

        let seat = game.seat_of(&caller).ok_or(IllegalAction::NotAPlayer { caller })?;
        if seat != game.current_player_index {
            return Err(IllegalAction::NotYourTurn { expected: game.current_player(), caller }.into());
        }

        let mut events = Vec::new();
        let edge = match action {
            Action::Draw { new_hand_root, new_deck_root, proof } => {
                self.draw(game, ledger, seat, *new_hand_root, *new_deck_root, proof, &mut events)?
            }
            Action::Play { card, new_hand_root, new_deck_root, proof } => {
                self.play(game, seat, *card, *new_hand_root, *new_deck_root, proof, &mut events)?
            }
            Action::Attack { attackers } => self.attack(game, seat, attackers, &mut events)?,
            Action::Defend { blocks } => self.defend(game, seat, blocks, &mut events)?,
            Action::Pass => {
                events.push(GameEvent::new(game.turn, GameEventData::PlayerPassed { player: caller }));
                Some(Edge::Passed)
            }
        };

        // No edge means the action ended the game.
        if let Some(edge) = edge {
            let (next, actor) = transition(step, edge)
                .ok_or(IllegalAction::WrongStep { step, action: kind })?;
            if actor == Actor::Opponent {
                game.current_player_index = 1 - game.current_player_index;
            }
            game.current_step = next;
            if next == Step::Draw && step != Step::Draw {
                game.turn = game.turn.saturating_add(1);
            }
            debug!("{} {:?} → {:?} for {}", caller, edge, next, game.current_player());
        }

        game.last_randomness_anchor = ledger.latest_anchor().next();
        Ok(events)
    }

    #[allow(clippy::too_many_arguments)]
    fn draw<L: Ledger + ?Sized>(
        &self,
        game: &mut Game,
        ledger: &L,
        seat: usize,
        new_hand_root: StateHash,
        new_deck_root: StateHash,
        proof: &[u8],
        events: &mut Vec<GameEvent>,
    ) -> EngineResult<Option<Edge>> {
        let player = game.players[seat];
        let state = game.player_at(seat).ok_or(IllegalAction::GameNotStarted)?;
        let before = *state.commitments();
        let secret_commitment = state.secret_commitment;

        if before.deck_size() == 0 {
            return match self.config.deck_exhaustion {
                DeckExhaustion::Reject => Err(EngineError::DeckExhausted { player }),
                DeckExhaustion::SkipDraw => {
                    events.push(GameEvent::new(game.turn, GameEventData::DrawSkipped { player }));
                    if before.hand_size() == 0 {
                        Ok(Some(Edge::DrawSkippedEmptyHand))
                    } else {
                        Ok(Some(Edge::DrawSkipped))
                    }
                }
                DeckExhaustion::Lose => {
                    let winner = game.players[1 - seat];
                    finish(game, winner, events);
                    Ok(None)
                }
            };
        }

        let anchor = game.last_randomness_anchor;
        let latest = ledger.latest_anchor();
        let ledger_value = match ledger.unpredictable_value(anchor) {
            Some(value) => value,
            None if anchor > latest => return Err(EngineError::AnchorPending { anchor, latest }),
            None => {
                return match self.config.stale_anchor {
                    StaleAnchor::Reject => Err(EngineError::AnchorUnavailable(anchor)),
                    StaleAnchor::Reanchor => {
                        warn!("{} anchor {} expired at {}, re-anchoring", player, anchor, latest);
                        events.push(GameEvent::new(
                            game.turn,
                            GameEventData::AnchorExpired { player, anchor },
                        ));
                        Ok(Some(Edge::Reanchored))
                    }
                };
            }
        };

        let statement = Statement::Draw(DrawStatement {
            game_id: game.id,
            player,
            secret_commitment,
            ledger_value,
            before,
            new_hand_root,
            new_deck_root,
        });
        let accepted = self.prove(&statement, proof)?;

        if let Some(state) = game.player_at_mut(seat) {
            state.apply_proof(&accepted);
        }
        debug!(
            "{} drew at anchor {}, hand root {}",
            player,
            anchor,
            short_hex(&new_hand_root)
        );
        events.push(GameEvent::new(game.turn, GameEventData::CardDrawn { player }));
        Ok(Some(Edge::Drew))
    }

    #[allow(clippy::too_many_arguments)]
    fn play(
        &self,
        game: &mut Game,
        seat: usize,
        card: CardId,
        new_hand_root: StateHash,
        new_deck_root: StateHash,
        proof: &[u8],
        events: &mut Vec<GameEvent>,
    ) -> EngineResult<Option<Edge>> {
        let player = game.players[seat];
        let state = game.player_at(seat).ok_or(IllegalAction::GameNotStarted)?;
        let before = *state.commitments();

        if before.hand_size() == 0 {
            return Err(IllegalAction::EmptyHand.into());
        }
        let stats = state.listing.stats_of(card).ok_or(IllegalAction::CardNotInListing { card })?;
        if new_deck_root != before.deck_root() {
            return Err(IllegalAction::DeckRootChanged.into());
        }

        let statement = Statement::Play(PlayStatement {
            game_id: game.id,
            player,
            secret_commitment: state.secret_commitment,
            before,
            card,
            stats,
            new_hand_root,
        });
        let accepted = self.prove(&statement, proof)?;

        let creature = game.allocate_creature_id().ok_or(EngineError::CreatureIdsExhausted)?;
        if let Some(state) = game.player_at_mut(seat) {
            state.apply_proof(&accepted);
            state.summon(Creature::new(creature, card, stats));
        }
        events.push(GameEvent::new(
            game.turn,
            GameEventData::CardPlayed { player, card, creature },
        ));
        Ok(Some(Edge::Played))
    }

    fn attack(
        &self,
        game: &mut Game,
        seat: usize,
        attackers: &[CreatureId],
        events: &mut Vec<GameEvent>,
    ) -> EngineResult<Option<Edge>> {
        let player = game.players[seat];
        let own = game.player_at(seat).ok_or(IllegalAction::GameNotStarted)?;
        let other = game.player_at(1 - seat).ok_or(IllegalAction::GameNotStarted)?;

        let mut declared = BTreeSet::new();
        for id in attackers {
            if !declared.insert(*id) {
                return Err(IllegalAction::DuplicateAttacker { creature: *id }.into());
            }
            check_owned(own, other, *id)?;
        }
        let contested = !declared.is_empty() && other.has_blockers();

        events.push(GameEvent::new(
            game.turn,
            GameEventData::PlayerAttacked { player, attackers: attackers.to_vec() },
        ));

        if contested {
            game.attackers = declared;
            return Ok(Some(Edge::AttackContested));
        }

        if resolve(game, seat, &declared, &BTreeMap::new(), events)? {
            Ok(None)
        } else {
            Ok(Some(Edge::AttackUncontested))
        }
    }

    fn defend(
        &self,
        game: &mut Game,
        seat: usize,
        blocks: &[(CreatureId, CreatureId)],
        events: &mut Vec<GameEvent>,
    ) -> EngineResult<Option<Edge>> {
        let player = game.players[seat];
        let attacking_seat = 1 - seat;
        let own = game.player_at(seat).ok_or(IllegalAction::GameNotStarted)?;
        let other = game.player_at(attacking_seat).ok_or(IllegalAction::GameNotStarted)?;

        let mut defenses = BTreeMap::new();
        let mut used = BTreeSet::new();
        for (attacker, defender) in blocks {
            if !game.attackers.contains(attacker) {
                return Err(IllegalAction::NotAttacking { creature: *attacker }.into());
            }
            if defenses.contains_key(attacker) {
                return Err(IllegalAction::AttackerBlockedTwice { attacker: *attacker }.into());
            }
            check_owned(own, other, *defender)?;
            if !used.insert(*defender) {
                return Err(IllegalAction::DefenderReused { defender: *defender }.into());
            }
            defenses.insert(*attacker, *defender);
        }

        events.push(GameEvent::new(
            game.turn,
            GameEventData::PlayerDefended { player, blocks: blocks.to_vec() },
        ));

        game.pending_defenses = defenses.clone();
        let attackers = std::mem::take(&mut game.attackers);
        let ended = resolve(game, attacking_seat, &attackers, &defenses, events)?;
        game.pending_defenses.clear();

        Ok(if ended { None } else { Some(Edge::Defended) })
    }

    fn prove(&self, statement: &Statement, proof: &[u8]) -> EngineResult<AcceptedTransition> {
        match self.gate.check(statement, proof) {
            GateOutcome::Accepted(accepted) => Ok(accepted),
            GateOutcome::Rejected { reason } => Err(EngineError::ProofRejected {
                kind: statement.kind(),
                reason,
            }),
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// `id` must be a live creature of `own`.
fn check_owned(own: &PlayerState, other: &PlayerState, id: CreatureId) -> EngineResult<()> {
    match own.lookup(id) {
        CreatureLookup::Alive(_) => Ok(()),
        CreatureLookup::Dead(_) => Err(IllegalAction::CreatureDead { creature: id }.into()),
        CreatureLookup::Missing => {
            if other.lookup(id) == CreatureLookup::Missing {
                Err(IllegalAction::UnknownCreature { creature: id }.into())
            } else {
                Err(IllegalAction::NotOwner { creature: id }.into())
            }
        }
    }
}

/// Run combat and emit its events. Returns true if it ended the game.
fn resolve(
    game: &mut Game,
    attacking_seat: usize,
    attackers: &BTreeSet<CreatureId>,
    defenses: &BTreeMap<CreatureId, CreatureId>,
    events: &mut Vec<GameEvent>,
) -> EngineResult<bool> {
    let turn = game.turn;
    let (attacking, defending) = game.pair_mut(attacking_seat).ok_or(IllegalAction::GameNotStarted)?;
    let report = resolve_combat(attacking, defending, attackers, defenses);

    for death in &report.deaths {
        events.push(GameEvent::new(
            turn,
            GameEventData::CreatureDied { owner: death.owner, creature: death.creature },
        ));
    }
    if report.damage > 0 {
        events.push(GameEvent::new(
            turn,
            GameEventData::PlayerDamaged {
                player: defending.id,
                amount: report.damage,
                health: defending.health,
            },
        ));
    }

    let winner = attacking.id;
    let lethal = defending.health == 0;
    if lethal {
        finish(game, winner, events);
    }
    Ok(lethal)
}

fn finish(game: &mut Game, winner: PlayerId, events: &mut Vec<GameEvent>) {
    game.status = GameStatus::Finished { winner };
    game.attackers.clear();
    game.pending_defenses.clear();
    info!("game {} finished on turn {}, winner {}", game.id, game.turn, winner);
    events.push(GameEvent::game_ended(game.turn, winner));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action::ActionKind;
    use crate::game::card::{CardStats, DeckListing};
    use crate::game::state::GameId;
    use crate::ledger::InMemoryLedger;
    use crate::proof::gate::StubProofVerifier;

    const A: PlayerId = PlayerId::new([1; 16]);
    const B: PlayerId = PlayerId::new([2; 16]);

    fn request() -> JoinRequest {
        JoinRequest {
            secret_commitment: [9; 32],
            listing: DeckListing::uniform(CardId(1), CardStats::new(2, 2), 10),
            hand_root: [1; 32],
            deck_root: [2; 32],
            proof: vec![1],
        }
    }

    fn started(config: &EngineConfig, gate: &ProofGate<StubProofVerifier>) -> Game {
        let machine = Machine::new(config, gate);
        let mut game = Game::new(GameId::new([3; 16]), [A, B], RandomnessAnchor(0));
        machine.join(&mut game, RandomnessAnchor(0), A, &request()).unwrap();
        machine.join(&mut game, RandomnessAnchor(0), B, &request()).unwrap();
        game
    }

    #[test]
    fn test_join_starts_game() {
        let config = EngineConfig::default();
        let gate = ProofGate::new(StubProofVerifier);
        let game = started(&config, &gate);

        assert_eq!(game.status, GameStatus::InProgress);
        assert_eq!(game.current_player(), A);
        assert_eq!(game.current_step, Step::Draw);
        assert_eq!(game.turn, 1);
        assert_eq!(game.last_randomness_anchor, RandomnessAnchor(1));

        let a = game.player(&A).unwrap();
        assert_eq!(a.health, 20);
        assert_eq!(a.commitments().hand_size(), 3);
        assert_eq!(a.commitments().deck_size(), 7);
        assert_eq!(a.commitments().hand_root(), [1; 32]);
    }

    #[test]
    fn test_wrong_step_checked_before_caller() {
        let config = EngineConfig::default();
        let gate = ProofGate::new(StubProofVerifier);
        let mut game = started(&config, &gate);
        let ledger = InMemoryLedger::new(b"machine");

        // B is not the current player, but the step violation is reported first.
        let result = Machine::new(&config, &gate).apply(&mut game, &ledger, B, &Action::Pass);
        assert_eq!(
            result,
            Err(IllegalAction::WrongStep { step: Step::Draw, action: ActionKind::Pass }.into())
        );
    }

    #[test]
    fn test_play_fails_once_creature_ids_run_out() {
        let config = EngineConfig::default();
        let gate = ProofGate::new(StubProofVerifier);
        let mut game = started(&config, &gate);
        let mut ledger = InMemoryLedger::new(b"machine");
        ledger.advance();
        let machine = Machine::new(&config, &gate);

        let draw = Action::Draw { new_hand_root: [3; 32], new_deck_root: [4; 32], proof: vec![1] };
        machine.apply(&mut game, &ledger, A, &draw).unwrap();

        game.next_creature_id = u32::MAX;
        let play = Action::Play {
            card: CardId(1),
            new_hand_root: [5; 32],
            new_deck_root: [4; 32],
            proof: vec![1],
        };
        assert_eq!(machine.apply(&mut game, &ledger, A, &play), Err(EngineError::CreatureIdsExhausted));
    }

    #[test]
    fn test_turn_action_before_start() {
        let config = EngineConfig::default();
        let gate = ProofGate::new(StubProofVerifier);
        let mut game = Game::new(GameId::new([3; 16]), [A, B], RandomnessAnchor(0));
        let ledger = InMemoryLedger::new(b"machine");

        let result = Machine::new(&config, &gate).apply(&mut game, &ledger, A, &Action::Pass);
        assert_eq!(result, Err(IllegalAction::GameNotStarted.into()));
    }

    #[test]
    fn test_stranger_cannot_join() {
        let config = EngineConfig::default();
        let gate = ProofGate::new(StubProofVerifier);
        let mut game = Game::new(GameId::new([3; 16]), [A, B], RandomnessAnchor(0));
        let stranger = PlayerId::new([7; 16]);

        let result = Machine::new(&config, &gate).join(&mut game, RandomnessAnchor(0), stranger, &request());
        assert_eq!(result, Err(IllegalAction::NotAPlayer { caller: stranger }.into()));
    }
}
