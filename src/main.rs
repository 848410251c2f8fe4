//! Veiled Duel Demo
//!
//! Plays one game between two local provers against an in-memory ledger
//! and the transparent verifier, then prints the final state hash.

use std::collections::BTreeSet;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use veiled_duel::{
    VERSION,
    config::EngineConfig,
    core::rng::PlayerSeed,
    error::EngineError,
    game::{
        action::{Action, Step},
        card::{CardDefinition, CardId, CardStats, DeckListing},
        events::{GameEvent, GameEventData},
        engine::GameEngine,
        state::{CreatureId, Game, GameId, PlayerId},
    },
    ledger::{InMemoryLedger, Ledger},
    proof::{prover::LocalProver, transparent::TransparentVerifier},
};

/// Upper bound on submitted actions before the demo gives up.
const MAX_ACTIONS: usize = 2_000;

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let config = EngineConfig::from_env().context("invalid engine configuration")?;
    info!("Veiled Duel v{}", VERSION);
    info!(
        "starting health {}, initial hand {}, deck exhaustion {:?}",
        config.starting_health, config.initial_hand_size, config.deck_exhaustion
    );

    demo_game(config)
}

fn listing(base: u32) -> DeckListing {
    let stats = [(2, 1), (1, 3), (3, 2), (4, 4), (2, 2), (5, 1), (1, 1), (3, 3), (2, 5), (4, 2)];
    DeckListing::new(
        stats.iter()
            .enumerate()
            .map(|(i, (attack, defense))| CardDefinition {
                id: CardId(base + i as u32),
                stats: CardStats::new(*attack, *defense),
            })
            .collect(),
    )
}

struct Seat {
    id: PlayerId,
    prover: LocalProver,
}

fn demo_game(config: EngineConfig) -> Result<()> {
    info!("=== Starting Demo Game ===");

    let mut ledger = InMemoryLedger::new(b"veiled-duel-demo");
    let mut engine = GameEngine::new(config.clone(), TransparentVerifier);
    let game_id = GameId::random();
    let ids = [PlayerId::new([0xa1; 16]), PlayerId::new([0xb2; 16])];
    engine.create_game(&ledger, game_id, ids)?;

    let mut seats = Vec::with_capacity(2);
    for (i, id) in ids.iter().enumerate() {
        let seed = PlayerSeed::from_secret(format!("demo-seed-{}", i).as_bytes());
        let (prover, request) = LocalProver::deal(seed, &listing(100 * (i as u32 + 1)), config.initial_hand_size)?;
        ledger.advance();
        let events = engine.join(&ledger, game_id, *id, &request)?;
        log_events(&events);
        seats.push(Seat { id: *id, prover });
    }

    for _ in 0..MAX_ACTIONS {
        // One block per action; it carries the value the last action anchored.
        ledger.advance();
        let game = engine.game(&game_id).ok_or_else(|| anyhow!("game vanished"))?;
        if game.is_finished() {
            break;
        }

        let seat = game.current_player_index;
        let (action, next) = choose(game, &ledger, seat, &seats[seat].prover)?;

        match engine.submit(&ledger, game_id, seats[seat].id, &action) {
            Ok(events) => {
                log_events(&events);
                if let Some(prover) = next {
                    seats[seat].prover = prover;
                }
            }
            Err(EngineError::DeckExhausted { player }) => {
                warn!("{} cannot draw and the rules forbid skipping; stopping", player);
                break;
            }
            Err(e) => bail!("action refused: {}", e),
        }
    }

    let game = engine.game(&game_id).ok_or_else(|| anyhow!("game vanished"))?;
    info!("=== Game Results ===");
    match game.winner() {
        Some(winner) => info!("winner: {} after {} turns", winner, game.turn),
        None => warn!("no winner after {} turns", game.turn),
    }
    for state in ids.iter().filter_map(|id| game.player(id)) {
        info!(
            "{}: health {}, board {}, graveyard {}",
            state.id, state.health, state.board.len(), state.graveyard.len()
        );
    }

    let view = engine.view(&game_id).ok_or_else(|| anyhow!("game vanished"))?;
    info!("Final State Hash: {}", view.state_hash);
    Ok(())
}

/// Pick the next action for `seat`, with the prover state that follows it.
fn choose(
    game: &Game,
    ledger: &InMemoryLedger,
    seat: usize,
    prover: &LocalProver,
) -> Result<(Action, Option<LocalProver>)> {
    match game.current_step {
        Step::Draw if prover.deck().is_empty() => {
            let action = Action::Draw {
                new_hand_root: prover.hand_root(),
                new_deck_root: prover.deck_root(),
                proof: Vec::new(),
            };
            Ok((action, None))
        }
        Step::Draw => {
            let anchor = game.last_randomness_anchor;
            let value = ledger
                .unpredictable_value(anchor)
                .ok_or_else(|| anyhow!("ledger lost anchor {}", anchor))?;
            let (action, next) = prover.prepare_draw(&value)?;
            Ok((action, Some(next)))
        }
        Step::Play if !prover.hand().is_empty() => {
            let (action, next) = prover.prepare_play(prover.hand()[0])?;
            Ok((action, Some(next)))
        }
        Step::Play | Step::Attack => {
            let own = game.player_at(seat).ok_or_else(|| anyhow!("seat {} empty", seat))?;
            let attackers: Vec<CreatureId> = own.board.keys().copied().collect();
            if attackers.is_empty() {
                Ok((Action::Pass, None))
            } else {
                Ok((Action::Attack { attackers }, None))
            }
        }
        Step::Defend => Ok((Action::Defend { blocks: blocks(game, seat)? }, None)),
    }
}

/// Block each attacker with the first unused creature that survives it.
fn blocks(game: &Game, seat: usize) -> Result<Vec<(CreatureId, CreatureId)>> {
    let own = game.player_at(seat).ok_or_else(|| anyhow!("seat {} empty", seat))?;
    let other = game.player_at(1 - seat).ok_or_else(|| anyhow!("seat {} empty", 1 - seat))?;

    let mut used = BTreeSet::new();
    let mut pairs = Vec::new();
    for attacker in game.attackers.iter().filter_map(|id| other.board.get(id)) {
        let blocker = own.board.values()
            .find(|c| !used.contains(&c.id) && c.defense > attacker.attack);
        if let Some(blocker) = blocker {
            used.insert(blocker.id);
            pairs.push((attacker.id, blocker.id));
        }
    }
    Ok(pairs)
}

fn log_events(events: &[GameEvent]) {
    for event in events {
        match &event.data {
            GameEventData::GameStarted { first } => info!("game started, {} goes first", first),
            GameEventData::CardPlayed { player, card, creature } => {
                info!("turn {}: {} played {} as {}", event.turn, player, card, creature)
            }
            GameEventData::CreatureDied { owner, creature } => {
                info!("turn {}: {} lost {}", event.turn, owner, creature)
            }
            GameEventData::PlayerDamaged { player, amount, health } => {
                info!("turn {}: {} took {} ({} left)", event.turn, player, amount, health)
            }
            GameEventData::DrawSkipped { player } => {
                info!("turn {}: {} skipped a draw", event.turn, player)
            }
            GameEventData::GameEnded { winner } => info!("game ended, winner {}", winner),
            _ => {}
        }
    }
}
