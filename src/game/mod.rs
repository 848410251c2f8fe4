//! Game Logic Module
//!
//! Turn/step machine, combat and the engine that owns every game.
//! 100% deterministic.
//!
//! ## Module Structure
//!
//! - `card`: Card kinds, stats and declared deck listings
//! - `state`: Game, player state, creatures
//! - `action`: Steps, actions and the transition table
//! - `machine`: Validation and effects of one request
//! - `combat`: Attack/defend resolution
//! - `events`: Events emitted per accepted request
//! - `view`: JSON snapshot for clients
//! - `engine`: Game store with clone-and-commit atomicity

pub mod card;
pub mod state;
pub mod action;
pub mod machine;
pub mod combat;
pub mod events;
pub mod view;
pub mod engine;

// Re-export key types
pub use card::{CardId, CardStats, CardDefinition, DeckListing};
pub use state::{Game, GameId, GameStatus, PlayerId, PlayerState, Creature, CreatureId};
pub use action::{Action, ActionKind, JoinRequest, Step, TRANSITIONS};
pub use combat::{resolve_combat, CombatReport};
pub use events::{GameEvent, GameEventData};
pub use view::{GameView, PlayerView};
pub use engine::GameEngine;
