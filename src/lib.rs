//! # Veiled Duel
//!
//! Deterministic ledger engine for a two-player card game whose hands and
//! decks stay private behind committed roots.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       VEILED DUEL                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Deterministic primitives                │
//! │  ├── hash.rs       - Domain-separated SHA-256 hashing        │
//! │  └── rng.rs        - Seed commitments, draw randomness       │
//! │                                                              │
//! │  commit/           - Hand and deck commitments               │
//! │  ├── merkle.rs     - Binary Merkle tree                      │
//! │  ├── collection.rs - Private collections, salted roots       │
//! │  └── store.rs      - Public roots and sizes per player       │
//! │                                                              │
//! │  proof/            - Proof gate and reference prover         │
//! │  ├── statement.rs  - InitialDraw / Draw / Play statements    │
//! │  ├── gate.rs       - Verifier seam, accepted transitions     │
//! │  ├── witness.rs    - Private inputs behind a statement       │
//! │  ├── transparent.rs- Re-executing reference verifier         │
//! │  └── prover.rs     - Client-side payload preparation         │
//! │                                                              │
//! │  game/             - Game logic (deterministic)              │
//! │  ├── card.rs       - Cards and deck listings                 │
//! │  ├── state.rs      - Game and player state                   │
//! │  ├── action.rs     - Steps, actions, transition table        │
//! │  ├── machine.rs    - Per-request validation and effects      │
//! │  ├── combat.rs     - Attack/defend resolution                │
//! │  ├── events.rs     - Emitted events                          │
//! │  ├── view.rs       - JSON snapshots                          │
//! │  └── engine.rs     - Game store, atomic commits              │
//! │                                                              │
//! │  ledger.rs         - Randomness anchors                      │
//! │  config.rs         - Engine rules from JSON or environment   │
//! │  error.rs          - Engine errors                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/`, `commit/` and `game/` modules are **100% deterministic**:
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//! - All randomness from ledger values mixed with committed seeds
//!
//! Given the same ledger and the same requests, every node reaches the
//! **same state hash**.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod commit;
pub mod proof;
pub mod game;
pub mod ledger;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use core::hash::{StateHash, StateHasher};
pub use core::rng::PlayerSeed;
pub use commit::{CardCollection, Commitments};
pub use proof::{LocalProver, ProofVerifier, TransparentVerifier};
pub use game::{Action, Game, GameEngine, GameEvent, GameId, PlayerId, Step};
pub use ledger::{InMemoryLedger, Ledger, RandomnessAnchor};
pub use config::{DeckExhaustion, EngineConfig, StaleAnchor};
pub use error::{EngineError, EngineResult, IllegalAction};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
