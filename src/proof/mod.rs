//! Proof System
//!
//! Everything between a claimed commitment update and its acceptance:
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PROOF SYSTEM                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  statement.rs    - InitialDraw / Draw / Play statements     │
//! │  gate.rs         - Verifier seam, AcceptedTransition        │
//! │  witness.rs      - Private inputs behind a statement        │
//! │  transparent.rs  - Reference verifier (re-execution)        │
//! │  prover.rs       - Client-side payload preparation          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod statement;
pub mod gate;
pub mod witness;
pub mod transparent;
pub mod prover;

// Re-export key types
pub use statement::{
    Statement, StatementKind,
    InitialDrawStatement, DrawStatement, PlayStatement,
};
pub use gate::{
    AcceptedTransition, GateOutcome, ProofGate,
    ProofVerifier, ProofVerificationError,
    StubProofVerifier, FixtureVerifier,
};
pub use witness::Witness;
pub use transparent::{TransparentVerifier, ConstraintViolation};
pub use prover::{LocalProver, ProverError};
