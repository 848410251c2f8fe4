//! Proof Gate
//!
//! Trust boundary between the engine and external proof verification.
//! The gate turns a claimed [`Statement`] plus a proof artifact into either
//! an [`AcceptedTransition`] (the only value able to update committed roots)
//! or a rejection reason. Verifier errors count as rejections.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::warn;

use crate::commit::store::Commitments;
use crate::game::state::PlayerId;
use crate::proof::statement::{Statement, StatementKind};

/// Interface for proof verification.
///
/// Implementations wrap the external verifier for the deployed circuits.
pub trait ProofVerifier {
    /// Verify `proof` for a statement of `kind` with the given public inputs.
    fn verify(
        &self,
        kind: StatementKind,
        public_inputs: &[u8],
        proof: &[u8],
    ) -> Result<bool, ProofVerificationError>;
}

impl<V: ProofVerifier + ?Sized> ProofVerifier for Box<V> {
    fn verify(
        &self,
        kind: StatementKind,
        public_inputs: &[u8],
        proof: &[u8],
    ) -> Result<bool, ProofVerificationError> {
        (**self).verify(kind, public_inputs, proof)
    }
}

/// Errors during proof verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofVerificationError {
    /// Proof format is invalid.
    #[error("invalid proof format")]
    InvalidProofFormat,
    /// Public inputs don't match what the proof was made for.
    #[error("public input mismatch")]
    PublicInputMismatch,
    /// Verification computation failed.
    #[error("verification failed: {0}")]
    VerificationFailed(String),
}

/// Proof of a statement that the gate accepted.
///
/// Can only be created by [`ProofGate::check`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcceptedTransition {
    kind: StatementKind,
    player: PlayerId,
    next: Commitments,
}

impl AcceptedTransition {
    /// Kind of the accepted statement.
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Player whose commitments it updates.
    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Commitments attested by the statement.
    pub fn next(&self) -> Commitments {
        self.next
    }
}

/// Outcome of a gate check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateOutcome {
    /// Statement proven.
    Accepted(AcceptedTransition),
    /// Statement not proven.
    Rejected {
        /// Why.
        reason: String,
    },
}

/// Synchronous wrapper around an injected verifier.
#[derive(Clone, Debug, Default)]
pub struct ProofGate<V> {
    verifier: V,
}

impl<V: ProofVerifier> ProofGate<V> {
    /// Create a gate over a verifier.
    pub fn new(verifier: V) -> Self {
        Self { verifier }
    }

    /// Underlying verifier.
    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    /// Check a statement against a proof artifact.
    pub fn check(&self, statement: &Statement, proof: &[u8]) -> GateOutcome {
        let kind = statement.kind();
        let public_inputs = match statement.public_inputs() {
            Ok(bytes) => bytes,
            Err(e) => {
                return GateOutcome::Rejected {
                    reason: format!("public inputs could not be encoded: {}", e),
                };
            }
        };

        match self.verifier.verify(kind, &public_inputs, proof) {
            Ok(true) => GateOutcome::Accepted(AcceptedTransition {
                kind,
                player: statement.player(),
                next: statement.next_commitments(),
            }),
            Ok(false) => {
                warn!("{} proof from {} rejected", kind, statement.player());
                GateOutcome::Rejected { reason: "proof does not verify".to_string() }
            }
            Err(e) => {
                warn!("{} proof from {} failed verification: {}", kind, statement.player(), e);
                GateOutcome::Rejected { reason: e.to_string() }
            }
        }
    }
}

/// Stub verifier for development (accepts any non-empty proof).
pub struct StubProofVerifier;

impl ProofVerifier for StubProofVerifier {
    fn verify(
        &self,
        _kind: StatementKind,
        _public_inputs: &[u8],
        proof: &[u8],
    ) -> Result<bool, ProofVerificationError> {
        if proof.is_empty() {
            return Err(ProofVerificationError::InvalidProofFormat);
        }
        Ok(true)
    }
}

/// Deterministic verifier driven by a fixture table.
///
/// Verdicts are keyed by statement kind and proof bytes; anything not in the
/// table is rejected.
#[derive(Clone, Debug, Default)]
pub struct FixtureVerifier {
    table: BTreeMap<(StatementKind, Vec<u8>), bool>,
}

impl FixtureVerifier {
    /// Empty table (rejects everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `proof` for statements of `kind`.
    pub fn accept(mut self, kind: StatementKind, proof: &[u8]) -> Self {
        self.table.insert((kind, proof.to_vec()), true);
        self
    }

    /// Explicitly reject `proof` for statements of `kind`.
    pub fn reject(mut self, kind: StatementKind, proof: &[u8]) -> Self {
        self.table.insert((kind, proof.to_vec()), false);
        self
    }
}

impl ProofVerifier for FixtureVerifier {
    fn verify(
        &self,
        kind: StatementKind,
        _public_inputs: &[u8],
        proof: &[u8],
    ) -> Result<bool, ProofVerificationError> {
        Ok(self.table.get(&(kind, proof.to_vec())).copied().unwrap_or(false))
    }
}
