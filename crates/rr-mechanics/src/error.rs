//! Error types for the mechanics engine.
//!
//! These are usage-contract violations only. A character rolling badly is a
//! [`SkillOutcome`](crate::resolution::SkillOutcome), never an error.

use crate::chain::ChainStatus;

/// Errors that can occur during mechanics operations.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// A cooperative check was requested with no participants.
    #[error("at least one participant is required")]
    NoParticipants,

    /// A chained check was started with no steps.
    #[error("a chained check needs at least one step")]
    EmptyChain,

    /// No chain with this id exists in the repository.
    #[error("chain {0} not found")]
    ChainNotFound(String),

    /// The chain has already reached a terminal status.
    #[error("chain {id} is already complete ({status})")]
    ChainComplete {
        /// Chain id.
        id: String,
        /// The terminal status the chain is in.
        status: ChainStatus,
    },

    /// The chain is waiting for a retry-or-abandon decision.
    #[error("chain {0} is awaiting a retry decision; retry or abandon it first")]
    AwaitingRetry(String),

    /// The chain is not in a state that allows a retry.
    #[error("chain {0} cannot be retried")]
    NotRetryable(String),

    /// An extended check was configured with impossible parameters.
    #[error("invalid extended check: {0}")]
    InvalidExtendedCheck(String),

    /// A round was requested on an extended check that is no longer running.
    #[error("extended check {id} is not in progress ({status})")]
    ExtendedCheckInactive {
        /// Extended check id.
        id: String,
        /// Current status of the check.
        status: crate::extended::ExtendedStatus,
    },

    /// A stored chain points at a step it does not have.
    #[error("chain {id} has no step {step}")]
    CorruptChain {
        /// Chain id.
        id: String,
        /// The missing step index.
        step: usize,
    },

    /// The chain repository failed to read or write.
    #[error("storage error: {0}")]
    Storage(String),

    /// The mechanics configuration is malformed.
    #[error("invalid mechanics config: {0}")]
    InvalidConfig(String),
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;
