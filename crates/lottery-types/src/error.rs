//! Error types for the lottery round engine.
//!
//! All errors use the `LT_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Admission errors
//! - 2xx: Lifecycle errors
//! - 3xx: Ledger gateway errors
//! - 4xx: Winner selection errors
//! - 5xx: Pot accounting errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::RoundState;

/// Central error enum for all lottery engine operations.
///
/// Every variant leaves the round in a previously-valid state: either `Open`
/// with the prior participant set, or `Open` after a rolled-back settlement.
#[derive(Debug, Error)]
pub enum LotteryError {
    // =================================================================
    // Admission Errors (1xx)
    // =================================================================
    /// The username is empty after trimming, or too long.
    #[error("LT_ERR_100: Invalid username: {reason}")]
    InvalidUsername { reason: String },

    /// A participant with this username is already in the round.
    #[error("LT_ERR_101: Username already entered: {0}")]
    DuplicateUsername(String),

    /// The round reached its participant cap.
    #[error("LT_ERR_102: Round full: {max} participants")]
    RoundFull { max: usize },

    // =================================================================
    // Lifecycle Errors (2xx)
    // =================================================================
    /// An operation that needs an `Open` round was attempted in another state.
    #[error("LT_ERR_200: Round not open: current state {state}")]
    RoundNotOpen { state: RoundState },

    /// Settlement was requested on a round with nobody in it.
    #[error("LT_ERR_201: No participants to settle")]
    NoParticipants,

    // =================================================================
    // Ledger Gateway Errors (3xx)
    // =================================================================
    /// The gateway could not complete a fee collection or payout.
    #[error("LT_ERR_300: Ledger gateway unavailable: {reason}")]
    GatewayUnavailable { reason: String },

    /// The gateway refused to collect the entry fee.
    #[error("LT_ERR_301: Entry fee rejected: {reason}")]
    FeeRejected { reason: String },

    /// The gateway rejected the pot payout; settlement was rolled back.
    #[error("LT_ERR_302: Settlement failed: {reason}")]
    SettlementFailed { reason: String },

    // =================================================================
    // Winner Selection Errors (4xx)
    // =================================================================
    /// The winner source failed or named a participant outside the list.
    #[error("LT_ERR_400: Winner selection failed: {reason}")]
    WinnerSelectionFailed { reason: String },

    // =================================================================
    // Pot Errors (5xx)
    // =================================================================
    /// `entry_fee × participants` does not fit in a `Decimal`.
    #[error("LT_ERR_500: Pot overflow: {entry_fee} x {participants}")]
    PotOverflow { entry_fee: Decimal, participants: usize },

    /// Collected fees disagree with the computed pot.
    #[error("LT_ERR_501: Pot mismatch: expected {expected}, collected {collected}")]
    PotMismatch { expected: Decimal, collected: Decimal },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("LT_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("LT_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Invalid round configuration.
    #[error("LT_ERR_902: Configuration error: {0}")]
    InvalidConfig(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LotteryError>;

impl From<serde_json::Error> for LotteryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Collaborator errors
// ---------------------------------------------------------------------------

/// Failure reported by a ledger gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The ledger processed the request and refused it (e.g. insufficient funds).
    #[error("rejected: {0}")]
    Rejected(String),

    /// The request could not be completed (transport down, timeout).
    #[error("unavailable: {0}")]
    Unavailable(String),
}

/// Failure reported by a winner source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SelectionError(pub String);
