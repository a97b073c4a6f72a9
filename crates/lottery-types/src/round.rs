//! Round lifecycle types.
//!
//! A round moves through **OPEN → SETTLING → CLOSED** and returns to OPEN
//! only through an explicit reset.
//!
//! During OPEN, participants are admitted and fees collected.
//! During SETTLING, the winner is selected and the pot paid out.
//! CLOSED holds the winner record until the caller resets the round.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Participant, RoundId, WinnerRecord};

/// The three states of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundState {
    /// Accepting new participants.
    Open,
    /// Winner selection and payout in progress.
    Settling,
    /// Winner paid; waiting for reset.
    Closed,
}

impl RoundState {
    #[must_use]
    pub fn is_open(self) -> bool {
        self == Self::Open
    }
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Settling => write!(f, "SETTLING"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// Read-only snapshot of a round, suitable for a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round_id: RoundId,
    pub state: RoundState,
    pub entry_fee: Decimal,
    pub asset: String,
    /// Participants in admission order.
    pub participants: Vec<Participant>,
    /// Current pot (`entry_fee × participants`).
    pub pot: Decimal,
    /// Present only when `state` is `Closed`.
    pub winner: Option<WinnerRecord>,
}
