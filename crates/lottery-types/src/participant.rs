//! Participant records held by a round's registry.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Account;

/// A participant admitted to a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// 0-based admission order within the round.
    pub position: usize,
    /// Trimmed, case-sensitive display name; unique within the round.
    pub username: String,
    /// Ledger address the fee was collected from and any payout goes to.
    pub account: Account,
    /// Fee paid on admission (equals the round's entry fee).
    pub paid_amount: Decimal,
    /// When the participant was admitted.
    pub admitted_at: DateTime<Utc>,
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Participant {
    pub fn dummy(position: usize, username: &str, account: &str) -> Self {
        Self {
            position,
            username: username.to_string(),
            account: Account::from(account),
            paid_amount: Decimal::new(1, 2),
            admitted_at: Utc::now(),
        }
    }
}
