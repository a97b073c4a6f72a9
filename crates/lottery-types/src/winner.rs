//! Settlement record produced when a round closes.
//!
//! The [`WinnerRecord`] doubles as a receipt: besides who won and how much,
//! it commits (via `snapshot_hash`) to the exact ordered participant list the
//! winner source was shown.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Account, Participant, RoundId, constants};

/// The winner of a closed round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerRecord {
    /// The round this record settles.
    pub round_id: RoundId,
    pub username: String,
    pub account: Account,
    /// Entire pot: `entry_fee × participant_count`.
    pub payout_amount: Decimal,
    /// Index the winner source returned.
    pub winner_index: usize,
    /// Participants in the round at settlement.
    pub participant_count: usize,
    /// Hex SHA-256 of the participant snapshot used for selection.
    pub snapshot_hash: String,
    pub settled_at: DateTime<Utc>,
}

impl WinnerRecord {
    /// Compute the snapshot hash over an ordered participant list.
    ///
    /// Commits to the round ID, the participant count, and each
    /// participant's position, username, account and paid amount, in order.
    #[must_use]
    pub fn snapshot_hash(round_id: RoundId, participants: &[Participant]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(constants::SNAPSHOT_HASH_DOMAIN);
        hasher.update(round_id.0.as_bytes());
        hasher.update((participants.len() as u64).to_le_bytes());

        for p in participants {
            hasher.update((p.position as u64).to_le_bytes());
            // Length prefixes keep ("ab","c") and ("a","bc") apart.
            hasher.update((p.username.len() as u64).to_le_bytes());
            hasher.update(p.username.as_bytes());
            hasher.update((p.account.as_str().len() as u64).to_le_bytes());
            hasher.update(p.account.as_str().as_bytes());
            hasher.update(p.paid_amount.to_string().as_bytes());
        }

        hex::encode(hasher.finalize())
    }

    /// Check that this record's hash matches the given participant list.
    #[must_use]
    pub fn verify_snapshot(&self, participants: &[Participant]) -> bool {
        participants.len() == self.participant_count
            && Self::snapshot_hash(self.round_id, participants) == self.snapshot_hash
    }
}
