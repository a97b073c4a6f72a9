//! Participant registry for a single round.
//!
//! Participants are kept in admission order. Usernames are unique within
//! the round: exact, case-sensitive comparison on the trimmed value.

use std::collections::HashSet;

use chrono::Utc;
use lottery_types::{Account, LotteryError, Participant, Result};
use rust_decimal::Decimal;

/// Trim a raw username and check it is non-empty and within `max_len`
/// characters.
///
/// # Errors
/// Returns `InvalidUsername` if the trimmed name is empty or too long.
pub fn normalize_username(raw: &str, max_len: usize) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LotteryError::InvalidUsername {
            reason: "username is required".to_string(),
        });
    }
    let len = trimmed.chars().count();
    if len > max_len {
        return Err(LotteryError::InvalidUsername {
            reason: format!("username is {len} characters, max {max_len}"),
        });
    }
    Ok(trimmed.to_string())
}

/// A normalized username cleared for admission at a given position.
#[derive(Debug)]
pub struct Admissible {
    username: String,
    position: usize,
}

impl Admissible {
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Ordered, username-unique list of a round's participants.
pub struct ParticipantRegistry {
    /// Participants in admission order.
    participants: Vec<Participant>,
    /// Index of usernames already admitted.
    usernames: HashSet<String>,
    /// Maximum number of participants before the round is full.
    max_participants: usize,
}

impl ParticipantRegistry {
    /// Create an empty registry with the given cap.
    #[must_use]
    pub fn new(max_participants: usize) -> Self {
        Self {
            participants: Vec::new(),
            usernames: HashSet::new(),
            max_participants,
        }
    }

    /// Check that `username` could be admitted right now, without admitting it.
    ///
    /// The engine calls this before collecting a fee so a doomed admission
    /// never moves funds. The returned [`Admissible`] is what
    /// [`push`](Self::push) consumes.
    ///
    /// # Errors
    /// - `DuplicateUsername` if the name is taken
    /// - `RoundFull` if the registry is at capacity
    pub fn check_admissible(&self, username: String) -> Result<Admissible> {
        if self.usernames.contains(&username) {
            return Err(LotteryError::DuplicateUsername(username));
        }
        if self.participants.len() >= self.max_participants {
            return Err(LotteryError::RoundFull {
                max: self.max_participants,
            });
        }
        Ok(Admissible {
            username,
            position: self.participants.len(),
        })
    }

    /// Append a cleared participant at the tail and return a copy of the record.
    ///
    /// The registry must not have changed since `admissible` was issued.
    pub fn push(
        &mut self,
        admissible: Admissible,
        account: Account,
        paid_amount: Decimal,
    ) -> Participant {
        debug_assert_eq!(admissible.position, self.participants.len());
        debug_assert!(!self.usernames.contains(&admissible.username));

        let participant = Participant {
            position: admissible.position,
            username: admissible.username,
            account,
            paid_amount,
            admitted_at: Utc::now(),
        };
        self.usernames.insert(participant.username.clone());
        self.participants.push(participant.clone());
        participant
    }

    /// Participants in admission order.
    #[must_use]
    pub fn as_slice(&self) -> &[Participant] {
        &self.participants
    }

    /// Participant at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Participant> {
        self.participants.get(index)
    }

    /// Whether `username` (already trimmed) is in the round.
    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.usernames.contains(username)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Remove everyone, for a new round.
    pub fn clear(&mut self) {
        self.participants.clear();
        self.usernames.clear();
    }
}
