//! Pot accounting for a single round.
//!
//! Invariant checked before every payout:
//! ```text
//! collected == entry_fee × participants
//! ```
//! The whole pot goes to the winner; no fee is retained.

use lottery_types::{LotteryError, Result};
use rust_decimal::Decimal;

/// Pot for `participants` entrants at `entry_fee` each.
///
/// # Errors
/// Returns `PotOverflow` if the product does not fit in a `Decimal`.
pub fn pot_for(entry_fee: Decimal, participants: usize) -> Result<Decimal> {
    entry_fee
        .checked_mul(Decimal::from(participants))
        .ok_or(LotteryError::PotOverflow {
            entry_fee,
            participants,
        })
}

/// Tracks fees collected into and paid out of the current round's pot.
pub struct PotLedger {
    /// Fixed entry fee for the round.
    entry_fee: Decimal,
    /// Fees confirmed by the gateway this round.
    collected: Decimal,
    /// Payouts confirmed by the gateway this round.
    paid_out: Decimal,
}

impl PotLedger {
    #[must_use]
    pub fn new(entry_fee: Decimal) -> Self {
        Self {
            entry_fee,
            collected: Decimal::ZERO,
            paid_out: Decimal::ZERO,
        }
    }

    /// Check one more fee of `amount` fits in the pot, without recording it.
    ///
    /// # Errors
    /// Returns `PotOverflow` if `collected + amount` does not fit in a `Decimal`.
    pub fn check_fee(&self, amount: Decimal, participants: usize) -> Result<Decimal> {
        self.collected
            .checked_add(amount)
            .ok_or(LotteryError::PotOverflow {
                entry_fee: amount,
                participants,
            })
    }

    /// Record a confirmed entry fee.
    ///
    /// # Errors
    /// Returns `PotOverflow` if the total does not fit; the ledger is unchanged.
    pub fn record_fee(&mut self, amount: Decimal, participants: usize) -> Result<()> {
        self.collected = self.check_fee(amount, participants)?;
        Ok(())
    }

    /// Record a confirmed payout.
    ///
    /// # Errors
    /// Returns `PotOverflow` if the total does not fit; the ledger is unchanged.
    pub fn record_payout(&mut self, amount: Decimal, participants: usize) -> Result<()> {
        self.paid_out = self
            .paid_out
            .checked_add(amount)
            .ok_or(LotteryError::PotOverflow {
                entry_fee: self.entry_fee,
                participants,
            })?;
        Ok(())
    }

    #[must_use]
    pub fn entry_fee(&self) -> Decimal {
        self.entry_fee
    }

    #[must_use]
    pub fn collected(&self) -> Decimal {
        self.collected
    }

    #[must_use]
    pub fn paid_out(&self) -> Decimal {
        self.paid_out
    }

    /// Funds still held for the round.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.collected - self.paid_out
    }

    /// Compute the payout for `participants` and check it matches what was
    /// collected.
    ///
    /// # Errors
    /// - `PotOverflow` if the pot does not fit in a `Decimal`
    /// - `PotMismatch` if collected fees differ from the computed pot
    pub fn verify(&self, participants: usize) -> Result<Decimal> {
        let expected = pot_for(self.entry_fee, participants)?;
        if self.collected != expected {
            return Err(LotteryError::PotMismatch {
                expected,
                collected: self.collected,
            });
        }
        Ok(expected)
    }

    /// Zero the ledger for a new round.
    pub fn reset(&mut self) {
        self.collected = Decimal::ZERO;
        self.paid_out = Decimal::ZERO;
    }
}
