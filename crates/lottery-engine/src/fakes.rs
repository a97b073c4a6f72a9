//! In-memory collaborators for tests and local runs.
//!
//! - [`InMemoryLedger`]: account balances plus an escrow holding the pot,
//!   with failure injection for fee collection and payout
//! - [`FixedWinnerSource`]: always picks the same index
//! - [`ScriptedWinnerSource`]: replays a queue of canned answers
//! - [`UniformWinnerSource`]: seeded uniform-random pick

use std::collections::{HashMap, VecDeque};

use lottery_types::{Account, GatewayError, Participant, SelectionError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::{LedgerGateway, WinnerSource};

// ---------------------------------------------------------------------------
// InMemoryLedger
// ---------------------------------------------------------------------------

/// Ledger gateway backed by a `HashMap` of account balances.
///
/// Collected fees move from the payer's balance into `escrow`; payouts move
/// from `escrow` to the winner. Both are all-or-nothing.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: HashMap<Account, Decimal>,
    escrow: Decimal,
    collect_failure: Option<GatewayError>,
    payout_failure: Option<GatewayError>,
    collect_calls: usize,
    payout_calls: usize,
}

impl InMemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger with each `(account, amount)` pre-funded.
    #[must_use]
    pub fn funded(accounts: &[(&str, Decimal)]) -> Self {
        let mut ledger = Self::new();
        for (account, amount) in accounts {
            ledger.fund(account, *amount);
        }
        ledger
    }

    /// Credit `amount` to `account`.
    pub fn fund(&mut self, account: &str, amount: Decimal) {
        *self.balances.entry(Account::from(account)).or_default() += amount;
    }

    #[must_use]
    pub fn balance(&self, account: &str) -> Decimal {
        self.balances
            .get(&Account::from(account))
            .copied()
            .unwrap_or_default()
    }

    /// Funds held for the pot.
    #[must_use]
    pub fn escrow(&self) -> Decimal {
        self.escrow
    }

    /// Fail every fee collection with `err` until cleared.
    pub fn fail_collections_with(&mut self, err: GatewayError) {
        self.collect_failure = Some(err);
    }

    /// Fail every payout with `err` until cleared.
    pub fn fail_payouts_with(&mut self, err: GatewayError) {
        self.payout_failure = Some(err);
    }

    pub fn clear_failures(&mut self) {
        self.collect_failure = None;
        self.payout_failure = None;
    }

    /// Number of `collect_entry_fee` calls, including failed ones.
    #[must_use]
    pub fn collect_calls(&self) -> usize {
        self.collect_calls
    }

    /// Number of `payout` calls, including failed ones.
    #[must_use]
    pub fn payout_calls(&self) -> usize {
        self.payout_calls
    }
}

impl LedgerGateway for InMemoryLedger {
    fn collect_entry_fee(
        &mut self,
        account: &Account,
        amount: Decimal,
    ) -> Result<(), GatewayError> {
        self.collect_calls += 1;
        if let Some(err) = &self.collect_failure {
            return Err(err.clone());
        }

        let balance = self.balances.entry(account.clone()).or_default();
        if *balance < amount {
            return Err(GatewayError::Rejected(format!(
                "insufficient funds: need {amount}, have {balance}"
            )));
        }
        *balance -= amount;
        self.escrow += amount;
        Ok(())
    }

    fn payout(&mut self, account: &Account, amount: Decimal) -> Result<(), GatewayError> {
        self.payout_calls += 1;
        if let Some(err) = &self.payout_failure {
            return Err(err.clone());
        }

        if self.escrow < amount {
            return Err(GatewayError::Rejected(format!(
                "escrow underfunded: need {amount}, have {}",
                self.escrow
            )));
        }
        self.escrow -= amount;
        *self.balances.entry(account.clone()).or_default() += amount;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Winner sources
// ---------------------------------------------------------------------------

/// Always selects the same index.
#[derive(Debug, Clone, Copy)]
pub struct FixedWinnerSource {
    index: usize,
    calls: usize,
}

impl FixedWinnerSource {
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self { index, calls: 0 }
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl WinnerSource for FixedWinnerSource {
    fn select(&mut self, _participants: &[Participant]) -> Result<usize, SelectionError> {
        self.calls += 1;
        Ok(self.index)
    }
}

/// Replays canned answers in order; errors once the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedWinnerSource {
    script: VecDeque<Result<usize, SelectionError>>,
    /// Sizes of the participant lists it was shown, in call order.
    seen: Vec<usize>,
}

impl ScriptedWinnerSource {
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = Result<usize, SelectionError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            seen: Vec::new(),
        }
    }

    #[must_use]
    pub fn seen(&self) -> &[usize] {
        &self.seen
    }
}

impl WinnerSource for ScriptedWinnerSource {
    fn select(&mut self, participants: &[Participant]) -> Result<usize, SelectionError> {
        self.seen.push(participants.len());
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(SelectionError("script exhausted".to_string())))
    }
}

/// Uniform-random pick from a seeded `StdRng`.
#[derive(Debug)]
pub struct UniformWinnerSource {
    rng: StdRng,
}

impl UniformWinnerSource {
    /// Reproducible source for a given seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl WinnerSource for UniformWinnerSource {
    fn select(&mut self, participants: &[Participant]) -> Result<usize, SelectionError> {
        if participants.is_empty() {
            return Err(SelectionError("no participants".to_string()));
        }
        Ok(self.rng.gen_range(0..participants.len()))
    }
}
