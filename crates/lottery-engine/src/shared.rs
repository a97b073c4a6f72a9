//! Thread-safe handle to a single round.
//!
//! Wraps a [`RoundEngine`] in `Arc<Mutex<_>>`. Each operation holds the lock
//! for its whole duration, collaborator calls included, so at most one
//! `admit` or `settle` is in flight per round. Reads return owned snapshots.

use std::sync::{Arc, Mutex, MutexGuard};

use lottery_types::{
    Account, LotteryError, Participant, Result, RoundState, RoundSummary, WinnerRecord,
};
use rust_decimal::Decimal;

use crate::engine::RoundEngine;
use crate::gateway::LedgerGateway;
use crate::selection::WinnerSource;

/// Cloneable, `Send + Sync` handle to one round.
pub struct SharedRoundEngine<G, W> {
    inner: Arc<Mutex<RoundEngine<G, W>>>,
}

impl<G, W> Clone for SharedRoundEngine<G, W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: LedgerGateway, W: WinnerSource> SharedRoundEngine<G, W> {
    #[must_use]
    pub fn new(engine: RoundEngine<G, W>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// See [`RoundEngine::admit`].
    pub fn admit(&self, username: &str, account: impl Into<Account>) -> Result<Participant> {
        self.lock()?.admit(username, account)
    }

    /// See [`RoundEngine::settle`].
    pub fn settle(&self) -> Result<WinnerRecord> {
        self.lock()?.settle()
    }

    /// See [`RoundEngine::reset`].
    pub fn reset(&self) -> Result<()> {
        self.lock()?.reset();
        Ok(())
    }

    pub fn list_participants(&self) -> Result<Vec<Participant>> {
        Ok(self.lock()?.list_participants().to_vec())
    }

    pub fn current_winner(&self) -> Result<Option<WinnerRecord>> {
        Ok(self.lock()?.current_winner().cloned())
    }

    pub fn state(&self) -> Result<RoundState> {
        Ok(self.lock()?.state())
    }

    pub fn pot(&self) -> Result<Decimal> {
        Ok(self.lock()?.pot())
    }

    pub fn summary(&self) -> Result<RoundSummary> {
        Ok(self.lock()?.summary())
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with_engine<T>(&self, f: impl FnOnce(&mut RoundEngine<G, W>) -> T) -> Result<T> {
        Ok(f(&mut *self.lock()?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, RoundEngine<G, W>>> {
        self.inner
            .lock()
            .map_err(|_| LotteryError::Internal("round lock poisoned".to_string()))
    }
}
