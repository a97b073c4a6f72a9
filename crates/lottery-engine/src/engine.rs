//! Round engine — the single authority over one lottery round.
//!
//! Lifecycle:
//! 1. **OPEN**: `admit` validates the username, collects the fee through the
//!    gateway, then appends the participant
//! 2. **SETTLING**: `settle` asks the winner source for an index and pays
//!    the whole pot to that participant
//! 3. **CLOSED**: the winner record is held until the caller calls `reset`
//!
//! Collaborator failures roll back: a failed fee collection admits nobody,
//! a failed selection or payout returns the round to OPEN untouched.

use chrono::Utc;
use lottery_types::{
    Account, GatewayError, LotteryError, Participant, Result, RoundConfig, RoundId, RoundState,
    RoundSummary, WinnerRecord,
};
use rust_decimal::Decimal;

use crate::gateway::LedgerGateway;
use crate::pot::PotLedger;
use crate::registry::{ParticipantRegistry, normalize_username};
use crate::selection::WinnerSource;

/// Owns one round and drives it through OPEN → SETTLING → CLOSED.
///
/// Every mutating operation takes `&mut self`, so admission and settlement
/// are serialized by construction. Use [`SharedRoundEngine`] to share a
/// round across threads.
///
/// [`SharedRoundEngine`]: crate::SharedRoundEngine
pub struct RoundEngine<G, W> {
    /// Identity of the current round; replaced on reset.
    round_id: RoundId,
    /// Fee, asset and limits. Fixed for the engine's lifetime.
    config: RoundConfig,
    state: RoundState,
    registry: ParticipantRegistry,
    pot: PotLedger,
    /// Set only on the transition to CLOSED.
    winner: Option<WinnerRecord>,
    gateway: G,
    winner_source: W,
}

impl<G: LedgerGateway, W: WinnerSource> RoundEngine<G, W> {
    /// Create an engine with a fresh OPEN round.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `config` fails validation.
    pub fn new(config: RoundConfig, gateway: G, winner_source: W) -> Result<Self> {
        config.validate()?;
        let round_id = RoundId::new();
        tracing::info!(
            round_id = %round_id,
            entry_fee = %config.entry_fee,
            asset = %config.asset,
            "Round opened"
        );
        Ok(Self {
            round_id,
            registry: ParticipantRegistry::new(config.max_participants),
            pot: PotLedger::new(config.entry_fee),
            config,
            state: RoundState::Open,
            winner: None,
            gateway,
            winner_source,
        })
    }

    /// Admit a participant, collecting the entry fee first.
    ///
    /// # Errors
    /// - `RoundNotOpen` if the round is settling or closed
    /// - `InvalidUsername` if the trimmed name is empty or too long
    /// - `DuplicateUsername` if the trimmed name is already entered
    /// - `RoundFull` if the participant cap is reached
    /// - `PotOverflow` if one more fee would not fit in the pot (no gateway call)
    /// - `FeeRejected` / `GatewayUnavailable` if the fee was not collected
    pub fn admit(&mut self, username: &str, account: impl Into<Account>) -> Result<Participant> {
        self.ensure_open()?;
        let username = normalize_username(username, self.config.max_username_len)?;
        let admissible = match self.registry.check_admissible(username) {
            Ok(admissible) => admissible,
            Err(err) => {
                tracing::warn!(round_id = %self.round_id, error = %err, "Admission refused");
                return Err(err);
            }
        };

        let fee = self.config.entry_fee;
        let entrants = self.registry.len() + 1;
        if let Err(err) = self.pot.check_fee(fee, entrants) {
            tracing::warn!(
                round_id = %self.round_id,
                username = %admissible.username(),
                pot = %self.pot.collected(),
                error = %err,
                "Admission refused: pot would overflow"
            );
            return Err(err);
        }

        let account = account.into();
        if let Err(err) = self.gateway.collect_entry_fee(&account, fee) {
            tracing::warn!(
                round_id = %self.round_id,
                username = %admissible.username(),
                %account,
                error = %err,
                "Entry fee not collected; participant not admitted"
            );
            return Err(match err {
                GatewayError::Rejected(reason) => LotteryError::FeeRejected { reason },
                GatewayError::Unavailable(reason) => LotteryError::GatewayUnavailable { reason },
            });
        }

        let participant = self.registry.push(admissible, account, fee);
        // Cannot overflow: `check_fee` passed above under the same borrow.
        self.pot.record_fee(fee, entrants)?;
        tracing::info!(
            round_id = %self.round_id,
            username = %participant.username,
            account = %participant.account,
            position = participant.position,
            pot = %self.pot.collected(),
            "Participant admitted"
        );
        Ok(participant)
    }

    /// Select a winner and pay out the whole pot.
    ///
    /// # Errors
    /// - `RoundNotOpen` if already settling or closed
    /// - `NoParticipants` if nobody has been admitted (state stays OPEN)
    /// - `WinnerSelectionFailed` if the source errs or returns an index out
    ///   of range (rolled back to OPEN)
    /// - `SettlementFailed` if the gateway rejects the payout (rolled back)
    /// - `GatewayUnavailable` if the payout could not be completed (rolled back)
    /// - `PotOverflow` / `PotMismatch` if pot accounting is inconsistent
    pub fn settle(&mut self) -> Result<WinnerRecord> {
        self.ensure_open()?;
        if self.registry.is_empty() {
            tracing::warn!(round_id = %self.round_id, "Settlement refused: no participants");
            return Err(LotteryError::NoParticipants);
        }
        let payout_amount = self.pot.verify(self.registry.len())?;

        self.state = RoundState::Settling;
        tracing::debug!(
            round_id = %self.round_id,
            participants = self.registry.len(),
            pot = %payout_amount,
            "Settling round"
        );

        match self.pay_winner(payout_amount) {
            Ok(record) => {
                self.state = RoundState::Closed;
                self.winner = Some(record.clone());
                tracing::info!(
                    round_id = %self.round_id,
                    winner = %record.username,
                    account = %record.account,
                    payout = %record.payout_amount,
                    snapshot = %record.snapshot_hash,
                    "Round settled"
                );
                Ok(record)
            }
            Err(err) => {
                self.state = RoundState::Open;
                tracing::warn!(
                    round_id = %self.round_id,
                    error = %err,
                    "Settlement rolled back; round reopened"
                );
                Err(err)
            }
        }
    }

    /// Selection and payout. Touches nothing but the pot ledger, and that
    /// only after the payout succeeded.
    fn pay_winner(&mut self, payout_amount: Decimal) -> Result<WinnerRecord> {
        let participants = self.registry.as_slice();

        let winner_index = self.winner_source.select(participants).map_err(|err| {
            LotteryError::WinnerSelectionFailed {
                reason: err.to_string(),
            }
        })?;
        let selected = participants
            .get(winner_index)
            .ok_or_else(|| LotteryError::WinnerSelectionFailed {
                reason: format!(
                    "index {winner_index} out of range for {} participants",
                    participants.len()
                ),
            })?;
        tracing::debug!(
            round_id = %self.round_id,
            winner_index,
            username = %selected.username,
            "Winner selected"
        );

        self.gateway
            .payout(&selected.account, payout_amount)
            .map_err(|err| match err {
                GatewayError::Rejected(reason) => LotteryError::SettlementFailed { reason },
                GatewayError::Unavailable(reason) => {
                    LotteryError::GatewayUnavailable { reason }
                }
            })?;
        // `paid_out` is zero while the round is open, so this cannot overflow.
        self.pot.record_payout(payout_amount, participants.len())?;

        Ok(WinnerRecord {
            round_id: self.round_id,
            username: selected.username.clone(),
            account: selected.account.clone(),
            payout_amount,
            winner_index,
            participant_count: participants.len(),
            snapshot_hash: WinnerRecord::snapshot_hash(self.round_id, participants),
            settled_at: Utc::now(),
        })
    }

    /// Start a fresh OPEN round: no participants, no winner, new round ID.
    ///
    /// Allowed from any state. Does not touch the gateway; fees collected
    /// for an unsettled round stay wherever the gateway holds them.
    pub fn reset(&mut self) {
        let previous = self.round_id;
        if self.pot.balance() > Decimal::ZERO {
            tracing::warn!(
                round_id = %previous,
                unpaid = %self.pot.balance(),
                participants = self.registry.len(),
                "Resetting round with an unpaid pot"
            );
        }

        self.round_id = RoundId::new();
        self.state = RoundState::Open;
        self.registry.clear();
        self.pot.reset();
        self.winner = None;
        tracing::info!(previous = %previous, round_id = %self.round_id, "Round reset");
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state.is_open() {
            Ok(())
        } else {
            Err(LotteryError::RoundNotOpen { state: self.state })
        }
    }
}

impl<G, W> RoundEngine<G, W> {
    /// Participants in admission order. Available in every state.
    #[must_use]
    pub fn list_participants(&self) -> &[Participant] {
        self.registry.as_slice()
    }

    /// The winner, present only once the round is CLOSED.
    #[must_use]
    pub fn current_winner(&self) -> Option<&WinnerRecord> {
        self.winner.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> RoundState {
        self.state
    }

    #[must_use]
    pub fn round_id(&self) -> RoundId {
        self.round_id
    }

    #[must_use]
    pub fn entry_fee(&self) -> Decimal {
        self.config.entry_fee
    }

    /// Fees collected into the current round's pot.
    #[must_use]
    pub fn pot(&self) -> Decimal {
        self.pot.collected()
    }

    /// Read-only snapshot of the whole round.
    #[must_use]
    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            round_id: self.round_id,
            state: self.state,
            entry_fee: self.config.entry_fee,
            asset: self.config.asset.clone(),
            participants: self.registry.as_slice().to_vec(),
            pot: self.pot.collected(),
            winner: self.winner.clone(),
        }
    }

    /// Access the ledger gateway.
    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Mutable access to the ledger gateway.
    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// Access the winner source.
    #[must_use]
    pub fn winner_source(&self) -> &W {
        &self.winner_source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FixedWinnerSource, InMemoryLedger, ScriptedWinnerSource};
    use lottery_types::SelectionError;

    fn fee() -> Decimal {
        Decimal::new(1, 2)
    }

    fn ledger() -> InMemoryLedger {
        InMemoryLedger::funded(&[
            ("0xA", Decimal::ONE),
            ("0xB", Decimal::ONE),
            ("0xC", Decimal::ONE),
        ])
    }

    fn engine_with<W: WinnerSource>(source: W) -> RoundEngine<InMemoryLedger, W> {
        RoundEngine::new(RoundConfig::default(), ledger(), source).unwrap()
    }

    #[test]
    fn new_engine_is_open_and_empty() {
        let engine = engine_with(FixedWinnerSource::new(0));
        assert_eq!(engine.state(), RoundState::Open);
        assert!(engine.list_participants().is_empty());
        assert!(engine.current_winner().is_none());
        assert_eq!(engine.pot(), Decimal::ZERO);
        assert_eq!(engine.entry_fee(), fee());
    }

    #[test]
    fn invalid_config_rejected() {
        let result = RoundEngine::new(
            RoundConfig::with_entry_fee(Decimal::ZERO),
            ledger(),
            FixedWinnerSource::new(0),
        );
        assert!(matches!(result, Err(LotteryError::InvalidConfig(_))));
    }

    #[test]
    fn admit_collects_fee_and_appends() {
        let mut engine = engine_with(FixedWinnerSource::new(0));
        let alice = engine.admit("  alice ", "0xA").unwrap();

        assert_eq!(alice.username, "alice");
        assert_eq!(alice.paid_amount, fee());
        assert_eq!(alice.position, 0);
        assert_eq!(engine.pot(), fee());
        assert_eq!(engine.gateway().escrow(), fee());
        assert_eq!(engine.gateway().balance("0xA"), Decimal::new(99, 2));
    }

    #[test]
    fn blank_username_rejected_before_gateway() {
        let mut engine = engine_with(FixedWinnerSource::new(0));
        let err = engine.admit("   ", "0xA").unwrap_err();
        assert!(matches!(err, LotteryError::InvalidUsername { .. }));
        assert_eq!(engine.gateway().collect_calls(), 0);
    }

    #[test]
    fn duplicate_after_trim_rejected_without_charging() {
        let mut engine = engine_with(FixedWinnerSource::new(0));
        engine.admit("alice", "0xA").unwrap();

        let err = engine.admit(" alice  ", "0xC").unwrap_err();
        assert!(matches!(err, LotteryError::DuplicateUsername(ref u) if u == "alice"));
        assert_eq!(engine.list_participants().len(), 1);
        assert_eq!(engine.gateway().collect_calls(), 1);
        assert_eq!(engine.gateway().balance("0xC"), Decimal::ONE);
    }

    #[test]
    fn rejected_fee_admits_nobody() {
        let mut engine = engine_with(FixedWinnerSource::new(0));
        let err = engine.admit("dave", "0xD").unwrap_err();
        assert!(matches!(err, LotteryError::FeeRejected { .. }));
        assert!(engine.list_participants().is_empty());
        assert_eq!(engine.pot(), Decimal::ZERO);
    }

    #[test]
    fn unavailable_gateway_admits_nobody() {
        let mut engine = engine_with(FixedWinnerSource::new(0));
        engine.admit("alice", "0xA").unwrap();
        engine
            .gateway_mut()
            .fail_collections_with(GatewayError::Unavailable("rpc timeout".into()));

        let err = engine.admit("bob", "0xB").unwrap_err();
        assert!(matches!(err, LotteryError::GatewayUnavailable { .. }));
        assert_eq!(engine.list_participants().len(), 1);
        assert_eq!(engine.pot(), fee());

        // The caller retries with a brand-new admit once the gateway is back.
        engine.gateway_mut().clear_failures();
        engine.admit("bob", "0xB").unwrap();
        assert_eq!(engine.list_participants().len(), 2);
    }

    #[test]
    fn pot_overflow_refused_before_collecting_fee() {
        let ledger = InMemoryLedger::funded(&[("0xA", Decimal::MAX), ("0xB", Decimal::MAX)]);
        let mut engine = RoundEngine::new(
            RoundConfig::with_entry_fee(Decimal::MAX),
            ledger,
            FixedWinnerSource::new(0),
        )
        .unwrap();
        engine.admit("alice", "0xA").unwrap();

        let err = engine.admit("bob", "0xB").unwrap_err();
        assert!(matches!(err, LotteryError::PotOverflow { participants: 2, .. }));
        assert_eq!(engine.gateway().collect_calls(), 1);
        assert_eq!(engine.gateway().balance("0xB"), Decimal::MAX);
        assert_eq!(engine.list_participants().len(), 1);
        assert_eq!(engine.pot(), Decimal::MAX);
        assert_eq!(engine.state(), RoundState::Open);

        // The round is still usable after the refusal.
        let record = engine.settle().unwrap();
        assert_eq!(record.payout_amount, Decimal::MAX);
        assert_eq!(engine.gateway().balance("0xA"), Decimal::MAX);
    }

    #[test]
    fn round_full_rejected() {
        let config = RoundConfig {
            max_participants: 1,
            ..RoundConfig::default()
        };
        let mut engine = RoundEngine::new(config, ledger(), FixedWinnerSource::new(0)).unwrap();
        engine.admit("alice", "0xA").unwrap();
        let err = engine.admit("bob", "0xB").unwrap_err();
        assert!(matches!(err, LotteryError::RoundFull { max: 1 }));
        assert_eq!(engine.gateway().collect_calls(), 1);
    }

    #[test]
    fn settle_pays_whole_pot() {
        let mut engine = engine_with(FixedWinnerSource::new(1));
        engine.admit("alice", "0xA").unwrap();
        engine.admit("bob", "0xB").unwrap();
        engine.admit("carol", "0xC").unwrap();

        let record = engine.settle().unwrap();
        assert_eq!(record.username, "bob");
        assert_eq!(record.account.as_str(), "0xB");
        assert_eq!(record.payout_amount, Decimal::new(3, 2));
        assert_eq!(record.participant_count, 3);
        assert_eq!(record.winner_index, 1);
        assert!(record.verify_snapshot(engine.list_participants()));

        assert_eq!(engine.state(), RoundState::Closed);
        assert_eq!(engine.current_winner(), Some(&record));
        assert_eq!(engine.gateway().escrow(), Decimal::ZERO);
        assert_eq!(engine.gateway().balance("0xB"), Decimal::new(102, 2));
    }

    #[test]
    fn settle_empty_round_fails_and_stays_open() {
        let mut engine = engine_with(FixedWinnerSource::new(0));
        let err = engine.settle().unwrap_err();
        assert!(matches!(err, LotteryError::NoParticipants));
        assert_eq!(engine.state(), RoundState::Open);
        assert_eq!(engine.winner_source().calls(), 0);
    }

    #[test]
    fn closed_round_rejects_admit_and_settle() {
        let mut engine = engine_with(FixedWinnerSource::new(0));
        engine.admit("alice", "0xA").unwrap();
        engine.settle().unwrap();

        let err = engine.admit("bob", "0xB").unwrap_err();
        assert!(matches!(
            err,
            LotteryError::RoundNotOpen {
                state: RoundState::Closed
            }
        ));
        let err = engine.settle().unwrap_err();
        assert!(matches!(err, LotteryError::RoundNotOpen { .. }));
        assert_eq!(engine.winner_source().calls(), 1);
    }

    #[test]
    fn rejected_payout_rolls_back() {
        let mut engine = engine_with(FixedWinnerSource::new(0));
        engine.admit("alice", "0xA").unwrap();
        engine.admit("bob", "0xB").unwrap();
        engine
            .gateway_mut()
            .fail_payouts_with(GatewayError::Rejected("out of gas".into()));

        let err = engine.settle().unwrap_err();
        assert!(matches!(err, LotteryError::SettlementFailed { .. }));
        assert_eq!(engine.state(), RoundState::Open);
        assert!(engine.current_winner().is_none());
        assert_eq!(engine.list_participants().len(), 2);
        assert_eq!(engine.pot(), Decimal::new(2, 2));
        assert_eq!(engine.gateway().escrow(), Decimal::new(2, 2));
    }

    #[test]
    fn unavailable_payout_rolls_back_and_can_be_retried() {
        let mut engine = engine_with(FixedWinnerSource::new(0));
        engine.admit("alice", "0xA").unwrap();
        engine
            .gateway_mut()
            .fail_payouts_with(GatewayError::Unavailable("node down".into()));

        let err = engine.settle().unwrap_err();
        assert!(matches!(err, LotteryError::GatewayUnavailable { .. }));
        assert_eq!(engine.state(), RoundState::Open);

        engine.gateway_mut().clear_failures();
        let record = engine.settle().unwrap();
        assert_eq!(record.payout_amount, fee());
        assert_eq!(engine.gateway().payout_calls(), 2);
    }

    #[test]
    fn selection_errors_roll_back_without_payout() {
        let source = ScriptedWinnerSource::new([Err(SelectionError("vrf down".into())), Ok(5), Ok(0)]);
        let mut engine = engine_with(source);
        engine.admit("alice", "0xA").unwrap();
        engine.admit("bob", "0xB").unwrap();

        let err = engine.settle().unwrap_err();
        assert!(matches!(err, LotteryError::WinnerSelectionFailed { .. }));
        assert_eq!(engine.state(), RoundState::Open);

        let err = engine.settle().unwrap_err();
        assert!(
            matches!(err, LotteryError::WinnerSelectionFailed { ref reason } if reason.contains("out of range"))
        );
        assert_eq!(engine.gateway().payout_calls(), 0);

        let record = engine.settle().unwrap();
        assert_eq!(record.username, "alice");
        assert_eq!(engine.winner_source().seen(), [2, 2, 2]);
    }

    #[test]
    fn reset_from_closed_starts_new_round() {
        let mut engine = engine_with(FixedWinnerSource::new(0));
        engine.admit("alice", "0xA").unwrap();
        engine.settle().unwrap();
        let old_round = engine.round_id();

        engine.reset();
        assert_eq!(engine.state(), RoundState::Open);
        assert!(engine.list_participants().is_empty());
        assert!(engine.current_winner().is_none());
        assert_eq!(engine.pot(), Decimal::ZERO);
        assert_ne!(engine.round_id(), old_round);

        // Usernames from the previous round are free again.
        engine.admit("alice", "0xA").unwrap();
    }

    #[test]
    fn reset_from_open_discards_participants_without_gateway() {
        let mut engine = engine_with(FixedWinnerSource::new(0));
        engine.admit("alice", "0xA").unwrap();
        engine.reset();
        assert!(engine.list_participants().is_empty());
        assert_eq!(engine.gateway().payout_calls(), 0);
        assert_eq!(engine.gateway().collect_calls(), 1);
    }

    #[test]
    fn reads_are_idempotent() {
        let mut engine = engine_with(FixedWinnerSource::new(0));
        engine.admit("alice", "0xA").unwrap();
        engine.admit("bob", "0xB").unwrap();

        let first = engine.list_participants().to_vec();
        assert_eq!(engine.list_participants(), first.as_slice());
        assert_eq!(engine.current_winner(), None);

        engine.settle().unwrap();
        let winner = engine.current_winner().cloned();
        assert_eq!(engine.current_winner().cloned(), winner);
        assert_eq!(engine.list_participants(), first.as_slice());
    }

    #[test]
    fn summary_reflects_round() {
        let mut engine = engine_with(FixedWinnerSource::new(0));
        engine.admit("alice", "0xA").unwrap();
        let summary = engine.summary();
        assert_eq!(summary.round_id, engine.round_id());
        assert_eq!(summary.state, RoundState::Open);
        assert_eq!(summary.asset, "ETH");
        assert_eq!(summary.pot, fee());
        assert_eq!(summary.participants.len(), 1);
        assert!(summary.winner.is_none());
    }
}
