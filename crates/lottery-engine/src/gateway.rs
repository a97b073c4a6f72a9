//! Ledger gateway: the external system of record that moves funds.

use lottery_types::{Account, GatewayError};
use rust_decimal::Decimal;

/// Moves funds on behalf of the engine.
///
/// Each call is a single, bounded, atomic request: it either fully happens
/// or reports an error. The engine never retries and never inspects how the
/// transfer is carried out.
pub trait LedgerGateway {
    /// Take the entry fee from `account` into the pot.
    fn collect_entry_fee(&mut self, account: &Account, amount: Decimal)
    -> Result<(), GatewayError>;

    /// Pay `amount` from the pot to `account`.
    fn payout(&mut self, account: &Account, amount: Decimal) -> Result<(), GatewayError>;
}

impl<G: LedgerGateway + ?Sized> LedgerGateway for Box<G> {
    fn collect_entry_fee(
        &mut self,
        account: &Account,
        amount: Decimal,
    ) -> Result<(), GatewayError> {
        (**self).collect_entry_fee(account, amount)
    }

    fn payout(&mut self, account: &Account, amount: Decimal) -> Result<(), GatewayError> {
        (**self).payout(account, amount)
    }
}
