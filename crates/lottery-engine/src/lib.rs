//! # lottery-engine
//!
//! **Round engine**: participant admission, pot accounting, and winner
//! settlement for a single lottery round.
//!
//! ## Architecture
//!
//! The [`RoundEngine`] owns one round and drives it through
//! **OPEN → SETTLING → CLOSED**, calling out to two collaborators:
//! 1. **[`LedgerGateway`]**: collects entry fees and pays out the pot
//! 2. **[`WinnerSource`]**: names one participant from the ordered list
//!
//! Internally:
//! - **[`ParticipantRegistry`]**: ordered, username-unique participant list
//! - **[`PotLedger`]**: fees collected vs. paid out for the round
//!
//! ## Admission Flow
//!
//! ```text
//! admit() → validate username → Gateway.collect_entry_fee() → Registry.push()
//! settle() → Source.select() → Gateway.payout(pot) → CLOSED + WinnerRecord
//! ```
//!
//! Collaborator failures never leave partial state: a failed fee collection
//! admits nobody, a failed payout rolls the round back to OPEN.
//!
//! [`SharedRoundEngine`] wraps the engine in a mutex for callers that share
//! one round across threads.

pub mod engine;
pub mod gateway;
pub mod pot;
pub mod registry;
pub mod selection;
pub mod shared;

#[cfg(any(test, feature = "test-helpers"))]
pub mod fakes;

pub use engine::RoundEngine;
pub use gateway::LedgerGateway;
pub use pot::PotLedger;
pub use registry::ParticipantRegistry;
pub use selection::WinnerSource;
pub use shared::SharedRoundEngine;
