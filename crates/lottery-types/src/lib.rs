//! # lottery-types
//!
//! Shared types, errors, and configuration for the **lottery round engine**.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`RoundId`], [`Account`]
//! - **Participant model**: [`Participant`]
//! - **Settlement model**: [`WinnerRecord`]
//! - **Round model**: [`RoundState`], [`RoundSummary`]
//! - **Configuration**: [`RoundConfig`]
//! - **Errors**: [`LotteryError`] with `LT_ERR_` prefix codes, plus the
//!   collaborator errors [`GatewayError`] and [`SelectionError`]
//! - **Constants**: defaults and limits

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod participant;
pub mod round;
pub mod winner;

pub use config::*;
pub use error::*;
pub use ids::*;
pub use participant::*;
pub use round::*;
pub use winner::*;

// Constants are accessed via `lottery_types::constants::FOO`.
