//! Round configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{LotteryError, Result, constants};

/// Configuration for a lottery round. Fixed for the round's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    /// Fee every participant pays on admission. Must be positive.
    pub entry_fee: Decimal,
    /// Asset the fee and pot are denominated in (e.g., "ETH").
    pub asset: String,
    /// Maximum participants per round.
    pub max_participants: usize,
    /// Maximum username length in characters, after trimming.
    pub max_username_len: usize,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            entry_fee: Decimal::new(
                constants::DEFAULT_ENTRY_FEE_MANTISSA,
                constants::DEFAULT_ENTRY_FEE_SCALE,
            ),
            asset: constants::DEFAULT_ASSET.to_string(),
            max_participants: constants::DEFAULT_MAX_PARTICIPANTS,
            max_username_len: constants::DEFAULT_MAX_USERNAME_LEN,
        }
    }
}

impl RoundConfig {
    /// Default config with a different entry fee.
    #[must_use]
    pub fn with_entry_fee(entry_fee: Decimal) -> Self {
        Self {
            entry_fee,
            ..Self::default()
        }
    }

    /// Parse and validate a config from JSON. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs no round can run with.
    pub fn validate(&self) -> Result<()> {
        if self.entry_fee <= Decimal::ZERO {
            return Err(LotteryError::InvalidConfig(format!(
                "entry_fee must be positive, got {}",
                self.entry_fee
            )));
        }
        if self.asset.trim().is_empty() {
            return Err(LotteryError::InvalidConfig("asset must not be empty".into()));
        }
        if self.max_participants == 0 {
            return Err(LotteryError::InvalidConfig(
                "max_participants must be > 0".into(),
            ));
        }
        if self.max_username_len == 0 {
            return Err(LotteryError::InvalidConfig(
                "max_username_len must be > 0".into(),
            ));
        }
        Ok(())
    }
}
