//! System-wide constants for the lottery round engine.

/// Default entry fee mantissa; combined with [`DEFAULT_ENTRY_FEE_SCALE`]
/// this is `0.01`.
pub const DEFAULT_ENTRY_FEE_MANTISSA: i64 = 1;

/// Default entry fee scale (number of decimal places).
pub const DEFAULT_ENTRY_FEE_SCALE: u32 = 2;

/// Default asset symbol the entry fee and pot are denominated in.
pub const DEFAULT_ASSET: &str = "ETH";

/// Maximum participants admitted to a single round (default).
pub const DEFAULT_MAX_PARTICIPANTS: usize = 10_000;

/// Maximum username length in characters, measured after trimming.
pub const DEFAULT_MAX_USERNAME_LEN: usize = 64;

/// Domain separator for the participant snapshot hash.
pub const SNAPSHOT_HASH_DOMAIN: &[u8] = b"lottery:snapshot:v1:";
