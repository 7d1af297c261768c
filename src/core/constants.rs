// Transaction message metadata label (CIP-20)
pub const METADATA_MESSAGE_LABEL: u64 = 674;

// Fee and slippage basis-point scale
pub const BASIS_POINT_SCALE: u32 = 10_000;

// Hex length of a minting policy id (28 bytes)
pub const POLICY_ID_HEX_LENGTH: usize = 56;

// Slippage Configuration
pub const DEFAULT_SLIPPAGE_PERCENT: f64 = 1.0;
pub const MAX_SLIPPAGE_PERCENT: f64 = 100.0;

// Request Configuration
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;
pub const MAX_REQUEST_RETRIES: u32 = 3;
