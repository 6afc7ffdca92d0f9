//! Constant variables.

/// Default address space width in bits.
pub const DEFAULT_ADDRESS_BITS: u64 = 64;
/// Default number of shards on the ring.
pub const DEFAULT_SHARDS: u64 = 8;
/// Default number of tokens claimed per node.
pub const DEFAULT_TOKENS: u64 = 8;
/// Number of shards in the production preset.
pub const PRODUCTION_SHARDS: u64 = 4096;
/// Tokens claimed per node in the production preset.
pub const PRODUCTION_TOKENS: u64 = 256;
