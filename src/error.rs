//! Error of shard-ring.

/// A wrap `Result` contains custom errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration errors reported by [`RingBuilder::build`](crate::RingBuilder::build).
///
/// Once a ring is built every operation on it is total: joins, leaves and
/// routing calls cannot fail.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Address width m={0} is not supported, must be one of 8, 16, 32, 64")]
    UnsupportedAddressWidth(u64),

    #[error("Ring must be split into at least one shard")]
    ZeroShards,

    #[error("Nodes must claim at least one token")]
    ZeroTokens,

    #[error("Hasher emits {emit} bytes, address width m={m} needs at least {need}")]
    HasherTooShort {
        m: u64,
        emit: usize,
        need: usize,
    },
}
