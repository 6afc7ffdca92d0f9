#![warn(missing_docs)]
//! The consistent hashing ring core: address algebra, shard table, token
//! allocation and replica routing.

pub mod address;
mod builder;
pub mod hasher;
mod shard;
mod topology;

pub use address::AddressSpace;
pub use builder::RingBuilder;
pub use hasher::HasherFactory;
pub use shard::Shard;
pub use topology::Ring;
