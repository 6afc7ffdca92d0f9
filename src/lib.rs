//! Consistent hashing ring for distributed key placement.
//!
//! A [Ring] deterministically maps keys to nodes without a central
//! coordinator. The address space `[0, 2^m - 1]` is split into `q` fixed
//! shards; each joining node derives `t` pseudo-random tokens by iterated
//! hashing and claims shards under deterministic tie-break rules, so the
//! layout changes only by roughly `1 / n` of the shards when the n-th node
//! joins or leaves. Replica lookups walk the ring clockwise and split the
//! result into primary nodes and handoff nodes, which lets callers implement
//! sloppy quorums and hinted handoff on top.
//!
//! The ring answers "which nodes should hold this key?"; it does not move
//! data, talk to the network or persist anything. Because two rings built
//! from the same configuration and member set are bit-identical, every
//! replica in a cluster can compute the same routing table independently.
//!
//! # Example
//!
//! ```
//! use shard_ring::Ring;
//!
//! # fn main() -> shard_ring::Result<()> {
//! let mut ring = Ring::builder().shards(8).tokens(8).build()?;
//!
//! ring.join("113.181.90.103");
//! ring.join("102.190.90.78");
//! ring.join("140.93.207.103");
//!
//! // Replica set for a key: primary nodes first, handoff nodes fill in
//! // for members that stepped back.
//! let (primary, handoff) = ring.successor_of(2, "One ring to rule them all");
//! assert_eq!(primary.len(), 2);
//! assert!(handoff.is_empty());
//!
//! // A node entering handoff mode keeps its shards but leaves primary duty;
//! // a leaving node's shards redistribute deterministically.
//! ring.handoff("102.190.90.78");
//! ring.leave("113.181.90.103");
//! # Ok(())
//! # }
//! ```

pub mod consts;
pub mod error;
pub mod inspect;
pub mod ring;

pub use error::Error;
pub use error::Result;
pub use inspect::RingInspect;
pub use inspect::ShardInspect;
pub use ring::AddressSpace;
pub use ring::HasherFactory;
pub use ring::Ring;
pub use ring::RingBuilder;
pub use ring::Shard;
