//! Shard entries of the ring.

use std::fmt;
use std::ops::Index;

use serde::Deserialize;
use serde::Serialize;

use super::address::AddressSpace;

/// One shard of the ring: its canonical boundary address, the token that
/// claimed it and the owning node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shard {
    hash: u64,
    addr: u64,
    rank: i64,
    node: String,
}

impl Shard {
    /// Rank marker of a shard that no token claimed. Such a shard owns a node
    /// only through the repair pass, which copies the `node` of a neighbor.
    pub const UNCLAIMED: i64 = -1;

    pub(crate) fn unclaimed(hash: u64) -> Self {
        Self {
            hash,
            addr: 0,
            rank: Self::UNCLAIMED,
            node: String::new(),
        }
    }

    /// Copy of the entry reporting `hash` instead of its own boundary
    /// address. Replica walks emit entries under the coordinator's address.
    pub(crate) fn with_hash(&self, hash: u64) -> Self {
        Self {
            hash,
            addr: self.addr,
            rank: self.rank,
            node: self.node.clone(),
        }
    }

    /// Canonical boundary address of the shard.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Address of the winning token, `0` if no token claimed the shard.
    pub fn addr(&self) -> u64 {
        self.addr
    }

    /// Rank of the winning token, [`Shard::UNCLAIMED`] if the shard was
    /// filled by repair.
    pub fn rank(&self) -> i64 {
        self.rank
    }

    /// Identifier of the owning node, empty before the first join.
    pub fn node(&self) -> &str {
        &self.node
    }

    /// Whether a token claimed this shard, as opposed to the repair pass.
    pub fn is_claimed(&self) -> bool {
        self.rank != Self::UNCLAIMED
    }
}

impl fmt::Display for Shard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{:x} | {} - {}}}", self.hash, self.rank, self.node)
    }
}

/// Fixed-length table of shard entries, index `0` through `q - 1`.
///
/// The table is allocated once at ring construction and reused; rebuilds
/// reset entries in place.
#[derive(Clone, Debug)]
pub(crate) struct ShardTable(Vec<Shard>);

impl ShardTable {
    pub fn new(space: &AddressSpace) -> Self {
        let q = space.shard_count();
        let mut shards = Vec::with_capacity(q as usize);
        for i in 1..=q {
            shards.push(Shard::unclaimed(space.shard_address(i)));
        }
        Self(shards)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[Shard] {
        &self.0
    }

    /// Records a winning token on `shard`. The canonical hash never changes.
    pub fn claim(&mut self, shard: usize, addr: u64, rank: i64, node: &str) {
        let entry = &mut self.0[shard];
        entry.addr = addr;
        entry.rank = rank;
        entry.node = node.to_string();
    }

    /// Copies ownership of `from` onto `shard`, leaving `addr` and `rank`
    /// untouched so the repaired marker survives.
    pub fn inherit(&mut self, shard: usize, from: usize) {
        let node = self.0[from].node.clone();
        self.0[shard].node = node;
    }

    /// Resets every entry to unclaimed, keeping canonical hashes.
    pub fn reset(&mut self) {
        for entry in &mut self.0 {
            entry.addr = 0;
            entry.rank = Shard::UNCLAIMED;
            entry.node.clear();
        }
    }
}

impl Index<usize> for ShardTable {
    type Output = Shard;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}
