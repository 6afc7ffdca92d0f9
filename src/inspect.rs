//! Inspection snapshots of ring state.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::ring::Ring;

/// Serializable snapshot of a ring's topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingInspect {
    /// Address space width in bits.
    pub m: u64,
    /// Number of shards.
    pub q: u64,
    /// Tokens claimed per node.
    pub t: u64,
    /// Member identifiers, sorted.
    pub members: Vec<String>,
    /// One row per shard, in index order.
    pub shards: Vec<ShardInspect>,
}

/// One shard row of [`RingInspect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardInspect {
    /// Shard index.
    pub index: u64,
    /// Canonical boundary address, hex.
    pub hash: String,
    /// Rank of the winning token, `-1` if the shard was filled by repair.
    pub rank: i64,
    /// Address of the winning token, hex.
    pub addr: String,
    /// Owning node identifier.
    pub node: String,
}

impl RingInspect {
    /// Snapshots `ring`.
    pub fn inspect(ring: &Ring) -> Self {
        let mut members = ring.members();
        members.sort();

        let shards = ring
            .shards()
            .iter()
            .enumerate()
            .map(|(i, shard)| ShardInspect {
                index: i as u64,
                hash: format!("{:x}", shard.hash()),
                rank: shard.rank(),
                addr: format!("{:x}", shard.addr()),
                node: shard.node().to_string(),
            })
            .collect();

        Self {
            m: ring.space().bits(),
            q: ring.space().shard_count(),
            t: ring.tokens(),
            members,
            shards,
        }
    }
}

impl fmt::Display for Ring {
    /// Human-readable multi-line topology snapshot, one row per shard. Useful
    /// in examples and logs; the exact layout is not a compatibility
    /// contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ring: m={}, q={}, t={}",
            self.space().bits(),
            self.space().shard_count(),
            self.tokens()
        )?;
        writeln!(f, "|     [0, {:16x}]", self.space().highest())?;

        write!(f, "|     [ ")?;
        for node in self.members() {
            write!(f, "{} ", node)?;
        }
        writeln!(f, "]")?;
        writeln!(f, "| ")?;

        for (i, shard) in self.shards().iter().enumerate() {
            writeln!(
                f,
                "| {:5}: {:x} \u{21d2} {:5} {:x} [{}]",
                i,
                shard.hash(),
                shard.rank(),
                shard.addr(),
                shard.node()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> Ring {
        let mut ring = Ring::builder().build().unwrap();
        ring.join("10.0.0.1");
        ring.join("10.0.0.2");
        ring
    }

    #[test]
    fn test_inspect_snapshot() {
        let snap = RingInspect::inspect(&ring());

        assert_eq!(snap.m, 64);
        assert_eq!(snap.q, 8);
        assert_eq!(snap.t, 8);
        assert_eq!(snap.members, vec!["10.0.0.1", "10.0.0.2"]);
        assert_eq!(snap.shards.len(), 8);
        assert_eq!(snap.shards[7].hash, "ffffffffffffffff");
        assert!(snap.shards.iter().all(|s| !s.node.is_empty()));
    }

    #[test]
    fn test_inspect_round_trip() {
        let snap = RingInspect::inspect(&ring());
        let json = serde_json::to_string(&snap).unwrap();
        let back: RingInspect = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, back);
    }

    #[test]
    fn test_display_layout() {
        let out = ring().to_string();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "ring: m=64, q=8, t=8");
        assert_eq!(lines[1], "|     [0, ffffffffffffffff]");
        // header, address space, members, separator, then one row per shard
        assert_eq!(lines.len(), 4 + 8);
        assert!(lines[4..].iter().all(|l| l.starts_with("| ")));
    }
}
