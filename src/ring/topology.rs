#![warn(missing_docs)]

//! The consistent hashing ring.

use std::collections::HashMap;
use std::fmt;

use super::address::AddressSpace;
use super::builder::RingBuilder;
use super::hasher;
use super::hasher::HasherFactory;
use super::shard::Shard;
use super::shard::ShardTable;

/// Consistent hashing ring mapping keys to nodes.
///
/// The address space `[0, 2^m - 1]` is split into `q` equal shards. A joining
/// node derives `t` pseudo-random tokens by iterated hashing and claims
/// shards under deterministic tie-break rules; shards no token reached
/// inherit an owner from their clockwise-preceding neighbor. For a fixed
/// configuration and member set the layout is independent of join order, so
/// independent replicas compute identical routing tables without
/// coordination.
///
/// The ring holds no data and performs no I/O. It is a plain single-threaded
/// structure; wrap it in a lock if it must be shared across threads.
#[derive(Clone)]
pub struct Ring {
    pub(crate) space: AddressSpace,
    pub(crate) t: u64,
    pub(crate) hasher: HasherFactory,
    pub(crate) shards: ShardTable,
    pub(crate) nodes: HashMap<String, bool>,
}

/// Tie-break for a token landing on a tracked shard, first match wins:
/// an unclaimed shard is taken freely; a rank-0 token is the node's home
/// claim and displaces any non-primary owner; within the same rank the
/// bigger address wins; otherwise the lower rank wins.
fn claims(main: &Shard, rank: i64, addr: u64) -> bool {
    main.addr() == 0
        || (rank == 0 && main.rank() != 0)
        || (main.rank() == rank && main.addr() < addr)
        || main.rank() > rank
}

impl Ring {
    /// Starts configuring a ring.
    pub fn builder() -> RingBuilder {
        RingBuilder::new()
    }

    /// Address space of the ring.
    pub fn space(&self) -> &AddressSpace {
        &self.space
    }

    /// Number of tokens each node claims on join.
    pub fn tokens(&self) -> u64 {
        self.t
    }

    /// Joins a node to the ring; it claims roughly `q / n` shards.
    ///
    /// Joining an existing member only reactivates it after a handoff;
    /// allocation does not run again.
    pub fn join(&mut self, node: &str) {
        if let Some(active) = self.nodes.get_mut(node) {
            *active = true;
            return;
        }

        let mut digest: Option<Box<[u8]>> = None;
        for rank in 0..self.t as i64 {
            let next = hasher::chain(&self.hasher, node, digest.as_deref());
            let (shard, addr) = self.space.locate(&next);
            digest = Some(next);

            if claims(&self.shards[shard], rank, addr) {
                self.shards.claim(shard, addr, rank, node);
            }
        }

        self.repair();
        self.nodes.insert(node.to_string(), true);
        tracing::debug!("join: node={}, members={}", node, self.nodes.len());
    }

    /// Fills shards no token reached by copying the owner of the nearest
    /// clockwise-preceding claimed shard, wrapping through the top of the
    /// ring. Only the node travels; the repaired marker stays on the entry.
    fn repair(&mut self) {
        let q = self.shards.len();

        if !self.shards[0].is_claimed() {
            for i in (1..q).rev() {
                if self.shards[i].is_claimed() {
                    self.shards.inherit(0, i);
                    break;
                }
            }
        }

        for i in 1..q {
            if !self.shards[i].is_claimed() {
                self.shards.inherit(i, i - 1);
            }
        }
    }

    /// Removes a node and rebuilds the layout from the remaining members.
    /// Leaving is a no-op for non-members.
    ///
    /// The rebuild replays [`Ring::join`] for every remaining member, so
    /// members previously in handoff mode come back active.
    pub fn leave(&mut self, node: &str) {
        if self.nodes.remove(node).is_none() {
            return;
        }

        let members: Vec<String> = self.nodes.keys().cloned().collect();
        self.shards.reset();
        self.nodes.clear();
        for member in &members {
            self.join(member);
        }
        tracing::debug!("leave: node={}, members={}", node, self.nodes.len());
    }

    /// Puts a member into handoff mode: it keeps its shards but is skipped
    /// when primary replica sets are built. Unknown identifiers are ignored.
    pub fn handoff(&mut self, node: &str) {
        if let Some(active) = self.nodes.get_mut(node) {
            *active = false;
            tracing::debug!("handoff: node={}", node);
        }
    }

    /// Address of `key` on the ring.
    pub fn address(&self, key: &str) -> u64 {
        let digest = hasher::chain(&self.hasher, key, None);
        self.space.locate(&digest).1
    }

    fn key_shard(&self, key: &str) -> usize {
        let digest = hasher::chain(&self.hasher, key, None);
        self.space.locate(&digest).0
    }

    /// Shard entry owning the address.
    pub fn lookup(&self, addr: u64) -> &Shard {
        &self.shards[self.space.shard_of(addr)]
    }

    /// Shard entry owning the key.
    pub fn lookup_key(&self, key: &str) -> &Shard {
        &self.shards[self.key_shard(key)]
    }

    /// The `min(n, q)` shard entries at and clockwise after the address.
    ///
    /// This is the raw shard sequence; consecutive shards owned by the same
    /// node are not collapsed.
    pub fn after(&self, n: u64, addr: u64) -> Vec<&Shard> {
        self.walk(n, self.space.shard_of(addr), 1)
    }

    /// Like [`Ring::after`], addressing by key.
    pub fn after_key(&self, n: u64, key: &str) -> Vec<&Shard> {
        self.walk(n, self.key_shard(key), 1)
    }

    /// The `min(n, q)` shard entries at and counter-clockwise before the
    /// address, duplicates unfiltered as in [`Ring::after`].
    pub fn before(&self, n: u64, addr: u64) -> Vec<&Shard> {
        self.walk(n, self.space.shard_of(addr), -1)
    }

    /// Like [`Ring::before`], addressing by key.
    pub fn before_key(&self, n: u64, key: &str) -> Vec<&Shard> {
        self.walk(n, self.key_shard(key), -1)
    }

    fn walk(&self, n: u64, from: usize, step: isize) -> Vec<&Shard> {
        let q = self.shards.len();
        let n = n.min(q as u64) as usize;
        let mut seq = Vec::with_capacity(n);
        for i in 0..n {
            let idx = (from as isize + step * i as isize).rem_euclid(q as isize) as usize;
            seq.push(&self.shards[idx]);
        }
        seq
    }

    /// The replica set for `key`: up to `n` distinct nodes split into primary
    /// replicas and handoff replicas.
    ///
    /// Primaries are the first distinct *active* members found walking
    /// clockwise from the coordinator shard. When members in handoff mode are
    /// skipped on that walk, the next distinct active members further along
    /// the ring fill in as handoff replicas, preserving locality of the key
    /// range. Every returned entry reports the coordinator shard's canonical
    /// address as its `hash` and carries the claiming token's `addr`, `rank`
    /// and `node`. With fewer than `n` distinct active members on the ring,
    /// fewer entries come back. Requesting `n = 0` sweeps the whole ring and
    /// returns every distinct active shard owner as primary, with no handoff.
    pub fn successor_of(&self, n: u64, key: &str) -> (Vec<Shard>, Vec<Shard>) {
        let q = self.shards.len();
        let coord = self.key_shard(key);
        let coord_hash = self.shards[coord].hash();

        let (last, head) = self.distinct_nodes(n, coord);

        let primary: Vec<Shard> = head
            .iter()
            .filter(|entry| self.is_active(entry.node()))
            .map(|entry| entry.with_hash(coord_hash))
            .collect();
        if primary.len() == n as usize {
            return (primary, Vec::new());
        }

        // The fill count is signed: with `n = 0` the sweep above collects
        // more primaries than requested, `wanted` goes negative and the loop
        // below exhausts without matching.
        let wanted = n as i64 - primary.len() as i64;
        let mut handoff: Vec<Shard> = Vec::new();
        for i in 1..q {
            let entry = &self.shards[(last + i) % q];

            if self.is_active(entry.node())
                && !handoff.iter().any(|h| h.node() == entry.node())
                && !primary.iter().any(|p| p.node() == entry.node())
            {
                handoff.push(entry.with_hash(coord_hash));
            }

            if handoff.len() as i64 == wanted {
                break;
            }
        }

        (primary, handoff)
    }

    /// Walks clockwise from `from` collecting the first shard entry of each
    /// distinct node, stopping at `n` nodes or after one full sweep. Returns
    /// the index of the last shard visited and the collected entries.
    fn distinct_nodes(&self, n: u64, from: usize) -> (usize, Vec<&Shard>) {
        let q = self.shards.len();
        let mut last = 0;
        let mut head: Vec<&Shard> = Vec::new();
        for i in 0..q {
            last = (from + i) % q;
            let entry = &self.shards[last];

            if !head.iter().any(|h| h.node() == entry.node()) {
                head.push(entry);
            }

            if head.len() == n as usize {
                break;
            }
        }
        (last, head)
    }

    fn is_active(&self, node: &str) -> bool {
        self.nodes.get(node).copied().unwrap_or(false)
    }

    /// Number of members, active or in handoff mode.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Whether `node` is a member, active or in handoff mode.
    pub fn has(&self, node: &str) -> bool {
        self.nodes.contains_key(node)
    }

    /// Member identifiers, in no particular order.
    pub fn members(&self) -> Vec<String> {
        self.nodes.keys().cloned().collect()
    }

    /// Shard entries grouped by owning member. Every member is keyed, with an
    /// empty list if it currently owns no shard.
    pub fn nodes(&self) -> HashMap<String, Vec<Shard>> {
        let mut groups: HashMap<String, Vec<Shard>> = self
            .nodes
            .keys()
            .map(|node| (node.clone(), Vec::new()))
            .collect();

        for entry in self.shards.as_slice() {
            if let Some(group) = groups.get_mut(entry.node()) {
                group.push(entry.clone());
            }
        }

        groups
    }

    /// The full shard vector in index order.
    pub fn shards(&self) -> &[Shard] {
        self.shards.as_slice()
    }
}

impl fmt::Debug for Ring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ring")
            .field("m", &self.space.bits())
            .field("q", &self.space.shard_count())
            .field("t", &self.t)
            .field("members", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> Ring {
        Ring::builder().build().unwrap()
    }

    #[test]
    fn test_claims_tie_break() {
        let mut table = ShardTable::new(&AddressSpace::new(64, 8));

        // an unclaimed shard is taken freely, whatever the rank
        assert!(claims(&table[0], 5, 0x10));

        // a rank-0 token displaces any non-primary owner, even a bigger one
        table.claim(0, 0xff, 2, "a");
        assert!(claims(&table[0], 0, 0x01));

        // within the same rank the bigger address wins
        table.claim(0, 0x10, 1, "a");
        assert!(claims(&table[0], 1, 0x20));
        assert!(!claims(&table[0], 1, 0x05));

        // a lower rank beats a higher rank
        assert!(claims(&table[0], 0, 0x05));
        assert!(!claims(&table[0], 2, 0xff));

        // a rank-0 owner yields only to a bigger rank-0 address
        table.claim(0, 0x10, 0, "a");
        assert!(claims(&table[0], 0, 0x20));
        assert!(!claims(&table[0], 0, 0x05));
        assert!(!claims(&table[0], 3, 0xff));
    }

    #[test]
    fn test_membership_round_trip() {
        let mut ring = ring();
        assert_eq!(ring.size(), 0);
        assert!(!ring.has("10.0.0.1"));

        ring.join("10.0.0.1");
        assert_eq!(ring.size(), 1);
        assert!(ring.has("10.0.0.1"));
        assert!(ring.members().contains(&"10.0.0.1".to_string()));

        ring.leave("10.0.0.1");
        assert_eq!(ring.size(), 0);
        assert!(!ring.has("10.0.0.1"));
    }

    #[test]
    fn test_first_join_owns_every_shard() {
        let mut ring = ring();
        ring.join("10.0.0.1");

        for shard in ring.shards() {
            assert_eq!(shard.node(), "10.0.0.1");
        }
        // at least one shard is claimed by a token, the rest may be repaired
        assert!(ring.shards().iter().any(Shard::is_claimed));
    }

    #[test]
    fn test_leave_of_non_member_is_noop() {
        let mut ring = ring();
        ring.join("10.0.0.1");
        let shards = ring.shards().to_vec();

        ring.leave("10.0.0.9");
        assert_eq!(ring.shards(), &shards[..]);
        assert_eq!(ring.size(), 1);
    }

    #[test]
    fn test_leave_of_sole_member_empties_ring() {
        let mut ring = ring();
        ring.join("10.0.0.1");
        ring.leave("10.0.0.1");

        assert_eq!(ring.size(), 0);
        for shard in ring.shards() {
            assert_eq!(shard.node(), "");
            assert_eq!(shard.addr(), 0);
            assert_eq!(shard.rank(), Shard::UNCLAIMED);
        }
    }

    #[test]
    fn test_handoff_of_unknown_node_is_ignored() {
        let mut ring = ring();
        ring.join("10.0.0.1");

        ring.handoff("10.0.0.9");
        assert!(!ring.has("10.0.0.9"));
        assert_eq!(ring.size(), 1);
    }

    #[test]
    fn test_rejoin_reactivates_without_reallocation() {
        let mut ring = ring();
        ring.join("10.0.0.1");
        ring.join("10.0.0.2");
        let shards = ring.shards().to_vec();

        ring.handoff("10.0.0.2");
        let (primary, _) = ring.successor_of(2, "key");
        assert!(primary.iter().all(|s| s.node() != "10.0.0.2"));

        ring.join("10.0.0.2");
        assert_eq!(ring.shards(), &shards[..]);
        let (primary, _) = ring.successor_of(2, "key");
        assert!(primary.iter().any(|s| s.node() == "10.0.0.2"));
    }

    #[test]
    fn test_successor_of_empty_ring() {
        let ring = ring();
        let (primary, handoff) = ring.successor_of(3, "key");
        assert!(primary.is_empty());
        assert!(handoff.is_empty());
    }

    #[test]
    fn test_successor_of_zero_replicas_sweeps_active_owners() {
        let mut ring = ring();
        ring.join("10.0.0.1");
        ring.join("10.0.0.2");
        ring.handoff("10.0.0.2");

        // requesting nothing never stops the distinct-node sweep early, so
        // every active shard owner routes as primary and nothing fills in
        let (primary, handoff) = ring.successor_of(0, "key");
        let nodes: Vec<&str> = primary.iter().map(Shard::node).collect();
        assert_eq!(nodes, ["10.0.0.1"]);
        assert!(handoff.is_empty());

        // an empty ring still yields two empty lists
        let ring = Ring::builder().build().unwrap();
        let (primary, handoff) = ring.successor_of(0, "key");
        assert!(primary.is_empty());
        assert!(handoff.is_empty());
    }

    #[test]
    fn test_successor_of_caps_at_distinct_members() {
        let mut ring = ring();
        ring.join("10.0.0.1");
        ring.join("10.0.0.2");

        let (primary, handoff) = ring.successor_of(100, "key");
        assert_eq!(primary.len(), 2);
        assert!(handoff.is_empty());
    }

    #[test]
    fn test_nodes_keys_every_member() {
        let mut ring = ring();
        ring.join("10.0.0.1");
        ring.join("10.0.0.2");
        ring.join("10.0.0.3");

        let groups = ring.nodes();
        assert_eq!(groups.len(), 3);
        let total: usize = groups.values().map(Vec::len).sum();
        assert_eq!(total, ring.shards().len());
    }

    #[test]
    fn test_nodes_of_empty_ring_is_empty() {
        assert!(ring().nodes().is_empty());
    }
}
