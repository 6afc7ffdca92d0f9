//! This module provides [RingBuilder] and its interface for [Ring].

use std::collections::HashMap;

use super::address::AddressSpace;
use super::hasher;
use super::hasher::HasherFactory;
use super::shard::ShardTable;
use super::topology::Ring;
use crate::consts;
use crate::error::Error;
use crate::error::Result;

/// Creates a RingBuilder to configure a [Ring].
///
/// Without further configuration [`RingBuilder::build`] produces the small
/// preset: `m = 64`, `q = 8`, `t = 8`, SHA-1.
pub struct RingBuilder {
    m: u64,
    q: u64,
    t: u64,
    hasher: HasherFactory,
}

impl Default for RingBuilder {
    fn default() -> Self {
        Self::small()
    }
}

impl RingBuilder {
    /// Creates a new instance of [RingBuilder] with the default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset for examples and tests: `m = 64`, `q = 8`, `t = 8`, SHA-1.
    pub fn small() -> Self {
        Self {
            m: consts::DEFAULT_ADDRESS_BITS,
            q: consts::DEFAULT_SHARDS,
            t: consts::DEFAULT_TOKENS,
            hasher: hasher::sha1(),
        }
    }

    /// Preset for production topologies: `m = 64`, `q = 4096`, `t = 256`,
    /// SHA-1.
    pub fn production() -> Self {
        Self {
            q: consts::PRODUCTION_SHARDS,
            t: consts::PRODUCTION_TOKENS,
            ..Self::small()
        }
    }

    /// Clones the configuration of an existing ring, not its topology.
    pub fn from_ring(ring: &Ring) -> Self {
        Self {
            m: ring.space.bits(),
            q: ring.space.shard_count(),
            t: ring.t,
            hasher: ring.hasher.clone(),
        }
    }

    /// Sets up the address space width in bits, one of 8, 16, 32 or 64.
    pub fn address_bits(mut self, m: u64) -> Self {
        self.m = m;
        self
    }

    /// Sets up the number of shards the address space is split into.
    pub fn shards(mut self, q: u64) -> Self {
        self.q = q;
        self
    }

    /// Sets up the number of tokens each node claims on join.
    pub fn tokens(mut self, t: u64) -> Self {
        self.t = t;
        self
    }

    /// Installs a digest factory. Digests must emit at least `m / 8` bytes.
    pub fn hasher(mut self, factory: HasherFactory) -> Self {
        self.hasher = factory;
        self
    }

    /// Validates the configuration and builds an empty ring.
    pub fn build(self) -> Result<Ring> {
        if !matches!(self.m, 8 | 16 | 32 | 64) {
            return Err(Error::UnsupportedAddressWidth(self.m));
        }
        if self.q == 0 {
            return Err(Error::ZeroShards);
        }
        if self.t == 0 {
            return Err(Error::ZeroTokens);
        }

        let need = (self.m / 8) as usize;
        let emit = hasher::output_size(&self.hasher);
        if emit < need {
            return Err(Error::HasherTooShort {
                m: self.m,
                emit,
                need,
            });
        }

        let space = AddressSpace::new(self.m, self.q);
        Ok(Ring {
            shards: ShardTable::new(&space),
            nodes: HashMap::new(),
            t: self.t,
            hasher: self.hasher,
            space,
        })
    }
}
