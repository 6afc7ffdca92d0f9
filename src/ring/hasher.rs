//! Hashing seam of the ring.
//!
//! A ring owns a factory of byte-oriented digests rather than a single digest
//! instance: token derivation consumes a fresh digest per token, and digest
//! state cannot be rewound once finalized. Any [`DynDigest`] implementation
//! wide enough for the configured address space works; SHA-1 is the default.

use std::sync::Arc;

use digest::DynDigest;
use sha1::Digest;
use sha1::Sha1;

/// Factory producing one digest instance per call.
pub type HasherFactory = Arc<dyn Fn() -> Box<dyn DynDigest> + Send + Sync>;

/// The default digest factory, SHA-1.
pub fn sha1() -> HasherFactory {
    Arc::new(|| Box::new(Sha1::new()) as Box<dyn DynDigest>)
}

/// Digest `key`, optionally chained with a previous digest.
///
/// Token `k` of a node hashes the node identifier concatenated with token
/// `k - 1`'s digest; the first token hashes the identifier alone. Keys hash
/// as their UTF-8 bytes.
pub(crate) fn chain(factory: &HasherFactory, key: &str, prev: Option<&[u8]>) -> Box<[u8]> {
    let mut hasher = factory();
    hasher.update(key.as_bytes());
    if let Some(prev) = prev {
        hasher.update(prev);
    }
    hasher.finalize()
}

/// Number of bytes the factory's digests emit.
pub(crate) fn output_size(factory: &HasherFactory) -> usize {
    factory().output_size()
}
