//! RIPEMD-160 checksums over key data.

use ripemd::{Digest, Ripemd160};

/// Checksum width carried at the tail of every text-form key.
pub(crate) const CHECKSUM_SIZE: usize = 4;

/// First four bytes of `RIPEMD160(data ++ suffix)`.
///
/// The legacy public-key form passes an empty suffix; every other form
/// mixes its two-letter variant suffix into the hash.
pub(crate) fn ripemd160_checksum(data: &[u8], suffix: &str) -> [u8; CHECKSUM_SIZE] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.update(suffix.as_bytes());
    let digest = hasher.finalize();
    let mut checksum = [0u8; CHECKSUM_SIZE];
    checksum.copy_from_slice(&digest[..CHECKSUM_SIZE]);
    checksum
}
