//! BLAKE3 helpers for cache keys and deterministic seeds.

/// Full 32-byte BLAKE3 digest of a normalized text; the key of the shared embedding cache.
#[inline]
pub fn hash_text(text: &str) -> [u8; 32] {
    *blake3::hash(text.as_bytes()).as_bytes()
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Only used where a collision is harmless (stub embedding seeds). Cache keys use the full
/// digest from [`hash_text`].
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}
