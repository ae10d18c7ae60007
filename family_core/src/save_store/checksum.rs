//! Integrity digests over serializable values.
//!
//! The digest is xxh3-64 over a canonical JSON form (object keys sorted), so two
//! structurally identical values hash the same regardless of map iteration order.
//! It detects accidental corruption: partial writes, hand-edited storage, damaged
//! transfers. It does not resist deliberate forgery; anyone can recompute it.

use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

/// Compute the checksum of a value as 16 lowercase hex digits.
pub fn checksum<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let bytes = canonical_bytes(value)?;
    Ok(format!("{:016x}", xxh3_64(&bytes)))
}

/// Recompute the checksum and compare it with `expected`.
pub fn verify<T: Serialize + ?Sized>(value: &T, expected: &str) -> Result<bool, serde_json::Error> {
    Ok(checksum(value)? == expected)
}

fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    // serde_json::Value keeps object keys in a BTreeMap.
    let canonical = serde_json::to_value(value)?;
    serde_json::to_vec(&canonical)
}
