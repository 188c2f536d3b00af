//! Content hashing for change detection.
//!
//! The persisted slot stores the SHA256 of the serialized snapshot, so a
//! mutation that leaves the sheet unchanged never rewrites it.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute a SHA256 hash of a serializable value.
///
/// The value is first serialized to JSON, then hashed. Snapshot tables are
/// ordered maps, so equal sheets always produce equal hashes.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn content_hash<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let json = serde_json::to_vec(value)?;
    Ok(hash_bytes(&json))
}

/// SHA256 of raw bytes as lowercase hex.
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Check if content has changed since it was last stored.
///
/// Returns `true` if there is no stored hash or the hashes differ.
#[must_use]
pub fn has_changed(current_hash: &str, stored_hash: Option<&str>) -> bool {
    stored_hash.is_none_or(|h| h != current_hash)
}
