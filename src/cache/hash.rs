//! Cache key hashing.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute SHA256 hash of a serializable value.
///
/// The value is serialized to JSON before hashing, ensuring deterministic output.
/// Returns a 64-character lowercase hexadecimal string.
pub fn compute_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Key of a schema snapshot: one per driver, database and connection.
///
/// The connection string is hashed, never stored.
pub fn schema_key(driver: &str, database: &str, connection: &str) -> String {
    let mut hasher = Sha256::new();
    for part in [driver, database, connection] {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    format!("schema:{:x}", hasher.finalize())
}
