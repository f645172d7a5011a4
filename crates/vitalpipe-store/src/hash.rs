//! Blake3 fingerprinting for durable entity identity

/// Fingerprint an ordered tuple of parts into a stable 64-char hex digest.
///
/// Each part is length-prefixed before hashing so that ("ab", "c") and
/// ("a", "bc") cannot collide. Task ids and record ids both come from
/// this one function.
pub fn fingerprint(parts: &[&str]) -> String {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// First 8 hex characters of an id, for log lines.
pub fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}
