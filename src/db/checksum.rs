//! Checksum calculation for check-in photo payloads.

use sha2::{Digest, Sha256};

/// Calculate the SHA-256 fingerprint of a submitted photo payload.
///
/// The raw payload is never stored; only this fingerprint is kept on the
/// attendance record for audit.
///
/// # Arguments
/// * `payload` - Base64 photo payload as received from the client
///
/// # Returns
/// Hexadecimal string representation of the SHA-256 hash.
pub fn photo_fingerprint(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_consistency() {
        let payload = "aGVsbG8gd29ybGQ=";
        let first = photo_fingerprint(payload);
        let second = photo_fingerprint(payload);
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_payload_different_fingerprint() {
        let first = photo_fingerprint("aGVsbG8=");
        let second = photo_fingerprint("d29ybGQ=");
        assert_ne!(first, second);
    }

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let fingerprint = photo_fingerprint("abc");
        assert_eq!(fingerprint.len(), 64);
        assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
