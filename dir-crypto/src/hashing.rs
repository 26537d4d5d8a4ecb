//! SHA-256 hashing used for canonical-record digests and CID computation.

use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 digest.
pub type Sha256Digest = [u8; 32];

/// Hash a single buffer with SHA-256.
pub fn sha256(data: &[u8]) -> Sha256Digest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash a single buffer with SHA-256, returning lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Hash multiple segments as if they were concatenated, without allocating
/// the concatenation.
pub fn sha256_multi(segments: &[&[u8]]) -> Sha256Digest {
    let mut hasher = Sha256::new();
    for segment in segments {
        hasher.update(segment);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_is_deterministic() {
        let data = b"hello world";
        assert_eq!(sha256(data), sha256(data));
    }

    #[test]
    fn sha256_multi_matches_concatenation() {
        let a = sha256_multi(&[b"hello", b" ", b"world"]);
        let b = sha256(b"hello world");
        assert_eq!(a, b);
    }

    #[test]
    fn sha256_hex_known_vector() {
        // SHA-256("") per NIST test vectors.
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85"
        );
    }
}
