//! Peer identity as seen by the routing table: a 256-bit id derived from a
//! node's Ed25519 public key, plus the XOR-distance metric Kademlia bucket
//! placement is built on.

use std::fmt;

use dir_crypto::sha256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub [u8; 32]);

impl PeerId {
    pub fn from_public_key(public_key: &[u8]) -> Self {
        Self(sha256(public_key))
    }

    /// XOR distance between two ids, collapsed to the index of the highest
    /// differing bit (0 = identical, 256 = maximally distant... never
    /// reached since index 255 is the most significant bit of a 32-byte id).
    pub fn distance(&self, other: &PeerId) -> u32 {
        for i in 0..32 {
            let x = self.0[i] ^ other.0[i];
            if x != 0 {
                let bit_in_byte = 7 - x.leading_zeros().min(7);
                return ((31 - i) as u32) * 8 + bit_in_byte + 1;
            }
        }
        0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhtNode {
    pub peer_id: PeerId,
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_ids_have_zero_distance() {
        let id = PeerId([7u8; 32]);
        assert_eq!(id.distance(&id), 0);
    }

    #[test]
    fn differing_high_bit_yields_large_distance() {
        let a = PeerId([0u8; 32]);
        let mut b_bytes = [0u8; 32];
        b_bytes[0] = 0x80;
        let b = PeerId(b_bytes);
        assert_eq!(a.distance(&b), 256);
    }

    #[test]
    fn differing_low_bit_yields_small_distance() {
        let a = PeerId([0u8; 32]);
        let mut b_bytes = [0u8; 32];
        b_bytes[31] = 1;
        let b = PeerId(b_bytes);
        assert_eq!(a.distance(&b), 1);
    }
}
