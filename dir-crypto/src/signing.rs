//! Ed25519 keypair generation and signing, used for peer identity keys
//! (`identity.key` under the data directory — see `dir-identity`).

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// An Ed25519 public key, as used to identify a peer on the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ed25519PublicKey(pub [u8; 32]);

impl Ed25519PublicKey {
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKey("ed25519 public key must be 32 bytes".into()))?;
        Ok(Self(arr))
    }
}

/// An Ed25519 signing keypair. Zeroized on drop since it guards the peer's
/// on-disk identity.
#[derive(ZeroizeOnDrop)]
pub struct Ed25519KeyPair {
    #[zeroize(skip)]
    verifying: VerifyingKey,
    signing: [u8; 32],
}

impl Ed25519KeyPair {
    /// Generate a fresh keypair using the OS CSPRNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self {
            verifying: signing_key.verifying_key(),
            signing: signing_key.to_bytes(),
        }
    }

    /// Reconstruct a keypair from a 32-byte seed (as persisted on disk).
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self {
            verifying: signing_key.verifying_key(),
            signing: signing_key.to_bytes(),
        }
    }

    pub fn seed(&self) -> [u8; 32] {
        self.signing
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.verifying.to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        let signing_key = SigningKey::from_bytes(&self.signing);
        signing_key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519KeyPair")
            .field("verifying", &hex::encode(self.verifying.to_bytes()))
            .finish_non_exhaustive()
    }
}

impl Drop for Ed25519KeyPair {
    fn drop(&mut self) {
        self.signing.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trips() {
        let kp = Ed25519KeyPair::generate();
        let msg = b"agent directory peer handshake";
        let sig = kp.sign(msg);
        assert!(crate::verify::verify_ed25519(&kp.public_key().to_bytes(), msg, &sig).is_ok());
    }

    #[test]
    fn seed_round_trip_preserves_identity() {
        let kp = Ed25519KeyPair::generate();
        let seed = kp.seed();
        let restored = Ed25519KeyPair::from_seed(&seed);
        assert_eq!(kp.public_key(), restored.public_key());
    }
}
