//! Agent Directory cryptography foundation module
//!
//! Hashing, signing, and signature verification primitives shared by every
//! other crate in the workspace: SHA-256 for CID/digest computation,
//! Ed25519 for peer identity, and ECDSA P-256 for record signatures (the
//! algorithm named by the well-known document format).

pub mod error;
pub mod hashing;
pub mod signing;
pub mod verify;

pub use error::CryptoError;
pub use hashing::{sha256, sha256_hex, Sha256Digest};
pub use signing::{Ed25519KeyPair, Ed25519PublicKey};
pub use verify::{
    ecdsa_p256_public_key_der, sign_ecdsa_p256, verify, verify_ecdsa_p256, verify_ed25519, SignatureAlgorithm,
};
