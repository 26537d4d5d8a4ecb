//! Disk persistence for the peer identity keypair.
//!
//! The on-disk format is a small JSON envelope holding an Argon2id-derived,
//! AES-256-GCM-encrypted Ed25519 seed. When no passphrase is configured the
//! seed is still wrapped (with an empty passphrase) so the file format is
//! uniform regardless of whether the deployment opts into encryption at
//! rest.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use argon2::Argon2;
use dir_crypto::Ed25519KeyPair;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use zeroize::Zeroize;

use crate::error::IdentityError;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

#[derive(Serialize, Deserialize)]
struct KeyFile {
    version: u8,
    salt: String,
    nonce: String,
    ciphertext: String,
}

/// A peer's durable identity: its signing keypair plus the peer id derived
/// from the public key (first 20 bytes of its SHA-256 digest, following
/// Kademlia's node-id convention).
pub struct PeerIdentity {
    keypair: Ed25519KeyPair,
    peer_id: [u8; 20],
}

impl PeerIdentity {
    fn from_keypair(keypair: Ed25519KeyPair) -> Self {
        let digest = dir_crypto::sha256(&keypair.public_key().to_bytes());
        let mut peer_id = [0u8; 20];
        peer_id.copy_from_slice(&digest[..20]);
        Self { keypair, peer_id }
    }

    pub fn keypair(&self) -> &Ed25519KeyPair {
        &self.keypair
    }

    pub fn peer_id(&self) -> [u8; 20] {
        self.peer_id
    }

    pub fn peer_id_hex(&self) -> String {
        hex::encode(self.peer_id)
    }
}

/// Loads or creates the identity keyfile at a configured path.
pub struct PeerKeystore {
    path: PathBuf,
}

impl PeerKeystore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the identity from disk, generating and persisting a fresh one
    /// if the file does not exist yet.
    pub async fn load_or_generate(&self, passphrase: &str) -> Result<PeerIdentity, IdentityError> {
        if tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            self.load(passphrase).await
        } else {
            let identity = PeerIdentity::from_keypair(Ed25519KeyPair::generate());
            self.persist(&identity, passphrase).await?;
            tracing::info!(peer_id = %identity.peer_id_hex(), path = %self.path.display(), "generated new peer identity");
            Ok(identity)
        }
    }

    pub async fn load(&self, passphrase: &str) -> Result<PeerIdentity, IdentityError> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|_| IdentityError::NotFound(self.path.display().to_string()))?;
        let file: KeyFile = serde_json::from_slice(&raw)
            .map_err(|e| IdentityError::Corrupt(e.to_string()))?;
        let seed = decrypt(&file, passphrase)?;
        let keypair = Ed25519KeyPair::from_seed(&seed);
        Ok(PeerIdentity::from_keypair(keypair))
    }

    pub async fn persist(&self, identity: &PeerIdentity, passphrase: &str) -> Result<(), IdentityError> {
        let mut seed = identity.keypair.seed();
        let file = encrypt(&seed, passphrase);
        seed.zeroize();
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(&file).map_err(|e| IdentityError::Corrupt(e.to_string()))?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn derive_aes_key(passphrase: &str, salt: &[u8]) -> [u8; 32] {
    let mut key = [0u8; 32];
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .expect("argon2 output length is fixed and valid");
    key
}

fn encrypt(seed: &[u8; 32], passphrase: &str) -> KeyFile {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let key_bytes = derive_aes_key(passphrase, &salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher
        .encrypt(nonce, seed.as_slice())
        .expect("AES-256-GCM encryption of a 32-byte seed cannot fail");

    KeyFile {
        version: 1,
        salt: hex::encode(salt),
        nonce: hex::encode(nonce_bytes),
        ciphertext: hex::encode(ciphertext),
    }
}

fn decrypt(file: &KeyFile, passphrase: &str) -> Result<[u8; 32], IdentityError> {
    let salt = hex::decode(&file.salt).map_err(|e| IdentityError::Corrupt(e.to_string()))?;
    let nonce_bytes = hex::decode(&file.nonce).map_err(|e| IdentityError::Corrupt(e.to_string()))?;
    let ciphertext = hex::decode(&file.ciphertext).map_err(|e| IdentityError::Corrupt(e.to_string()))?;

    let key_bytes = derive_aes_key(passphrase, &salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
    let nonce = Nonce::from_slice(&nonce_bytes);
    let plaintext = cipher
        .decrypt(nonce, ciphertext.as_slice())
        .map_err(|_| IdentityError::IncorrectPassphrase)?;
    plaintext
        .try_into()
        .map_err(|_| IdentityError::Corrupt("decrypted seed has wrong length".into()))
}
