//! Signature verification dispatch.
//!
//! The record model (`dir-types`) attaches a `signature.algorithm` string to
//! every signed record; `dir-verify` re-hashes the canonical bytes and calls
//! through here to check the signature against an attached public key.

use ed25519_dalek::{Signature as Ed25519Signature, Verifier, VerifyingKey};
use p256::ecdsa::{
    signature::Signer, signature::Verifier as P256Verifier, Signature as P256Signature, SigningKey as P256SigningKey,
    VerifyingKey as P256VerifyingKey,
};
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

/// Signature algorithms recognized by the verification subsystem. Matches
/// the `type` enumeration of the well-known document (`ecdsa-p256`) plus
/// the Ed25519 scheme used for peer-to-peer handshakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureAlgorithm {
    EcdsaP256,
    Ed25519,
}

impl SignatureAlgorithm {
    pub fn parse(s: &str) -> Result<Self, CryptoError> {
        match s {
            "ecdsa-p256" | "ECDSA_P256" | "ecdsa_p256" => Ok(Self::EcdsaP256),
            "ed25519" | "Ed25519" => Ok(Self::Ed25519),
            other => Err(CryptoError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Verify an Ed25519 signature over `message` using the raw 32-byte public key.
pub fn verify_ed25519(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
    let pk_bytes: [u8; 32] = public_key
        .try_into()
        .map_err(|_| CryptoError::InvalidKey("ed25519 public key must be 32 bytes".into()))?;
    let sig_bytes: [u8; 64] = signature
        .try_into()
        .map_err(|_| CryptoError::InvalidSignature("ed25519 signature must be 64 bytes".into()))?;

    let verifying = VerifyingKey::from_bytes(&pk_bytes)
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    let sig = Ed25519Signature::from_bytes(&sig_bytes);
    Ok(verifying.verify(message, &sig).is_ok())
}

/// Verify an ECDSA P-256 signature. `public_key` is a DER-encoded
/// SubjectPublicKeyInfo (as served in the well-known document), `signature`
/// is DER-encoded ECDSA.
pub fn verify_ecdsa_p256(public_key_der: &[u8], message: &[u8], signature_der: &[u8]) -> Result<bool, CryptoError> {
    use p256::pkcs8::DecodePublicKey;

    let verifying = P256VerifyingKey::from_public_key_der(public_key_der)
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    let sig = P256Signature::from_der(signature_der)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    Ok(verifying.verify(message, &sig).is_ok())
}

/// Sign `message` with a PKCS8 DER-encoded ECDSA P-256 private key,
/// returning a DER-encoded signature. Used by `dirctl sign` over a
/// record's canonical bytes.
pub fn sign_ecdsa_p256(private_key_der: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    use p256::pkcs8::DecodePrivateKey;

    let signing = P256SigningKey::from_pkcs8_der(private_key_der)
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    let signature: P256Signature = signing.sign(message);
    Ok(signature.to_der().as_bytes().to_vec())
}

/// The DER SubjectPublicKeyInfo matching a PKCS8 DER private key, to embed
/// in a record's `signature.certificate`.
pub fn ecdsa_p256_public_key_der(private_key_der: &[u8]) -> Result<Vec<u8>, CryptoError> {
    use p256::pkcs8::{DecodePrivateKey, EncodePublicKey};

    let signing = P256SigningKey::from_pkcs8_der(private_key_der)
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    let der = signing
        .verifying_key()
        .to_public_key_der()
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    Ok(der.as_bytes().to_vec())
}

/// Dispatch verification by algorithm. `public_key` encoding depends on the
/// algorithm: raw 32 bytes for Ed25519, DER SubjectPublicKeyInfo for P-256.
pub fn verify(
    algorithm: SignatureAlgorithm,
    public_key: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<bool, CryptoError> {
    match algorithm {
        SignatureAlgorithm::Ed25519 => verify_ed25519(public_key, message, signature),
        SignatureAlgorithm::EcdsaP256 => verify_ecdsa_p256(public_key, message, signature),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::{signature::Signer, SigningKey};
    use p256::pkcs8::EncodePublicKey;

    #[test]
    fn ecdsa_p256_round_trips() {
        let signing = SigningKey::random(&mut rand::rngs::OsRng);
        let der = signing.verifying_key().to_public_key_der().unwrap();
        let msg = b"record canonical bytes";
        let sig: P256Signature = signing.sign(msg);
        let sig_der = sig.to_der();
        assert!(verify_ecdsa_p256(der.as_bytes(), msg, sig_der.as_bytes()).unwrap());
    }

    #[test]
    fn sign_and_verify_via_pkcs8_key() {
        use p256::pkcs8::EncodePrivateKey;

        let signing = SigningKey::random(&mut rand::rngs::OsRng);
        let pkcs8 = signing.to_pkcs8_der().unwrap();
        let msg = b"record canonical bytes";

        let sig_der = sign_ecdsa_p256(pkcs8.as_bytes(), msg).unwrap();
        let pub_der = ecdsa_p256_public_key_der(pkcs8.as_bytes()).unwrap();
        assert!(verify_ecdsa_p256(&pub_der, msg, &sig_der).unwrap());
    }

    #[test]
    fn algorithm_parse_rejects_unknown() {
        assert!(SignatureAlgorithm::parse("rsa-4096").is_err());
        assert_eq!(SignatureAlgorithm::parse("ecdsa-p256").unwrap(), SignatureAlgorithm::EcdsaP256);
    }
}
