use ed25519_dalek::{
    Signature as DalekSignature, Signer as DalekSignerTrait, SigningKey,
    Verifier as DalekVerifierTrait, VerifyingKey,
};
use ringdht_core::PublicKey;
use thiserror::Error;

/// Length of an Ed25519 signature.
pub const SIGNATURE_LEN: usize = 64;

/// Errors returned by signing/verification helpers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningError {
    /// Pubkey bytes are not a valid Ed25519 verifying key.
    #[error("invalid public key bytes")]
    InvalidPublicKey,
    /// Signature blob does not have the Ed25519 length.
    #[error("invalid signature length: expected 64 bytes, got {0}")]
    InvalidSignatureLength(usize),
}

/// Trait for message signing backends.
pub trait Signer {
    /// Signs `msg` and returns a 64-byte signature.
    fn sign(&self, msg: &[u8]) -> Result<[u8; SIGNATURE_LEN], SigningError>;
    /// Returns the signer's public key; it becomes the value owner.
    fn public_key(&self) -> PublicKey;
}

/// Trait for signature verification backends.
pub trait Verifier {
    /// Verifies `sig` against `(owner, msg)`.
    fn verify(&self, owner: &PublicKey, msg: &[u8], sig: &[u8]) -> Result<bool, SigningError>;
}

/// Ed25519 signing implementation backed by `ed25519-dalek`.
#[derive(Debug, Clone)]
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    /// Creates a signer from a 32-byte secret key.
    pub fn from_secret(secret: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&secret),
        }
    }
}

impl Signer for Ed25519Signer {
    fn sign(&self, msg: &[u8]) -> Result<[u8; SIGNATURE_LEN], SigningError> {
        let signature = self.signing_key.sign(msg);
        Ok(signature.to_bytes())
    }

    fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }
}

/// Stateless Ed25519 verifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519Verifier;

impl Verifier for Ed25519Verifier {
    fn verify(&self, owner: &PublicKey, msg: &[u8], sig: &[u8]) -> Result<bool, SigningError> {
        let verifying_key =
            VerifyingKey::from_bytes(&owner.0).map_err(|_| SigningError::InvalidPublicKey)?;
        let raw: [u8; SIGNATURE_LEN] = sig
            .try_into()
            .map_err(|_| SigningError::InvalidSignatureLength(sig.len()))?;
        let signature = DalekSignature::from_bytes(&raw);
        Ok(verifying_key.verify(msg, &signature).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::{Ed25519Signer, Ed25519Verifier, Signer, SigningError, Verifier};

    #[test]
    fn sign_and_verify_round_trip() {
        let signer = Ed25519Signer::from_secret([0x42_u8; 32]);
        let verifier = Ed25519Verifier;
        let msg = b"ringdht signed payload";

        let signature = signer.sign(msg).expect("sign should succeed");
        let ok = verifier
            .verify(&signer.public_key(), msg, &signature)
            .expect("verify should succeed");
        assert!(ok);
    }

    #[test]
    fn verify_fails_when_message_changes() {
        let signer = Ed25519Signer::from_secret([0x10_u8; 32]);
        let verifier = Ed25519Verifier;

        let signature = signer.sign(b"original").expect("sign should succeed");
        let ok = verifier
            .verify(&signer.public_key(), b"tampered", &signature)
            .expect("verify should run");
        assert!(!ok);
    }

    #[test]
    fn verify_fails_when_signature_changes() {
        let signer = Ed25519Signer::from_secret([0xAA_u8; 32]);
        let verifier = Ed25519Verifier;
        let msg = b"message";

        let mut signature = signer.sign(msg).expect("sign should succeed");
        signature[0] ^= 0x01;
        let ok = verifier
            .verify(&signer.public_key(), msg, &signature)
            .expect("verify should run");
        assert!(!ok);
    }

    #[test]
    fn verify_rejects_wrong_signature_length() {
        let signer = Ed25519Signer::from_secret([0x01_u8; 32]);
        let err = Ed25519Verifier
            .verify(&signer.public_key(), b"msg", &[0_u8; 12])
            .expect_err("short signature must fail");
        assert_eq!(err, SigningError::InvalidSignatureLength(12));
    }
}
