//! Sign, verify, seal and open values.
//!
//! Signatures cover [`Value::to_sign`]; encryption covers
//! [`Value::to_encrypt`], so opening a sealed value always yields a value
//! whose signature can be checked.

use ringdht_codec::ser::MAX_VALUE_SIZE;
use ringdht_codec::{CodecError, Value, ValueId};
use ringdht_core::hash::blake3_32;
use ringdht_core::PublicKey;
use thiserror::Error;

use crate::aead::{AeadCipher, AeadError, NONCE_LEN};
use crate::signing::{Signer, SigningError, Verifier};

#[derive(Debug, Error)]
pub enum SealError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("aead error: {0}")]
    Aead(#[from] AeadError),
    #[error("signing error: {0}")]
    Signing(#[from] SigningError),
    #[error("value is not signed")]
    NotSigned,
    #[error("value is not sealed")]
    NotSealed,
    #[error("sealed body id {inner:#x} does not match envelope id {outer:#x}")]
    IdMismatch { inner: ValueId, outer: ValueId },
    #[error("signature verification failed")]
    SignatureInvalid,
}

/// Derives a per-value nonce: `H("ringdht/nonce/v1" || id_be || H(plaintext))[..24]`.
pub fn derive_seal_nonce(id: ValueId, plaintext: &[u8]) -> [u8; NONCE_LEN] {
    let mut preimage = Vec::with_capacity(16 + 8 + 32);
    preimage.extend_from_slice(b"ringdht/nonce/v1");
    preimage.extend_from_slice(&id.to_be_bytes());
    preimage.extend_from_slice(&blake3_32(plaintext));
    let hash = blake3_32(&preimage);
    let mut nonce = [0_u8; NONCE_LEN];
    nonce.copy_from_slice(&hash[..NONCE_LEN]);
    nonce
}

/// Signs `value` with `signer`, which becomes its owner.
pub fn sign_value(value: Value, signer: &impl Signer) -> Result<Value, SealError> {
    let owner = signer.public_key();
    let to_sign = value.to_sign_as(&owner)?;
    let signature = signer.sign(&to_sign)?;
    Ok(value.into_signed(owner, signature.to_vec())?)
}

/// Checks the signature of a signed value against its owner.
pub fn verify_value(value: &Value, verifier: &impl Verifier) -> Result<bool, SealError> {
    let (Some(owner), Some(signature)) = (value.owner(), value.signature()) else {
        return Err(SealError::NotSigned);
    };
    let to_sign = value.to_sign()?;
    Ok(verifier.verify(owner, &to_sign, signature)?)
}

/// Addresses `value` to `recipient`, signs it, and seals the signed body
/// under `key`.
pub fn seal_value(
    mut value: Value,
    signer: &impl Signer,
    recipient: &PublicKey,
    key: &[u8],
    cipher: &impl AeadCipher,
) -> Result<Value, SealError> {
    value.set_recipient(recipient.id());
    let mut signed = sign_value(value, signer)?;
    let plaintext = signed.to_encrypt()?;
    let nonce = derive_seal_nonce(signed.id, &plaintext);
    let cypher = cipher.seal(key, signed.id, nonce, &plaintext)?;
    if cypher.len() > MAX_VALUE_SIZE {
        return Err(CodecError::FieldTooLarge {
            len: cypher.len(),
            limit: MAX_VALUE_SIZE,
        }
        .into());
    }
    signed.set_cypher(cypher);
    Ok(signed)
}

/// Decrypts a sealed value and verifies the signed body inside it.
pub fn open_value(
    sealed: &Value,
    key: &[u8],
    cipher: &impl AeadCipher,
    verifier: &impl Verifier,
) -> Result<Value, SealError> {
    let cypher = sealed.cypher().ok_or(SealError::NotSealed)?;
    let plaintext = cipher.open(key, sealed.id, cypher)?;
    let inner = Value::unpack(&plaintext)?;
    if inner.id != sealed.id {
        return Err(SealError::IdMismatch {
            inner: inner.id,
            outer: sealed.id,
        });
    }
    if !verify_value(&inner, verifier)? {
        return Err(SealError::SignatureInvalid);
    }
    Ok(inner)
}
