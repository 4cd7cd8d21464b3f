//! Symmetric sealing of value bodies.
//!
//! A cypher is `nonce || ciphertext || tag`. The owning value id is bound as
//! associated data, so a cypher copied under another id does not open.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    Key, XChaCha20Poly1305, XNonce,
};
use ringdht_codec::ValueId;
use thiserror::Error;

/// XChaCha20 nonce length.
pub const NONCE_LEN: usize = 24;
/// Poly1305 tag length.
pub const TAG_LEN: usize = 16;
/// Bytes a cypher adds on top of the sealed body.
pub const SEAL_OVERHEAD: usize = NONCE_LEN + TAG_LEN;
/// Symmetric key length.
pub const KEY_LEN: usize = 32;

const AAD_DOMAIN: &[u8; 12] = b"ringdht/seal";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AeadError {
    #[error("key must be {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),
    #[error("cypher of {0} bytes is shorter than nonce and tag")]
    CypherTooShort(usize),
    #[error("sealing failed")]
    SealFailed,
    /// Wrong key, wrong id, or a tampered cypher.
    #[error("cypher does not open")]
    OpenFailed,
}

/// Seals and opens value bodies under a shared key.
pub trait AeadCipher {
    /// Encrypts `body` for value `id`, returning the full cypher.
    fn seal(
        &self,
        key: &[u8],
        id: ValueId,
        nonce: [u8; NONCE_LEN],
        body: &[u8],
    ) -> Result<Vec<u8>, AeadError>;

    /// Recovers the body sealed for value `id`.
    fn open(&self, key: &[u8], id: ValueId, cypher: &[u8]) -> Result<Vec<u8>, AeadError>;
}

/// `"ringdht/seal" || id_be`.
pub fn build_value_aad(id: ValueId) -> [u8; 20] {
    let mut aad = [0_u8; 20];
    aad[..12].copy_from_slice(AAD_DOMAIN);
    aad[12..].copy_from_slice(&id.to_be_bytes());
    aad
}

#[derive(Debug, Default, Clone, Copy)]
pub struct XChaCha20Poly1305Cipher;

impl XChaCha20Poly1305Cipher {
    fn keyed(key: &[u8]) -> Result<XChaCha20Poly1305, AeadError> {
        if key.len() != KEY_LEN {
            return Err(AeadError::InvalidKeyLength(key.len()));
        }
        Ok(XChaCha20Poly1305::new(Key::from_slice(key)))
    }
}

impl AeadCipher for XChaCha20Poly1305Cipher {
    fn seal(
        &self,
        key: &[u8],
        id: ValueId,
        nonce: [u8; NONCE_LEN],
        body: &[u8],
    ) -> Result<Vec<u8>, AeadError> {
        let aad = build_value_aad(id);
        let sealed = Self::keyed(key)?
            .encrypt(XNonce::from_slice(&nonce), Payload { msg: body, aad: &aad })
            .map_err(|_| AeadError::SealFailed)?;

        let mut cypher = Vec::with_capacity(NONCE_LEN + sealed.len());
        cypher.extend_from_slice(&nonce);
        cypher.extend_from_slice(&sealed);
        Ok(cypher)
    }

    fn open(&self, key: &[u8], id: ValueId, cypher: &[u8]) -> Result<Vec<u8>, AeadError> {
        let cipher = Self::keyed(key)?;
        if cypher.len() < SEAL_OVERHEAD {
            return Err(AeadError::CypherTooShort(cypher.len()));
        }
        let (nonce, sealed) = cypher.split_at(NONCE_LEN);
        let aad = build_value_aad(id);
        cipher
            .decrypt(XNonce::from_slice(nonce), Payload { msg: sealed, aad: &aad })
            .map_err(|_| AeadError::OpenFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        build_value_aad, AeadCipher, AeadError, XChaCha20Poly1305Cipher, NONCE_LEN, SEAL_OVERHEAD,
    };

    const KEY: [u8; 32] = [0x11; 32];
    const NONCE: [u8; NONCE_LEN] = [0x22; NONCE_LEN];

    #[test]
    fn aad_is_domain_then_big_endian_id() {
        let aad = build_value_aad(0x0102_0304_0506_0708);
        assert_eq!(&aad[..12], b"ringdht/seal");
        assert_eq!(&aad[12..], &0x0102_0304_0506_0708_u64.to_be_bytes());
    }

    #[test]
    fn cypher_is_nonce_then_sealed_body() {
        let body = b"packed signed value";
        let cypher = XChaCha20Poly1305Cipher
            .seal(&KEY, 42, NONCE, body)
            .expect("seal");
        assert_eq!(cypher.len(), body.len() + SEAL_OVERHEAD);
        assert_eq!(&cypher[..NONCE_LEN], &NONCE);

        let opened = XChaCha20Poly1305Cipher
            .open(&KEY, 42, &cypher)
            .expect("open");
        assert_eq!(opened, body);
    }

    #[test]
    fn cypher_is_bound_to_its_value_id() {
        let cypher = XChaCha20Poly1305Cipher
            .seal(&KEY, 7, NONCE, b"note for bob")
            .expect("seal");
        assert_eq!(
            XChaCha20Poly1305Cipher.open(&KEY, 8, &cypher),
            Err(AeadError::OpenFailed)
        );
    }

    #[test]
    fn flipped_cypher_byte_does_not_open() {
        let mut cypher = XChaCha20Poly1305Cipher
            .seal(&KEY, 7, NONCE, b"note for bob")
            .expect("seal");
        cypher[NONCE_LEN] ^= 0x80;
        assert_eq!(
            XChaCha20Poly1305Cipher.open(&KEY, 7, &cypher),
            Err(AeadError::OpenFailed)
        );
    }

    #[test]
    fn short_cypher_and_bad_key_are_typed_errors() {
        assert_eq!(
            XChaCha20Poly1305Cipher.open(&KEY, 1, &[0; SEAL_OVERHEAD - 1]),
            Err(AeadError::CypherTooShort(SEAL_OVERHEAD - 1))
        );
        assert_eq!(
            XChaCha20Poly1305Cipher.seal(&[0x11; 31], 1, NONCE, b"body"),
            Err(AeadError::InvalidKeyLength(31))
        );
    }
}
