//! Cryptographic capabilities for ringdht values.
//!
//! Includes Ed25519 signing/verification, an XChaCha20-Poly1305 AEAD, and the
//! sign/seal/open flows that run them over a value's to-sign and to-encrypt views.

pub mod aead;
pub mod seal;
pub mod signing;

pub use seal::{open_value, seal_value, sign_value, verify_value, SealError};
