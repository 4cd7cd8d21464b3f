//! Core ringdht primitives shared across crates.
//!
//! Includes fixed-size hash/key types, hash helpers, and base errors.

pub mod error;
pub mod hash;
pub mod types;

pub use error::CoreError;
pub use types::{InfoHash, PublicKey, HASH_LEN, PUBLIC_KEY_LEN};
