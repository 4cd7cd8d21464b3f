//! ringdht node-side value admission.
//!
//! Wires the type registry, signature verification and store/edit policies
//! into a single decision point used by a node's storage layer.

pub mod admission;
pub mod config;
pub mod logging;

pub use admission::{Admission, AdmissionDecision, RejectReason};
pub use config::{ConfigError, NodeConfig};
