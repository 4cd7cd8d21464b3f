use std::net::SocketAddr;
use std::time::Duration;

use ringdht_codec::{CodecError, TypeRegistry, Value, ValueType, ValueTypeId};
use ringdht_core::InfoHash;
use ringdht_crypto::signing::Verifier;
use ringdht_crypto::verify_value;
use tracing::{debug, info, warn};

use crate::config::NodeConfig;

/// Why a value was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Wire bytes did not decode.
    Malformed,
    /// Packed value exceeds the configured size limit.
    TooLarge { size: usize, limit: usize },
    /// Type id is not registered and unknown types are refused.
    UnknownType(ValueTypeId),
    /// Owner signature did not verify.
    BadSignature,
    /// Replacement targets a different value id.
    IdMismatch,
    /// Replacement changes the value type.
    TypeMismatch,
    /// The type's store policy refused the value.
    StorePolicy,
    /// The type's edit policy refused the replacement.
    EditPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// Value to store, possibly normalized by the store policy.
    Accepted(Value),
    Rejected(RejectReason),
}

impl AdmissionDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AdmissionDecision::Accepted(_))
    }

    /// Whether the sender sent something no honest peer would.
    pub fn penalize_source(&self) -> bool {
        matches!(
            self,
            AdmissionDecision::Rejected(RejectReason::Malformed | RejectReason::BadSignature)
        )
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            AdmissionDecision::Accepted(value) => Some(value),
            AdmissionDecision::Rejected(_) => None,
        }
    }

    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            AdmissionDecision::Accepted(_) => None,
            AdmissionDecision::Rejected(reason) => Some(*reason),
        }
    }
}

/// Single decision point for inbound stores and edits.
///
/// Holds no mutable state; one instance can serve concurrent callers.
pub struct Admission<V> {
    registry: TypeRegistry,
    config: NodeConfig,
    verifier: V,
}

impl<V: Verifier> Admission<V> {
    pub fn new(registry: TypeRegistry, config: NodeConfig, verifier: V) -> Self {
        Self {
            registry,
            config,
            verifier,
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// How long a stored value of `type_id` stays valid.
    pub fn expiration_for(&self, type_id: ValueTypeId) -> Duration {
        self.registry.get(type_id).expiration()
    }

    /// Decodes wire bytes and runs store admission on the result.
    pub fn ingest(
        &self,
        key: &InfoHash,
        bytes: &[u8],
        source_id: &InfoHash,
        source_addr: &SocketAddr,
    ) -> AdmissionDecision {
        match Value::unpack(bytes) {
            Ok(value) => self.admit_store(key, value, source_id, source_addr),
            Err(err) => {
                warn!(
                    "admission: malformed value at {} from {}: {}",
                    key, source_addr, err
                );
                AdmissionDecision::Rejected(RejectReason::Malformed)
            }
        }
    }

    /// Decides whether `value` may be stored at `key`.
    pub fn admit_store(
        &self,
        key: &InfoHash,
        mut value: Value,
        source_id: &InfoHash,
        source_addr: &SocketAddr,
    ) -> AdmissionDecision {
        let value_type = match self.precheck(key, &value, source_addr) {
            Ok(value_type) => value_type,
            Err(reason) => return AdmissionDecision::Rejected(reason),
        };
        if !value_type.accepts_store(key, &mut value, source_id, source_addr) {
            info!(
                "admission: store of {:016x} at {} refused by {} policy",
                value.id,
                key,
                value_type.name()
            );
            return AdmissionDecision::Rejected(RejectReason::StorePolicy);
        }
        debug!("admission: stored {} at {}", value, key);
        AdmissionDecision::Accepted(value)
    }

    /// Decides whether `new` may replace the stored `old` at `key`.
    ///
    /// The stored value's type governs the edit.
    pub fn admit_edit(
        &self,
        key: &InfoHash,
        old: &Value,
        mut new: Value,
        source_id: &InfoHash,
        source_addr: &SocketAddr,
    ) -> AdmissionDecision {
        if old.id != new.id {
            return AdmissionDecision::Rejected(RejectReason::IdMismatch);
        }
        if old.value_type() != new.value_type() {
            info!(
                "admission: edit of {:016x} at {} changes type {} -> {}",
                old.id,
                key,
                old.value_type(),
                new.value_type()
            );
            return AdmissionDecision::Rejected(RejectReason::TypeMismatch);
        }
        let value_type = match self.precheck(key, &new, source_addr) {
            Ok(value_type) => value_type,
            Err(reason) => return AdmissionDecision::Rejected(reason),
        };
        if !value_type.accepts_edit(key, old, &mut new, source_id, source_addr) {
            info!(
                "admission: edit of {:016x} at {} refused by {} policy (seq {} -> {})",
                old.id,
                key,
                value_type.name(),
                old.seq(),
                new.seq()
            );
            return AdmissionDecision::Rejected(RejectReason::EditPolicy);
        }
        debug!("admission: replaced {} at {}", new, key);
        AdmissionDecision::Accepted(new)
    }

    /// Size, type and signature checks shared by stores and edits.
    fn precheck(
        &self,
        key: &InfoHash,
        value: &Value,
        source_addr: &SocketAddr,
    ) -> Result<&ValueType, RejectReason> {
        let size = match value.pack() {
            Ok(bytes) => bytes.len(),
            Err(CodecError::FieldTooLarge { len, .. }) => len,
            Err(err) => {
                warn!(
                    "admission: value {:016x} at {} does not encode: {}",
                    value.id, key, err
                );
                return Err(RejectReason::Malformed);
            }
        };
        if size > self.config.max_value_size {
            info!(
                "admission: value {:016x} at {} is {} bytes (limit {})",
                value.id, key, size, self.config.max_value_size
            );
            return Err(RejectReason::TooLarge {
                size,
                limit: self.config.max_value_size,
            });
        }

        let type_id = value.value_type();
        if self.config.reject_unknown_types && !self.registry.contains(type_id) {
            info!("admission: unknown type {} at {}", type_id, key);
            return Err(RejectReason::UnknownType(type_id));
        }

        // sealed bodies can only be checked by their recipient
        if self.config.verify_signatures && value.is_signed() && !value.is_encrypted() {
            match verify_value(value, &self.verifier) {
                Ok(true) => {}
                Ok(false) => {
                    warn!(
                        "admission: bad signature on {:016x} at {} from {}",
                        value.id, key, source_addr
                    );
                    return Err(RejectReason::BadSignature);
                }
                Err(err) => {
                    warn!(
                        "admission: unverifiable signature on {:016x} at {} from {}: {}",
                        value.id, key, source_addr, err
                    );
                    return Err(RejectReason::BadSignature);
                }
            }
        }

        Ok(self.registry.get(type_id))
    }
}
