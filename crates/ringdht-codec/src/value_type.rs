use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ringdht_core::InfoHash;

use crate::value::Value;

/// Numeric identifier of a payload class.
pub type ValueTypeId = u16;

/// Reserved id of generic user data.
pub const USER_DATA_ID: ValueTypeId = 0;
/// Validity window applied when a type does not choose its own.
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(60 * 60);

/// Decides whether `candidate` may be stored at `key`.
///
/// Arguments are `(key, candidate, source_id, source_addr)`. The policy may
/// normalize the candidate in place before accepting it, but keeps no state
/// between calls.
pub type StorePolicy =
    Arc<dyn Fn(&InfoHash, &mut Value, &InfoHash, &SocketAddr) -> bool + Send + Sync>;

/// Decides whether `new` may replace `old` at `key`.
///
/// Arguments are `(key, old, new, source_id, source_addr)`.
pub type EditPolicy =
    Arc<dyn Fn(&InfoHash, &Value, &mut Value, &InfoHash, &SocketAddr) -> bool + Send + Sync>;

/// Accepts every store.
pub fn default_store_policy(_: &InfoHash, _: &mut Value, _: &InfoHash, _: &SocketAddr) -> bool {
    true
}

/// Rejects every edit: values are immutable unless a type opts in.
pub fn default_edit_policy(
    _: &InfoHash,
    _: &Value,
    _: &mut Value,
    _: &InfoHash,
    _: &SocketAddr,
) -> bool {
    false
}

/// Permits a replacement signed by the same owner with a strictly greater `seq`.
pub fn signed_sequence_edit_policy(
    _: &InfoHash,
    old: &Value,
    new: &mut Value,
    _: &InfoHash,
    _: &SocketAddr,
) -> bool {
    match (old.owner(), new.owner()) {
        (Some(old_owner), Some(new_owner)) if old_owner == new_owner => {
            new.envelope.seq > old.envelope.seq
        }
        _ => false,
    }
}

/// Describes a class of payload and its admission rules.
///
/// Equality is by `id` alone.
#[derive(Clone)]
pub struct ValueType {
    id: ValueTypeId,
    name: String,
    expiration: Duration,
    store_policy: StorePolicy,
    edit_policy: EditPolicy,
}

impl ValueType {
    /// Builds a type with the default (accept-store, reject-edit) policies.
    pub fn new(id: ValueTypeId, name: impl Into<String>, expiration: Duration) -> Self {
        Self::with_policies(
            id,
            name,
            expiration,
            Arc::new(default_store_policy),
            Arc::new(default_edit_policy),
        )
    }

    pub fn with_policies(
        id: ValueTypeId,
        name: impl Into<String>,
        expiration: Duration,
        store_policy: StorePolicy,
        edit_policy: EditPolicy,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            expiration,
            store_policy,
            edit_policy,
        }
    }

    /// Generic user data: id 0, one hour, default policies.
    pub fn user_data() -> Self {
        Self::new(USER_DATA_ID, "User Data", DEFAULT_EXPIRATION)
    }

    pub fn id(&self) -> ValueTypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    pub fn store_policy(&self) -> &StorePolicy {
        &self.store_policy
    }

    pub fn edit_policy(&self) -> &EditPolicy {
        &self.edit_policy
    }

    /// Runs the store policy for `candidate`.
    pub fn accepts_store(
        &self,
        key: &InfoHash,
        candidate: &mut Value,
        source_id: &InfoHash,
        source_addr: &SocketAddr,
    ) -> bool {
        (self.store_policy)(key, candidate, source_id, source_addr)
    }

    /// Runs the edit policy for replacing `old` with `new`.
    pub fn accepts_edit(
        &self,
        key: &InfoHash,
        old: &Value,
        new: &mut Value,
        source_id: &InfoHash,
        source_addr: &SocketAddr,
    ) -> bool {
        (self.edit_policy)(key, old, new, source_id, source_addr)
    }
}

impl Default for ValueType {
    fn default() -> Self {
        Self::user_data()
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ValueType {}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueType")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}
