//! ringdht value codec.
//!
//! Defines the value envelope, its flags and type registry, the canonical
//! binary wire format, and the payload types carried inside values.

pub mod announcement;
pub mod error;
pub mod filter;
pub mod flags;
pub mod registry;
pub mod ser;
pub mod value;
pub mod value_type;

pub use announcement::ServiceAnnouncement;
pub use error::CodecError;
pub use filter::{all_filter, chain_filters, type_filter, Filter};
pub use flags::ValueFlags;
pub use registry::TypeRegistry;
pub use ser::Serializable;
pub use value::{Envelope, Payload, Value, ValueId, INVALID_ID};
pub use value_type::{
    default_edit_policy, default_store_policy, signed_sequence_edit_policy, EditPolicy,
    StorePolicy, ValueType, ValueTypeId, USER_DATA_ID,
};
