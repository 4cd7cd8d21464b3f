use std::collections::HashMap;

use crate::announcement::ServiceAnnouncement;
use crate::value_type::{ValueType, ValueTypeId};

/// Known value types by id.
///
/// Unknown ids resolve to generic user data.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: HashMap<ValueTypeId, ValueType>,
    fallback: ValueType,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(ServiceAnnouncement::value_type());
        registry
    }
}

impl TypeRegistry {
    /// Registry holding only the user data type.
    pub fn empty() -> Self {
        let fallback = ValueType::user_data();
        let mut types = HashMap::new();
        types.insert(fallback.id(), fallback.clone());
        Self { types, fallback }
    }

    /// Registers `value_type`, returning the type it replaced.
    pub fn register(&mut self, value_type: ValueType) -> Option<ValueType> {
        self.types.insert(value_type.id(), value_type)
    }

    pub fn contains(&self, id: ValueTypeId) -> bool {
        self.types.contains_key(&id)
    }

    /// Looks up `id`, falling back to user data.
    pub fn get(&self, id: ValueTypeId) -> &ValueType {
        self.types.get(&id).unwrap_or(&self.fallback)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
