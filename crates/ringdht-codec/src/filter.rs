//! Predicate combinators used to scan value sets.

use std::sync::Arc;

use crate::value::Value;
use crate::value_type::ValueType;

/// Shareable value predicate.
pub type Filter = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Accepts every value.
pub fn all_filter() -> Filter {
    Arc::new(|_: &Value| true)
}

/// Accepts values of `value_type`. Only the id is captured.
pub fn type_filter(value_type: &ValueType) -> Filter {
    let id = value_type.id();
    Arc::new(move |v: &Value| v.value_type() == id)
}

/// Short-circuiting AND: `second` runs only when `first` accepts.
pub fn chain_filters(first: Filter, second: Filter) -> Filter {
    Arc::new(move |v: &Value| first(v) && second(v))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::{all_filter, chain_filters, type_filter, Filter};
    use crate::value::Value;
    use crate::value_type::ValueType;

    fn values() -> Vec<Value> {
        vec![
            Value::new(1, b"a".to_vec()),
            Value::new(2, b"b".to_vec()),
            Value::new(1, b"c".to_vec()),
            Value::default(),
        ]
    }

    #[test]
    fn all_filter_accepts_everything() {
        let f = all_filter();
        assert!(values().iter().all(|v| f(v)));
    }

    #[test]
    fn type_filter_outlives_the_type_object() {
        let f = {
            let ty = ValueType::new(1, "one", Duration::from_secs(10));
            type_filter(&ty)
        };
        let matched: Vec<_> = values().into_iter().filter(|v| f(v)).collect();
        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|v| v.value_type() == 1));
    }

    #[test]
    fn chain_of_distinct_types_accepts_nothing() {
        let a = ValueType::new(1, "one", Duration::from_secs(10));
        let b = ValueType::new(2, "two", Duration::from_secs(10));
        let f = chain_filters(type_filter(&a), type_filter(&b));
        assert!(!values().iter().any(|v| f(v)));
    }

    #[test]
    fn chain_of_same_type_matches_single_filter() {
        let a = ValueType::new(1, "one", Duration::from_secs(10));
        let single = type_filter(&a);
        let chained = chain_filters(type_filter(&a), type_filter(&a));
        for v in values() {
            assert_eq!(single(&v), chained(&v));
        }
    }

    #[test]
    fn chain_skips_second_when_first_rejects() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let second: Filter = Arc::new(move |_: &Value| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });
        let ty = ValueType::new(2, "two", Duration::from_secs(10));
        let f = chain_filters(type_filter(&ty), second);

        for v in values() {
            f(&v);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
