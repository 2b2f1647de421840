//! Trainable prompt parameter

use serde_json::Value;
use std::sync::{PoisonError, RwLock};

/// A named, mutable value slot backing one trainable prompt variable.
///
/// The generator owning a parameter only ever reads it at call time; writes
/// come from an external training procedure holding a clone of the
/// `Arc<Parameter>`. The slot is therefore a plain `RwLock` with no contention
/// on the hot path.
#[derive(Debug, Default)]
pub struct Parameter {
    data: RwLock<Option<Value>>,
}

impl Parameter {
    /// Create a parameter holding an initial value (usually a preset prompt
    /// value) or nothing.
    #[must_use]
    pub fn new(initial: Option<Value>) -> Self {
        Self {
            data: RwLock::new(initial),
        }
    }

    /// Current value, cloned out of the slot.
    #[must_use]
    pub fn data(&self) -> Option<Value> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the slot currently holds a value.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Replace the held value. Called by training procedures between calls.
    pub fn set_data(&self, value: Value) {
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    /// Clear the held value back to the unset marker.
    pub fn clear(&self) {
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_starts_with_initial_value() {
        let param = Parameter::new(Some(json!("preset")));
        assert!(param.is_set());
        assert_eq!(param.data(), Some(json!("preset")));
    }

    #[test]
    fn test_starts_unset_without_initial_value() {
        let param = Parameter::new(None);
        assert!(!param.is_set());
        assert_eq!(param.data(), None);
    }

    #[test]
    fn test_set_and_clear() {
        let param = Parameter::new(None);
        param.set_data(json!("trained-value"));
        assert_eq!(param.data(), Some(json!("trained-value")));
        param.clear();
        assert!(!param.is_set());
    }

    #[test]
    fn test_shared_handle_observes_external_writes() {
        let param = Arc::new(Parameter::new(None));
        let optimizer_handle = Arc::clone(&param);
        optimizer_handle.set_data(json!("v2"));
        assert_eq!(param.data(), Some(json!("v2")));
    }
}
