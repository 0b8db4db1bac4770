use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A property value as stored by the host pipeline.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Double(f64),
    /// String value.
    String(String),
}

/// Shared, thread-safe bag of named properties.
///
/// Clones share the same storage. Numeric getters are lenient: a missing or unparsable value
/// reads as `0`.
#[derive(Clone, Debug, Default)]
pub struct Properties {
    values: Arc<RwLock<HashMap<String, PropValue>>>,
}

impl Properties {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value for `name`.
    pub fn get(&self, name: &str) -> Option<PropValue> {
        self.values.read().get(name).cloned()
    }

    /// Whether `name` is set.
    pub fn contains(&self, name: &str) -> bool {
        self.values.read().contains_key(name)
    }

    /// Store a raw value.
    pub fn set(&self, name: impl Into<String>, value: PropValue) {
        self.values.write().insert(name.into(), value);
    }

    /// Remove `name`, returning its previous value.
    pub fn remove(&self, name: &str) -> Option<PropValue> {
        self.values.write().remove(name)
    }

    /// Store an integer.
    pub fn set_int(&self, name: impl Into<String>, value: i64) {
        self.set(name, PropValue::Int(value));
    }

    /// Store a double.
    pub fn set_double(&self, name: impl Into<String>, value: f64) {
        self.set(name, PropValue::Double(value));
    }

    /// Store a string.
    pub fn set_string(&self, name: impl Into<String>, value: impl Into<String>) {
        self.set(name, PropValue::String(value.into()));
    }

    /// Integer value for `name`; doubles truncate, strings are parsed.
    pub fn get_int(&self, name: &str) -> i64 {
        match self.get(name) {
            Some(PropValue::Int(v)) => v,
            Some(PropValue::Double(v)) => v as i64,
            Some(PropValue::String(s)) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|v| v as i64))
                    .unwrap_or(0)
            }
            None => 0,
        }
    }

    /// Double value for `name`; strings are parsed.
    pub fn get_double(&self, name: &str) -> f64 {
        match self.get(name) {
            Some(PropValue::Int(v)) => v as f64,
            Some(PropValue::Double(v)) => v,
            Some(PropValue::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
            None => 0.0,
        }
    }

    /// String value for `name`; numbers are formatted.
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.get(name).map(|v| match v {
            PropValue::Int(v) => v.to_string(),
            PropValue::Double(v) => v.to_string(),
            PropValue::String(s) => s,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/properties.rs"]
mod tests;
