//! crates/eer_core/src/validation.rs
//! Field-path keyed validation errors.
//!
//! Keys are dotted paths (`country`, `movements.1.from`, ...). A key is
//! present only while its field is invalid. The set is replaced wholesale by
//! each validation pass; the only partial edit is `clear`, used when a field
//! changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{MovementField, ReportField};

/// Error key for a top-level field.
#[inline]
pub fn field_key(field: ReportField) -> String {
    field.key().to_string()
}

/// Error key for one attribute of the movement at `index`.
#[inline]
pub fn movement_key(index: usize, field: MovementField) -> String {
    format!("movements.{index}.{}", field.key())
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.insert(key.into(), message.into());
    }

    /// Drop one key; returns whether it was present.
    pub fn clear(&mut self, key: &str) -> bool {
        self.0.remove(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The movement at `removed` is gone: drop its keys and renumber the keys
    /// of every later row so they keep naming the same movement.
    pub fn movement_removed(&mut self, removed: usize) {
        for (key, message) in std::mem::take(&mut self.0) {
            let parsed = split_movement_key(&key).map(|(i, attr)| (i, attr.to_string()));
            match parsed {
                Some((i, _)) if i == removed => {}
                Some((i, attr)) if i > removed => {
                    self.0.insert(format!("movements.{}.{attr}", i - 1), message);
                }
                _ => {
                    self.0.insert(key, message);
                }
            }
        }
    }
}

/// `movements.{i}.{attr}` -> `(i, attr)`.
fn split_movement_key(key: &str) -> Option<(usize, &str)> {
    let (index, attr) = key.strip_prefix("movements.")?.split_once('.')?;
    Some((index.parse().ok()?, attr))
}
