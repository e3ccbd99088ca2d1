//! Validation outcomes and the data view handed to validators.
//!
//! A validator is a plain closure over the entity's current data: it
//! receives a [`Snapshot`] of every field, the name of the field under
//! validation, and the entity-type label, and reports a single
//! [`Outcome`]. `Ok(())` accepts the value; an error carries the
//! message surfaced through `Entity::errors`.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::entity::{Entity, Slot};

/// A rejected field value.
///
/// Carries only the message; whether it came from a plain string or a
/// structured error does not matter to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    message: String,
}

impl FieldError {
    /// Rejects with a plain message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Rejects with a structured error; its display text becomes the
    /// message.
    #[must_use]
    pub fn from_error(err: impl fmt::Display) -> Self {
        Self {
            message: err.to_string(),
        }
    }

    /// The message shown to callers.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.message
    }
}

impl From<String> for FieldError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for FieldError {
    fn from(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// What a validator reports for a single field invocation.
pub type Outcome = Result<(), FieldError>;

static NULL: Value = Value::Null;

/// Read-only view of an entity's current data, as seen by validators.
///
/// The snapshot always includes the value under validation, so
/// cross-field validators observe consistent state.
pub struct Snapshot<'a> {
    slots: &'a BTreeMap<String, Slot>,
}

impl<'a> Snapshot<'a> {
    pub(crate) fn new(slots: &'a BTreeMap<String, Slot>) -> Self {
        Self { slots }
    }

    /// Current scalar value of a field.
    ///
    /// Unset fields, fields holding child entities, and undeclared
    /// fields all read as `Null`.
    #[must_use]
    pub fn get(&self, field: &str) -> &'a Value {
        match self.slots.get(field) {
            Some(Slot::Scalar(value)) => value,
            _ => &NULL,
        }
    }

    /// Child entities of a nested field.
    #[must_use]
    pub fn children(&self, field: &str) -> Option<&'a [Entity]> {
        match self.slots.get(field) {
            Some(Slot::Children(children)) => Some(children),
            _ => None,
        }
    }

    /// Whether the field currently holds a non-null scalar value.
    #[must_use]
    pub fn is_set(&self, field: &str) -> bool {
        !self.get(field).is_null()
    }
}
