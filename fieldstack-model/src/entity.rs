//! The entity engine: construction, mutation, and error aggregation.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::error::{ModelError, ModelResult};
use crate::schema::Schema;
use crate::validator::Snapshot;

/// Per-field storage: a scalar JSON value, or the child entities of a
/// nested field.
#[derive(Debug, Clone)]
pub(crate) enum Slot {
    Scalar(Value),
    Children(Vec<Entity>),
}

/// A validated, schema-backed wrapper around a plain data record.
///
/// Construction merges input with schema defaults, drops undeclared
/// fields, builds child entities for nested fields, and validates every
/// field. Afterwards [`Entity::set`] is the only scalar mutation path:
/// each assignment re-runs that field's validator against the updated
/// snapshot before returning.
#[derive(Debug, Clone)]
pub struct Entity {
    schema: Arc<Schema>,
    slots: BTreeMap<String, Slot>,
    errors: BTreeMap<String, Vec<String>>,
}

impl Entity {
    /// Constructs an entity from defaults alone.
    pub fn new(schema: &Arc<Schema>) -> ModelResult<Self> {
        Self::from_value(schema, Value::Object(Map::new()))
    }

    /// Constructs an entity from a raw JSON object.
    ///
    /// Declared fields take their supplied value, falling back to the
    /// schema default; undeclared input fields are discarded; nested
    /// fields build their children recursively. Every field is
    /// validated before the entity is returned.
    pub fn from_value(schema: &Arc<Schema>, raw: Value) -> ModelResult<Self> {
        let mut raw = match raw {
            Value::Object(map) => map,
            other => {
                return Err(ModelError::NotAnObject {
                    label: schema.label().to_string(),
                    actual: value_kind(&other),
                });
            }
        };

        let mut slots = BTreeMap::new();
        for (field, spec) in schema.fields() {
            let resolved = match raw.remove(field) {
                Some(value) => value,
                None => spec.default_value().cloned().unwrap_or(Value::Null),
            };
            let slot = match spec.children_schema() {
                Some(child_schema) => {
                    Slot::Children(build_children(schema, field, child_schema, resolved)?)
                }
                None => Slot::Scalar(resolved),
            };
            slots.insert(field.to_string(), slot);
        }
        for field in raw.keys() {
            debug!(
                entity = schema.label(),
                field = field.as_str(),
                "discarding undeclared field"
            );
        }

        let mut entity = Self {
            schema: Arc::clone(schema),
            slots,
            errors: BTreeMap::new(),
        };
        entity.validate_all();
        Ok(entity)
    }

    /// The schema this entity was built with.
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Current scalar value of a field.
    ///
    /// Unset fields and fields holding child entities read as `Null`;
    /// use [`Entity::children`] for the latter.
    #[must_use]
    pub fn get(&self, field: &str) -> &Value {
        Snapshot::new(&self.slots).get(field)
    }

    /// Child entities of a nested field.
    #[must_use]
    pub fn children(&self, field: &str) -> Option<&[Entity]> {
        match self.slots.get(field) {
            Some(Slot::Children(children)) => Some(children),
            _ => None,
        }
    }

    /// Mutable access to a nested field's children.
    ///
    /// Child mutations show up immediately through [`Entity::valid`]
    /// and [`Entity::errors`], which always walk the live children.
    pub fn children_mut(&mut self, field: &str) -> Option<&mut Vec<Entity>> {
        match self.slots.get_mut(field) {
            Some(Slot::Children(children)) => Some(children),
            _ => None,
        }
    }

    /// Assigns a field and re-validates it before returning.
    ///
    /// Only the assigned field is re-validated, against the snapshot
    /// that already contains the new value; other fields keep their
    /// recorded errors. Assigning an array to a nested field rebuilds
    /// its children. Assigning an undeclared field is a configuration
    /// error.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> ModelResult<()> {
        let value = value.into();
        let Some(spec) = self.schema.field(field) else {
            return Err(ModelError::UndeclaredField {
                field: field.to_string(),
                label: self.schema.label().to_string(),
            });
        };
        let slot = match spec.children_schema() {
            Some(child_schema) => {
                Slot::Children(build_children(&self.schema, field, child_schema, value)?)
            }
            None => Slot::Scalar(value),
        };
        self.slots.insert(field.to_string(), slot);
        self.validate_field(field);
        trace!(entity = self.schema.label(), field, "field assigned");
        Ok(())
    }

    /// Plain JSON rendering of all declared fields.
    ///
    /// Unset fields appear as `Null`; child entities materialize
    /// through their own `fetch`. Undeclared input never shows up here.
    #[must_use]
    pub fn fetch(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for (field, slot) in &self.slots {
            let value = match slot {
                Slot::Scalar(value) => value.clone(),
                Slot::Children(children) => Value::Array(
                    children
                        .iter()
                        .map(|child| Value::Object(child.fetch()))
                        .collect(),
                ),
            };
            out.insert(field.clone(), value);
        }
        out
    }

    /// Messages recorded for one field, if it is currently in error.
    #[must_use]
    pub fn field_errors(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    /// Aggregated validation errors, restricted to fields currently in
    /// error.
    ///
    /// Scalar fields report `{"errors": [message, ...]}`. Nested fields
    /// report a mapping from child index to that child's own errors
    /// (valid children are omitted), alongside an `"errors"` entry when
    /// the field's own validator rejected. Recursion continues to
    /// arbitrary depth; an entity with no own or descendant errors
    /// reports an empty object.
    #[must_use]
    pub fn errors(&self) -> Value {
        let mut out = Map::new();
        for (field, slot) in &self.slots {
            match slot {
                Slot::Scalar(_) => {
                    if let Some(messages) = self.errors.get(field) {
                        out.insert(field.clone(), json!({ "errors": messages }));
                    }
                }
                Slot::Children(children) => {
                    let mut entry = Map::new();
                    if let Some(messages) = self.errors.get(field) {
                        entry.insert("errors".to_string(), json!(messages));
                    }
                    for (index, child) in children.iter().enumerate() {
                        let child_errors = child.errors();
                        if !is_empty_object(&child_errors) {
                            entry.insert(index.to_string(), child_errors);
                        }
                    }
                    if !entry.is_empty() {
                        out.insert(field.clone(), Value::Object(entry));
                    }
                }
            }
        }
        Value::Object(out)
    }

    /// Whether the entity and all of its descendants are valid.
    ///
    /// Computed on read, never cached, so mutations to children are
    /// reflected immediately.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
            && self.slots.values().all(|slot| match slot {
                Slot::Scalar(_) => true,
                Slot::Children(children) => children.iter().all(Entity::valid),
            })
    }

    fn validate_all(&mut self) {
        let fields: Vec<String> = self.slots.keys().cloned().collect();
        for field in fields {
            self.validate_field(&field);
        }
        if !self.errors.is_empty() {
            debug!(
                entity = self.schema.label(),
                fields = self.errors.len(),
                "constructed with validation errors"
            );
        }
    }

    /// Runs one field's validator against the current snapshot and
    /// records the outcome.
    fn validate_field(&mut self, field: &str) {
        let Some(spec) = self.schema.field(field) else {
            return;
        };
        let outcome = {
            let snapshot = Snapshot::new(&self.slots);
            (spec.validator())(&snapshot, field, self.schema.label())
        };
        match outcome {
            Ok(()) => {
                self.errors.remove(field);
            }
            Err(err) => {
                self.errors
                    .insert(field.to_string(), vec![err.text().to_string()]);
            }
        }
    }
}

/// Builds the child entities of a nested field.
///
/// Absent and null inputs resolve to zero children. Anything other than
/// an array of objects fails construction.
fn build_children(
    parent: &Arc<Schema>,
    field: &str,
    child_schema: &Arc<Schema>,
    resolved: Value,
) -> ModelResult<Vec<Entity>> {
    let elements = match resolved {
        Value::Null => Vec::new(),
        Value::Array(elements) => elements,
        other => {
            return Err(ModelError::ChildrenNotAnArray {
                field: field.to_string(),
                label: parent.label().to_string(),
                actual: value_kind(&other),
            });
        }
    };
    let mut children = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        if !element.is_object() {
            return Err(ModelError::ChildNotAnObject {
                field: field.to_string(),
                label: parent.label().to_string(),
                actual: value_kind(&element),
                index,
            });
        }
        children.push(child_schema.construct(element)?);
    }
    Ok(children)
}

fn is_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(Map::is_empty)
}

/// JSON type name for error messages.
fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
