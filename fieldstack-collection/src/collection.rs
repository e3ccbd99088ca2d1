//! Ordered, type-homogeneous entity collections.

use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use fieldstack_model::{Entity, Schema};

use crate::error::{CollectionError, CollectionResult};

/// An ordered container of entities of one declared item type.
///
/// Chainable operations (`filter`, `sort_by`, `concat`) return new
/// collections and leave the receiver untouched; `key_by` and `result`
/// are terminal.
#[derive(Debug, Clone)]
pub struct Collection {
    schema: Arc<Schema>,
    items: Vec<Entity>,
}

impl Collection {
    /// Builds a collection from raw JSON objects, constructing an
    /// entity of the item type for each.
    pub fn new(schema: &Arc<Schema>, items: Vec<Value>) -> CollectionResult<Self> {
        let mut entities = Vec::with_capacity(items.len());
        for item in items {
            entities.push(schema.construct(item)?);
        }
        Ok(Self {
            schema: Arc::clone(schema),
            items: entities,
        })
    }

    /// Wraps existing entities.
    ///
    /// Every entity must already be of the item type; a mismatch is a
    /// configuration error, raised immediately.
    pub fn from_entities(schema: &Arc<Schema>, items: Vec<Entity>) -> CollectionResult<Self> {
        for item in &items {
            check_item_type(schema, item)?;
        }
        Ok(Self {
            schema: Arc::clone(schema),
            items,
        })
    }

    /// The declared item schema.
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The current items, in order.
    #[must_use]
    pub fn items(&self) -> &[Entity] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.items.iter()
    }

    /// Appends one entity of the item type.
    pub fn push(&mut self, item: Entity) -> CollectionResult<()> {
        check_item_type(&self.schema, &item)?;
        self.items.push(item);
        Ok(())
    }

    /// Keeps items whose fields equal every value named by the
    /// predicate.
    ///
    /// The predicate maps field name to expected value; comparison uses
    /// the item's `fetch` rendering, so unset fields compare as `Null`.
    /// No match yields an empty collection, not an error.
    #[must_use]
    pub fn filter(&self, predicate: &Map<String, Value>) -> Self {
        let items: Vec<Entity> = self
            .items
            .iter()
            .filter(|item| {
                let data = item.fetch();
                predicate
                    .iter()
                    .all(|(field, expected)| data.get(field).unwrap_or(&Value::Null) == expected)
            })
            .cloned()
            .collect();
        debug!(
            item_type = self.schema.label(),
            kept = items.len(),
            total = self.items.len(),
            "filtered collection"
        );
        Self {
            schema: Arc::clone(&self.schema),
            items,
        }
    }

    /// Stable ascending sort by one field's current value.
    ///
    /// Numbers order numerically and strings lexicographically; across
    /// kinds a fixed rank applies and unset values sort last. Ties keep
    /// their original relative order.
    #[must_use]
    pub fn sort_by(&self, field: &str) -> Self {
        let mut items = self.items.clone();
        items.sort_by(|a, b| value_order(a.get(field), b.get(field)));
        Self {
            schema: Arc::clone(&self.schema),
            items,
        }
    }

    /// Indexes items by one field's value, rendered as a string.
    ///
    /// Terminal. Later items overwrite earlier ones on duplicate keys.
    #[must_use]
    pub fn key_by(&self, field: &str) -> BTreeMap<String, Entity> {
        let mut out = BTreeMap::new();
        for item in &self.items {
            out.insert(key_text(item.get(field)), item.clone());
        }
        out
    }

    /// A new collection with `other` converted to entities of the item
    /// type and appended after the existing items. The receiver is
    /// unchanged.
    pub fn concat(&self, other: Vec<Value>) -> CollectionResult<Self> {
        let mut items = self.items.clone();
        items.reserve(other.len());
        for item in other {
            items.push(self.schema.construct(item)?);
        }
        Ok(Self {
            schema: Arc::clone(&self.schema),
            items,
        })
    }

    /// Materializes the current sequence. Terminal.
    #[must_use]
    pub fn result(self) -> Vec<Entity> {
        self.items
    }

    /// Whether every item is valid, transitively.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.items.iter().all(Entity::valid)
    }

    /// Aggregated item errors, keyed by item index; valid items are
    /// omitted. The same shape entities use for nested fields.
    #[must_use]
    pub fn errors(&self) -> Value {
        let mut out = Map::new();
        for (index, item) in self.items.iter().enumerate() {
            let errors = item.errors();
            if errors.as_object().is_some_and(|map| !map.is_empty()) {
                out.insert(index.to_string(), errors);
            }
        }
        Value::Object(out)
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn check_item_type(schema: &Arc<Schema>, item: &Entity) -> CollectionResult<()> {
    if item.schema().name() != schema.name() {
        return Err(CollectionError::WrongItemType {
            expected: schema.label().to_string(),
            actual: item.schema().label().to_string(),
        });
    }
    Ok(())
}

/// Total order over JSON values for sorting.
///
/// Unset values sort after everything else; otherwise bools, then
/// numbers, then strings, then arrays and objects. Arrays and objects
/// compare equal among themselves, so the stable sort keeps their
/// original order.
fn value_order(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) => 3,
        Value::Object(_) => 4,
        Value::Null => 5,
    }
}

/// String key for `key_by`: string values verbatim, everything else via
/// its JSON rendering.
fn key_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
