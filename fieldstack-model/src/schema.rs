//! Static schema declarations.
//!
//! A [`Schema`] declares the fields of one entity kind: for each field
//! a validator, an optional default value, and optionally the schema of
//! nested child entities. Schemas are built once through
//! [`SchemaBuilder`] and shared as `Arc<Schema>`; entity and collection
//! constructors take the schema explicitly, there is no static registry
//! to look types up in.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::entity::Entity;
use crate::error::{ModelError, ModelResult};
use crate::validator::{Outcome, Snapshot};

/// Validation function for a single field.
///
/// Receives the full data snapshot, the field name, and the entity-type
/// label (for contextual messages).
pub type Validator = Arc<dyn Fn(&Snapshot<'_>, &str, &str) -> Outcome + Send + Sync>;

/// Per-field configuration: validator, optional default, optional
/// nested entity type.
#[derive(Clone)]
pub struct FieldSpec {
    validator: Validator,
    default_value: Option<Value>,
    children: Option<Arc<Schema>>,
}

impl FieldSpec {
    /// A field validated by the given function.
    #[must_use]
    pub fn new(
        validator: impl Fn(&Snapshot<'_>, &str, &str) -> Outcome + Send + Sync + 'static,
    ) -> Self {
        Self {
            validator: Arc::new(validator),
            default_value: None,
            children: None,
        }
    }

    /// A field that accepts any value.
    #[must_use]
    pub fn accept_any() -> Self {
        Self::new(|_, _, _| Ok(()))
    }

    /// Sets the value used when construction input does not supply one.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Declares the field as holding child entities of the given type.
    #[must_use]
    pub fn with_children(mut self, schema: Arc<Schema>) -> Self {
        self.children = Some(schema);
        self
    }

    /// Schema of the nested entity type, when declared.
    #[must_use]
    pub fn children_schema(&self) -> Option<&Arc<Schema>> {
        self.children.as_ref()
    }

    pub(crate) fn validator(&self) -> &Validator {
        &self.validator
    }

    pub(crate) fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("default_value", &self.default_value)
            .field("children", &self.children.as_ref().map(|s| s.name()))
            .finish_non_exhaustive()
    }
}

/// Static field declarations for one entity kind.
#[derive(Debug)]
pub struct Schema {
    name: String,
    label: String,
    fields: BTreeMap<String, FieldSpec>,
}

impl Schema {
    /// Starts declaring a schema for the entity type with the given
    /// name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: BTreeMap::new(),
            duplicate: None,
        }
    }

    /// The declared type name (e.g. `Product`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The entity-type label passed to validators (e.g.
    /// `ProductEntity`).
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Field declarations, ordered by field name.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Looks up one field's declaration.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Whether the schema declares the given field.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Constructs an entity of this type from a raw JSON object.
    ///
    /// This is the uniform construction capability that nested fields
    /// and collections invoke, regardless of the concrete type.
    pub fn construct(self: &Arc<Self>, raw: Value) -> ModelResult<Entity> {
        Entity::from_value(self, raw)
    }
}

/// Builder for [`Schema`].
pub struct SchemaBuilder {
    name: String,
    fields: BTreeMap<String, FieldSpec>,
    duplicate: Option<String>,
}

impl SchemaBuilder {
    /// Declares a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        let name = name.into();
        if self.fields.insert(name.clone(), spec).is_some() {
            self.duplicate.get_or_insert(name);
        }
        self
    }

    /// Shorthand for a field declared as a bare validator function.
    #[must_use]
    pub fn field_fn(
        self,
        name: impl Into<String>,
        validator: impl Fn(&Snapshot<'_>, &str, &str) -> Outcome + Send + Sync + 'static,
    ) -> Self {
        self.field(name, FieldSpec::new(validator))
    }

    /// Finalizes the schema.
    ///
    /// Fails on an empty type name or a field declared twice; both are
    /// configuration mistakes, not data problems.
    pub fn build(self) -> ModelResult<Arc<Schema>> {
        if self.name.is_empty() {
            return Err(ModelError::InvalidSchema {
                name: self.name,
                reason: "type name must not be empty".into(),
            });
        }
        if let Some(field) = self.duplicate {
            return Err(ModelError::InvalidSchema {
                name: self.name,
                reason: format!("field '{field}' declared twice"),
            });
        }
        let label = format!("{}Entity", self.name);
        Ok(Arc::new(Schema {
            name: self.name,
            label,
            fields: self.fields,
        }))
    }
}
