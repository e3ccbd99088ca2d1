use fieldstack_model::{FieldError, FieldSpec, ModelError, Schema};
use serde_json::json;
use std::sync::Arc;

// ── Builder ──────────────────────────────────────────────────────

#[test]
fn builds_schema_with_name_and_label() {
    let schema = Schema::builder("Product")
        .field("name", FieldSpec::accept_any())
        .build()
        .unwrap();

    assert_eq!(schema.name(), "Product");
    assert_eq!(schema.label(), "ProductEntity");
}

#[test]
fn empty_type_name_is_rejected() {
    let result = Schema::builder("").field("name", FieldSpec::accept_any()).build();
    assert!(matches!(result, Err(ModelError::InvalidSchema { .. })));
}

#[test]
fn duplicate_field_is_rejected() {
    let result = Schema::builder("Product")
        .field("name", FieldSpec::accept_any())
        .field("name", FieldSpec::accept_any())
        .build();

    let err = result.unwrap_err();
    assert!(matches!(err, ModelError::InvalidSchema { .. }));
    assert!(err.to_string().contains("name"));
}

#[test]
fn declares_and_field_lookup() {
    let schema = Schema::builder("Product")
        .field("name", FieldSpec::accept_any())
        .build()
        .unwrap();

    assert!(schema.declares("name"));
    assert!(!schema.declares("price"));
    assert!(schema.field("name").is_some());
    assert!(schema.field("price").is_none());
}

#[test]
fn fields_iterates_declarations() {
    let schema = Schema::builder("Product")
        .field("name", FieldSpec::accept_any())
        .field("price", FieldSpec::accept_any())
        .build()
        .unwrap();

    let names: Vec<&str> = schema.fields().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["name", "price"]);
}

// ── FieldSpec ────────────────────────────────────────────────────

#[test]
fn field_fn_is_shorthand_for_field_spec() {
    let via_fn = Schema::builder("A")
        .field_fn("x", |_, field, _| Err(FieldError::message(format!("{field} bad"))))
        .build()
        .unwrap();
    let via_spec = Schema::builder("A")
        .field(
            "x",
            FieldSpec::new(|_, field, _| Err(FieldError::message(format!("{field} bad")))),
        )
        .build()
        .unwrap();

    let from_fn = via_fn.construct(json!({"x": 1})).unwrap();
    let from_spec = via_spec.construct(json!({"x": 1})).unwrap();
    assert_eq!(from_fn.errors(), from_spec.errors());
}

#[test]
fn children_schema_exposed_on_spec() {
    let child = Schema::builder("Child")
        .field("foo", FieldSpec::accept_any())
        .build()
        .unwrap();
    let spec = FieldSpec::accept_any().with_children(Arc::clone(&child));

    assert_eq!(spec.children_schema().unwrap().name(), "Child");
    assert!(FieldSpec::accept_any().children_schema().is_none());
}

// ── Construction capability ──────────────────────────────────────

#[test]
fn construct_builds_entity_of_this_type() {
    let schema = Schema::builder("Product")
        .field("name", FieldSpec::accept_any())
        .build()
        .unwrap();

    let entity = schema.construct(json!({"name": "A"})).unwrap();
    assert_eq!(entity.schema().name(), "Product");
    assert_eq!(entity.get("name"), &json!("A"));
}

#[test]
fn construct_rejects_non_object_input() {
    let schema = Schema::builder("Product")
        .field("name", FieldSpec::accept_any())
        .build()
        .unwrap();

    let err = schema.construct(json!([1, 2])).unwrap_err();
    assert!(matches!(err, ModelError::NotAnObject { .. }));
    assert!(err.to_string().contains("ProductEntity"));
}
