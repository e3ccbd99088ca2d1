//! Schema-driven entity model for FieldStack.
//!
//! Defines the core data-shaping layer the UI consumes:
//! - [`Schema`] / [`FieldSpec`] — static per-type field declarations:
//!   a validator, an optional default value, and optionally the schema
//!   of nested child entities
//! - [`Entity`] — a validated wrapper around a plain JSON record:
//!   defaults merge in at construction, nested arrays become child
//!   entities, and every assignment re-validates the touched field
//! - [`Snapshot`] / [`Outcome`] / [`FieldError`] — what validators see
//!   and what they report
//!
//! Rejected field values are entity *state*, read back through
//! [`Entity::errors`] and [`Entity::valid`]. `Err` is reserved for
//! configuration mistakes ([`ModelError`]), so a consuming UI never has
//! to handle a failure path for ordinary invalid input.

mod entity;
mod error;
mod schema;
mod validator;

pub use entity::Entity;
pub use error::{ModelError, ModelResult};
pub use schema::{FieldSpec, Schema, SchemaBuilder, Validator};
pub use validator::{FieldError, Outcome, Snapshot};
