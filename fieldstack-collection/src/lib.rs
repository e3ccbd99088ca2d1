//! Typed entity collections for FieldStack.
//!
//! A [`Collection`] wraps an ordered sequence of entities of one
//! declared item type and layers query-style operations on top:
//! `filter`, `sort_by` and `concat` chain by returning new collections;
//! `key_by` and `result` materialize. Construction reuses the entity
//! construction path, so raw objects are validated the same way
//! everywhere.

mod collection;
mod error;

pub use collection::Collection;
pub use error::{CollectionError, CollectionResult};
