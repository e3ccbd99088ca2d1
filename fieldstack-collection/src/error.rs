//! Error types for the collection layer.

use thiserror::Error;

/// Result type for collection operations.
pub type CollectionResult<T> = Result<T, CollectionError>;

/// Configuration errors raised when a collection is misused.
///
/// Query operations never fail on empty results — empty collections and
/// empty mappings are ordinary outcomes.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// Item construction failed in the model layer.
    #[error(transparent)]
    Model(#[from] fieldstack_model::ModelError),

    /// An entity of a different type was handed to a typed collection.
    #[error("collection of {expected} cannot hold an entity of type {actual}")]
    WrongItemType { expected: String, actual: String },
}
