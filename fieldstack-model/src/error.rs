//! Error types for the model layer.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Configuration errors, raised immediately at the point of misuse.
///
/// Rejected field values never appear here — they are recorded on the
/// entity and read back through `Entity::errors`.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Entity input was not a JSON object.
    #[error("{label} expects a JSON object as input, got {actual}")]
    NotAnObject { label: String, actual: &'static str },

    /// A nested field received a value that is not an array.
    #[error("field '{field}' on {label} holds child entities and expects an array, got {actual}")]
    ChildrenNotAnArray {
        field: String,
        label: String,
        actual: &'static str,
    },

    /// An element of a nested field's array was not a JSON object.
    #[error("field '{field}' on {label} expects objects as children, got {actual} at index {index}")]
    ChildNotAnObject {
        field: String,
        label: String,
        actual: &'static str,
        index: usize,
    },

    /// `set` was called with a field the schema does not declare.
    #[error("{label} does not declare a field named '{field}'")]
    UndeclaredField { field: String, label: String },

    /// Schema declaration is malformed.
    #[error("invalid schema '{name}': {reason}")]
    InvalidSchema { name: String, reason: String },
}
