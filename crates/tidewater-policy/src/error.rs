//! Policy engine error types.

/// Errors produced while parsing or manipulating bucket policies.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// The policy document was not valid JSON or did not match the schema.
    #[error("malformed policy document: {0}")]
    Json(#[from] serde_json::Error),

    /// A condition key was inserted strictly but already exists.
    #[error("condition key already exists: {0}")]
    DuplicateConditionKey(String),
}
