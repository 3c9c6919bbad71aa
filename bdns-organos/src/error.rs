//! Error types for bdns-organos
//!
//! "No match" is not an error: the resolver returns `Ok(None)`. Id
//! conflicts are recovered by the upserter and reported as an outcome.
//! What remains here either aborts the batch or comes from the listing
//! service or the database.

use thiserror::Error;

/// Engine error type
#[derive(Debug, Error)]
pub enum OrganoError {
    /// Inserting the node would break the hierarchy (dangling parent,
    /// second root). Indicates an ordering bug in the caller.
    #[error("Invariant violation for node {id}: {reason}")]
    InvariantViolation { id: String, reason: String },

    /// Node rejected at construction time
    #[error("Invalid node: {0}")]
    InvalidNode(String),

    /// Every suffix up to the configured bound is taken by a different node
    #[error("No free id for {base} after {attempts} attempts")]
    SuffixExhausted { base: String, attempts: u32 },

    /// Parent chain does not terminate
    #[error("Hierarchy cycle detected at node {0}")]
    Cycle(String),

    /// Listing service request failed
    #[error("Listing fetch error: {0}")]
    Fetch(String),

    /// Listing payload could not be decoded
    #[error("Listing parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl OrganoError {
    /// True for errors that must escalate out of a batch import
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, OrganoError::InvariantViolation { .. })
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, OrganoError>;
