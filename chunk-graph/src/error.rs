//! Error types for the `chunk-graph` crate.

use thiserror::Error;

use crate::relationship::RelationshipKind;

/// Errors raised by construction, configuration, and ingestion.
///
/// Relationship lookups never produce a `GraphError`: an absent relationship
/// or an unresolvable target is reported through
/// [`Resolution`](crate::resolver::Resolution) instead.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Chunk size, overlap, or window parameters are malformed.
    #[error("Invalid split configuration: {0}")]
    InvalidSplitConfig(String),

    /// A node was constructed with a malformed relationship entry.
    #[error("Invalid relationship ({kind}): {message}")]
    InvalidRelationship {
        /// The offending relationship kind.
        kind: RelationshipKind,
        /// A description of the failure.
        message: String,
    },

    /// A record lacks a field named by the record schema.
    #[error("Record {index} is missing field '{field}'")]
    MissingField {
        /// Position of the record in the input.
        index: usize,
        /// The missing field name.
        field: String,
    },

    /// A record field holds a value of the wrong shape.
    #[error("Record {index} has invalid field '{field}': {message}")]
    InvalidField {
        /// Position of the record in the input.
        index: usize,
        /// The offending field name.
        field: String,
        /// A description of the failure.
        message: String,
    },

    /// The same id appears twice in a collection.
    #[error("Duplicate id in collection: {0}")]
    DuplicateId(String),

    /// JSON (de)serialization failed.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Reading input failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A convenience result type for chunk graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
