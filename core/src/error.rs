//! Error types for store access and for the todo service.
//!
//! # Design
//! `StoreError::NotFound` gets a dedicated variant because the service uses
//! it as the cache-miss signal; every other store failure is opaque to the
//! service and is surfaced as-is. `TodoError` is what the service hands back
//! to the API layer: a client mistake, a record missing from both stores, or
//! a store failure tagged with the store it came from.

use std::fmt;

use thiserror::Error;

/// Failures reported by a store (backend or cache).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store returned 404 for the requested record.
    #[error("resource not found")]
    NotFound,

    /// The store returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The request never produced a response (connect, timeout, I/O).
    #[error("transport failed: {0}")]
    Transport(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

/// Which of the two stores an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreRole {
    Backend,
    Cache,
}

impl fmt::Display for StoreRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreRole::Backend => write!(f, "backend"),
            StoreRole::Cache => write!(f, "cache"),
        }
    }
}

/// Errors returned by `TodoService` operations.
#[derive(Debug, Error)]
pub enum TodoError {
    /// Missing required field, path/body id mismatch, or admission limit hit.
    #[error("{0}")]
    ClientError(String),

    /// The id is absent from both the cache and the backend.
    #[error("todo.id = {0}")]
    NotFound(String),

    /// A store failed with something other than a cache miss.
    #[error("{store} store error: {source}")]
    Collaborator {
        store: StoreRole,
        #[source]
        source: StoreError,
    },
}

impl TodoError {
    pub(crate) fn backend(source: StoreError) -> Self {
        TodoError::Collaborator {
            store: StoreRole::Backend,
            source,
        }
    }

    pub(crate) fn cache(source: StoreError) -> Self {
        TodoError::Collaborator {
            store: StoreRole::Cache,
            source,
        }
    }
}
