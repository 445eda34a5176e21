//! Domain DTOs for the todos API.
//!
//! # Design
//! `Todo` is the record exchanged with clients and with both stores. By the
//! time a `Todo` reaches a store every defaultable field is resolved; only
//! `title` may be absent, which tells the store to keep what it already has.
//! `TodoInput` is the loosely-typed inbound body: every field is optional and
//! the service decides what a missing field means for each operation.

use serde::{Deserialize, Serialize};

/// Category assigned when the caller leaves it out.
pub const DEFAULT_CATEGORY: &str = "Default group";

/// `chrono` format string for `deadline` (`yyyy/MM/dd`).
pub const DEADLINE_FORMAT: &str = "%Y/%m/%d";

/// A single todo record as stored by the backend and mirrored by the cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub deadline: String,
}

/// Inbound body for create, replace and patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

impl TodoInput {
    /// Input carrying only a title, the minimum a create needs.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// Treat `Some("")` the same as `None`.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
