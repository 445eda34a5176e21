//! Cache-aside core for the todos API.
//!
//! # Overview
//! `TodoService` fronts a durable backend store with a lookaside cache store
//! and keeps the two consistent from the caller's point of view. Both stores
//! are reached through the `TodoStore` trait; `HttpStore` implements it over
//! HTTP by building requests and parsing responses (`StoreClient`) and leaving
//! the round-trip to a host-supplied `Transport`.
//!
//! # Design
//! - No I/O happens in this crate; the host wires in a `Transport`.
//! - `StoreClient` is stateless: it holds only `base_url`.
//! - The service receives both stores explicitly and keeps no state between
//!   calls.
//! - DTOs are defined independently from the mock-store crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod service;
pub mod store;
pub mod types;

pub use client::StoreClient;
pub use error::{StoreError, StoreRole, TodoError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use service::{TodoService, DEFAULT_LIMIT};
pub use store::{HttpStore, TodoStore, Transport};
pub use types::{Todo, TodoInput, DEFAULT_CATEGORY};
