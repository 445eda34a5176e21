//! HTTP front end for the cache-aside todos service.
//!
//! Routes requests onto `todo_core::TodoService`, whose backend and cache
//! stores are reached over HTTP through `ReqwestTransport`.

pub mod config;
pub mod transport;
pub mod web;
