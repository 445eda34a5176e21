//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Store requests and responses are plain data. `StoreClient` builds
//! `HttpRequest` values and parses `HttpResponse` values; executing them is
//! the job of a `Transport` supplied by the host, so nothing in this crate
//! opens a socket.

/// HTTP method for a store request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

/// An HTTP request described as plain data.
///
/// Built by `StoreClient::build_*` methods.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport` after executing an `HttpRequest`, then handed to
/// `StoreClient::parse_*` methods.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}
