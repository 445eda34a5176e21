//! Stateless HTTP request builder and response parser for a record store.
//!
//! # Design
//! `StoreClient` holds only a `base_url` and carries no mutable state between
//! calls. Backend and cache speak the same protocol, so one client type
//! serves both; they differ only in where `base_url` points. Each operation is
//! split into a `build_*` method that produces an `HttpRequest` and a
//! `parse_*` method that consumes an `HttpResponse`.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::error::StoreError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::Todo;

/// Bytes escaped when an id becomes a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Synchronous, stateless client for one record store.
#[derive(Debug, Clone)]
pub struct StoreClient {
    base_url: String,
}

impl StoreClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list_all(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.base_url.clone(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_by_id(&self, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.record_path(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_upsert(&self, record: &Todo) -> Result<HttpRequest, StoreError> {
        let body =
            serde_json::to_string(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.base_url.clone(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_delete_by_id(&self, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.record_path(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_delete_all(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.base_url.clone(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// `{base_url}/{id}` with `id` escaped so it cannot spill into the query
    /// or fragment, or split into further segments.
    fn record_path(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, utf8_percent_encode(id, PATH_SEGMENT))
    }

    pub fn parse_list_all(&self, response: HttpResponse) -> Result<Vec<Todo>, StoreError> {
        check_status(&response)?;
        serde_json::from_str(&response.body)
            .map_err(|e| StoreError::Deserialization(e.to_string()))
    }

    pub fn parse_get_by_id(&self, response: HttpResponse) -> Result<Todo, StoreError> {
        check_status(&response)?;
        serde_json::from_str(&response.body)
            .map_err(|e| StoreError::Deserialization(e.to_string()))
    }

    pub fn parse_upsert(&self, response: HttpResponse) -> Result<Todo, StoreError> {
        check_status(&response)?;
        serde_json::from_str(&response.body)
            .map_err(|e| StoreError::Deserialization(e.to_string()))
    }

    /// A 404 means the record is already gone, which is what the caller wanted.
    pub fn parse_delete_by_id(&self, response: HttpResponse) -> Result<(), StoreError> {
        match check_status(&response) {
            Ok(()) | Err(StoreError::NotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn parse_delete_all(&self, response: HttpResponse) -> Result<(), StoreError> {
        check_status(&response)
    }
}

/// Map non-2xx status codes to the appropriate `StoreError` variant.
fn check_status(response: &HttpResponse) -> Result<(), StoreError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    if response.status == 404 {
        return Err(StoreError::NotFound);
    }
    Err(StoreError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}
