//! The store contract the service is written against, and its HTTP adapter.
//!
//! `TodoStore` is the five-operation keyed-collection contract shared by the
//! backend and the cache. `HttpStore` implements it by pairing a
//! `StoreClient` (pure request/response mapping) with a host-supplied
//! `Transport` that performs the round-trip.

use async_trait::async_trait;

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::Todo;

/// A keyed collection of todo records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Every record in the store; empty when there are none.
    async fn list_all(&self) -> Result<Vec<Todo>, StoreError>;

    /// The record with `id`, or `StoreError::NotFound`.
    async fn get_by_id(&self, id: &str) -> Result<Todo, StoreError>;

    /// Create or overwrite by `record.id`; returns the stored value.
    async fn upsert(&self, record: &Todo) -> Result<Todo, StoreError>;

    /// Remove one record. Removing an absent record succeeds.
    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError>;

    async fn delete_all(&self) -> Result<(), StoreError>;
}

/// Executes a plain-data request. Timeouts are the transport's business.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, StoreError>;
}

/// `TodoStore` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStore<T> {
    client: StoreClient,
    transport: T,
}

impl<T: Transport> HttpStore<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            client: StoreClient::new(base_url),
            transport,
        }
    }
}

#[async_trait]
impl<T: Transport> TodoStore for HttpStore<T> {
    async fn list_all(&self) -> Result<Vec<Todo>, StoreError> {
        let response = self.transport.execute(self.client.build_list_all()).await?;
        self.client.parse_list_all(response)
    }

    async fn get_by_id(&self, id: &str) -> Result<Todo, StoreError> {
        let response = self
            .transport
            .execute(self.client.build_get_by_id(id))
            .await?;
        self.client.parse_get_by_id(response)
    }

    async fn upsert(&self, record: &Todo) -> Result<Todo, StoreError> {
        let request = self.client.build_upsert(record)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_upsert(response)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let response = self
            .transport
            .execute(self.client.build_delete_by_id(id))
            .await?;
        self.client.parse_delete_by_id(response)
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let response = self.transport.execute(self.client.build_delete_all()).await?;
        self.client.parse_delete_all(response)
    }
}
