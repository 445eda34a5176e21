//! Cache-aside todo service.
//!
//! # Design
//! The backend is the source of truth and the cache is a lookaside mirror.
//! Reads go to the cache first and fall back to the backend only when the
//! cache reports not-found (or, for listing, an empty collection). Writes go
//! to the backend first and the backend's returned value is then pushed into
//! the cache. Deletes go backend-then-cache. Calls within one operation are
//! strictly sequential; the service keeps no state between operations.
//!
//! Cache writes made on behalf of a read (repopulation) or a write
//! (write-through) are best-effort: a failure is logged and the backend's
//! value is still returned.

use chrono::{Local, NaiveDate};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::{StoreError, StoreRole, TodoError};
use crate::store::TodoStore;
use crate::types::{non_empty, Todo, TodoInput, DEADLINE_FORMAT, DEFAULT_CATEGORY};

/// Admission limit used when none is configured.
pub const DEFAULT_LIMIT: usize = 100;

/// Source of "today" for defaulting `deadline`.
pub type Clock = fn() -> NaiveDate;

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

pub struct TodoService<B, C> {
    backend: B,
    cache: C,
    limit: usize,
    clock: Clock,
}

impl<B: TodoStore, C: TodoStore> TodoService<B, C> {
    pub fn new(backend: B, cache: C, limit: usize) -> Self {
        Self {
            backend,
            cache,
            limit,
            clock: local_today,
        }
    }

    /// Replace the date source used for defaulted deadlines.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// All todos, served from the cache unless the cache is empty.
    ///
    /// On an empty cache the backend's collection is copied into the cache
    /// one record at a time before being returned.
    #[tracing::instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Todo>, TodoError> {
        debug!("Retrieving all todos");
        let cached = self
            .cache
            .list_all()
            .await
            .map_err(|e| downstream(StoreRole::Cache, e))?;
        if !cached.is_empty() {
            return Ok(cached);
        }

        debug!("Cache empty, retrieving from backend");
        let todos = self
            .backend
            .list_all()
            .await
            .map_err(|e| downstream(StoreRole::Backend, e))?;
        for todo in &todos {
            self.cache_best_effort(todo).await;
        }
        Ok(todos)
    }

    /// Look a todo up by id, cache first.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<Todo, TodoError> {
        match self.cache.get_by_id(id).await {
            Ok(todo) => {
                debug!("Found cached version");
                return Ok(todo);
            }
            Err(StoreError::NotFound) => debug!("Not in cache, retrieving from backend"),
            Err(e) => return Err(downstream(StoreRole::Cache, e)),
        }

        match self.backend.get_by_id(id).await {
            Ok(todo) => {
                debug!("Found in backend");
                self.cache_best_effort(&todo).await;
                Ok(todo)
            }
            Err(StoreError::NotFound) => Err(TodoError::NotFound(id.to_string())),
            Err(e) => Err(downstream(StoreRole::Backend, e)),
        }
    }

    /// Create a todo, filling in id, category, deadline and completion.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, input: TodoInput) -> Result<Todo, TodoError> {
        self.check_admission().await?;

        if input.title.is_none() {
            return Err(TodoError::ClientError(
                "todos.title cannot be null".to_string(),
            ));
        }

        let id = match non_empty(input.id.as_deref()) {
            Some(id) => id.to_string(),
            None => Uuid::new_v4().to_string(),
        };
        let record = Todo {
            id,
            title: non_empty(input.title.as_deref()).map(str::to_string),
            complete: input.complete.unwrap_or(false),
            category: default_category(&input),
            deadline: self.default_deadline(&input),
        };
        debug!(id = %record.id, "Creating todo");
        self.write_through(record).await
    }

    /// Full update addressed by `id`. The title is never taken from the
    /// input; the backend keeps whatever title it already holds.
    #[tracing::instrument(skip(self))]
    pub async fn replace(&self, id: &str, input: TodoInput) -> Result<Todo, TodoError> {
        check_path_id(id, &input)?;
        let record = Todo {
            id: id.to_string(),
            title: None,
            complete: input.complete.unwrap_or(false),
            category: default_category(&input),
            deadline: self.default_deadline(&input),
        };
        self.write_through(record).await
    }

    /// Partial update addressed by `id`. A non-empty title in the input is
    /// applied; every other field is defaulted as on create.
    #[tracing::instrument(skip(self))]
    pub async fn patch(&self, id: &str, input: TodoInput) -> Result<Todo, TodoError> {
        check_path_id(id, &input)?;
        let record = Todo {
            id: id.to_string(),
            title: non_empty(input.title.as_deref()).map(str::to_string),
            complete: input.complete.unwrap_or(false),
            category: default_category(&input),
            deadline: self.default_deadline(&input),
        };
        self.write_through(record).await
    }

    /// Remove one todo from the backend and then from the cache. Both
    /// removals are always attempted; a backend failure wins.
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_id(&self, id: &str) -> Result<(), TodoError> {
        let backend = self.backend.delete_by_id(id).await;
        let cache = self.cache.delete_by_id(id).await;
        backend.map_err(|e| downstream(StoreRole::Backend, e))?;
        cache.map_err(|e| downstream(StoreRole::Cache, e))
    }

    /// Remove every todo, backend first. Same failure policy as
    /// `delete_by_id`.
    #[tracing::instrument(skip(self))]
    pub async fn delete_all(&self) -> Result<(), TodoError> {
        debug!("Removing all todos");
        let backend = self.backend.delete_all().await;
        let cache = self.cache.delete_all().await;
        backend.map_err(|e| downstream(StoreRole::Backend, e))?;
        cache.map_err(|e| downstream(StoreRole::Cache, e))
    }

    /// Reject a create once the cache holds `limit` records. Counts the
    /// cache, not the backend, so a cold cache never blocks.
    async fn check_admission(&self) -> Result<(), TodoError> {
        let count = self
            .cache
            .list_all()
            .await
            .map_err(|e| downstream(StoreRole::Cache, e))?
            .len();
        if count >= self.limit {
            return Err(TodoError::ClientError(format!(
                "todos.api.limit={}, todos.size={count}",
                self.limit
            )));
        }
        Ok(())
    }

    async fn write_through(&self, record: Todo) -> Result<Todo, TodoError> {
        let saved = self
            .backend
            .upsert(&record)
            .await
            .map_err(|e| downstream(StoreRole::Backend, e))?;
        debug!(id = %saved.id, "Written to backend");
        self.cache_best_effort(&saved).await;
        Ok(saved)
    }

    async fn cache_best_effort(&self, todo: &Todo) {
        match self.cache.upsert(todo).await {
            Ok(_) => debug!(id = %todo.id, "Written to cache"),
            Err(e) => warn!(id = %todo.id, error = %e, "Cache write failed"),
        }
    }

    fn default_deadline(&self, input: &TodoInput) -> String {
        match non_empty(input.deadline.as_deref()) {
            Some(deadline) => deadline.to_string(),
            None => (self.clock)().format(DEADLINE_FORMAT).to_string(),
        }
    }
}

fn default_category(input: &TodoInput) -> String {
    non_empty(input.category.as_deref())
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string()
}

fn check_path_id(id: &str, input: &TodoInput) -> Result<(), TodoError> {
    let Some(body_id) = input.id.as_deref() else {
        return Err(TodoError::ClientError(
            "todos.id cannot be null on put".to_string(),
        ));
    };
    if body_id != id {
        return Err(TodoError::ClientError(format!(
            "todos.id {body_id} and id {id} are inconsistent"
        )));
    }
    Ok(())
}

fn downstream(store: StoreRole, source: StoreError) -> TodoError {
    error!(%store, error = %source, "Store error downstream");
    match store {
        StoreRole::Backend => TodoError::backend(source),
        StoreRole::Cache => TodoError::cache(source),
    }
}
