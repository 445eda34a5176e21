//! Cache-aside lifecycle against two live mock stores.
//!
//! # Design
//! Starts a backend and a cache store on random ports, then drives
//! `TodoService` over real HTTP through a ureq-backed `Transport`. The stores'
//! maps are shared with the test so it can observe what landed where.

use async_trait::async_trait;
use mock_store::Db;
use todo_core::{
    HttpMethod, HttpRequest, HttpResponse, HttpStore, StoreError, TodoError, TodoInput,
    TodoService, Transport,
};

/// Executes requests with ureq, returning 4xx/5xx as data.
struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, StoreError> {
        let result = match (req.method, req.body) {
            (HttpMethod::Get, _) => self.agent.get(&req.path).call(),
            (HttpMethod::Delete, _) => self.agent.delete(&req.path).call(),
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&req.path)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self.agent.post(&req.path).send_empty(),
        };
        let mut response = result.map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().unwrap_or_default();
        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

/// Serve a store on its own thread and runtime; returns its base URL.
fn spawn_store(db: Db) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_store::run_with(listener, db).await
        })
        .unwrap();
    });

    format!("http://{addr}/todos")
}

type Service = TodoService<HttpStore<UreqTransport>, HttpStore<UreqTransport>>;

fn service(backend_db: Db, cache_db: Db, limit: usize) -> Service {
    let backend = HttpStore::new(&spawn_store(backend_db), UreqTransport::new());
    let cache = HttpStore::new(&spawn_store(cache_db), UreqTransport::new());
    TodoService::new(backend, cache, limit)
}

#[tokio::test]
async fn create_get_delete_lifecycle() {
    let backend_db = Db::default();
    let cache_db = Db::default();
    let service = service(backend_db.clone(), cache_db.clone(), 100);

    // Step 1: create with defaults.
    let created = service.create(TodoInput::titled("Buy milk")).await.unwrap();
    assert!(!created.id.is_empty());
    assert_eq!(created.title.as_deref(), Some("Buy milk"));
    assert_eq!(created.category, "Default group");
    assert_eq!(
        created.deadline,
        chrono::Local::now().date_naive().format("%Y/%m/%d").to_string()
    );
    assert!(!created.complete);

    // Step 2: both stores hold it.
    assert!(backend_db.read().await.contains_key(&created.id));
    assert!(cache_db.read().await.contains_key(&created.id));

    // Step 3: get is served by the cache even when the backend copy drifts.
    backend_db
        .write()
        .await
        .get_mut(&created.id)
        .unwrap()
        .title = Some("drifted".to_string());
    let fetched = service.get_by_id(&created.id).await.unwrap();
    assert_eq!(fetched, created);

    // Step 4: delete removes it from both.
    service.delete_by_id(&created.id).await.unwrap();
    assert!(backend_db.read().await.is_empty());
    assert!(cache_db.read().await.is_empty());

    // Step 5: gone everywhere.
    let err = service.get_by_id(&created.id).await.unwrap_err();
    assert!(matches!(err, TodoError::NotFound(ref id) if *id == created.id));

    // Step 6: deleting again is tolerated.
    service.delete_by_id(&created.id).await.unwrap();
}

#[tokio::test]
async fn cold_cache_is_repopulated_by_reads() {
    let backend_db = Db::default();
    let cache_db = Db::default();
    let service = service(backend_db.clone(), cache_db.clone(), 100);

    for title in ["one", "two"] {
        service.create(TodoInput::titled(title)).await.unwrap();
    }
    cache_db.write().await.clear();

    let listed = service.list_all().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(cache_db.read().await.len(), 2);

    cache_db.write().await.clear();
    let id = listed[0].id.clone();
    let fetched = service.get_by_id(&id).await.unwrap();
    assert_eq!(fetched.id, id);
    assert!(cache_db.read().await.contains_key(&id));
}

#[tokio::test]
async fn replace_keeps_backend_title() {
    let backend_db = Db::default();
    let cache_db = Db::default();
    let service = service(backend_db.clone(), cache_db.clone(), 100);

    let created = service.create(TodoInput::titled("Walk dog")).await.unwrap();
    let input = TodoInput {
        id: Some(created.id.clone()),
        complete: Some(true),
        category: Some("chores".to_string()),
        ..TodoInput::default()
    };
    let replaced = service.replace(&created.id, input).await.unwrap();
    assert_eq!(replaced.title.as_deref(), Some("Walk dog"));
    assert!(replaced.complete);
    assert_eq!(replaced.category, "chores");
    assert_eq!(cache_db.read().await.get(&created.id), Some(&as_stored(&replaced)));
}

fn as_stored(todo: &todo_core::Todo) -> mock_store::Todo {
    mock_store::Todo {
        id: todo.id.clone(),
        title: todo.title.clone(),
        complete: todo.complete,
        category: todo.category.clone(),
        deadline: todo.deadline.clone(),
    }
}

#[tokio::test]
async fn admission_counts_the_cache() {
    let backend_db = Db::default();
    let cache_db = Db::default();
    let service = service(backend_db.clone(), cache_db.clone(), 2);

    service.create(TodoInput::titled("a")).await.unwrap();
    service.create(TodoInput::titled("b")).await.unwrap();
    let err = service.create(TodoInput::titled("c")).await.unwrap_err();
    assert!(matches!(err, TodoError::ClientError(_)));
    assert_eq!(backend_db.read().await.len(), 2);

    // A flushed cache no longer blocks, whatever the backend holds.
    cache_db.write().await.clear();
    service.create(TodoInput::titled("c")).await.unwrap();
    assert_eq!(backend_db.read().await.len(), 3);

    service.delete_all().await.unwrap();
    assert!(backend_db.read().await.is_empty());
    assert!(cache_db.read().await.is_empty());
}

#[tokio::test]
async fn unreachable_cache_is_a_collaborator_error() {
    let backend = HttpStore::new(&spawn_store(Db::default()), UreqTransport::new());
    let cache = HttpStore::new("http://127.0.0.1:1/todos", UreqTransport::new());
    let service = TodoService::new(backend, cache, 100);

    let err = service.get_by_id("x").await.unwrap_err();
    assert!(matches!(
        err,
        TodoError::Collaborator {
            source: StoreError::Transport(_),
            ..
        }
    ));
}
