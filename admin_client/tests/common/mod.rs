#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use admin_client::error::ApiError;
use admin_client::query::ListParams;
use admin_client::services::ResourceApi;
use admin_client::{PagedResult, Resource, Role, User};
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn timestamp() -> DateTime<Utc> {
    "2024-08-27T10:00:00Z".parse().unwrap()
}

pub fn role(id: &str, name: &str, is_default: bool) -> Role {
    Role {
        id: id.into(),
        created_at: timestamp(),
        updated_at: timestamp(),
        name: name.into(),
        description: None,
        is_default,
    }
}

pub fn user(id: &str, first: &str, last: &str, role_id: &str) -> User {
    User {
        id: id.into(),
        created_at: timestamp(),
        updated_at: timestamp(),
        first: first.into(),
        last: last.into(),
        role_id: role_id.into(),
        photo: None,
    }
}

// ---------------------------------------------------------------------------
// In-memory ResourceApi
// ---------------------------------------------------------------------------

/// Paged in-memory collection with call log and failure injection.
pub struct FakeApi<R: Resource> {
    records: Mutex<Vec<R>>,
    page_size: usize,
    list_calls: Mutex<Vec<ListParams>>,
    mutation_calls: Mutex<usize>,
    list_failures: Mutex<VecDeque<ApiError>>,
    mutation_failures: Mutex<VecDeque<ApiError>>,
    list_delay: Mutex<Duration>,
    factory: Option<fn(&R::Payload, usize) -> R>,
}

impl<R: Resource> FakeApi<R> {
    pub fn new(records: Vec<R>, page_size: usize) -> Arc<Self> {
        Arc::new(Self::build(records, page_size, None))
    }

    pub fn with_factory(records: Vec<R>, page_size: usize, factory: fn(&R::Payload, usize) -> R) -> Arc<Self> {
        Arc::new(Self::build(records, page_size, Some(factory)))
    }

    fn build(records: Vec<R>, page_size: usize, factory: Option<fn(&R::Payload, usize) -> R>) -> Self {
        Self {
            records: Mutex::new(records),
            page_size,
            list_calls: Mutex::new(Vec::new()),
            mutation_calls: Mutex::new(0),
            list_failures: Mutex::new(VecDeque::new()),
            mutation_failures: Mutex::new(VecDeque::new()),
            list_delay: Mutex::new(Duration::ZERO),
            factory,
        }
    }

    pub fn list_calls(&self) -> Vec<ListParams> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn mutation_calls(&self) -> usize {
        *self.mutation_calls.lock().unwrap()
    }

    pub fn records(&self) -> Vec<R> {
        self.records.lock().unwrap().clone()
    }

    pub fn fail_next_list(&self, err: ApiError) {
        self.list_failures.lock().unwrap().push_back(err);
    }

    pub fn fail_next_mutation(&self, err: ApiError) {
        self.mutation_failures.lock().unwrap().push_back(err);
    }

    pub fn set_list_delay(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = delay;
    }

    fn take_mutation_failure(&self) -> Result<(), ApiError> {
        *self.mutation_calls.lock().unwrap() += 1;
        match self.mutation_failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn not_found(id: &str) -> ApiError {
        ApiError::new(format!("{} {id} not found", R::LABEL), Some(404), None)
    }
}

#[async_trait]
impl<R: Resource> ResourceApi<R> for FakeApi<R> {
    async fn list(&self, search: Option<&str>, page: u32) -> Result<PagedResult<R>, ApiError> {
        self.list_calls
            .lock()
            .unwrap()
            .push(ListParams::new(search.unwrap_or_default(), page));

        let delay = *self.list_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.list_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        let needle = search.unwrap_or_default().to_lowercase();
        let matching: Vec<R> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.display_name().to_lowercase().contains(&needle))
            .cloned()
            .collect();

        let pages = matching.len().div_ceil(self.page_size).max(1) as u32;
        let data = matching
            .into_iter()
            .skip((page.saturating_sub(1) as usize) * self.page_size)
            .take(self.page_size)
            .collect();

        Ok(PagedResult {
            data,
            next: (page < pages).then_some(page + 1),
            prev: (page > 1).then(|| page - 1),
            pages,
        })
    }

    async fn get(&self, id: &str) -> Result<R, ApiError> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.id() == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, payload: &R::Payload) -> Result<R, ApiError> {
        self.take_mutation_failure()?;
        let factory = self
            .factory
            .ok_or_else(|| ApiError::new("create not supported", Some(501), None))?;
        let mut records = self.records.lock().unwrap();
        let created = factory(payload, records.len() + 1);
        records.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, payload: &R::Payload) -> Result<R, ApiError> {
        self.take_mutation_failure()?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        record.apply_payload(payload);
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<R, ApiError> {
        self.take_mutation_failure()?;
        let mut records = self.records.lock().unwrap();
        let index = records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        Ok(records.remove(index))
    }
}

// ---------------------------------------------------------------------------
// Scripted HTTP server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Value>,
}

impl Recorded {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(self.query.as_deref().unwrap_or_default().as_bytes())
            .into_owned()
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
    pub delay: Duration,
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone, Default)]
struct ScriptState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    replies: Arc<Mutex<VecDeque<Reply>>>,
}

pub struct ScriptedServer {
    pub base_url: String,
    state: ScriptState,
}

impl ScriptedServer {
    /// Serves `replies` in order, one per request; `200 {}` once they run out.
    pub async fn start(replies: Vec<Reply>) -> Self {
        let state = ScriptState {
            requests: Arc::default(),
            replies: Arc::new(Mutex::new(replies.into())),
        };

        let app = Router::new().fallback(record).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn record(State(state): State<ScriptState>, method: Method, uri: Uri, body: Bytes) -> impl IntoResponse {
    state.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        body: serde_json::from_slice(&body).ok(),
    });

    let reply = state
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Reply::json(200, serde_json::json!({})));

    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }

    (StatusCode::from_u16(reply.status).unwrap(), Json(reply.body))
}
