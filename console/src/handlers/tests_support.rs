//! In-memory services for handler tests.

use std::sync::{Arc, Mutex};

use admin_client::error::ApiError;
use admin_client::services::ResourceApi;
use admin_client::{PagedResult, Resource, Role, User};
use async_trait::async_trait;
use serde_json::json;

use crate::state::AppState;

pub struct Fake<R> {
    records: Mutex<Vec<R>>,
}

impl<R: Resource> Fake<R> {
    pub fn new(records: Vec<R>) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(records),
        })
    }

    pub fn record(&self, id: &str) -> Option<R> {
        self.records.lock().unwrap().iter().find(|record| record.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn not_found(id: &str) -> ApiError {
        ApiError::new(format!("{} {id} not found", R::LABEL), Some(404), None)
    }
}

#[async_trait]
impl<R: Resource> ResourceApi<R> for Fake<R> {
    async fn list(&self, search: Option<&str>, _page: u32) -> Result<PagedResult<R>, ApiError> {
        let needle = search.unwrap_or_default().to_lowercase();
        let data = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.display_name().to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(PagedResult {
            data,
            next: None,
            prev: None,
            pages: 1,
        })
    }

    async fn get(&self, id: &str) -> Result<R, ApiError> {
        self.record(id).ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, payload: &R::Payload) -> Result<R, ApiError> {
        let mut records = self.records.lock().unwrap();
        let mut body = serde_json::to_value(payload).unwrap();
        body["id"] = json!(format!("new-{}", records.len() + 1));
        body["createdAt"] = json!("2024-09-01T00:00:00Z");
        body["updatedAt"] = json!("2024-09-01T00:00:00Z");
        let created: R = serde_json::from_value(body).unwrap();
        records.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, payload: &R::Payload) -> Result<R, ApiError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        record.apply_payload(payload);
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<R, ApiError> {
        let mut records = self.records.lock().unwrap();
        let index = records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        Ok(records.remove(index))
    }
}

pub fn admin_role() -> Role {
    serde_json::from_value(json!({
        "id": "r1",
        "createdAt": "2024-08-27T10:00:00Z",
        "updatedAt": "2024-08-27T10:00:00Z",
        "name": "Admin",
        "isDefault": true
    }))
    .unwrap()
}

pub fn editor_role() -> Role {
    serde_json::from_value(json!({
        "id": "r2",
        "createdAt": "2024-08-27T10:00:00Z",
        "updatedAt": "2024-08-27T10:00:00Z",
        "name": "Editor",
        "description": "Can edit content"
    }))
    .unwrap()
}

pub fn ada() -> User {
    serde_json::from_value(json!({
        "id": "u1",
        "createdAt": "2024-01-02T10:00:00Z",
        "updatedAt": "2024-08-27T10:00:00Z",
        "first": "Ada",
        "last": "Lovelace",
        "roleId": "r1"
    }))
    .unwrap()
}

/// One user (Ada, an Admin) and two roles (Admin is the default).
pub fn fake_state() -> (AppState, Arc<Fake<User>>, Arc<Fake<Role>>) {
    let users = Fake::new(vec![ada()]);
    let roles = Fake::new(vec![admin_role(), editor_role()]);
    let state = AppState::with_services(users.clone(), roles.clone());
    (state, users, roles)
}
