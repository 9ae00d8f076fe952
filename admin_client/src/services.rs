use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::retry::{retry_request, RetryPolicy};
use crate::{PagedResult, Resource, Role, User};

/// CRUD surface of one REST collection.
#[async_trait]
pub trait ResourceApi<R: Resource>: Send + Sync {
    async fn list(&self, search: Option<&str>, page: u32) -> Result<PagedResult<R>, ApiError>;

    async fn get(&self, id: &str) -> Result<R, ApiError>;

    async fn create(&self, payload: &R::Payload) -> Result<R, ApiError>;

    async fn update(&self, id: &str, payload: &R::Payload) -> Result<R, ApiError>;

    async fn delete(&self, id: &str) -> Result<R, ApiError>;
}

/// HTTP implementation of [`ResourceApi`]; every call goes through the retry wrapper.
pub struct ResourceService<R> {
    api: Arc<ApiClient>,
    retry: RetryPolicy,
    _resource: PhantomData<fn() -> R>,
}

pub type UserService = ResourceService<User>;
pub type RoleService = ResourceService<Role>;

impl<R: Resource> ResourceService<R> {
    pub fn new(api: Arc<ApiClient>, retry: RetryPolicy) -> Self {
        Self {
            api,
            retry,
            _resource: PhantomData,
        }
    }

    fn collection() -> String {
        format!("/{}", R::KEY.as_str())
    }

    fn member(id: &str) -> String {
        format!("/{}/{}", R::KEY.as_str(), id)
    }
}

impl<R> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            retry: self.retry,
            _resource: PhantomData,
        }
    }
}

/// Query string for a list call: `page` always, `search` only when non-empty.
pub fn list_query(search: Option<&str>, page: u32) -> Vec<(&'static str, String)> {
    let mut query = vec![("page", page.to_string())];
    if let Some(term) = search.filter(|term| !term.is_empty()) {
        query.push(("search", term.to_string()));
    }
    query
}

#[async_trait]
impl<R: Resource> ResourceApi<R> for ResourceService<R> {
    async fn list(&self, search: Option<&str>, page: u32) -> Result<PagedResult<R>, ApiError> {
        let path = Self::collection();
        let query = list_query(search, page);
        retry_request(&self.retry, || self.api.get(&path, &query)).await
    }

    async fn get(&self, id: &str) -> Result<R, ApiError> {
        let path = Self::member(id);
        retry_request(&self.retry, || self.api.get(&path, &[])).await
    }

    async fn create(&self, payload: &R::Payload) -> Result<R, ApiError> {
        let path = Self::collection();
        retry_request(&self.retry, || self.api.post(&path, payload)).await
    }

    async fn update(&self, id: &str, payload: &R::Payload) -> Result<R, ApiError> {
        let path = Self::member(id);
        retry_request(&self.retry, || self.api.patch(&path, payload)).await
    }

    async fn delete(&self, id: &str) -> Result<R, ApiError> {
        let path = Self::member(id);
        retry_request(&self.retry, || self.api.delete(&path)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_skips_empty_search() {
        assert_eq!(list_query(None, 1), vec![("page", "1".to_string())]);
        assert_eq!(list_query(Some(""), 3), vec![("page", "3".to_string())]);
        assert_eq!(
            list_query(Some("ada l"), 2),
            vec![("page", "2".to_string()), ("search", "ada l".to_string())]
        );
    }

    #[test]
    fn paths_follow_the_collection_key() {
        assert_eq!(UserService::collection(), "/users");
        assert_eq!(RoleService::member("r1"), "/roles/r1");
    }
}
