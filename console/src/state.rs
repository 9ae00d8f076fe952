use std::sync::Arc;

use admin_client::api::ApiClient;
use admin_client::config::Config;
use admin_client::error::ApiError;
use admin_client::mutations::ResourceActions;
use admin_client::query::{ListParams, ListQuery, QueryCache};
use admin_client::retry::RetryPolicy;
use admin_client::services::{ResourceApi, RoleService, UserService};
use admin_client::toast::Toaster;
use admin_client::{Role, User};

/// Everything a command needs: one cache and one toaster shared by both
/// resources, plus the service behind each.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<QueryCache>,
    pub toaster: Toaster,
    pub users: Arc<dyn ResourceApi<User>>,
    pub roles: Arc<dyn ResourceApi<Role>>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let api = Arc::new(ApiClient::new(config)?);
        let retry = RetryPolicy::new(config.max_retries);

        Ok(Self::with_services(
            Arc::new(UserService::new(api.clone(), retry)),
            Arc::new(RoleService::new(api, retry)),
        ))
    }

    pub fn with_services(users: Arc<dyn ResourceApi<User>>, roles: Arc<dyn ResourceApi<Role>>) -> Self {
        Self {
            cache: Arc::new(QueryCache::new()),
            toaster: Toaster::default(),
            users,
            roles,
        }
    }

    pub fn user_query(&self) -> ListQuery<User> {
        ListQuery::new(self.cache.clone(), self.users.clone(), self.toaster.clone())
    }

    pub fn role_query(&self) -> ListQuery<Role> {
        ListQuery::new(self.cache.clone(), self.roles.clone(), self.toaster.clone())
    }

    pub fn user_actions(&self) -> ResourceActions<User> {
        ResourceActions::new(self.cache.clone(), self.users.clone(), self.toaster.clone())
    }

    pub fn role_actions(&self) -> ResourceActions<Role> {
        ResourceActions::new(self.cache.clone(), self.roles.clone(), self.toaster.clone())
    }

    /// Roles for the role-name column. A failed fetch leaves the list empty
    /// and every user shows an unknown role.
    pub async fn role_lookup(&self) -> Vec<Role> {
        let query = self.role_query();
        if query.cache().needs_fetch(admin_client::QueryKey::Roles, &ListParams::default()) {
            query.refetch(ListParams::default()).await;
        }
        query.state().data.map(|page| page.data).unwrap_or_default()
    }
}
