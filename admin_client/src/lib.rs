pub mod api;
pub mod config;
pub mod error;
pub mod mutations;
pub mod query;
pub mod retry;
pub mod search;
pub mod services;
pub mod toast;
pub mod utils;
pub mod validation;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use validator::Validate;

use crate::query::CachedPage;
use crate::validation::{validate_new_role, validate_new_user, FieldErrors};

/// Cache key of a resource collection. Also the REST collection path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Users,
    Roles,
}

impl QueryKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKey::Users => "users",
            QueryKey::Roles => "roles",
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub first: String,
    pub last: String,
    pub role_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first, self.last)
    }

    /// Avatar fallback: first letter of each name part.
    pub fn initials(&self) -> String {
        self.first
            .chars()
            .next()
            .into_iter()
            .chain(self.last.chars().next())
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// One page of a collection as returned by the list endpoints.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PagedResult<T> {
    pub data: Vec<T>,
    pub next: Option<u32>,
    pub prev: Option<u32>,
    pub pages: u32,
}

impl<T> PagedResult<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_prev(&self) -> bool {
        self.prev.is_some()
    }
}

/// Partial user body for `POST /users` and `PATCH /users/{id}`.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "First name is required"))]
    pub first: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Role is required"))]
    pub role_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// Partial role body for `POST /roles` and `PATCH /roles/{id}`.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RolePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

/// A record type served by one REST collection and cached under one key.
pub trait Resource:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Payload: Clone + fmt::Debug + Serialize + Validate + Send + Sync + 'static;

    const KEY: QueryKey;
    /// Singular name used in notifications ("User", "Role").
    const LABEL: &'static str;

    fn id(&self) -> &str;

    fn display_name(&self) -> String;

    /// Writes every field present in `payload` onto `self`.
    fn apply_payload(&mut self, payload: &Self::Payload);

    /// Required-field check for a create form.
    fn validate_new(payload: &Self::Payload) -> Result<(), FieldErrors>;

    fn wrap(page: PagedResult<Self>) -> CachedPage;

    fn unwrap(page: &CachedPage) -> Option<&PagedResult<Self>>;
}

impl Resource for User {
    type Payload = UserPayload;

    const KEY: QueryKey = QueryKey::Users;
    const LABEL: &'static str = "User";

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        self.full_name()
    }

    fn apply_payload(&mut self, payload: &UserPayload) {
        if let Some(first) = &payload.first {
            self.first = first.clone();
        }
        if let Some(last) = &payload.last {
            self.last = last.clone();
        }
        if let Some(role_id) = &payload.role_id {
            self.role_id = role_id.clone();
        }
        if let Some(photo) = &payload.photo {
            self.photo = Some(photo.clone());
        }
    }

    fn validate_new(payload: &UserPayload) -> Result<(), FieldErrors> {
        validate_new_user(payload)
    }

    fn wrap(page: PagedResult<Self>) -> CachedPage {
        CachedPage::Users(page)
    }

    fn unwrap(page: &CachedPage) -> Option<&PagedResult<Self>> {
        match page {
            CachedPage::Users(page) => Some(page),
            _ => None,
        }
    }
}

impl Resource for Role {
    type Payload = RolePayload;

    const KEY: QueryKey = QueryKey::Roles;
    const LABEL: &'static str = "Role";

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn apply_payload(&mut self, payload: &RolePayload) {
        if let Some(name) = &payload.name {
            self.name = name.clone();
        }
        if let Some(description) = &payload.description {
            self.description = Some(description.clone());
        }
        if let Some(is_default) = payload.is_default {
            self.is_default = is_default;
        }
    }

    fn validate_new(payload: &RolePayload) -> Result<(), FieldErrors> {
        validate_new_role(payload)
    }

    fn wrap(page: PagedResult<Self>) -> CachedPage {
        CachedPage::Roles(page)
    }

    fn unwrap(page: &CachedPage) -> Option<&PagedResult<Self>> {
        match page {
            CachedPage::Roles(page) => Some(page),
            _ => None,
        }
    }
}
