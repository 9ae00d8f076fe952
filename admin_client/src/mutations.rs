//! Optimistic mutations.
//!
//! Each mutation cancels the in-flight fetch for its key, snapshots the
//! cached page, installs a patched copy, then calls the server. Failure
//! puts the snapshot back. Success or failure, the key ends up stale so
//! the next read reconciles with the server.

use std::future::Future;
use std::sync::Arc;

use crate::error::ApiError;
use crate::query::{MutationPhase, QueryCache};
use crate::services::ResourceApi;
use crate::toast::Toaster;
use crate::validation::{validate, FieldErrors};
use crate::{PagedResult, Resource, Role, RolePayload};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MutationError {
    /// Rejected locally; no request was sent.
    #[error(transparent)]
    Validation(#[from] FieldErrors),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Runs `request` with an optimistic `patch` applied to the cached page of `R`.
///
/// On success `success_message` builds the toast text from the response.
/// On failure the pre-mutation page is restored exactly and the error is
/// returned for the caller to show inline.
pub async fn mutate_optimistic<R, T, P, Fut, M>(
    cache: &QueryCache,
    toaster: &Toaster,
    patch: P,
    request: Fut,
    success_message: M,
) -> Result<T, ApiError>
where
    R: Resource,
    P: FnOnce(&mut PagedResult<R>),
    Fut: Future<Output = Result<T, ApiError>>,
    M: FnOnce(&T) -> String,
{
    // 1) stop a late fetch from overwriting the patch
    cache.cancel(R::KEY);

    // 2) snapshot
    let snapshot = cache.data::<R>();

    // 3) install the patched page
    if let Some(mut page) = snapshot.clone() {
        patch(&mut page);
        cache.set_data(Some(page));
    }
    cache.set_mutation(R::KEY, MutationPhase::Mutating);

    let result = request.await;
    match &result {
        Ok(value) => {
            cache.set_mutation(R::KEY, MutationPhase::Committed);
            toaster.success(success_message(value)).await;
        }
        Err(err) => {
            if snapshot.is_some() {
                cache.set_data(snapshot);
            }
            cache.set_mutation(R::KEY, MutationPhase::RolledBack);
            tracing::warn!(key = %R::KEY, error = %err, status = ?err.status, "mutation rolled back");
        }
    }

    // 4) settle
    cache.invalidate(R::KEY);
    result
}

/// Create, update and delete for one resource, wired to the shared cache.
pub struct ResourceActions<R: Resource> {
    cache: Arc<QueryCache>,
    api: Arc<dyn ResourceApi<R>>,
    toaster: Toaster,
}

impl<R: Resource> Clone for ResourceActions<R> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            api: self.api.clone(),
            toaster: self.toaster.clone(),
        }
    }
}

impl<R: Resource> ResourceActions<R> {
    pub fn new(cache: Arc<QueryCache>, api: Arc<dyn ResourceApi<R>>, toaster: Toaster) -> Self {
        Self { cache, api, toaster }
    }

    /// Removes `target` from the cached page right away.
    pub async fn delete(&self, target: &R) -> Result<R, ApiError> {
        let id = target.id().to_string();
        let message = format!(
            "{} {} has been successfully deleted.",
            R::LABEL,
            target.display_name()
        );

        mutate_optimistic(
            &self.cache,
            &self.toaster,
            |page: &mut PagedResult<R>| page.data.retain(|record| record.id() != id),
            self.api.delete(target.id()),
            |_| message,
        )
        .await
    }

    /// Patches `target` in the cached page with the fields of `payload`.
    pub async fn update(&self, target: &R, payload: R::Payload) -> Result<R, MutationError> {
        validate(&payload)?;

        let id = target.id().to_string();
        let message = format!("{} {} updated successfully", R::LABEL, target.display_name());

        let updated = mutate_optimistic(
            &self.cache,
            &self.toaster,
            |page: &mut PagedResult<R>| {
                for record in page.data.iter_mut().filter(|record| record.id() == id) {
                    record.apply_payload(&payload);
                }
            },
            self.api.update(target.id(), &payload),
            |_| message,
        )
        .await?;
        Ok(updated)
    }

    /// No optimistic row: the id only exists once the server answers.
    pub async fn create(&self, payload: R::Payload) -> Result<R, MutationError> {
        R::validate_new(&payload)?;

        let created = mutate_optimistic(
            &self.cache,
            &self.toaster,
            |_: &mut PagedResult<R>| {},
            self.api.create(&payload),
            |created: &R| format!("{} {} created successfully", R::LABEL, created.display_name()),
        )
        .await?;
        Ok(created)
    }
}

impl ResourceActions<Role> {
    /// Makes `role` the only default role in the cached page.
    pub async fn set_default(&self, role: &Role) -> Result<Role, ApiError> {
        let id = role.id.clone();
        let message = format!("Role {} set as default successfully", role.name);
        let payload = RolePayload {
            is_default: Some(true),
            ..Default::default()
        };

        mutate_optimistic(
            &self.cache,
            &self.toaster,
            |page: &mut PagedResult<Role>| {
                for record in page.data.iter_mut() {
                    record.is_default = record.id == id;
                }
            },
            self.api.update(&role.id, &payload),
            |_| message,
        )
        .await
    }
}
