use admin_client::mutations::MutationError;
use admin_client::query::ListParams;
use admin_client::RolePayload;

use super::{settled, with_retry};
use crate::cli::RoleCommand;
use crate::error::ConsoleError;
use crate::state::AppState;
use crate::views::roles::{render_role, render_roles};

pub async fn handle(state: &AppState, action: RoleCommand, interactive: bool) -> Result<String, ConsoleError> {
    let actions = &state.role_actions();

    match action {
        RoleCommand::List(args) => {
            let params = ListParams::new(args.search.unwrap_or_default(), args.page);
            let roles = settled(state.role_query().refetch(params).await)?;
            Ok(render_roles(&roles))
        }
        RoleCommand::Get { id } => {
            let role = state.roles.get(&id).await?;
            Ok(render_role(&role))
        }
        RoleCommand::Create {
            name,
            description,
            default,
        } => {
            let payload = &RoleCommand::payload(name, description, default);
            let created = with_retry(interactive, move || async move {
                actions.create(payload.clone()).await
            })
            .await?;
            Ok(render_role(&created))
        }
        RoleCommand::Update { id, name, description } => {
            let target = &state.roles.get(&id).await?;
            let payload = &RolePayload {
                name,
                description,
                is_default: None,
            };
            let updated = with_retry(interactive, move || async move {
                actions.update(target, payload.clone()).await
            })
            .await?;
            Ok(render_role(&updated))
        }
        RoleCommand::SetDefault { id } => {
            let target = &state.roles.get(&id).await?;
            let updated = with_retry(interactive, move || async move {
                actions.set_default(target).await.map_err(MutationError::from)
            })
            .await?;
            Ok(render_role(&updated))
        }
        RoleCommand::Delete { id } => {
            let target = &state.roles.get(&id).await?;
            with_retry(interactive, move || async move {
                actions.delete(target).await.map_err(MutationError::from)
            })
            .await?;
            Ok(String::new())
        }
    }
}
