use admin_client::mutations::MutationError;
use admin_client::query::ListParams;
use admin_client::UserPayload;

use super::{settled, with_retry};
use crate::cli::UserCommand;
use crate::error::ConsoleError;
use crate::state::AppState;
use crate::views::users::{render_user, render_users};

pub async fn handle(state: &AppState, action: UserCommand, interactive: bool) -> Result<String, ConsoleError> {
    match action {
        UserCommand::List(args) => {
            let roles = state.role_lookup().await;
            let params = ListParams::new(args.search.unwrap_or_default(), args.page);
            let users = settled(state.user_query().refetch(params).await)?;
            Ok(render_users(&users, &roles))
        }
        UserCommand::Get { id } => {
            let user = state.users.get(&id).await?;
            let roles = state.role_lookup().await;
            Ok(render_user(&user, &roles))
        }
        UserCommand::Create(fields) => {
            let payload: &UserPayload = &fields.into();
            let actions = &state.user_actions();
            let created = with_retry(interactive, move || async move {
                actions.create(payload.clone()).await
            })
            .await?;

            let roles = state.role_lookup().await;
            Ok(render_user(&created, &roles))
        }
        UserCommand::Update { id, fields } => {
            let target = &state.users.get(&id).await?;
            let payload: &UserPayload = &fields.into();
            let actions = &state.user_actions();
            let updated = with_retry(interactive, move || async move {
                actions.update(target, payload.clone()).await
            })
            .await?;

            let roles = state.role_lookup().await;
            Ok(render_user(&updated, &roles))
        }
        UserCommand::Delete { id } => {
            let target = &state.users.get(&id).await?;
            let actions = &state.user_actions();
            with_retry(interactive, move || async move {
                actions.delete(target).await.map_err(MutationError::from)
            })
            .await?;
            Ok(String::new())
        }
    }
}
