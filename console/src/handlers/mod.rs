pub mod browse;
pub mod roles;
pub mod users;

#[cfg(test)]
pub mod tests_support;

use std::future::Future;

use admin_client::mutations::MutationError;
use admin_client::query::QueryState;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::error::ConsoleError;
use crate::views::error_callout;

/// Runs a mutation; on a server failure shows the message and, when a
/// terminal is attached, offers to resubmit the same operation.
/// Validation failures are returned as-is since resubmitting cannot help.
pub async fn with_retry<T, F, Fut>(interactive: bool, mut op: F) -> Result<T, ConsoleError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, MutationError>>,
{
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(MutationError::Validation(fields)) => return Err(fields.into()),
            Err(MutationError::Api(err)) => {
                if !interactive {
                    return Err(err.into());
                }
                eprint!("{}", error_callout(Some(&err.message), None));
                if !confirm("Retry? [y/N] ").await? {
                    return Err(err.into());
                }
            }
        }
    }
}

async fn confirm(question: &str) -> Result<bool, ConsoleError> {
    let mut stderr = tokio::io::stderr();
    stderr.write_all(question.as_bytes()).await?;
    stderr.flush().await?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut answer).await?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Turns a failed list fetch into an error; a settled one passes through.
pub fn settled<R>(state: QueryState<R>) -> Result<QueryState<R>, ConsoleError> {
    match state.error {
        Some(err) if state.is_error => Err(err.into()),
        _ => Ok(state),
    }
}
