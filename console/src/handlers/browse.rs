//! Interactive list view: free text is a search term (debounced), lines
//! starting with `:` are commands.

use std::collections::HashSet;

use admin_client::config::SEARCH_DEBOUNCE;
use admin_client::mutations::ResourceActions;
use admin_client::query::{ListQuery, QueryState};
use admin_client::search::{Debouncer, ListController};
use admin_client::{Resource, Role};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::BrowseTarget;
use crate::error::ConsoleError;
use crate::state::AppState;
use crate::views::roles::render_roles;
use crate::views::users::render_users;
use crate::views::{error_callout, toast_line};

const HELP: &str = "Type to search. :n next  :p previous  :page N  :r reload  \
                    :d ID delete  :default ID set default role  :retry  :q quit";
const LIST_RETRY_HINT: &str = ":r to retry";
const MUTATION_RETRY_HINT: &str = ":retry to resubmit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Search(String),
    Next,
    Prev,
    Page(u32),
    Reload,
    Delete(String),
    SetDefault(String),
    Retry,
    Help,
    Quit,
    Unknown(String),
}

impl BrowseCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return BrowseCommand::Search(line.to_string());
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::to_string);

        match (name, arg) {
            ("n" | "next", None) => BrowseCommand::Next,
            ("p" | "prev", None) => BrowseCommand::Prev,
            ("r" | "reload", None) => BrowseCommand::Reload,
            ("retry", None) => BrowseCommand::Retry,
            ("h" | "help", None) => BrowseCommand::Help,
            ("q" | "quit", None) => BrowseCommand::Quit,
            ("page", Some(page)) => match page.parse() {
                Ok(page) => BrowseCommand::Page(page),
                Err(_) => BrowseCommand::Unknown(line.to_string()),
            },
            ("d" | "delete", Some(id)) => BrowseCommand::Delete(id),
            ("default", Some(id)) => BrowseCommand::SetDefault(id),
            _ => BrowseCommand::Unknown(line.to_string()),
        }
    }
}

/// Mutation that failed and can be resubmitted with `:retry`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Delete(String),
    SetDefault(String),
}

/// Prints list state and any toast not printed yet.
#[derive(Default)]
struct Screen {
    shown: HashSet<String>,
}

impl Screen {
    async fn show<R>(&mut self, state: &AppState, view: &QueryState<R>, render: &impl Fn(&QueryState<R>) -> String) {
        print!("{}", render(view));
        if view.is_error {
            let message = view.error.as_ref().map(|err| err.message.as_str());
            print!("{}", error_callout(message, Some(LIST_RETRY_HINT)));
        }
        self.flush_toasts(state).await;
    }

    async fn flush_toasts(&mut self, state: &AppState) {
        for toast in state.toaster.all().await {
            if self.shown.insert(toast.id.to_string()) {
                println!("{}", toast_line(&toast));
            }
        }
    }
}

pub async fn run(state: &AppState, target: BrowseTarget) -> Result<(), ConsoleError> {
    match target {
        BrowseTarget::Users => {
            let roles = state.role_lookup().await;
            browse(state, state.user_query(), state.user_actions(), |view| render_users(view, &roles)).await
        }
        BrowseTarget::Roles => browse(state, state.role_query(), state.role_actions(), render_roles).await,
    }
}

async fn browse<R: Resource>(
    state: &AppState,
    query: ListQuery<R>,
    actions: ResourceActions<R>,
    render: impl Fn(&QueryState<R>) -> String,
) -> Result<(), ConsoleError> {
    let mut list = ListController::new(query);
    let (mut debouncer, mut settled) = Debouncer::new(SEARCH_DEBOUNCE);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut screen = Screen::default();
    let mut pending: Option<Pending> = None;

    println!("{HELP}");
    let view = list.load().await;
    screen.show(state, &view, &render).await;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = match BrowseCommand::parse(&line) {
                    BrowseCommand::Retry => match pending.take() {
                        Some(Pending::Delete(id)) => BrowseCommand::Delete(id),
                        Some(Pending::SetDefault(id)) => BrowseCommand::SetDefault(id),
                        None => {
                            println!("Nothing to retry.");
                            continue;
                        }
                    },
                    command => command,
                };

                let view = match command {
                    BrowseCommand::Quit => break,
                    BrowseCommand::Help => {
                        println!("{HELP}");
                        continue;
                    }
                    BrowseCommand::Unknown(input) => {
                        println!("Unknown command {input:?}. {HELP}");
                        continue;
                    }
                    BrowseCommand::Search(term) => {
                        debouncer.push(term);
                        continue;
                    }
                    BrowseCommand::Next => list.next_page().await,
                    BrowseCommand::Prev => list.prev_page().await,
                    BrowseCommand::Page(page) => list.go_to_page(page).await,
                    BrowseCommand::Reload => list.refresh().await,
                    BrowseCommand::Delete(id) => {
                        if let Err(err) = delete_row(&list, &actions, &id).await {
                            report_failure(&err);
                            pending = Some(Pending::Delete(id));
                        }
                        list.load().await
                    }
                    BrowseCommand::SetDefault(id) => {
                        if let Err(err) = set_default(state, &id).await {
                            report_failure(&err);
                            pending = Some(Pending::SetDefault(id));
                        }
                        list.load().await
                    }
                    BrowseCommand::Retry => continue,
                };
                screen.show(state, &view, &render).await;
            }
            Some(term) = settled.recv() => {
                let view = list.apply_search(term).await;
                screen.show(state, &view, &render).await;
            }
        }
    }

    debouncer.cancel();
    Ok(())
}

fn report_failure(err: &ConsoleError) {
    match err {
        ConsoleError::Api(api) => print!("{}", error_callout(Some(&api.message), Some(MUTATION_RETRY_HINT))),
        other => print!("{}", error_callout(Some(&other.to_string()), None)),
    }
}

async fn delete_row<R: Resource>(
    list: &ListController<R>,
    actions: &ResourceActions<R>,
    id: &str,
) -> Result<R, ConsoleError> {
    let target = list
        .state()
        .rows()
        .iter()
        .find(|record| record.id() == id)
        .cloned()
        .ok_or_else(|| ConsoleError::NotOnPage(format!("{} {id}", R::LABEL)))?;
    Ok(actions.delete(&target).await?)
}

/// Looks the role up in the cached roles page, so it must be on screen
/// (or in the role-name lookup when browsing users).
async fn set_default(state: &AppState, id: &str) -> Result<Role, ConsoleError> {
    let role = state
        .cache
        .data::<Role>()
        .and_then(|page| page.data.into_iter().find(|role| role.id == id))
        .ok_or_else(|| ConsoleError::NotOnPage(format!("Role {id}")))?;
    Ok(state.role_actions().set_default(&role).await?)
}
