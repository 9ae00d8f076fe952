mod cli;
mod error;
mod handlers;
mod state;
mod views;

use std::io::IsTerminal;
use std::process::ExitCode;

use admin_client::config::Config;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cli::{Args, Command};
use error::ConsoleError;
use state::AppState;
use views::toast_line;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "console=info,admin_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), ConsoleError> {
    let mut config = Config::from_env()?;
    if let Some(url) = &args.api_url {
        config = config.with_api_url(url)?;
    }
    config.max_retries = args.retries;
    tracing::debug!(api_url = %config.api_url, env = ?config.env, "configuration loaded");

    let state = AppState::new(&config)?;
    let interactive = std::io::stdin().is_terminal();

    let output = match args.command {
        Command::Users { action } => handlers::users::handle(&state, action, interactive).await?,
        Command::Roles { action } => handlers::roles::handle(&state, action, interactive).await?,
        Command::Browse { target } => return handlers::browse::run(&state, target).await,
    };

    print!("{output}");
    for toast in state.toaster.all().await {
        println!("{}", toast_line(&toast));
    }
    Ok(())
}
