use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use taskflow::config::{AppConfig, AuthBackendKind, ConfigError, MockLatency};
use taskflow::models::{RegisterRequest, UserUpdate};
use taskflow::navigation::LogNavigator;
use taskflow::services::auth::{self, AuthServiceError};
use taskflow::storage::{FileStorage, SessionStorage};
use taskflow::store::auth::selectors::{select_auth_error, select_user, select_user_profile};
use taskflow::store::auth::{AuthAction, AuthEffects};
use taskflow::store::{Store, StoreError, StoreHandle};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    AuthService(#[from] AuthServiceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Rejected(String),
    #[error("not logged in")]
    NotLoggedIn,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "taskflow", about = "TaskFlow session CLI")]
struct Cli {
    /// Auth backend: `mock` or `http`.
    #[arg(long, env = "AUTH_BACKEND")]
    backend: Option<AuthBackendKind>,

    #[arg(long, env = "AUTH_API_URL")]
    api_url: Option<String>,

    /// JSON file holding the persisted session.
    #[arg(long, env = "SESSION_STORE_PATH")]
    session_path: Option<PathBuf>,

    /// Skip the mock backend's simulated latency.
    #[arg(long)]
    no_latency: bool,

    /// Log the store's action history before exiting.
    #[arg(long)]
    history: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Restore the persisted session and report whether it is valid.
    Restore,
    Login {
        email: String,
        password: String,
    },
    Register {
        email: String,
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    Logout,
    /// Print the current user's profile.
    Whoami,
    UpdateProfile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "taskflow failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    info!(backend = ?config.backend, session_path = %config.session_path.display(), "starting");

    let api = auth::from_config(&config)?;
    let storage = SessionStorage::new(Arc::new(FileStorage::new(config.session_path.clone())));
    let effects = AuthEffects::new(api, storage, Arc::new(LogNavigator));
    let store = Store::builder().history_limit(config.history_limit).effects(effects.into_effects()).build();
    let handle = store.handle();

    let result = run_command(&handle, cli.command).await;
    if cli.history {
        for record in handle.history() {
            info!(seq = record.seq, action = record.kind, "history");
        }
    }
    store.shutdown();
    result
}

fn load_config(cli: &Cli) -> Result<AppConfig, CliError> {
    let mut config = AppConfig::from_env()?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.trim_end_matches('/').to_string();
    }
    if let Some(path) = &cli.session_path {
        config.session_path.clone_from(path);
    }
    if cli.no_latency {
        config.mock_latency = MockLatency::None;
    }
    Ok(config)
}

async fn run_command(store: &StoreHandle, command: Command) -> Result<(), CliError> {
    match command {
        Command::Restore => {
            restore(store).await?;
            if store.state().auth.is_authenticated {
                print_profile(store)
            } else {
                println!("no valid session");
                Ok(())
            }
        }
        Command::Login { email, password } => {
            complete(store, AuthAction::login(email, password)).await?;
            print_profile(store)
        }
        Command::Register { email, password, first_name, last_name } => {
            let request = RegisterRequest { email, password, first_name, last_name };
            complete(store, AuthAction::register(request)).await?;
            print_profile(store)
        }
        Command::Logout => {
            restore(store).await?;
            complete(store, AuthAction::Logout).await?;
            println!("logged out");
            Ok(())
        }
        Command::Whoami => {
            restore(store).await?;
            print_profile(store)
        }
        Command::UpdateProfile { first_name, last_name, email, avatar } => {
            restore(store).await?;
            let id = store.select(|s| select_user(s).map(|u| u.id.clone())).ok_or(CliError::NotLoggedIn)?;
            let update = UserUpdate { id: Some(id), first_name, last_name, email, avatar, ..UserUpdate::default() };
            complete(store, AuthAction::update_user(update)).await?;
            print_profile(store)
        }
    }
}

async fn restore(store: &StoreHandle) -> Result<(), CliError> {
    store.dispatch(AuthAction::LoadUserFromToken)?;
    store.settle().await;
    Ok(())
}

/// Dispatch `action`, wait for every follow-up, and surface any auth error.
async fn complete(store: &StoreHandle, action: AuthAction) -> Result<(), CliError> {
    store.dispatch(action)?;
    store.settle().await;
    match store.select(|s| select_auth_error(s).map(str::to_owned)) {
        Some(message) => Err(CliError::Rejected(message)),
        None => Ok(()),
    }
}

fn print_profile(store: &StoreHandle) -> Result<(), CliError> {
    let profile = store.select(select_user_profile).ok_or(CliError::NotLoggedIn)?;
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}
