use std::fs::{self, OpenOptions};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use contribs::app::App;
use contribs::auth::{self, TokenStore};
use contribs::cache::ResultCache;
use contribs::config::{Config, ServerConfig};
use contribs::contributions::snapshot::EXAMPLE_USERS;
use contribs::contributions::{Pacing, SnapshotDir};
use contribs::github::GitHubClient;
use contribs::precache::precache_all;
use contribs::state::Route;
use contribs::storage::{FileStore, KeyValueStore};
use contribs::{ContribError, Result};

/// Explore a GitHub user's merged open-source contributions.
#[derive(Parser, Debug)]
#[command(author, version, about, args_conflicts_with_subcommands = true)]
struct Args {
    /// Screen to open: `/`, `/USERNAME` or a `/callback?code=..` redirect URL
    route: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the OAuth code exchange server
    Serve,
    /// Export snapshots (default: the example users)
    Precache { users: Vec<String> },
    /// Forget the stored GitHub token
    Logout,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let result = match args.command {
        None => run_dashboard(args.route.as_deref().map_or(Route::Landing, Route::parse)),
        Some(Command::Serve) => run_server(),
        Some(Command::Precache { users }) => run_precache(users),
        Some(Command::Logout) => run_logout(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
fn init_stderr_logging() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

/// Log to a file so the terminal UI stays clean.
fn init_file_logging(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.data_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())?;

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn open_store(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    let store = FileStore::open(config.store_dir())?.with_quota(config.store_quota);
    Ok(Arc::new(store))
}

fn run_dashboard(route: Route) -> Result<()> {
    let config = Config::load();
    init_file_logging(&config)?;
    info!(route = %route, "starting dashboard");

    let runtime = Runtime::new()?;
    let store = open_store(&config)?;
    let tokens = TokenStore::new(store.clone()).with_override(config.github_token.clone());
    let cache = ResultCache::new(store);
    let snapshots = SnapshotDir::new(config.snapshot_dir.clone());

    let mut app = App::new(config, runtime.handle().clone(), tokens, cache, snapshots);
    app.navigate(route);

    let mut terminal = ratatui::try_init()?;
    let result = app.run(&mut terminal);
    ratatui::restore();

    // Abandon any loads still in flight
    runtime.shutdown_background();
    result.map_err(ContribError::from)
}

fn run_server() -> Result<()> {
    init_stderr_logging();
    let config = ServerConfig::load()?;
    Runtime::new()?.block_on(auth::server::serve(config))
}

fn run_precache(users: Vec<String>) -> Result<()> {
    init_stderr_logging();
    let config = Config::load();
    let users = if users.is_empty() {
        EXAMPLE_USERS.iter().map(|u| u.to_string()).collect()
    } else {
        users
    };

    let mut client =
        GitHubClient::new(config.github_token.as_deref())?.with_base_url(config.api_url.clone());
    if !client.is_authenticated() {
        warn!("GITHUB_TOKEN not set; anonymous requests hit rate limits quickly");
    }

    let snapshots = SnapshotDir::new(config.snapshot_dir.clone());
    info!(dir = %snapshots.root().display(), "writing snapshots");

    let written =
        Runtime::new()?.block_on(precache_all(&mut client, &snapshots, &users, Pacing::default()));
    if written == 0 {
        return Err(ContribError::Other("no snapshots were written".to_string()));
    }
    Ok(())
}

fn run_logout() -> Result<()> {
    init_stderr_logging();
    let config = Config::load();
    let tokens = TokenStore::new(open_store(&config)?);
    tokens.clear()?;
    info!("Signed out");
    if config.github_token.is_some() {
        warn!("GITHUB_TOKEN is still set in the environment");
    }
    Ok(())
}
