//! timepunch server entry point.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use timepunch_auth::{FileCredentialStore, MemoryTokenCache, OAuthClient, TokenManager};
use timepunch_core::tracing::{TracingConfig, init_tracing};
use timepunch_server::cli::{AuthAction, Cli, Command, ConfigAction};
use timepunch_server::config::ServerConfig;
use timepunch_server::error::{ServerError, ServerResult};
use timepunch_server::identity::HeaderIdentity;
use timepunch_server::routes::{AppState, build_router};
use timepunch_server::timesheet::TimesheetClient;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // The server logs JSON for a pipeline; everything else stays readable.
    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else if matches!(&cli.command, None | Some(Command::Serve)) {
        TracingConfig::server()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ServerResult<()> {
    // Load configuration
    let config = if let Some(ref path) = cli.config {
        ServerConfig::load_from(path).map_err(ServerError::Config)?
    } else {
        ServerConfig::load().map_err(ServerError::Config)?
    };

    match cli.command {
        None | Some(Command::Serve) => serve(config, cli.listen).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => {
                let rendered = toml::to_string_pretty(&config)
                    .map_err(|e| ServerError::Config(format!("failed to render config: {}", e)))?;
                print!("{}", rendered);
                Ok(())
            }
            ConfigAction::Validate => {
                config.validate().map_err(ServerError::Config)?;
                println!("configuration OK");
                Ok(())
            }
            ConfigAction::Path => {
                println!("{}", ServerConfig::default_path().display());
                Ok(())
            }
        },
        Some(Command::Auth { action }) => {
            let manager = build_token_manager(&config)?;
            match action {
                AuthAction::Status => {
                    if manager.is_authorized()? {
                        println!("authorized (refresh token stored)");
                    } else {
                        println!("not authorized - start the server and visit /auth");
                    }
                    Ok(())
                }
                AuthAction::Token => {
                    let token = manager.access_token().await?;
                    println!("{}", token);
                    Ok(())
                }
                AuthAction::Clear => {
                    manager.clear_authorization()?;
                    println!("refresh token discarded");
                    Ok(())
                }
            }
        }
    }
}

/// Builds the token manager from configuration, backed by the file store.
fn build_token_manager(config: &ServerConfig) -> ServerResult<TokenManager> {
    let credentials = config.resolve_credentials().map_err(ServerError::Config)?;
    let callback_url = config.callback_url().map_err(ServerError::Config)?;
    let store = FileCredentialStore::new(config.store_path(), credentials)?;
    let oauth = OAuthClient::new(Duration::from_secs(config.google.timeout));

    Ok(TokenManager::new(
        oauth,
        Arc::new(store),
        Arc::new(MemoryTokenCache::new()),
        callback_url,
        config.scope(),
    )
    .with_state_ttl(config.state_ttl()))
}

/// Runs the web server in the foreground.
async fn serve(config: ServerConfig, listen_override: Option<String>) -> ServerResult<()> {
    config.validate().map_err(ServerError::Config)?;

    let tokens = build_token_manager(&config)?;
    let timesheet = TimesheetClient::new(
        config.timesheet_api_url().map_err(ServerError::Config)?,
        Duration::from_secs(config.timesheet.timeout),
    );
    let identity = Arc::new(HeaderIdentity::new(
        config.identity.header.clone(),
        config.identity.fallback_email.clone(),
    ));

    let state = Arc::new(AppState {
        tokens,
        timesheet,
        identity,
    });

    let listen = listen_override.unwrap_or_else(|| config.server.listen.clone());
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!("listening on {}", listen);

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
