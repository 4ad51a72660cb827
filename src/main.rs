//! askdocs - Terminal client for a document chat backend
//!
#![doc = "askdocs - Terminal client for a retrieval-augmented document chat backend"]
#![doc = "Main entry point for the askdocs application."]

use std::sync::Arc;

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use askdocs::api::ApiClient;
use askdocs::auth::{KeyringTokenStore, TokenStore};
use askdocs::cli::{Cli, Commands, DocsCommand};
use askdocs::commands;
use askdocs::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments first so --verbose can raise the filter
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration (file, then env, then CLI overrides)
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Credentials live in the OS keyring; the store is injected rather than
    // reached for as a global so the request layer stays testable.
    let tokens: Arc<dyn TokenStore> = Arc::new(KeyringTokenStore);
    let client = ApiClient::new(&config.backend, tokens)?;

    // Execute command
    match cli.command {
        Commands::Signup { email } => {
            tracing::info!("Starting account signup");
            commands::auth::signup(&client, email).await
        }
        Commands::Login { email } => {
            tracing::info!("Starting login");
            commands::auth::login(&client, email).await
        }
        Commands::Logout => {
            tracing::info!("Starting logout");
            commands::auth::logout(&client).await
        }
        Commands::Status => {
            tracing::info!("Checking backend status");
            commands::auth::status(&client, &config).await
        }
        Commands::Docs { command } => match command {
            DocsCommand::List => {
                tracing::info!("Listing indexed documents");
                commands::docs::list(&client).await
            }
            DocsCommand::Upload { files } => {
                tracing::info!("Uploading {} file(s)", files.len());
                commands::docs::upload(&client, &files).await
            }
            DocsCommand::Delete { id } => {
                tracing::info!("Deleting document {}", id);
                commands::docs::delete(&client, &id).await
            }
        },
        Commands::Ask { question } => {
            tracing::info!("Asking one-shot question");
            commands::ask::run_ask(&client, &question, &config.chat).await
        }
        Commands::Chat => {
            tracing::info!("Starting interactive chat mode");
            commands::chat::run_chat(&client, &config.chat).await
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise the default level is `info`, raised
/// to `debug` by `--verbose`.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "askdocs=debug"
    } else {
        "askdocs=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
