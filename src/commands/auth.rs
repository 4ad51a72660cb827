//! Account and credential commands
//!
//! Handlers for `signup`, `login`, `logout`, and `status`. Passwords are
//! read from the terminal with masked echo and never land in shell history
//! or argv. Tokens themselves are owned by the token store; these handlers
//! only report what it holds.

use colored::Colorize;

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::{AskdocsError, Result};

use super::{prompt_password, resolve_email};

/// Backend rejects shorter passwords at signup; checking here saves a round trip.
const MIN_PASSWORD_CHARS: usize = 8;

/// Register a new account
///
/// Prompts for the email when it was not given on the command line, and
/// always prompts for the password twice.
pub async fn signup(client: &ApiClient, email: Option<String>) -> Result<()> {
    let email = resolve_email(email)?;

    let password = prompt_password("Password: ")?;
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AskdocsError::Input(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_CHARS
        ))
        .into());
    }

    let confirmation = prompt_password("Confirm password: ")?;
    if password != confirmation {
        return Err(AskdocsError::Input("Passwords do not match".to_string()).into());
    }

    let account = client.signup(&email, &password).await?;

    println!(
        "{}",
        format!("Account created for {}", account.email).green()
    );
    println!("Log in with {} to start asking.", "askdocs login".cyan());
    Ok(())
}

/// Log in and store the issued tokens
pub async fn login(client: &ApiClient, email: Option<String>) -> Result<()> {
    let email = resolve_email(email)?;
    let password = prompt_password("Password: ")?;

    let pair = client.login(&email, &password).await?;

    println!("{}", format!("Logged in as {}", email).green());
    if let Some(seconds) = pair.access_expires_in {
        println!("Access token valid for about {} minutes.", seconds / 60);
    }
    Ok(())
}

/// End the session and clear stored credentials
pub async fn logout(client: &ApiClient) -> Result<()> {
    client.logout().await?;
    println!("{}", "Logged out.".green());
    Ok(())
}

/// Show backend reachability and credential state
pub async fn status(client: &ApiClient, config: &Config) -> Result<()> {
    println!("\nBackend: {}", config.backend.api_base);

    match client.health().await {
        Ok(health) => println!("Health:  {}", health.status.green()),
        Err(e) => println!("Health:  {} ({})", "unreachable".red(), e),
    }

    if client.has_credentials() {
        println!("Auth:    {}", "credentials stored".green());
    } else {
        println!(
            "Auth:    {} (run {})",
            "not logged in".yellow(),
            "askdocs login".cyan()
        );
    }
    println!();
    Ok(())
}
