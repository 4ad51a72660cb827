//! Interactive chat command
//!
//! This module provides the readline-based chat loop. Each line is either a
//! chat command (prefixed with `/`) or a question submitted to the active
//! session. Session bookkeeping, turn tickets, and the one-shot title
//! trigger live in [`crate::session`]; this loop only drives them and
//! renders the results.
//!
//! Commands are case-insensitive.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use thiserror::Error;

use crate::api::ApiClient;
use crate::config::ChatConfig;
use crate::error::{AskdocsError, Result};
use crate::session::{ApplyOutcome, SessionStore, TitleJob};

/// Errors that can occur when parsing chat commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatCommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Chat commands that can be executed during an interactive session
///
/// These commands manage session state or provide information, rather than
/// being sent to the backend as questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Start a fresh session and make it active
    NewSession,

    /// List all sessions with their titles
    ListSessions,

    /// Switch to the session with this 1-based list number
    Switch(usize),

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a chat command
    ///
    /// The input should be submitted to the active session as a question.
    None,
}

/// Parse a user input string into a chat command
///
/// Input that does not start with `/` is a question, except the bare words
/// `exit` and `quit`.
///
/// # Errors
///
/// Returns [`ChatCommandError::UnknownCommand`] if input starts with `/` but
/// is not a valid command, and the argument variants when `/switch` is given
/// no number or something that is not a positive number.
///
/// # Examples
///
/// ```
/// use askdocs::commands::chat::{parse_chat_command, ChatCommand};
///
/// let cmd = parse_chat_command("/new").unwrap();
/// assert_eq!(cmd, ChatCommand::NewSession);
///
/// let cmd = parse_chat_command("/switch 2").unwrap();
/// assert_eq!(cmd, ChatCommand::Switch(2));
///
/// let cmd = parse_chat_command("what is in my notes?").unwrap();
/// assert_eq!(cmd, ChatCommand::None);
///
/// // Invalid command returns error
/// assert!(parse_chat_command("/foo").is_err());
/// ```
pub fn parse_chat_command(input: &str) -> std::result::Result<ChatCommand, ChatCommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's a question (except exit/quit)
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(ChatCommand::None);
    }

    match lower.as_str() {
        "/new" => Ok(ChatCommand::NewSession),
        "/sessions" => Ok(ChatCommand::ListSessions),

        // Handle /switch with no argument or invalid argument
        "/switch" => Err(ChatCommandError::MissingArgument {
            command: "/switch".to_string(),
            usage: "/switch <number>".to_string(),
        }),
        input if input.starts_with("/switch ") => {
            let arg = input[8..].trim();
            match arg.parse::<usize>() {
                Ok(number) if number >= 1 => Ok(ChatCommand::Switch(number)),
                _ => Err(ChatCommandError::UnsupportedArgument {
                    command: "/switch".to_string(),
                    arg: arg.to_string(),
                }),
            }
        }

        "/help" | "/?" => Ok(ChatCommand::Help),

        // Exit commands
        "exit" | "quit" | "/exit" | "/quit" => Ok(ChatCommand::Exit),

        // Unknown command starting with "/"
        input if input.starts_with('/') => {
            let cmd = input.split_whitespace().next().unwrap_or(input);
            Err(ChatCommandError::UnknownCommand(cmd.to_string()))
        }

        // A question for the backend
        _ => Ok(ChatCommand::None),
    }
}

/// Run the interactive chat loop
///
/// Reads lines until the user exits, dispatching chat commands locally and
/// submitting everything else to the active session.
pub async fn run_chat(client: &ApiClient, chat: &ChatConfig) -> Result<()> {
    let mut store = SessionStore::new();
    let mut rl = DefaultEditor::new()?;

    print_welcome_banner();

    loop {
        let prompt = match store.active() {
            Some(session) => format!("{} > ", session.title().cyan()),
            None => "> ".to_string(),
        };
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                // Check for chat commands first
                let command = match parse_chat_command(trimmed) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{}", e.to_string().red());
                        continue;
                    }
                };
                match command {
                    ChatCommand::NewSession => {
                        store.create_session();
                        println!("Started a new session\n");
                        continue;
                    }
                    ChatCommand::ListSessions => {
                        print_sessions(&store);
                        continue;
                    }
                    ChatCommand::Switch(number) => {
                        switch_session(&mut store, number);
                        continue;
                    }
                    ChatCommand::Help => {
                        print_help();
                        continue;
                    }
                    ChatCommand::Exit => break,
                    ChatCommand::None => {
                        // A question for the active session
                    }
                }

                rl.add_history_entry(trimmed)?;

                if let Err(e) = run_turn(client, &mut store, trimmed, chat).await {
                    eprintln!("{}", format!("Error: {}", e).red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Submits one question to the active session and renders the answer.
///
/// The session id is captured before the request so the answer lands on the
/// session the question was typed into, even when the user switches away
/// while the backend is thinking.
async fn run_turn(
    client: &ApiClient,
    store: &mut SessionStore,
    question: &str,
    chat: &ChatConfig,
) -> Result<()> {
    let session_id = store.active_id();
    let submission = match store.submit_question(session_id, question) {
        Some(submission) => submission,
        None => {
            return Err(
                AskdocsError::Input("The active session no longer exists".to_string()).into(),
            )
        }
    };

    // Emitted at submission when an earlier turn left the log eligible.
    if let Some(job) = submission.title_job {
        run_title_job(client, store, job).await;
    }

    let response = client.ask_question(question, Some(session_id)).await?;

    match store.apply_answer(
        submission.ticket,
        response.answer.clone(),
        response.sources.clone(),
    ) {
        ApplyOutcome::Applied(title_job) => {
            super::render_answer(&response, chat);
            if let Some(job) = title_job {
                run_title_job(client, store, job).await;
            }
        }
        ApplyOutcome::Stale => {
            tracing::debug!("Dropped stale answer for session {}", session_id);
        }
    }
    Ok(())
}

/// Generates and applies a session title.
///
/// Titles are cosmetic, so failures are logged and swallowed; the session
/// keeps its current title either way.
async fn run_title_job(client: &ApiClient, store: &mut SessionStore, job: TitleJob) {
    match client.generate_session_title(&job.context).await {
        Ok(title) => {
            if store.apply_title(job.session_id, &title) {
                tracing::debug!("Titled session {}: {}", job.session_id, title.trim());
            }
        }
        Err(e) => tracing::warn!("Title generation failed: {}", e),
    }
}

fn switch_session(store: &mut SessionStore, number: usize) {
    let target = store.sessions().get(number - 1).map(|session| session.id());
    match target {
        Some(id) => {
            store.switch_to(id);
            if let Some(session) = store.get(id) {
                println!("Switched to session {} ({})\n", number, session.title());
            }
        }
        None => {
            eprintln!(
                "{}",
                format!(
                    "No session number {}; type '/sessions' to see the list",
                    number
                )
                .red()
            );
        }
    }
}

fn print_sessions(store: &SessionStore) {
    println!("\nSessions:");
    for (index, session) in store.sessions().iter().enumerate() {
        let marker = if session.id() == store.active_id() {
            "*"
        } else {
            " "
        };
        let title = if session.id() == store.active_id() {
            session.title().cyan().to_string()
        } else {
            session.title().to_string()
        };
        println!(
            "  {} {}. {} ({} messages)",
            marker,
            index + 1,
            title,
            session.messages().len()
        );
    }
    println!();
}

/// Display welcome banner for interactive chat
fn print_welcome_banner() {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║              askdocs Interactive Chat - Welcome!             ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Ask questions about your uploaded documents.");
    println!("Type '/help' for available commands, 'exit' to quit\n");
}

/// Display help text for chat commands
pub fn print_help() {
    println!(
        r#"
Chat Commands
=============

SESSIONS:
  /new            - Start a fresh session and switch to it
  /sessions       - List sessions; * marks the active one
  /switch <n>     - Switch to session number <n> from the list

OTHER:
  /help or /?     - Show this help
  exit or quit    - Leave chat (/exit and /quit work too)

Anything else is sent to the backend as a question about your documents.
New sessions are titled automatically after the first exchange.
"#
    );
}
