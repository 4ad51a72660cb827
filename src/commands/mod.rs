/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes four top-level command modules:

- `auth` — signup / login / logout / status
- `docs` — list, upload, and delete indexed documents
- `ask`  — one-shot question answering
- `chat` — interactive chat with sessions and generated titles

These handlers are intentionally small and use the library components:
the API client, the token store, and the session state machine. Shared
input and rendering helpers live here.
*/

use std::borrow::Cow;

use colored::Colorize;
use regex::Regex;
use rustyline::completion::Completer;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{ColorMode, DefaultEditor, Editor, Helper};

use crate::api::types::AskResponse;
use crate::config::ChatConfig;
use crate::error::{AskdocsError, Result};

pub mod ask;
pub mod auth;
pub mod chat;
pub mod docs;

/// Checks whether `email` looks like an address the backend would accept.
///
/// Deliberately loose: one `@`, no whitespace, a dot somewhere in the
/// domain. The backend remains the authority; this only catches typos
/// before a request is made.
pub(crate) fn is_valid_email(email: &str) -> bool {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

/// Uses the provided email or prompts for one, then validates its shape.
pub(crate) fn resolve_email(email: Option<String>) -> Result<String> {
    let email = match email {
        Some(email) => email,
        None => prompt_line("Email: ")?,
    };
    let email = email.trim().to_string();

    if !is_valid_email(&email) {
        return Err(
            AskdocsError::Input(format!("'{}' is not a valid email address", email)).into(),
        );
    }
    Ok(email)
}

/// Reads one line of input with normal echo.
pub(crate) fn prompt_line(prompt: &str) -> Result<String> {
    let mut editor = DefaultEditor::new()?;
    let line = editor.readline(prompt)?;
    Ok(line.trim().to_string())
}

/// Reads one line of input with every character rendered as `*`.
pub(crate) fn prompt_password(prompt: &str) -> Result<String> {
    let config = rustyline::Config::builder()
        .color_mode(ColorMode::Forced)
        .auto_add_history(false)
        .build();
    let mut editor: Editor<MaskedInput, DefaultHistory> = Editor::with_config(config)?;
    editor.set_helper(Some(MaskedInput));
    let line = editor.readline(prompt)?;
    Ok(line)
}

/// Rustyline helper that masks typed characters.
///
/// Only the highlighter does anything; the remaining helper traits keep
/// their default no-op behavior. Forced color mode makes rustyline render
/// through [`Highlighter::highlight`] even on dumb terminals, which is what
/// keeps the password off the screen.
struct MaskedInput;

impl Highlighter for MaskedInput {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Owned("*".repeat(line.chars().count()))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Completer for MaskedInput {
    type Candidate = String;
}

impl Hinter for MaskedInput {
    type Hint = String;
}

impl Validator for MaskedInput {}
impl Helper for MaskedInput {}

/// Prints an answer and, when configured, its cited sources.
///
/// Shared by the one-shot `ask` command and the chat REPL so both render
/// answers identically.
pub(crate) fn render_answer(response: &AskResponse, chat: &ChatConfig) {
    println!("\n{}", response.answer);

    if chat.show_sources && !response.sources.is_empty() {
        println!("\n{}", "Sources:".bold());
        for source in &response.sources {
            // Chunk indices are zero-based on the wire; people count from one.
            let label = format!("{} (chunk {})", source.document_name, source.chunk_index + 1);
            match source.score {
                Some(score) => println!("  {} {}", label.cyan(), format!("score {:.3}", score)),
                None => println!("  {}", label.cyan()),
            }
            println!(
                "    {}",
                truncate_snippet(&source.snippet, chat.max_snippet_chars)
            );
        }
    }
    println!();
}

/// Collapses whitespace and truncates a snippet for terminal display.
pub(crate) fn truncate_snippet(snippet: &str, max_chars: usize) -> String {
    let cleaned = snippet.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.chars().count() <= max_chars {
        return cleaned;
    }

    let kept: String = cleaned.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}
