//! One-shot question command
//!
//! `askdocs ask "..."` sends a single question with no session attached and
//! prints the answer. Conversation state lives in the `chat` command.

use crate::api::ApiClient;
use crate::config::ChatConfig;
use crate::error::{AskdocsError, Result};

/// Ask one question and print the answer with its sources
pub async fn run_ask(client: &ApiClient, question: &str, chat: &ChatConfig) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AskdocsError::Input("Question cannot be empty".to_string()).into());
    }

    let response = client.ask_question(question, None).await?;
    super::render_answer(&response, chat);
    Ok(())
}
