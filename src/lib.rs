//! askdocs - Terminal client for a retrieval-augmented document chat backend
//!
//! Upload documents, ask questions answered with cited snippets, and hold
//! titled chat sessions against a self-hosted retrieval backend. The backend
//! does the heavy lifting (chunking, embedding, vector search, answer
//! generation, token issuance); this crate is the client side: credential
//! storage, an authenticated HTTP layer with transparent refresh-on-401,
//! typed API operations, and the chat session state machine.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `auth`: token pair storage behind the injectable [`auth::TokenStore`] trait
//! - `api`: wire types, the authenticated request client, and typed operations
//! - `session`: in-memory chat sessions with one-shot title generation
//! - `config`: configuration loading and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//! - `commands`: one handler per subcommand
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use askdocs::auth::KeyringTokenStore;
//! use askdocs::{ApiClient, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     let client = ApiClient::new(&config.backend, Arc::new(KeyringTokenStore))?;
//!
//!     let response = client.ask_question("What do my notes say about Rust?", None).await?;
//!     println!("{}", response.answer);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod session;

// Re-export commonly used types
pub use api::{ApiClient, AskResponse, DocumentSummary, SourceInfo, UploadFile};
pub use auth::{TokenPair, TokenStore};
pub use config::Config;
pub use error::{AskdocsError, Result};
pub use session::{ChatMessage, ChatSession, SessionStore};
