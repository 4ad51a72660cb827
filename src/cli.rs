//! Command-line interface definition for askdocs
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for account management, document handling, and
//! question answering.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// askdocs - Terminal client for a document chat backend
///
/// Upload documents, ask questions answered with cited snippets, and hold
/// titled chat sessions against a self-hosted retrieval backend.
#[derive(Parser, Debug, Clone)]
#[command(name = "askdocs")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the backend API base URL
    #[arg(long)]
    pub api_base: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for askdocs
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new account
    Signup {
        /// Email to register; prompted for when omitted
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Log in and store the session tokens
    Login {
        /// Email to log in with; prompted for when omitted
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Log out and discard stored tokens
    Logout,

    /// Show login state and backend health
    Status,

    /// Manage indexed documents
    Docs {
        /// Document subcommand
        #[command(subcommand)]
        command: DocsCommand,
    },

    /// Ask a single question against the indexed documents
    Ask {
        /// Question text
        question: String,
    },

    /// Start an interactive chat with sessions and generated titles
    Chat,
}

/// Document management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum DocsCommand {
    /// List indexed documents
    List,

    /// Upload .txt or .pdf files for indexing
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Delete a document by id
    Delete {
        /// Document id as shown by `docs list`
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            api_base: None,
            command: Commands::Status,
        }
    }
}
