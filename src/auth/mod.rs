//! Credential storage for the document chat backend
//!
//! The backend issues a short-lived access token plus a longer-lived refresh
//! token at login. This module owns how that pair is held between runs.
//!
//! # Module Layout
//!
//! - [`token_store`] -- [`TokenStore`] trait plus the keyring-backed and
//!   in-memory implementations

pub mod token_store;

pub use token_store::{KeyringTokenStore, MemoryTokenStore, TokenPair, TokenStore};
