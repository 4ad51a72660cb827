//! HTTP client for the document chat backend
//!
//! # Module Layout
//!
//! - [`types`]  -- request/response wire shapes
//! - [`http`]   -- bearer attachment and the single refresh-and-retry on 401
//! - [`client`] -- typed domain operations built on top of [`http`]

pub mod client;
pub mod http;
pub mod types;

pub use client::{ApiClient, UploadFile};
pub use types::{AskResponse, DocumentSummary, HealthResponse, SourceInfo, UploadResponse, UserAccount};
