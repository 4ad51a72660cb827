//! Wire types for the document chat backend API
//!
//! Request and response shapes mirror the backend's JSON contract. Response
//! structs derive only what the client needs; backend-owned timestamps stay
//! as strings so the client never fails on a serialization detail it does
//! not act on.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::TokenPair;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Body for `POST /auth/login` and `POST /auth/signup`.
#[derive(Debug, Serialize)]
pub(crate) struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Body for `POST /auth/refresh`.
#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair issued by `/auth/login` and `/auth/refresh`.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[allow(dead_code)]
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_expires_in: Option<u64>,
}

impl TokenResponse {
    /// Converts the wire shape into the pair the token store persists.
    ///
    /// A backend that omits the refresh token yields an empty refresh
    /// string; the refresh operation treats that the same as having no
    /// token at all.
    pub(crate) fn into_pair(self) -> TokenPair {
        TokenPair {
            access_token: self.access_token,
            refresh_token: self.refresh_token.unwrap_or_default(),
            access_expires_in: self.expires_in,
            refresh_expires_in: self.refresh_expires_in,
        }
    }
}

/// Account record returned by `POST /auth/signup`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserAccount {
    /// Backend-assigned account identifier.
    pub id: String,
    /// Email the account was registered under.
    pub email: String,
    /// Registration timestamp as reported by the backend.
    pub created_at: String,
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// One indexed document as reported by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentSummary {
    /// Document identifier, used for deletion.
    pub id: String,
    /// Original filename at upload time.
    pub filename: String,
    /// MIME type the backend detected for the document.
    pub content_type: String,
    /// Number of text chunks extracted from the document.
    pub chunk_count: u64,
    /// Number of embeddings stored for the document.
    pub embedding_count: u64,
    /// Upload timestamp as reported by the backend.
    pub created_at: String,
}

/// Response from `GET /docs`.
#[derive(Debug, Deserialize)]
pub(crate) struct DocumentListResponse {
    pub documents: Vec<DocumentSummary>,
}

/// Response from `POST /upload`.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    /// Summaries of the documents created by this upload.
    pub documents: Vec<DocumentSummary>,
    /// Number of documents the backend accepted.
    pub count: u64,
}

// ---------------------------------------------------------------------------
// Questions and titles
// ---------------------------------------------------------------------------

/// Body for `POST /ask`.
#[derive(Debug, Serialize)]
pub(crate) struct AskRequest {
    pub question: String,
    /// Session identifier forwarded for backends that track multi-turn
    /// context. Omitted from the body when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_session_id: Option<Uuid>,
}

/// A retrieved chunk cited as evidence for an answer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceInfo {
    /// Identifier of the cited chunk.
    pub chunk_id: String,
    /// Identifier of the document the chunk belongs to.
    pub document_id: String,
    /// Filename of the document the chunk belongs to.
    pub document_name: String,
    /// Position of the chunk within its document.
    pub chunk_index: u32,
    /// Retrieval score, when the backend reports one.
    #[serde(default)]
    pub score: Option<f64>,
    /// Excerpt of the chunk text.
    pub snippet: String,
}

/// Response from `POST /ask`.
#[derive(Debug, Clone, Deserialize)]
pub struct AskResponse {
    /// Generated answer text.
    pub answer: String,
    /// Chunks the answer was grounded on, in relevance order.
    pub sources: Vec<SourceInfo>,
}

/// Body for `POST /ask/title`.
#[derive(Debug, Serialize)]
pub(crate) struct TitleRequest {
    pub context: String,
}

/// Response from `POST /ask/title`.
#[derive(Debug, Deserialize)]
pub(crate) struct TitleResponse {
    pub title: String,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Response from `GET /health`.
#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    /// Backend-reported status, `"ok"` when healthy.
    pub status: String,
    /// Server-side timestamp of the probe.
    #[serde(default)]
    pub timestamp: String,
}
