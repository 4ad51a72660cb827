//! Typed operations against the document chat backend
//!
//! [`ApiClient`] is the one place the rest of the crate talks to the backend
//! through. Each method serializes its input to the wire shape, sends it via
//! the authenticated plumbing in [`super::http`], and maps any non-success
//! status to a [`AskdocsError::Backend`] carrying the response body text
//! verbatim (or a generic message when the body is empty).

use std::path::Path;
use std::sync::{Arc, RwLock};

use reqwest::multipart::{Form, Part};
use reqwest::Response;
use uuid::Uuid;

use crate::api::http::AuthenticatedClient;
use crate::api::types::{
    AskRequest, AskResponse, CredentialsRequest, DocumentListResponse, DocumentSummary,
    HealthResponse, TitleRequest, TitleResponse, TokenResponse, UploadResponse, UserAccount,
};
use crate::auth::{TokenPair, TokenStore};
use crate::config::BackendConfig;
use crate::error::{AskdocsError, Result};

/// MIME types the backend can ingest, keyed by file extension.
const SUPPORTED_UPLOADS: &[(&str, &str)] = &[("txt", "text/plain"), ("pdf", "application/pdf")];

/// A file staged for upload, read into memory up front.
///
/// Bytes are buffered rather than streamed so the authenticated retry can
/// rebuild the multipart body after a token refresh.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Name presented to the backend.
    pub filename: String,
    /// MIME type derived from the file extension.
    pub content_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Reads a file from disk and stages it for upload.
    ///
    /// # Errors
    ///
    /// Returns [`AskdocsError::Input`] when the extension is not one the
    /// backend ingests or the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        let content_type = SUPPORTED_UPLOADS
            .iter()
            .find(|(supported, _)| *supported == extension)
            .map(|(_, mime)| (*mime).to_string())
            .ok_or_else(|| {
                AskdocsError::Input(format!(
                    "Unsupported file type for {}: only .txt and .pdf are accepted",
                    path.display()
                ))
            })?;

        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.to_string())
            .ok_or_else(|| {
                AskdocsError::Input(format!("Cannot determine filename for {}", path.display()))
            })?;

        let bytes = std::fs::read(path)
            .map_err(|e| AskdocsError::Input(format!("Cannot read {}: {}", path.display(), e)))?;

        Ok(Self {
            filename,
            content_type,
            bytes,
        })
    }
}

/// Client for the document chat backend.
///
/// Holds the authenticated HTTP client plus a cached copy of the document
/// list. The cache is served until an upload or deletion invalidates it.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use askdocs::api::ApiClient;
/// use askdocs::auth::KeyringTokenStore;
/// use askdocs::config::BackendConfig;
///
/// # async fn example() -> askdocs::error::Result<()> {
/// let config = BackendConfig::default();
/// let client = ApiClient::new(&config, Arc::new(KeyringTokenStore))?;
/// let documents = client.list_documents().await?;
/// println!("{} documents indexed", documents.len());
/// # Ok(())
/// # }
/// ```
pub struct ApiClient {
    http: AuthenticatedClient,
    tokens: Arc<dyn TokenStore>,
    documents_cache: RwLock<Option<Vec<DocumentSummary>>>,
}

impl ApiClient {
    /// Creates a client for the configured backend with an injected token
    /// store.
    pub fn new(config: &BackendConfig, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        Ok(Self {
            http: AuthenticatedClient::new(config, tokens.clone())?,
            tokens,
            documents_cache: RwLock::new(None),
        })
    }

    /// Whether a bearer credential is currently stored.
    pub fn has_credentials(&self) -> bool {
        self.tokens.access_token().is_some()
    }

    // -----------------------------------------------------------------------
    // Auth
    // -----------------------------------------------------------------------

    /// Registers a new account.
    ///
    /// Unauthenticated; the backend answers 201 with the created account.
    pub async fn signup(&self, email: &str, password: &str) -> Result<UserAccount> {
        let url = self.http.endpoint("auth/signup");
        let request = CredentialsRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .http
            .send_unauthenticated(|client| client.post(&url).json(&request))
            .await?;
        if !response.status().is_success() {
            return Err(backend_error(response).await.into());
        }

        let account: UserAccount = response.json().await?;
        tracing::info!("Registered account {}", account.email);
        Ok(account)
    }

    /// Exchanges credentials for a token pair and persists it.
    ///
    /// Unauthenticated. On success the pair is written to the token store
    /// and also returned so callers can report expiry information.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
        let url = self.http.endpoint("auth/login");
        let request = CredentialsRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .http
            .send_unauthenticated(|client| client.post(&url).json(&request))
            .await?;
        if !response.status().is_success() {
            return Err(backend_error(response).await.into());
        }

        let parsed: TokenResponse = response.json().await?;
        let pair = parsed.into_pair();
        self.tokens.set_tokens(&pair);
        tracing::info!("Logged in as {}", email);
        Ok(pair)
    }

    /// Ends the backend session and clears local credentials.
    ///
    /// The server call is best effort. Local credentials are cleared even
    /// when the backend rejects the request or cannot be reached.
    pub async fn logout(&self) -> Result<()> {
        let url = self.http.endpoint("auth/logout");
        match self.http.send(|client| client.post(&url)).await {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!("Logout rejected with {}", response.status());
            }
            Err(e) => tracing::warn!("Logout request failed: {}", e),
            Ok(_) => {}
        }
        self.tokens.clear();
        Ok(())
    }

    /// Probes the backend health endpoint.
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.http.endpoint("health");
        let response = self
            .http
            .send_unauthenticated(|client| client.get(&url))
            .await?;
        if !response.status().is_success() {
            return Err(backend_error(response).await.into());
        }
        Ok(response.json().await?)
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    /// Lists indexed documents, serving the cached copy when it is warm.
    pub async fn list_documents(&self) -> Result<Vec<DocumentSummary>> {
        if let Ok(cache) = self.documents_cache.read() {
            if let Some(cached) = &*cache {
                tracing::debug!("Using cached document list");
                return Ok(cached.clone());
            }
        }

        let url = self.http.endpoint("docs");
        let response = self.http.send(|client| client.get(&url)).await?;
        if !response.status().is_success() {
            return Err(backend_error(response).await.into());
        }

        let parsed: DocumentListResponse = response.json().await?;
        if let Ok(mut cache) = self.documents_cache.write() {
            *cache = Some(parsed.documents.clone());
        }
        Ok(parsed.documents)
    }

    /// Uploads files for indexing and invalidates the document cache.
    ///
    /// The backend expects a multipart form with one `files` part per file.
    pub async fn upload_documents(&self, files: &[UploadFile]) -> Result<UploadResponse> {
        if files.is_empty() {
            return Err(AskdocsError::Input("No files to upload".to_string()).into());
        }

        let url = self.http.endpoint("upload");
        let response = self
            .http
            .send(|client| {
                let mut form = Form::new();
                for file in files {
                    let part = Part::bytes(file.bytes.clone()).file_name(file.filename.clone());
                    // The hardcoded MIME strings always parse; fall back to
                    // the default part on the impossible branch rather than
                    // panic inside the builder closure.
                    let part = match part.mime_str(&file.content_type) {
                        Ok(part) => part,
                        Err(_) => {
                            Part::bytes(file.bytes.clone()).file_name(file.filename.clone())
                        }
                    };
                    form = form.part("files", part);
                }
                client.post(&url).multipart(form)
            })
            .await?;
        if !response.status().is_success() {
            return Err(backend_error(response).await.into());
        }

        let receipt: UploadResponse = response.json().await?;
        tracing::info!("Uploaded {} documents", receipt.count);
        self.invalidate_documents_cache();
        Ok(receipt)
    }

    /// Deletes one document by id and invalidates the document cache.
    pub async fn delete_document(&self, id: &str) -> Result<()> {
        let url = self.http.endpoint(&format!("docs/{}", id));
        let response = self.http.send(|client| client.delete(&url)).await?;
        if !response.status().is_success() {
            return Err(backend_error(response).await.into());
        }
        tracing::info!("Deleted document {}", id);
        self.invalidate_documents_cache();
        Ok(())
    }

    fn invalidate_documents_cache(&self) {
        if let Ok(mut cache) = self.documents_cache.write() {
            *cache = None;
        }
    }

    // -----------------------------------------------------------------------
    // Questions and titles
    // -----------------------------------------------------------------------

    /// Asks a question against the indexed documents.
    ///
    /// `chat_session_id` rides along when the question belongs to a chat
    /// session so backends that track multi-turn context can use it.
    pub async fn ask_question(
        &self,
        question: &str,
        chat_session_id: Option<Uuid>,
    ) -> Result<AskResponse> {
        let url = self.http.endpoint("ask");
        let request = AskRequest {
            question: question.to_string(),
            chat_session_id,
        };

        let response = self
            .http
            .send(|client| client.post(&url).json(&request))
            .await?;
        if !response.status().is_success() {
            return Err(backend_error(response).await.into());
        }
        Ok(response.json().await?)
    }

    /// Generates a short title for a conversation transcript.
    pub async fn generate_session_title(&self, context: &str) -> Result<String> {
        let url = self.http.endpoint("ask/title");
        let request = TitleRequest {
            context: context.to_string(),
        };

        let response = self
            .http
            .send(|client| client.post(&url).json(&request))
            .await?;
        if !response.status().is_success() {
            return Err(backend_error(response).await.into());
        }

        let parsed: TitleResponse = response.json().await?;
        Ok(parsed.title)
    }
}

/// Converts a rejected response into the error surfaced to the user.
///
/// The body text is carried verbatim so messages like `Document not found`
/// reach the terminal exactly as the backend wrote them.
async fn backend_error(response: Response) -> AskdocsError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        "Request failed".to_string()
    } else {
        body
    };
    AskdocsError::Backend { status, message }
}
