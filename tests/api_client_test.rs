use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use askdocs::api::{ApiClient, UploadFile};
use askdocs::auth::{MemoryTokenStore, TokenPair, TokenStore};
use askdocs::config::BackendConfig;
use askdocs::error::AskdocsError;

/// Builds a client against the mock server with an in-memory token store,
/// optionally seeded with a pair so authenticated calls start logged in.
fn client_against(server: &MockServer, seed: Option<TokenPair>) -> (ApiClient, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::default());
    if let Some(pair) = seed {
        store.set_tokens(&pair);
    }

    let config = BackendConfig {
        api_base: format!("{}/api", server.uri()),
        timeout_seconds: 5,
    };
    let client = ApiClient::new(&config, store.clone()).expect("client");
    (client, store)
}

fn token_body(access: &str, refresh: &str) -> serde_json::Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": 1800,
        "refresh_expires_in": 86400,
        "token_type": "bearer"
    })
}

/// Login stores exactly the returned pair and sends no bearer header
#[tokio::test]
async fn test_login_stores_returned_pair() {
    let server = MockServer::start().await;
    // Stale credentials linger from an earlier run; login must overwrite
    // them without ever attaching them to the login request itself.
    let (client, store) = client_against(&server, Some(TokenPair::new("stale", "stale-r")));

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(500).set_body_string("login must be unauthenticated"))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "a@b.com", "password": "x"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "T1",
            "refresh_token": "R1",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pair = client.login("a@b.com", "x").await.unwrap();
    assert_eq!(pair.access_token, "T1");

    let stored = store.snapshot().expect("pair stored");
    assert_eq!(stored.access_token, "T1");
    assert_eq!(stored.refresh_token, "R1");
}

/// A rejected login surfaces the backend's body text and stores nothing
#[tokio::test]
async fn test_login_failure_surfaces_body_and_stores_nothing() {
    let server = MockServer::start().await;
    let (client, store) = client_against(&server, None);

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid email or password."))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.login("a@b.com", "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid email or password.");
    assert!(store.snapshot().is_none());
}

/// Signup parses the created account from the 201 response
#[tokio::test]
async fn test_signup_returns_created_account() {
    let server = MockServer::start().await;
    let (client, store) = client_against(&server, None);

    Mock::given(method("POST"))
        .and(path("/api/auth/signup"))
        .and(body_json(json!({"email": "a@b.com", "password": "longenough"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "user-1",
            "email": "a@b.com",
            "created_at": "2025-03-01T10:15:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let account = client.signup("a@b.com", "longenough").await.unwrap();
    assert_eq!(account.id, "user-1");
    assert_eq!(account.email, "a@b.com");

    // Signup never touches the token store.
    assert!(store.snapshot().is_none());
}

/// Expired token: 401 -> refresh -> retried call succeeds with the new pair
#[tokio::test]
async fn test_ask_question_401_refresh_retry() {
    let server = MockServer::start().await;
    let (client, store) = client_against(&server, Some(TokenPair::new("T1", "R1")));

    // First attempt carries the stale token and is rejected.
    Mock::given(method("POST"))
        .and(path("/api/ask"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Could not validate credentials."))
        .expect(1)
        .mount(&server)
        .await;

    // The refresh exchange rotates the pair.
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({"refresh_token": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("T2", "R2")))
        .expect(1)
        .mount(&server)
        .await;

    // The retry carries the fresh token and succeeds.
    Mock::given(method("POST"))
        .and(path("/api/ask"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "X is...",
            "sources": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client.ask_question("What is X?", None).await.unwrap();
    assert_eq!(response.answer, "X is...");
    assert!(response.sources.is_empty());

    let stored = store.snapshot().expect("pair stored");
    assert_eq!(stored.access_token, "T2");
    assert_eq!(stored.refresh_token, "R2");
}

/// Persistent 401 triggers exactly one refresh and one retry, then gives up
#[tokio::test]
async fn test_persistent_401_retries_exactly_once() {
    let server = MockServer::start().await;
    let (client, _store) = client_against(&server, Some(TokenPair::new("T1", "R1")));

    Mock::given(method("POST"))
        .and(path("/api/ask"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Could not validate credentials."))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("T2", "R2")))
        .expect(1)
        .mount(&server)
        .await;

    // The retry is rejected too; no second refresh may follow.
    Mock::given(method("POST"))
        .and(path("/api/ask"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Could not validate credentials."))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.ask_question("What is X?", None).await.unwrap_err();
    assert_eq!(err.to_string(), "Could not validate credentials.");
}

/// A rejected refresh empties the store and suppresses the retry
#[tokio::test]
async fn test_refresh_rejection_clears_store_and_stops() {
    let server = MockServer::start().await;
    let (client, store) = client_against(&server, Some(TokenPair::new("T1", "R1")));

    // Only the initial request reaches the ask endpoint.
    Mock::given(method("POST"))
        .and(path("/api/ask"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Could not validate credentials."))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid refresh token."))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.ask_question("What is X?", None).await.unwrap_err();
    let err = err.downcast::<AskdocsError>().expect("askdocs error");
    assert!(matches!(err, AskdocsError::SessionExpired));
    assert!(store.snapshot().is_none());
}

/// With no credentials at all, a 401 fails fast without calling refresh
#[tokio::test]
async fn test_401_without_credentials_escalates_immediately() {
    let server = MockServer::start().await;
    let (client, store) = client_against(&server, None);

    Mock::given(method("POST"))
        .and(path("/api/ask"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Could not validate credentials."))
        .expect(1)
        .mount(&server)
        .await;

    // No mock for /api/auth/refresh: a request there would fail the test.
    let err = client.ask_question("What is X?", None).await.unwrap_err();
    let err = err.downcast::<AskdocsError>().expect("askdocs error");
    assert!(matches!(err, AskdocsError::SessionExpired));
    assert!(store.snapshot().is_none());
}

/// Document list is cached until an upload invalidates it
#[tokio::test]
async fn test_upload_invalidates_document_cache() {
    let server = MockServer::start().await;
    let (client, _store) = client_against(&server, Some(TokenPair::new("T1", "R1")));

    let doc = |id: &str, filename: &str| {
        json!({
            "id": id,
            "filename": filename,
            "content_type": "text/plain",
            "chunk_count": 3,
            "embedding_count": 3,
            "created_at": "2025-03-01T10:15:00"
        })
    };

    // Two fetches: one to warm the cache, one after invalidation.
    Mock::given(method("GET"))
        .and(path("/api/docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [doc("doc-1", "notes.txt")]
        })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "documents": [doc("doc-2", "a.txt"), doc("doc-3", "b.txt")],
            "count": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let first = client.list_documents().await.unwrap();
    assert_eq!(first.len(), 1);

    // Second list is served from the cache; the mock would fail on a third hit.
    let cached = client.list_documents().await.unwrap();
    assert_eq!(cached, first);

    let files = vec![
        UploadFile {
            filename: "a.txt".to_string(),
            content_type: "text/plain".to_string(),
            bytes: b"alpha".to_vec(),
        },
        UploadFile {
            filename: "b.txt".to_string(),
            content_type: "text/plain".to_string(),
            bytes: b"beta".to_vec(),
        },
    ];
    let receipt = client.upload_documents(&files).await.unwrap();
    assert_eq!(receipt.count, 2);
    assert_eq!(receipt.documents.len(), 2);

    // The cache was dropped, so this refetches (second expected GET).
    client.list_documents().await.unwrap();
}

/// The multipart body is rebuilt for the retry after a refresh
#[tokio::test]
async fn test_upload_retries_with_fresh_token_after_401() {
    let server = MockServer::start().await;
    let (client, _store) = client_against(&server, Some(TokenPair::new("T1", "R1")));

    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Could not validate credentials."))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("T2", "R2")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "documents": [{
                "id": "doc-1",
                "filename": "notes.txt",
                "content_type": "text/plain",
                "chunk_count": 1,
                "embedding_count": 1,
                "created_at": "2025-03-01T10:15:00"
            }],
            "count": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let files = vec![UploadFile {
        filename: "notes.txt".to_string(),
        content_type: "text/plain".to_string(),
        bytes: b"hello".to_vec(),
    }];
    let receipt = client.upload_documents(&files).await.unwrap();
    assert_eq!(receipt.count, 1);
}

/// Deleting an unknown id surfaces the backend's message verbatim
#[tokio::test]
async fn test_delete_missing_document_surfaces_body_text() {
    let server = MockServer::start().await;
    let (client, _store) = client_against(&server, Some(TokenPair::new("T1", "R1")));

    Mock::given(method("DELETE"))
        .and(path("/api/docs/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Document not found"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.delete_document("nope").await.unwrap_err();
    assert_eq!(err.to_string(), "Document not found");
}

/// An empty failure body falls back to the generic message
#[tokio::test]
async fn test_empty_error_body_falls_back_to_generic_message() {
    let server = MockServer::start().await;
    let (client, _store) = client_against(&server, Some(TokenPair::new("T1", "R1")));

    Mock::given(method("DELETE"))
        .and(path("/api/docs/doc-1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.delete_document("doc-1").await.unwrap_err();
    assert_eq!(err.to_string(), "Request failed");
}

/// Deletion invalidates the cached document list
#[tokio::test]
async fn test_delete_invalidates_document_cache() {
    let server = MockServer::start().await;
    let (client, _store) = client_against(&server, Some(TokenPair::new("T1", "R1")));

    Mock::given(method("GET"))
        .and(path("/api/docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "documents": [] })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/docs/doc-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.list_documents().await.unwrap();
    client.delete_document("doc-1").await.unwrap();
    client.list_documents().await.unwrap();
}

/// Title generation round-trips the transcript context
#[tokio::test]
async fn test_generate_session_title() {
    let server = MockServer::start().await;
    let (client, _store) = client_against(&server, Some(TokenPair::new("T1", "R1")));

    Mock::given(method("POST"))
        .and(path("/api/ask/title"))
        .and(body_json(json!({
            "context": "user: What is X?\nassistant: X is..."
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "About X"})))
        .expect(1)
        .mount(&server)
        .await;

    let title = client
        .generate_session_title("user: What is X?\nassistant: X is...")
        .await
        .unwrap();
    assert_eq!(title, "About X");
}

/// Logout clears local credentials even when the backend rejects the call
#[tokio::test]
async fn test_logout_clears_store_despite_backend_failure() {
    let server = MockServer::start().await;
    let (client, store) = client_against(&server, Some(TokenPair::new("T1", "R1")));

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    client.logout().await.unwrap();
    assert!(store.snapshot().is_none());
}

/// Health probe hits the API-prefixed endpoint without credentials
#[tokio::test]
async fn test_health_probe() {
    let server = MockServer::start().await;
    let (client, _store) = client_against(&server, None);

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "timestamp": "2025-03-01T10:15:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");
}
