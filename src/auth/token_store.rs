//! Credential persistence via OS keyring
//!
//! This module stores the access/refresh token pair issued by the backend
//! using the operating system's native credential store (Keychain on macOS,
//! Secret Service on Linux, Windows Credential Manager on Windows).
//!
//! Storage is exposed behind the [`TokenStore`] trait so the request client
//! receives an injected service instead of reaching for a global. The two
//! keyring entry names are stable identifiers; changing them would orphan
//! credentials saved by earlier versions of the client.

use std::sync::RwLock;

// ---------------------------------------------------------------------------
// TokenPair
// ---------------------------------------------------------------------------

/// A complete access/refresh token pair issued by the backend.
///
/// Written on login or refresh success and cleared on logout or an
/// irrecoverable refresh failure. The expiry values are informational only;
/// no timer is scheduled against them, since an expired access token is
/// discovered reactively through a 401 response.
///
/// # Examples
///
/// ```
/// use askdocs::auth::TokenPair;
///
/// let pair = TokenPair::new("access", "refresh");
/// assert_eq!(pair.access_token, "access");
/// assert!(pair.access_expires_in.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Short-lived bearer credential attached to API calls.
    pub access_token: String,

    /// Longer-lived credential exchanged for a fresh pair when the access
    /// token expires.
    pub refresh_token: String,

    /// Access token lifetime in seconds, when the backend reported one.
    pub access_expires_in: Option<u64>,

    /// Refresh token lifetime in seconds, when the backend reported one.
    pub refresh_expires_in: Option<u64>,
}

impl TokenPair {
    /// Creates a pair with no expiry information.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            access_expires_in: None,
            refresh_expires_in: None,
        }
    }
}

// ---------------------------------------------------------------------------
// TokenStore trait
// ---------------------------------------------------------------------------

/// Synchronous credential storage injected into the request client.
///
/// The store holds either a complete pair or nothing; implementations must
/// never leave a partial pair (access without refresh) behind. Operations do
/// not fail outward: when the backing storage is unusable they log a warning
/// and degrade to a no-op, so an unavailable keyring never takes the client
/// down with it.
pub trait TokenStore: Send + Sync {
    /// Persists both tokens, overwriting any prior pair.
    fn set_tokens(&self, pair: &TokenPair);

    /// Returns the current access token, if one is stored.
    fn access_token(&self) -> Option<String>;

    /// Returns the current refresh token, if one is stored.
    fn refresh_token(&self) -> Option<String>;

    /// Removes all stored credentials.
    fn clear(&self);
}

// ---------------------------------------------------------------------------
// KeyringTokenStore
// ---------------------------------------------------------------------------

/// Keyring service name under which both token entries live.
const KEYRING_SERVICE: &str = "askdocs";

/// Entry name for the access token. Stable across releases.
const ACCESS_TOKEN_KEY: &str = "access_token";

/// Entry name for the refresh token. Stable across releases.
const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Stateless accessor for the OS native keyring.
///
/// Both tokens are stored as plain entry passwords under the `askdocs`
/// service, one entry per token. Expiry metadata is not persisted; only the
/// two token strings survive between runs.
///
/// # Examples
///
/// ```no_run
/// use askdocs::auth::{KeyringTokenStore, TokenPair, TokenStore};
///
/// let store = KeyringTokenStore;
/// store.set_tokens(&TokenPair::new("access", "refresh"));
/// assert_eq!(store.access_token().as_deref(), Some("access"));
/// store.clear();
/// ```
pub struct KeyringTokenStore;

impl KeyringTokenStore {
    fn write_entry(key: &str, value: &str) -> bool {
        let entry = match keyring::Entry::new(KEYRING_SERVICE, key) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Keyring unavailable, not persisting {}: {}", key, e);
                return false;
            }
        };
        match entry.set_password(value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to persist {} to keyring: {}", key, e);
                false
            }
        }
    }

    fn read_entry(key: &str) -> Option<String> {
        let entry = match keyring::Entry::new(KEYRING_SERVICE, key) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Keyring unavailable, cannot read {}: {}", key, e);
                return None;
            }
        };
        match entry.get_password() {
            Ok(value) => Some(value),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                tracing::warn!("Failed to read {} from keyring: {}", key, e);
                None
            }
        }
    }

    fn delete_entry(key: &str) {
        let entry = match keyring::Entry::new(KEYRING_SERVICE, key) {
            Ok(entry) => entry,
            Err(_) => return,
        };
        match entry.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => tracing::warn!("Failed to delete {} from keyring: {}", key, e),
        }
    }
}

impl TokenStore for KeyringTokenStore {
    fn set_tokens(&self, pair: &TokenPair) {
        let wrote_access = Self::write_entry(ACCESS_TOKEN_KEY, &pair.access_token);
        let wrote_refresh = Self::write_entry(REFRESH_TOKEN_KEY, &pair.refresh_token);
        // A half-written pair would let a stale refresh token outlive a new
        // access token, so roll back to empty instead.
        if !(wrote_access && wrote_refresh) {
            tracing::warn!("Incomplete token write, clearing stored credentials");
            self.clear();
        }
    }

    fn access_token(&self) -> Option<String> {
        Self::read_entry(ACCESS_TOKEN_KEY)
    }

    fn refresh_token(&self) -> Option<String> {
        Self::read_entry(REFRESH_TOKEN_KEY)
    }

    fn clear(&self) {
        Self::delete_entry(ACCESS_TOKEN_KEY);
        Self::delete_entry(REFRESH_TOKEN_KEY);
    }
}

// ---------------------------------------------------------------------------
// MemoryTokenStore
// ---------------------------------------------------------------------------

/// In-process token store used by tests and one-shot tooling.
///
/// Holds the pair behind an `RwLock` so it can be shared across tasks the
/// same way the keyring store is.
///
/// # Examples
///
/// ```
/// use askdocs::auth::{MemoryTokenStore, TokenPair, TokenStore};
///
/// let store = MemoryTokenStore::default();
/// assert!(store.access_token().is_none());
/// store.set_tokens(&TokenPair::new("a", "r"));
/// assert_eq!(store.refresh_token().as_deref(), Some("r"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    pair: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStore {
    /// Returns a copy of the stored pair, mainly for test assertions.
    pub fn snapshot(&self) -> Option<TokenPair> {
        match self.pair.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn set_tokens(&self, pair: &TokenPair) {
        match self.pair.write() {
            Ok(mut guard) => *guard = Some(pair.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(pair.clone()),
        }
    }

    fn access_token(&self) -> Option<String> {
        self.snapshot().map(|pair| pair.access_token)
    }

    fn refresh_token(&self) -> Option<String> {
        self.snapshot().map(|pair| pair.refresh_token)
    }

    fn clear(&self) {
        match self.pair.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // MemoryTokenStore
    // -----------------------------------------------------------------------

    #[test]
    fn test_memory_store_starts_empty() {
        let store = MemoryTokenStore::default();
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
    }

    #[test]
    fn test_get_returns_most_recently_set_access_token() {
        let store = MemoryTokenStore::default();
        store.set_tokens(&TokenPair::new("first_access", "first_refresh"));
        store.set_tokens(&TokenPair::new("second_access", "second_refresh"));

        assert_eq!(store.access_token().as_deref(), Some("second_access"));
        assert_eq!(store.refresh_token().as_deref(), Some("second_refresh"));
    }

    #[test]
    fn test_clear_empties_the_store() {
        let store = MemoryTokenStore::default();
        store.set_tokens(&TokenPair::new("a", "r"));
        store.clear();

        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_set_overwrites_whole_pair() {
        let store = MemoryTokenStore::default();
        let mut pair = TokenPair::new("a1", "r1");
        pair.access_expires_in = Some(1800);
        store.set_tokens(&pair);

        store.set_tokens(&TokenPair::new("a2", "r2"));
        let snapshot = store.snapshot().expect("pair present");
        assert_eq!(snapshot.access_token, "a2");
        // Expiry info from the earlier pair must not leak into the new one.
        assert!(snapshot.access_expires_in.is_none());
    }

    #[test]
    fn test_token_store_is_object_safe() {
        fn take_store(_store: &dyn TokenStore) {}
        take_store(&MemoryTokenStore::default());
        take_store(&KeyringTokenStore);
    }

    // -----------------------------------------------------------------------
    // Keyring integration tests  (require system keyring; skipped in CI)
    // -----------------------------------------------------------------------

    #[test]
    #[ignore = "requires system keyring"]
    fn test_keyring_roundtrip() {
        let store = KeyringTokenStore;
        store.set_tokens(&TokenPair::new("integration_access", "integration_refresh"));

        assert_eq!(store.access_token().as_deref(), Some("integration_access"));
        assert_eq!(
            store.refresh_token().as_deref(),
            Some("integration_refresh")
        );

        store.clear();
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
    }

    #[test]
    #[ignore = "requires system keyring"]
    fn test_keyring_clear_is_idempotent() {
        let store = KeyringTokenStore;
        // Clearing an empty store must not panic or log errors.
        store.clear();
        store.clear();
    }
}
