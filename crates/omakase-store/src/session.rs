//! Session identity backed by the tab's store.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::Storage;

/// Default storage key holding the session token.
pub const DEFAULT_SESSION_KEY: &str = "sessionId";

/// An opaque session identifier.
///
/// The client never interprets the value; it is only echoed to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a session ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new universally-unique session ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the session ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Per-tab session identity provider.
///
/// The token is created lazily on the first call to [`session_id`], written
/// to the store once, and memoized for the lifetime of the provider. Storage
/// failures are logged and never surfaced.
///
/// # Example
///
/// ```rust,ignore
/// let identity = SessionIdentity::new(storage);
/// let token = identity.session_id();
/// request.header("session-id", token.as_str());
/// ```
///
/// [`session_id`]: SessionIdentity::session_id
#[derive(Debug)]
pub struct SessionIdentity {
    storage: Storage,
    key: String,
    current: OnceLock<SessionId>,
}

impl SessionIdentity {
    /// Create a provider using the default storage key.
    pub fn new(storage: Storage) -> Self {
        Self::with_key(storage, DEFAULT_SESSION_KEY)
    }

    /// Create a provider using a custom storage key.
    pub fn with_key(storage: Storage, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            current: OnceLock::new(),
        }
    }

    /// Get the session token, creating and persisting it on first use.
    pub fn session_id(&self) -> SessionId {
        self.current.get_or_init(|| self.load_or_create()).clone()
    }

    /// Storage key holding the token.
    pub fn key(&self) -> &str {
        &self.key
    }

    fn load_or_create(&self) -> SessionId {
        match self.storage.get_string(&self.key) {
            Ok(Some(existing)) if !existing.is_empty() => {
                debug!(key = %self.key, "reusing persisted session id");
                return SessionId::new(existing);
            }
            Ok(_) => {}
            Err(e) => warn!(key = %self.key, error = %e, "failed to read session id"),
        }

        let id = SessionId::generate();
        if let Err(e) = self.storage.set_string(&self.key, id.as_str()) {
            warn!(key = %self.key, error = %e, "failed to persist session id");
        }
        debug!(key = %self.key, "created session id");
        id
    }
}
