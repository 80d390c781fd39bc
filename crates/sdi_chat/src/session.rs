//! Session gate guarding the generation workspace.
//!
//! A session exists once a credential pair has been accepted and lasts
//! until `logout`. Stores decide where the session lives: in memory for a
//! single process, or in `<workspace>/.sdi/session.json` so it survives
//! between CLI invocations.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use sdi_core::config::STATE_DIR;
use sdi_core::AuthConfig;

/// Name of the session file inside the state directory.
pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Login required")]
    NotAuthenticated,

    #[error("Session store error: {0}")]
    Store(String),
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Store(err.to_string())
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            created_at: Utc::now(),
        }
    }
}

/// Decides whether a credential pair is accepted.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Accepts exactly one configured pair.
#[derive(Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_config(auth: &AuthConfig) -> Self {
        Self::new(auth.username.clone(), auth.password.clone())
    }
}

impl Default for StaticCredentials {
    fn default() -> Self {
        Self::from_config(&AuthConfig::default())
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

/// Where the current session is kept.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> SessionResult<Option<Session>>;
    fn store(&self, session: &Session) -> SessionResult<()>;
    fn clear(&self) -> SessionResult<()>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> SessionResult<std::sync::MutexGuard<'_, Option<Session>>> {
        self.session
            .lock()
            .map_err(|_| SessionError::Store("session lock poisoned".to_string()))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> SessionResult<Option<Session>> {
        Ok(self.slot()?.clone())
    }

    fn store(&self, session: &Session) -> SessionResult<()> {
        *self.slot()? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> SessionResult<()> {
        *self.slot()? = None;
        Ok(())
    }
}

/// Store backed by `<workspace>/.sdi/session.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(workspace_root: impl AsRef<Path>) -> Self {
        Self {
            path: workspace_root.as_ref().join(STATE_DIR).join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> SessionResult<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // An unreadable file is treated as no session.
                warn!("Ignoring corrupt session file {:?}: {}", self.path, e);
                Ok(None)
            }
        }
    }

    fn store(&self, session: &Session) -> SessionResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, content)?;
        debug!("Session saved to {:?}", self.path);
        Ok(())
    }

    fn clear(&self) -> SessionResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            debug!("Session file removed: {:?}", self.path);
        }
        Ok(())
    }
}

/// Explicit session context: verifies credentials and owns the
/// authenticated flag through its store.
pub struct SessionGate {
    verifier: Arc<dyn CredentialVerifier>,
    store: Box<dyn SessionStore>,
}

impl SessionGate {
    pub fn new(verifier: Arc<dyn CredentialVerifier>, store: Box<dyn SessionStore>) -> Self {
        Self { verifier, store }
    }

    /// In-memory gate accepting the configured pair.
    pub fn in_memory(auth: &AuthConfig) -> Self {
        Self::new(
            Arc::new(StaticCredentials::from_config(auth)),
            Box::new(MemorySessionStore::new()),
        )
    }

    /// File-backed gate for a workspace.
    pub fn for_workspace(workspace_root: impl AsRef<Path>, auth: &AuthConfig) -> Self {
        Self::new(
            Arc::new(StaticCredentials::from_config(auth)),
            Box::new(FileSessionStore::new(workspace_root)),
        )
    }

    /// Accept or reject a credential pair. A rejected attempt leaves any
    /// existing session untouched.
    pub fn login(&self, username: &str, password: &str) -> SessionResult<Session> {
        if !self.verifier.verify(username, password) {
            warn!("Login rejected for user '{}'", username);
            return Err(SessionError::InvalidCredentials);
        }
        let session = Session::new(username);
        self.store.store(&session)?;
        info!("User '{}' logged in", username);
        Ok(session)
    }

    /// Current session, if any.
    pub fn check_session(&self) -> SessionResult<Option<Session>> {
        self.store.load()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.store.load(), Ok(Some(_)))
    }

    /// Entry check for protected operations.
    pub fn require_session(&self) -> SessionResult<Session> {
        self.store.load()?.ok_or(SessionError::NotAuthenticated)
    }

    pub fn logout(&self) -> SessionResult<()> {
        self.store.clear()?;
        info!("Logged out");
        Ok(())
    }
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
