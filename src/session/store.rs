//! Token to identity table.
//!
//! The table only ever holds snapshots. `create_session` stores an online copy
//! of the identity and `invalidate` writes an offline copy back to the account
//! store; nothing else mutates either side.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::token::{generate_session_token, SessionToken};
use super::SessionError;
use crate::accounts::{AccountStore, Identity};

/// Regeneration attempts before giving up on a colliding token.
const MAX_TOKEN_ATTEMPTS: usize = 8;

/// Storage for live sessions.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Insert a new entry. Returns `false` and leaves the table untouched when
    /// the token is already live.
    async fn insert(&self, token: &SessionToken, identity: Identity) -> bool;

    async fn get(&self, token: &str) -> Option<Identity>;

    async fn remove(&self, token: &str) -> Option<Identity>;

    async fn len(&self) -> usize;
}

/// Process-local session table behind a mutex.
#[derive(Debug, Default)]
pub struct MemorySessionBackend {
    entries: Mutex<HashMap<SessionToken, Identity>>,
}

impl MemorySessionBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionBackend for MemorySessionBackend {
    async fn insert(&self, token: &SessionToken, identity: Identity) -> bool {
        let mut entries = self.entries.lock().await;
        if entries.contains_key(token) {
            return false;
        }
        entries.insert(token.clone(), identity);
        true
    }

    async fn get(&self, token: &str) -> Option<Identity> {
        let key = SessionToken::from(token.to_string());
        self.entries.lock().await.get(&key).cloned()
    }

    async fn remove(&self, token: &str) -> Option<Identity> {
        let key = SessionToken::from(token.to_string());
        self.entries.lock().await.remove(&key)
    }

    async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

type TokenGenerator = fn() -> Result<SessionToken, SessionError>;

pub struct SessionStore {
    backend: Arc<dyn SessionBackend>,
    accounts: Arc<dyn AccountStore>,
    generate: TokenGenerator,
}

impl SessionStore {
    #[must_use]
    pub fn new(backend: Arc<dyn SessionBackend>, accounts: Arc<dyn AccountStore>) -> Self {
        Self {
            backend,
            accounts,
            generate: generate_session_token,
        }
    }

    /// Store backed by [`MemorySessionBackend`].
    #[must_use]
    pub fn in_memory(accounts: Arc<dyn AccountStore>) -> Self {
        Self::new(Arc::new(MemorySessionBackend::new()), accounts)
    }

    #[must_use]
    pub fn with_token_generator(mut self, generate: TokenGenerator) -> Self {
        self.generate = generate;
        self
    }

    /// Issue a new token for `identity` and store an online snapshot of it.
    ///
    /// # Errors
    /// Fails when secure randomness is unavailable or no free token turns up.
    pub async fn create_session(&self, identity: &Identity) -> Result<SessionToken, SessionError> {
        let snapshot = identity.signed_in();
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = (self.generate)()?;
            if self.backend.insert(&token, snapshot.clone()).await {
                debug!("Session created for {}", identity.username);
                return Ok(token);
            }
            warn!("Generated session token collides with a live session, regenerating");
        }
        Err(SessionError::TokenCollision(MAX_TOKEN_ATTEMPTS))
    }

    /// Identity bound to `token`, if the session is live.
    pub async fn resolve(&self, token: &str) -> Option<Identity> {
        if token.is_empty() {
            return None;
        }
        self.backend.get(token).await
    }

    /// Drop the session and persist the identity as offline.
    ///
    /// Unknown tokens are a no-op and return `Ok(None)`. The entry is removed
    /// before the write-back, so a failed write-back still ends the session.
    ///
    /// # Errors
    /// Returns [`SessionError::WriteBack`] if the account store rejects the update.
    pub async fn invalidate(&self, token: &str) -> Result<Option<Identity>, SessionError> {
        let Some(identity) = self.backend.remove(token).await else {
            return Ok(None);
        };

        let offline = identity.signed_out(Utc::now());
        self.accounts.update(&offline).await?;
        debug!("Session closed for {}", offline.username);

        Ok(Some(offline))
    }

    /// Number of live sessions.
    pub async fn live_sessions(&self) -> usize {
        self.backend.len().await
    }
}
