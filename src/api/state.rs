use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use std::sync::Arc;

use crate::accounts::{AccountStore, PasswordVerifier};
use crate::locale::{LocaleCache, Translator};
use crate::session::{CookiePolicy, SessionStore};

/// Shared handles every handler can reach.
#[derive(Clone)]
pub struct AppState {
    sessions: Arc<SessionStore>,
    accounts: Arc<dyn AccountStore>,
    passwords: Arc<dyn PasswordVerifier>,
    translator: Arc<dyn Translator>,
    locales: Arc<LocaleCache>,
    cookie_key: Key,
    cookie_policy: CookiePolicy,
}

impl AppState {
    /// Sessions default to the in-memory backend over `accounts`.
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        passwords: Arc<dyn PasswordVerifier>,
        translator: Arc<dyn Translator>,
        locales: Arc<LocaleCache>,
        cookie_key: Key,
    ) -> Self {
        Self {
            sessions: Arc::new(SessionStore::in_memory(accounts.clone())),
            accounts,
            passwords,
            translator,
            locales,
            cookie_key,
            cookie_policy: CookiePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = Arc::new(sessions);
        self
    }

    #[must_use]
    pub fn with_cookie_policy(mut self, cookie_policy: CookiePolicy) -> Self {
        self.cookie_policy = cookie_policy;
        self
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[must_use]
    pub fn accounts(&self) -> &dyn AccountStore {
        self.accounts.as_ref()
    }

    #[must_use]
    pub fn passwords(&self) -> Arc<dyn PasswordVerifier> {
        self.passwords.clone()
    }

    #[must_use]
    pub fn translator(&self) -> &dyn Translator {
        self.translator.as_ref()
    }

    #[must_use]
    pub fn locales(&self) -> &LocaleCache {
        &self.locales
    }

    #[must_use]
    pub const fn cookie_policy(&self) -> CookiePolicy {
        self.cookie_policy
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl FromRef<AppState> for CookiePolicy {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_policy()
    }
}
