use chrono::{DateTime, Utc};

/// A user account as stored by the account store.
///
/// Sessions only ever hold cloned snapshots of this record; state changes
/// produce a new value that is written back through [`super::AccountStore::update`].
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct Identity {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
    /// Empty until the account is bound to a locale.
    pub locale: String,
    pub online: bool,
    pub last_seen: Option<DateTime<Utc>>,
}

impl Identity {
    #[must_use]
    pub fn new(email: String, username: String, password_hash: String, locale: String) -> Self {
        Self {
            email,
            username,
            password_hash,
            is_admin: false,
            locale,
            online: false,
            last_seen: None,
        }
    }

    /// Case-insensitive comparison against the username.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.username.to_lowercase() == name.to_lowercase()
    }

    /// Case-insensitive match on either the email or the username.
    #[must_use]
    pub fn matches_login(&self, field: &str) -> bool {
        let field = field.to_lowercase();
        self.username.to_lowercase() == field || self.email.to_lowercase() == field
    }

    /// Snapshot marked online, stored in the session table at login.
    #[must_use]
    pub fn signed_in(&self) -> Self {
        Self {
            online: true,
            ..self.clone()
        }
    }

    /// Snapshot marked offline, written back to the account store at logout.
    #[must_use]
    pub fn signed_out(&self, at: DateTime<Utc>) -> Self {
        Self {
            online: false,
            last_seen: Some(at),
            ..self.clone()
        }
    }

    /// Copy of the account with administrator rights.
    #[must_use]
    pub fn promoted(&self) -> Self {
        Self {
            is_admin: true,
            ..self.clone()
        }
    }

    /// Locale bound to the account, if any.
    #[must_use]
    pub fn bound_locale(&self) -> Option<&str> {
        if self.locale.is_empty() {
            None
        } else {
            Some(&self.locale)
        }
    }
}
