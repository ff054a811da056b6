//! Account store interface and the in-memory implementation.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use super::Identity;

/// Unique account attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountField {
    Email,
    Username,
}

impl std::fmt::Display for AccountField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::Username => f.write_str("username"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AccountStoreError {
    #[error("account store query failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0} already in use")]
    Duplicate(AccountField),
    #[error("account not found: {0}")]
    NotFound(String),
}

/// Lookups and writes against the account store.
///
/// Every email and username comparison is case-insensitive. `update` is keyed
/// by email.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AccountStoreError>;

    async fn find_by_username(&self, username: &str)
        -> Result<Option<Identity>, AccountStoreError>;

    async fn find_by_email_or_username(
        &self,
        field: &str,
    ) -> Result<Option<Identity>, AccountStoreError>;

    async fn insert(&self, identity: &Identity) -> Result<(), AccountStoreError>;

    async fn update(&self, identity: &Identity) -> Result<(), AccountStoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), AccountStoreError>;
}

/// Give `username` administrator rights. Returns the updated account, or
/// `None` when no such account exists.
///
/// # Errors
/// Returns an error if the lookup or the write-back fails.
pub async fn grant_admin(
    store: &dyn AccountStore,
    username: &str,
) -> Result<Option<Identity>, AccountStoreError> {
    let Some(identity) = store.find_by_username(username).await? else {
        return Ok(None);
    };
    if identity.is_admin {
        return Ok(Some(identity));
    }

    let admin = identity.promoted();
    store.update(&admin).await?;
    Ok(Some(admin))
}

/// Account store backed by a vector, used when no DSN is configured and in tests.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<Vec<Identity>>,
}

impl MemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }

    async fn find_by<F>(&self, predicate: F) -> Option<Identity>
    where
        F: Fn(&Identity) -> bool,
    {
        self.accounts
            .read()
            .await
            .iter()
            .find(|identity| predicate(identity))
            .cloned()
    }
}

fn same(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AccountStoreError> {
        Ok(self.find_by(|identity| same(&identity.email, email)).await)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Identity>, AccountStoreError> {
        Ok(self.find_by(|identity| identity.is_named(username)).await)
    }

    async fn find_by_email_or_username(
        &self,
        field: &str,
    ) -> Result<Option<Identity>, AccountStoreError> {
        Ok(self.find_by(|identity| identity.matches_login(field)).await)
    }

    async fn insert(&self, identity: &Identity) -> Result<(), AccountStoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts
            .iter()
            .any(|existing| same(&existing.email, &identity.email))
        {
            return Err(AccountStoreError::Duplicate(AccountField::Email));
        }
        if accounts
            .iter()
            .any(|existing| existing.is_named(&identity.username))
        {
            return Err(AccountStoreError::Duplicate(AccountField::Username));
        }
        accounts.push(identity.clone());
        Ok(())
    }

    async fn update(&self, identity: &Identity) -> Result<(), AccountStoreError> {
        let mut accounts = self.accounts.write().await;
        let Some(existing) = accounts
            .iter_mut()
            .find(|existing| same(&existing.email, &identity.email))
        else {
            return Err(AccountStoreError::NotFound(identity.email.clone()));
        };
        *existing = identity.clone();
        Ok(())
    }

    async fn ping(&self) -> Result<(), AccountStoreError> {
        Ok(())
    }
}
