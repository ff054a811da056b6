use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::accounts::{validation::InvalidField, AccountField, AccountStoreError, PasswordError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("secure randomness unavailable: {0}")]
    RandomnessUnavailable(#[from] rand::Error),
    #[error("could not find a free session token after {0} attempts")]
    TokenCollision(usize),
    #[error("failed to write back account: {0}")]
    WriteBack(#[from] AccountStoreError),
}

/// Why a login attempt was refused. Both cases look the same to the client
/// apart from the flash text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialFailure {
    UnknownAccount,
    WrongPassword,
}

impl CredentialFailure {
    #[must_use]
    pub const fn translation_key(self) -> &'static str {
        match self {
            Self::UnknownAccount => "error.user-no-exist",
            Self::WrongPassword => "error.invalid-credentials",
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("validation failed: {0:?}")]
    ValidationFailed(InvalidField),
    #[error("account conflict: {0} already in use")]
    AccountConflict(AccountField),
    #[error("invalid credentials: {0:?}")]
    CredentialsInvalid(CredentialFailure),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Session(SessionError),
    #[error("account store failure: {0}")]
    Store(AccountStoreError),
}

impl AuthError {
    /// Translation key of the flash shown for recoverable failures, `None` for
    /// server errors.
    #[must_use]
    pub const fn flash_key(&self) -> Option<&'static str> {
        match self {
            Self::NotAuthenticated => Some("login.login-prompt"),
            Self::ValidationFailed(field) => Some(field.translation_key()),
            Self::AccountConflict(AccountField::Email) => Some("signup.email-in-use"),
            Self::AccountConflict(AccountField::Username) => Some("signup.username-in-use"),
            Self::CredentialsInvalid(reason) => Some(reason.translation_key()),
            Self::Password(_) => Some("signup.password-failure"),
            Self::Session(_) | Self::Store(_) => None,
        }
    }
}

impl From<AccountStoreError> for AuthError {
    fn from(err: AccountStoreError) -> Self {
        match err {
            AccountStoreError::Duplicate(field) => Self::AccountConflict(field),
            other => Self::Store(other),
        }
    }
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::WriteBack(store) => Self::from(store),
            other => Self::Session(other),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED.into_response(),
            Self::ValidationFailed(_)
            | Self::AccountConflict(_)
            | Self::CredentialsInvalid(_)
            | Self::Password(_) => StatusCode::BAD_REQUEST.into_response(),
            Self::Session(err) => {
                error!("Session failure: {err}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            Self::Store(err) => {
                error!("Account store failure: {err}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
