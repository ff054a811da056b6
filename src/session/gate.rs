//! Per-request access decision.

use std::net::IpAddr;

use super::{store::SessionStore, token::SessionToken};
use crate::accounts::Identity;
use crate::locale::LocaleCache;

/// Page a request targets, derived from the first path segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Page {
    Login,
    Signup,
    NotFound,
    Dashboard,
    Logout,
    Profile,
    Other(String),
}

impl Page {
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let segment = path.trim_start_matches('/').split('/').next().unwrap_or("");
        match segment {
            "login" => Self::Login,
            "signup" => Self::Signup,
            "404" => Self::NotFound,
            "" | "dashboard" => Self::Dashboard,
            "logout" => Self::Logout,
            "profile" => Self::Profile,
            other => Self::Other(other.to_string()),
        }
    }

    /// Pages served without a session.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::Login | Self::Signup | Self::NotFound)
    }
}

/// Who is making the request, evaluated fresh for every request.
#[derive(Clone, Debug)]
pub enum AccessState {
    Anonymous {
        locale: String,
    },
    Authenticated {
        identity: Identity,
        token: SessionToken,
        locale: String,
    },
}

impl AccessState {
    #[must_use]
    pub fn locale(&self) -> &str {
        match self {
            Self::Anonymous { locale } | Self::Authenticated { locale, .. } => locale,
        }
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Anonymous { .. } => None,
            Self::Authenticated { identity, .. } => Some(identity),
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectToLogin,
}

#[must_use]
pub const fn check_access(state: &AccessState, page: &Page) -> GateDecision {
    if page.is_public() || state.is_authenticated() {
        GateDecision::Allow
    } else {
        GateDecision::RedirectToLogin
    }
}

/// Resolve the access state from the session token and the client address.
///
/// The locale is the one bound to the identity when it has one, otherwise the
/// cached lookup for the address.
pub async fn resolve_access(
    sessions: &SessionStore,
    locales: &LocaleCache,
    token: Option<String>,
    address: Option<IpAddr>,
) -> AccessState {
    let resolved = match token {
        Some(token) => sessions
            .resolve(&token)
            .await
            .map(|identity| (identity, SessionToken::from(token))),
        None => None,
    };

    match resolved {
        Some((identity, token)) => {
            let locale = match identity.bound_locale() {
                Some(locale) => locale.to_string(),
                None => locales.locale_for(address).await,
            };
            AccessState::Authenticated {
                identity,
                token,
                locale,
            }
        }
        None => AccessState::Anonymous {
            locale: locales.locale_for(address).await,
        },
    }
}
