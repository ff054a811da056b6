use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponseParts, ResponseParts},
};
use axum_extra::extract::{
    cookie::{Cookie, Key, SameSite},
    SignedCookieJar,
};
use std::convert::Infallible;

use super::token::SessionToken;

pub const SESSION_COOKIE_NAME: &str = "session-id";
pub const FLASH_COOKIE_NAME: &str = "flash-data";

/// Attributes shared by every cookie the application sets.
#[derive(Clone, Copy, Debug, Default)]
pub struct CookiePolicy {
    pub secure: bool,
}

impl CookiePolicy {
    #[must_use]
    pub fn cookie(self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .build()
    }

    /// Removal cookie; the path must match the one used when setting it.
    #[must_use]
    pub fn removal(name: &'static str) -> Cookie<'static> {
        Cookie::build((name, "")).path("/").build()
    }
}

/// Signed cookie jar carrying the session token and the flash queue.
///
/// Cookies with a bad signature are invisible through this type, so a tampered
/// session cookie reads as no session and a tampered flash cookie as an empty
/// queue. Returned from a handler it emits the pending `Set-Cookie` headers.
pub struct CookieCarrier {
    jar: SignedCookieJar,
    policy: CookiePolicy,
}

impl CookieCarrier {
    #[must_use]
    pub fn new(jar: SignedCookieJar, policy: CookiePolicy) -> Self {
        Self { jar, policy }
    }

    /// Token from the session cookie, if present and correctly signed.
    #[must_use]
    pub fn session_token(&self) -> Option<String> {
        self.jar
            .get(SESSION_COOKIE_NAME)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    }

    #[must_use]
    pub fn with_session(self, token: &SessionToken) -> Self {
        let cookie = self
            .policy
            .cookie(SESSION_COOKIE_NAME, token.as_str().to_string());
        Self {
            jar: self.jar.add(cookie),
            policy: self.policy,
        }
    }

    /// Expire the session cookie on the client.
    #[must_use]
    pub fn without_session(self) -> Self {
        Self {
            jar: self.jar.remove(CookiePolicy::removal(SESSION_COOKIE_NAME)),
            policy: self.policy,
        }
    }

    pub(super) fn flash_value(&self) -> Option<String> {
        self.jar
            .get(FLASH_COOKIE_NAME)
            .map(|cookie| cookie.value().to_string())
    }

    pub(super) fn with_flash_value(self, value: String) -> Self {
        let cookie = self.policy.cookie(FLASH_COOKIE_NAME, value);
        Self {
            jar: self.jar.add(cookie),
            policy: self.policy,
        }
    }

    pub(super) fn without_flash(self) -> Self {
        Self {
            jar: self.jar.remove(CookiePolicy::removal(FLASH_COOKIE_NAME)),
            policy: self.policy,
        }
    }
}

impl<S> FromRequestParts<S> for CookieCarrier
where
    S: Send + Sync,
    Key: FromRef<S>,
    CookiePolicy: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, Key::from_ref(state));
        Ok(Self::new(jar, CookiePolicy::from_ref(state)))
    }
}

impl IntoResponseParts for CookieCarrier {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.jar.into_response_parts(res)
    }
}
