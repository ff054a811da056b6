//! Router tests driving full request flows.

use super::{gate, router, AppState};
use crate::accounts::{
    AccountStore, Argon2Verifier, Identity, MemoryAccountStore, PasswordError, PasswordVerifier,
};
use crate::locale::{Catalog, FixedLocaleResolver, LocaleCache};
use crate::session::{CookieCarrier, CookiePolicy, SessionError, SessionStore, SessionToken};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        request, Request, StatusCode,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_extra::extract::{cookie::Key, SignedCookieJar};
use http_body_util::BodyExt;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tower::ServiceExt;

/// Fast stand-in for argon2.
struct PlainVerifier;

impl PasswordVerifier for PlainVerifier {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        Ok(format!("plain:{plaintext}"))
    }

    fn verify(&self, digest: &str, plaintext: &str) -> bool {
        digest == format!("plain:{plaintext}")
    }
}

struct TestApp {
    state: AppState,
    accounts: Arc<MemoryAccountStore>,
    key: Key,
}

impl TestApp {
    fn new() -> Result<Self> {
        Self::with_verifier(Arc::new(PlainVerifier))
    }

    fn with_verifier(passwords: Arc<dyn PasswordVerifier>) -> Result<Self> {
        let accounts = Arc::new(MemoryAccountStore::new());
        let translator = Arc::new(Catalog::embedded().context("embedded catalogs")?);
        let locales = Arc::new(LocaleCache::new(
            Arc::new(FixedLocaleResolver::new("FR")),
            "US",
        ));
        let key = Key::generate();
        let state = AppState::new(
            accounts.clone(),
            passwords,
            translator,
            locales,
            key.clone(),
        );
        Ok(Self {
            state,
            accounts,
            key,
        })
    }

    fn router(&self) -> Router {
        router(self.state.clone(), &resources_dir())
    }

    fn client(&self) -> TestClient {
        TestClient::new(self.router())
    }

    /// Signed `session-id` cookie pair for `token`, as a browser would send it.
    fn session_cookie(&self, token: &SessionToken) -> Option<String> {
        let carrier = CookieCarrier::new(SignedCookieJar::new(self.key.clone()), CookiePolicy::default())
            .with_session(token);
        (carrier, ())
            .into_response()
            .headers()
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(ToString::to_string)
    }
}

fn resources_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates/res")
}

/// Oneshot client that keeps cookies between requests.
struct TestClient {
    router: Router,
    cookies: BTreeMap<String, String>,
    forwarded_for: Option<&'static str>,
}

impl TestClient {
    fn new(router: Router) -> Self {
        Self {
            router,
            cookies: BTreeMap::new(),
            forwarded_for: None,
        }
    }

    fn from_address(mut self, address: &'static str) -> Self {
        self.forwarded_for = Some(address);
        self
    }

    fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    fn set_raw_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    async fn send(&mut self, mut builder: request::Builder, body: Body) -> Result<Response> {
        if !self.cookies.is_empty() {
            let header = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(COOKIE, header);
        }
        if let Some(address) = self.forwarded_for {
            builder = builder.header("x-forwarded-for", address);
        }

        let response = self.router.clone().oneshot(builder.body(body)?).await?;

        for value in response.headers().get_all(SET_COOKIE) {
            let value = value.to_str()?;
            let pair = value.split(';').next().unwrap_or_default();
            let Some((name, cookie_value)) = pair.split_once('=') else {
                continue;
            };
            if value.contains("Max-Age=0") {
                self.cookies.remove(name);
            } else {
                self.cookies
                    .insert(name.to_string(), cookie_value.to_string());
            }
        }

        Ok(response)
    }

    async fn get(&mut self, path: &str) -> Result<Response> {
        self.send(Request::builder().method("GET").uri(path), Body::empty())
            .await
    }

    async fn post_form(&mut self, path: &str, form: &str) -> Result<Response> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(path)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(form.to_string()),
        )
        .await
    }

    async fn signup(&mut self, email: &str, username: &str, password: &str) -> Result<Response> {
        let form = format!(
            "email={}&username={username}&password={password}",
            email.replace('@', "%40")
        );
        self.post_form("/signup", &form).await
    }

    async fn login(&mut self, username: &str, password: &str) -> Result<Response> {
        self.post_form("/login", &format!("username={username}&password={password}"))
            .await
    }
}

fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
}

fn assert_redirect(response: &Response, to: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response), Some(to));
}

async fn body_text(response: Response) -> Result<String> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(String::from_utf8(bytes.to_vec())?)
}

#[tokio::test]
async fn signup_then_login_authenticates() -> Result<()> {
    let app = TestApp::with_verifier(Arc::new(Argon2Verifier::new()))?;
    let mut client = app.client();

    let response = client.signup("a@b.com", "alice", "abcdef").await?;
    assert_redirect(&response, "/dashboard");
    assert!(client.has_cookie("session-id"));
    assert_eq!(app.accounts.len().await, 1);

    let response = client.get("/logout").await?;
    assert_redirect(&response, "/login");
    assert!(!client.has_cookie("session-id"));

    let response = client.login("alice", "abcdef").await?;
    assert_redirect(&response, "/dashboard");

    let response = client.get("/dashboard").await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await?.contains(r#"href="/profile/alice""#));

    // email works as the login field too
    let mut other = app.client();
    let response = other.login("a%40b.com", "abcdef").await?;
    assert_redirect(&response, "/dashboard");
    Ok(())
}

#[tokio::test]
async fn duplicate_signup_is_a_conflict() -> Result<()> {
    let app = TestApp::new()?;
    let response = app.client().signup("a@b.com", "alice", "abcdef").await?;
    assert_redirect(&response, "/dashboard");

    let mut client = app.client();
    let response = client.signup("a@b.com", "alice2", "abcdef").await?;
    assert_redirect(&response, "/signup");
    assert!(!client.has_cookie("session-id"));
    assert_eq!(app.accounts.len().await, 1);

    let body = body_text(client.get("/signup").await?).await?;
    assert!(body.contains("Email in-use"));
    assert!(body.contains(r#"name="email" value="a@b.com""#));
    assert!(body.contains(r#"name="username" value="alice2""#));

    let response = client.signup("c@d.com", "ALICE", "abcdef").await?;
    assert_redirect(&response, "/signup");
    let body = body_text(client.get("/signup").await?).await?;
    assert!(body.contains("Username in-use"));
    assert_eq!(app.accounts.len().await, 1);
    Ok(())
}

#[tokio::test]
async fn invalid_signup_fields_create_nothing() -> Result<()> {
    let app = TestApp::new()?;
    let mut client = app.client();

    let cases = [
        ("not-an-email", "alice", "abcdef", "Email invalid"),
        ("a@b.com", "", "abcdef", "Username invalid"),
        ("a@b.com", "alice", "abc", "Password must be at least 6 characters"),
    ];
    for (email, username, password, message) in cases {
        let response = client.signup(email, username, password).await?;
        assert_redirect(&response, "/signup");
        let body = body_text(client.get("/signup").await?).await?;
        assert!(body.contains(message), "missing {message:?}");
    }

    assert!(app.accounts.is_empty().await);
    assert_eq!(app.state.sessions().live_sessions().await, 0);
    Ok(())
}

#[tokio::test]
async fn unknown_user_login_fails_without_session() -> Result<()> {
    let app = TestApp::new()?;
    let mut client = app.client();

    let response = client.login("ghost", "whatever").await?;
    assert_redirect(&response, "/login");
    assert!(!client.has_cookie("session-id"));
    assert_eq!(app.state.sessions().live_sessions().await, 0);

    let body = body_text(client.get("/login").await?).await?;
    assert!(body.contains("No account exists with that username or email."));
    assert!(body.contains(r#"value="ghost""#));
    Ok(())
}

#[tokio::test]
async fn wrong_password_redirects_like_unknown_user() -> Result<()> {
    let app = TestApp::new()?;
    app.client().signup("a@b.com", "alice", "abcdef").await?;

    let mut client = app.client();
    let response = client.login("alice", "wrong!").await?;
    assert_redirect(&response, "/login");
    assert!(!client.has_cookie("session-id"));

    let body = body_text(client.get("/login").await?).await?;
    assert!(body.contains("Invalid username or password."));
    Ok(())
}

#[tokio::test]
async fn flashes_are_shown_exactly_once() -> Result<()> {
    let app = TestApp::new()?;
    let mut client = app.client();

    client.login("ghost", "whatever").await?;
    let first = body_text(client.get("/login").await?).await?;
    assert!(first.contains("No account exists"));
    assert!(!client.has_cookie("flash-data"));

    let second = body_text(client.get("/login").await?).await?;
    assert!(!second.contains("No account exists"));
    assert!(!second.contains(r#"value="ghost""#));
    Ok(())
}

#[tokio::test]
async fn logout_writes_back_and_second_logout_is_gated() -> Result<()> {
    let app = TestApp::new()?;
    let mut client = app.client();
    client.signup("a@b.com", "alice", "abcdef").await?;
    assert_eq!(app.state.sessions().live_sessions().await, 1);

    let response = client.get("/logout").await?;
    assert_redirect(&response, "/login");
    assert!(!client.has_cookie("session-id"));
    assert_eq!(app.state.sessions().live_sessions().await, 0);

    let stored = app
        .accounts
        .find_by_email("a@b.com")
        .await?
        .context("account missing")?;
    assert!(!stored.online);
    assert!(stored.last_seen.is_some());

    let body = body_text(client.get("/login").await?).await?;
    assert!(body.contains("You have been logged out."));

    let response = client.get("/logout").await?;
    assert_redirect(&response, "/login");
    let body = body_text(client.get("/login").await?).await?;
    assert!(body.contains("Please log in to continue."));
    Ok(())
}

#[tokio::test]
async fn logout_after_session_ended_elsewhere_is_gated() -> Result<()> {
    let app = TestApp::new()?;
    let mut client = app.client();
    client.signup("a@b.com", "alice", "abcdef").await?;

    // Session ended elsewhere; the browser still holds the cookie.
    let session = client
        .cookies
        .get("session-id")
        .cloned()
        .context("no session cookie")?;
    let mut stale = app.client();
    stale.set_raw_cookie("session-id", &session);
    stale.get("/logout").await?;

    let response = client.get("/logout").await?;
    assert_redirect(&response, "/login");
    assert!(body_text(client.get("/login").await?)
        .await?
        .contains("Please log in to continue."));
    Ok(())
}

#[tokio::test]
async fn profile_redirects() -> Result<()> {
    let app = TestApp::new()?;
    let mut client = app.client();
    client.signup("a@b.com", "alice", "abcdef").await?;

    assert_redirect(&client.get("/profile/alice").await?, "/dashboard");
    assert_redirect(&client.get("/profile/ALICE").await?, "/dashboard");
    assert_redirect(&client.get("/profile/").await?, "/dashboard");
    assert_redirect(&client.get("/profile").await?, "/dashboard");
    assert_redirect(&client.get("/profile/bob").await?, "/404");

    app.client().signup("b@c.com", "bob", "abcdef").await?;
    let response = client.get("/profile/Bob").await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await?;
    assert!(body.contains("<h2>bob"));
    Ok(())
}

#[tokio::test]
async fn anonymous_requests_for_protected_pages_go_to_login() -> Result<()> {
    let app = TestApp::new()?;
    let mut client = app.client();

    for path in ["/", "/dashboard", "/logout", "/profile/alice"] {
        assert_redirect(&client.get(path).await?, "/login");
    }
    for path in ["/login", "/signup", "/404"] {
        assert_eq!(client.get(path).await?.status(), StatusCode::OK, "{path}");
    }
    Ok(())
}

#[tokio::test]
async fn gate_never_runs_protected_handler_without_session() -> Result<()> {
    let app = TestApp::new()?;
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let router = Router::new()
        .route(
            "/dashboard",
            get(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { "ok" }
            }),
        )
        .route_layer(middleware::from_fn_with_state(
            app.state.clone(),
            gate::access_gate,
        ))
        .with_state(app.state.clone());

    let mut anonymous = TestClient::new(router.clone());
    assert_redirect(&anonymous.get("/dashboard").await?, "/login");

    let mut forged = TestClient::new(router.clone());
    forged.set_raw_cookie("session-id", "made-up-token");
    assert_redirect(&forged.get("/dashboard").await?, "/login");
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let alice = Identity::new(
        "a@b.com".to_string(),
        "alice".to_string(),
        "plain:abcdef".to_string(),
        String::new(),
    );
    let token = app.state.sessions().create_session(&alice).await?;
    let cookie = app.session_cookie(&token).context("no signed cookie")?;
    let (name, value) = cookie.split_once('=').context("malformed cookie")?;

    let mut signed_in = TestClient::new(router);
    signed_in.set_raw_cookie(name, value);
    assert_eq!(signed_in.get("/dashboard").await?.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn unknown_pages_redirect_to_not_found() -> Result<()> {
    let app = TestApp::new()?;
    let mut client = app.client();

    assert_redirect(&client.get("/nowhere").await?, "/404");
    let response = client.get("/404").await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await?.contains("Page not found"));
    Ok(())
}

#[tokio::test]
async fn messages_follow_the_client_locale() -> Result<()> {
    let app = TestApp::new()?;
    let mut client = app.client().from_address("203.0.113.20");

    client.login("ghost", "whatever").await?;
    let body = body_text(client.get("/login").await?).await?;
    assert!(body.contains("Aucun compte ne correspond"));
    assert!(body.contains(r#"<html lang="fr">"#));
    Ok(())
}

#[tokio::test]
async fn signup_binds_the_request_locale() -> Result<()> {
    let app = TestApp::new()?;
    let mut client = app.client().from_address("203.0.113.21");
    client.signup("a@b.com", "alice", "abcdef").await?;

    let stored = app
        .accounts
        .find_by_email("a@b.com")
        .await?
        .context("account missing")?;
    assert_eq!(stored.locale, "FR");
    Ok(())
}

#[tokio::test]
async fn health_reports_store_status() -> Result<()> {
    let app = TestApp::new()?;
    let mut client = app.client();
    client.signup("a@b.com", "alice", "abcdef").await?;

    let response = app
        .router()
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("X-App"));
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await?)?;
    assert_eq!(body["name"], "smark");
    assert_eq!(body["database"], "ok");
    assert!(body.get("sessions").is_none());
    Ok(())
}

#[tokio::test]
async fn static_resources_are_public() -> Result<()> {
    let app = TestApp::new()?;
    let mut client = app.client();

    let response = client.get("/res/style.css").await?;
    assert_eq!(response.status(), StatusCode::OK);
    let response = client.get("/res/missing.css").await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

fn no_entropy() -> Result<SessionToken, SessionError> {
    Err(SessionError::RandomnessUnavailable(rand::Error::new(
        std::io::Error::other("no entropy"),
    )))
}

#[tokio::test]
async fn login_without_randomness_is_a_server_error() -> Result<()> {
    let mut app = TestApp::new()?;
    app.accounts
        .insert(&Identity::new(
            "a@b.com".to_string(),
            "alice".to_string(),
            "plain:abcdef".to_string(),
            String::new(),
        ))
        .await?;
    let sessions = SessionStore::in_memory(app.accounts.clone()).with_token_generator(no_entropy);
    app.state = app.state.clone().with_sessions(sessions);
    let mut client = app.client();

    let response = client.login("alice", "abcdef").await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!client.has_cookie("session-id"));
    assert_eq!(app.state.sessions().live_sessions().await, 0);
    Ok(())
}

#[tokio::test]
async fn secure_policy_marks_cookies_secure() -> Result<()> {
    let mut app = TestApp::new()?;
    app.state = app
        .state
        .clone()
        .with_cookie_policy(CookiePolicy { secure: true });
    assert!(app.state.cookie_policy().secure);
    let mut client = app.client();

    let response = client.signup("a@b.com", "alice", "abcdef").await?;
    assert_redirect(&response, "/dashboard");
    let session = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("session-id="))
        .context("session cookie")?;
    assert!(session.contains("Secure"));
    assert!(session.contains("HttpOnly"));
    Ok(())
}

