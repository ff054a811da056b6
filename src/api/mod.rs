use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::get,
    Router,
};
use std::{net::SocketAddr, path::Path};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, services::ServeDir, set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use ulid::Ulid;

mod client;
mod gate;
pub(crate) mod handlers;
mod state;

#[cfg(test)]
mod tests;

pub use client::ClientAddress;
pub use state::AppState;

use handlers::{dashboard, health, login, logout, not_found, profile, signup};

/// Application routes. Page routes sit behind the access gate; `/health`,
/// `/res` and the unknown-page fallback do not.
pub fn router(state: AppState, resources_dir: &Path) -> Router {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/login", get(login::login_page).post(login::login))
        .route("/signup", get(signup::signup_page).post(signup::signup))
        .route("/logout", get(logout::logout).post(logout::logout))
        .route("/profile", get(profile::own_profile))
        .route("/profile/", get(profile::own_profile))
        .route("/profile/{name}", get(profile::profile))
        .route("/404", get(not_found::not_found))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            gate::access_gate,
        ))
        .route("/health", get(health::health).options(health::health))
        .nest_service("/res", ServeDir::new(resources_dir))
        .fallback(not_found::fallback)
        .with_state(state)
}

/// Serve the application on `port` until ctrl-c.
///
/// # Errors
/// Returns an error if the listener cannot bind or the server fails.
pub async fn new(port: u16, state: AppState, resources_dir: &Path) -> Result<()> {
    let app = router(state, resources_dir).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span)),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {err}");
            std::future::pending::<()>().await;
        }
        info!("Gracefully shutdown");
    })
    .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
