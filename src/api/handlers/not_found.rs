use axum::{
    extract::{Extension, State},
    http::Uri,
    response::{Redirect, Response},
};
use tracing::debug;

use super::render;
use crate::api::AppState;
use crate::session::{AccessState, CookieCarrier};
use crate::views;

pub async fn not_found(
    State(state): State<AppState>,
    Extension(access): Extension<AccessState>,
    carrier: CookieCarrier,
) -> Response {
    render(&state, &access, carrier, views::not_found_page)
}

/// Unknown pages go to `/404` before any session check.
pub async fn fallback(uri: Uri) -> Redirect {
    debug!("No page for {}", uri.path());
    Redirect::to("/404")
}
