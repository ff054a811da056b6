use axum::{
    extract::{Extension, Path, State},
    response::{IntoResponse, Redirect, Response},
};

use super::render;
use crate::api::AppState;
use crate::session::{AccessState, AuthError, CookieCarrier};
use crate::views;

/// `/profile` without a name shows the caller's own landing page.
pub async fn own_profile() -> Redirect {
    Redirect::to("/dashboard")
}

pub async fn profile(
    State(state): State<AppState>,
    Extension(access): Extension<AccessState>,
    Path(name): Path<String>,
    carrier: CookieCarrier,
) -> Response {
    let Some(viewer) = access.identity() else {
        return Redirect::to("/login").into_response();
    };
    if name.is_empty() || viewer.is_named(&name) {
        return Redirect::to("/dashboard").into_response();
    }

    match state.accounts().find_by_username(&name).await {
        Ok(Some(owner)) => render(&state, &access, carrier, |ctx| {
            views::profile_page(ctx, &owner)
        }),
        Ok(None) => Redirect::to("/404").into_response(),
        Err(err) => AuthError::from(err).into_response(),
    }
}
