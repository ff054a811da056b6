use axum::{
    extract::{Extension, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::{error, info};

use crate::api::AppState;
use crate::session::{AccessState, CookieCarrier, FlashKind};

/// End the caller's session. The session cookie is expired even when the
/// write-back fails or the entry was already gone.
pub async fn logout(
    State(state): State<AppState>,
    Extension(access): Extension<AccessState>,
    carrier: CookieCarrier,
) -> Response {
    let AccessState::Authenticated {
        identity,
        token,
        locale,
    } = access
    else {
        return (carrier.without_session(), Redirect::to("/login")).into_response();
    };

    match state.sessions().invalidate(token.as_str()).await {
        Ok(_) => info!("User {} logged out", identity.username),
        Err(err) => error!("Failed to record logout of {}: {err}", identity.email),
    }

    let notice = state.translator().translate(&locale, "login.logged-out");
    (
        carrier
            .without_session()
            .enqueue_flash(FlashKind::Info, notice),
        Redirect::to("/login"),
    )
        .into_response()
}
