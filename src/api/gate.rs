use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use super::{client::ClientAddress, AppState};
use crate::session::{check_access, resolve_access, CookieCarrier, FlashKind, GateDecision, Page};

/// Route middleware that resolves the caller and stops anonymous requests for
/// protected pages before their handler runs.
///
/// Allowed requests carry the resolved [`crate::session::AccessState`] as an
/// extension.
pub(crate) async fn access_gate(
    State(state): State<AppState>,
    ClientAddress(address): ClientAddress,
    carrier: CookieCarrier,
    mut request: Request,
    next: Next,
) -> Response {
    let page = Page::from_path(request.uri().path());
    let access = resolve_access(
        state.sessions(),
        state.locales(),
        carrier.session_token(),
        address,
    )
    .await;

    match check_access(&access, &page) {
        GateDecision::Allow => {
            request.extensions_mut().insert(access);
            next.run(request).await
        }
        GateDecision::RedirectToLogin => {
            debug!("Anonymous request for {page:?}, redirecting to login");
            let prompt = state
                .translator()
                .translate(access.locale(), "login.login-prompt");
            (
                carrier.enqueue_flash(FlashKind::Error, prompt),
                Redirect::to("/login"),
            )
                .into_response()
        }
    }
}
