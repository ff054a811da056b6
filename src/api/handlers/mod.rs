pub mod dashboard;
pub mod health;
pub mod login;
pub mod logout;
pub mod not_found;
pub mod profile;
pub mod signup;

use axum::response::{Html, IntoResponse, Redirect, Response};

use super::AppState;
use crate::session::{AccessState, AuthError, CookieCarrier, FlashField, FlashKind};
use crate::views::PageContext;

/// Render a page after draining the flash queue into it.
fn render<F>(state: &AppState, access: &AccessState, carrier: CookieCarrier, page: F) -> Response
where
    F: FnOnce(&PageContext<'_>) -> String,
{
    let (carrier, flashes) = carrier.drain_flashes();
    let ctx = PageContext::new(
        state.translator(),
        access.locale(),
        access.identity(),
        flashes.into(),
    );
    (carrier, Html(page(&ctx))).into_response()
}

/// Turn a recoverable auth failure into flashes and a redirect back to the
/// form. Server errors become a 500.
fn redirect_with_error(
    state: &AppState,
    access: &AccessState,
    carrier: CookieCarrier,
    err: AuthError,
    remembered: &[(FlashField, &str)],
    back_to: &str,
) -> Response {
    let Some(key) = err.flash_key() else {
        return err.into_response();
    };

    let text = state.translator().translate(access.locale(), key);
    let carrier = remembered
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .fold(
            carrier.enqueue_flash(FlashKind::Error, text),
            |carrier, (field, value)| carrier.enqueue_flash(FlashKind::Data(*field), *value),
        );

    (carrier, Redirect::to(back_to)).into_response()
}
