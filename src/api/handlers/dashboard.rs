use axum::{
    extract::{Extension, State},
    response::Response,
};

use super::render;
use crate::api::AppState;
use crate::session::{AccessState, CookieCarrier};
use crate::views;

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(access): Extension<AccessState>,
    carrier: CookieCarrier,
) -> Response {
    render(&state, &access, carrier, views::dashboard_page)
}
