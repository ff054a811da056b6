use axum::{
    extract::{Extension, Form, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::info;

use super::{redirect_with_error, render};
use crate::accounts::{verify_password, Identity};
use crate::api::{client::ClientAddress, AppState};
use crate::session::{AccessState, AuthError, CookieCarrier, CredentialFailure, FlashField};
use crate::views;

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    /// Username or email.
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login_page(
    State(state): State<AppState>,
    Extension(access): Extension<AccessState>,
    carrier: CookieCarrier,
) -> Response {
    render(&state, &access, carrier, views::login_page)
}

pub async fn login(
    State(state): State<AppState>,
    Extension(access): Extension<AccessState>,
    ClientAddress(address): ClientAddress,
    carrier: CookieCarrier,
    Form(form): Form<LoginForm>,
) -> Response {
    let identity = match authenticate(&state, &form.username, &form.password).await {
        Ok(identity) => identity,
        Err(err) => {
            return redirect_with_error(
                &state,
                &access,
                carrier,
                err,
                &[(FlashField::Username, form.username.as_str())],
                "/login",
            );
        }
    };

    let token = match state.sessions().create_session(&identity).await {
        Ok(token) => token,
        Err(err) => return AuthError::from(err).into_response(),
    };

    if let Some(locale) = identity.bound_locale() {
        state.locales().remember(address, locale).await;
    }
    info!("User {} logged in", identity.username);

    (carrier.with_session(&token), Redirect::to("/dashboard")).into_response()
}

/// Look up the account by username or email and check the password.
async fn authenticate(state: &AppState, login: &str, password: &str) -> Result<Identity, AuthError> {
    let identity = state
        .accounts()
        .find_by_email_or_username(login)
        .await?
        .ok_or(AuthError::CredentialsInvalid(CredentialFailure::UnknownAccount))?;

    if verify_password(
        state.passwords(),
        identity.password_hash.clone(),
        password.to_string(),
    )
    .await
    {
        Ok(identity)
    } else {
        Err(AuthError::CredentialsInvalid(CredentialFailure::WrongPassword))
    }
}
