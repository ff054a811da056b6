use axum::{
    extract::{Extension, Form, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::info;

use super::{redirect_with_error, render};
use crate::accounts::{hash_password, validation::validate_signup, AccountField, Identity};
use crate::api::{client::ClientAddress, AppState};
use crate::session::{AccessState, AuthError, CookieCarrier, FlashField};
use crate::views;

#[derive(Debug, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn signup_page(
    State(state): State<AppState>,
    Extension(access): Extension<AccessState>,
    carrier: CookieCarrier,
) -> Response {
    render(&state, &access, carrier, views::signup_page)
}

pub async fn signup(
    State(state): State<AppState>,
    Extension(access): Extension<AccessState>,
    ClientAddress(address): ClientAddress,
    carrier: CookieCarrier,
    Form(form): Form<SignupForm>,
) -> Response {
    let identity = match register(&state, &form, access.locale()).await {
        Ok(identity) => identity,
        Err(err) => {
            return redirect_with_error(
                &state,
                &access,
                carrier,
                err,
                &[
                    (FlashField::Email, form.email.as_str()),
                    (FlashField::Username, form.username.as_str()),
                ],
                "/signup",
            );
        }
    };

    let token = match state.sessions().create_session(&identity).await {
        Ok(token) => token,
        Err(err) => return AuthError::from(err).into_response(),
    };

    state.locales().remember(address, &identity.locale).await;
    info!("User {} signed up", identity.username);

    (carrier.with_session(&token), Redirect::to("/dashboard")).into_response()
}

/// Validate the form and create the account. Nothing is written unless every
/// check passes.
async fn register(state: &AppState, form: &SignupForm, locale: &str) -> Result<Identity, AuthError> {
    validate_signup(&form.email, &form.username, &form.password)
        .map_err(AuthError::ValidationFailed)?;

    if state.accounts().find_by_email(&form.email).await?.is_some() {
        return Err(AuthError::AccountConflict(AccountField::Email));
    }
    if state
        .accounts()
        .find_by_username(&form.username)
        .await?
        .is_some()
    {
        return Err(AuthError::AccountConflict(AccountField::Username));
    }

    let digest = hash_password(state.passwords(), form.password.clone()).await?;
    let identity = Identity::new(
        form.email.clone(),
        form.username.clone(),
        digest,
        locale.to_string(),
    );
    state.accounts().insert(&identity).await?;

    Ok(identity)
}
