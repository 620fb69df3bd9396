//! Login and logout.

use axum::{
    extract::State,
    response::{IntoResponse, Json, Redirect},
};
use axum_extra::extract::{cookie::CookieJar, Form};
use tracing::{info, warn};

use crate::error::{ConsoleError, Result};
use crate::forms::{LoginForm, LOGIN_FIELDS, LOGIN_PASSWORD_FIELDS};
use crate::middleware::{ConsoleState, LOGIN_PATH};
use crate::views::FormView;

pub async fn login_page() -> Json<FormView> {
    Json(FormView {
        name: "Login",
        fields: LOGIN_FIELDS.to_vec(),
        password_fields: LOGIN_PASSWORD_FIELDS.to_vec(),
        url: LOGIN_PATH,
    })
}

/// Check credentials against the directory and open a session.
pub async fn login(
    State(state): State<ConsoleState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse> {
    if form.username.is_empty() || form.password.is_empty() {
        return Err(ConsoleError::InvalidCredentials);
    }

    if !state.directory.authenticate(&form.username, &form.password).await {
        warn!(username = %form.username, "Login rejected");
        return Err(ConsoleError::InvalidCredentials);
    }

    let token = state.sessions.issue(&form.username)?;
    let jar = jar.add(state.sessions.session_cookie(token));

    info!(username = %form.username, "Console login");
    Ok((jar, Redirect::to("/")))
}

pub async fn logout(State(state): State<ConsoleState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(state.sessions.cleared_cookie());
    (jar, Redirect::to(LOGIN_PATH))
}
