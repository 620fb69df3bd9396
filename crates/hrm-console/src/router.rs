//! Console router
//!
//! Wires every console page onto one [`Router`]. All pages except login,
//! health and the not-found fallback take a [`SessionUser`](crate::middleware::SessionUser)
//! and redirect to `/login` without one.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};

use crate::error::ErrorResponse;
use crate::middleware::{ConsoleState, SessionLayer};
use crate::views::HealthView;
use crate::{auth_api, directory_api, membership_api};

pub fn console_router(state: ConsoleState) -> Router {
    let sessions = state.sessions.clone();

    Router::new()
        .route("/", get(directory_api::index))
        .route("/employees", get(directory_api::list_employees))
        .route("/groups", get(directory_api::list_groups))
        .route("/add_employee", get(directory_api::add_employee_form))
        .route("/add_group", get(directory_api::add_group_form))
        .route("/add/:kind", post(directory_api::add_entity))
        .route("/delete/:kind/:id", get(directory_api::delete_entity))
        .route("/add_to_user/:kind/:id", get(membership_api::membership_page))
        .route("/update_user/group/:id", post(membership_api::update_memberships))
        .route("/login", get(auth_api::login_page).post(auth_api::login))
        .route("/logout", get(auth_api::logout))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
        .layer(SessionLayer::new(sessions))
}

async fn health() -> Json<HealthView> {
    Json(HealthView {
        status: "UP",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn not_found() -> Response {
    let body = ErrorResponse {
        error: "NOT_FOUND".to_string(),
        message: "Page not found".to_string(),
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
