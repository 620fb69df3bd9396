//! Console Middleware
//!
//! Session gate for the console pages. [`SessionLayer`] puts the
//! [`SessionService`] into request extensions and the [`SessionUser`]
//! extractor reads the session cookie against it. Requests without a valid
//! session are redirected to the login page.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use hrm_directory::DirectoryClient;
use tower::{Layer, Service};
use tracing::debug;

use crate::error::ConsoleError;
use crate::session::{SessionClaims, SessionService};

pub const LOGIN_PATH: &str = "/login";

/// Shared console state
#[derive(Clone)]
pub struct ConsoleState {
    pub directory: Arc<dyn DirectoryClient>,
    pub sessions: Arc<SessionService>,
}

impl ConsoleState {
    pub fn new(directory: Arc<dyn DirectoryClient>, sessions: Arc<SessionService>) -> Self {
        Self { directory, sessions }
    }
}

/// Logged-in console user
pub struct SessionUser(pub SessionClaims);

impl SessionUser {
    pub fn username(&self) -> &str {
        &self.0.sub
    }
}

/// Why a request did not get a [`SessionUser`]
pub enum SessionRejection {
    /// No cookie, or the token did not validate
    LoginRequired,
    /// [`SessionLayer`] is not installed
    NotConfigured,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            SessionRejection::LoginRequired => Redirect::to(LOGIN_PATH).into_response(),
            SessionRejection::NotConfigured => {
                ConsoleError::internal("Session service not configured").into_response()
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let sessions = parts
            .extensions
            .get::<Arc<SessionService>>()
            .ok_or(SessionRejection::NotConfigured)?;

        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(sessions.cookie_name())
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                debug!(path = %parts.uri.path(), "No session cookie");
                SessionRejection::LoginRequired
            })?;

        let claims = sessions
            .validate(&token)
            .map_err(|_| SessionRejection::LoginRequired)?;

        Ok(SessionUser(claims))
    }
}

/// Layer that injects the session service into request extensions
#[derive(Clone)]
pub struct SessionLayer {
    sessions: Arc<SessionService>,
}

impl SessionLayer {
    pub fn new(sessions: Arc<SessionService>) -> Self {
        Self { sessions }
    }
}

impl<S> Layer<S> for SessionLayer {
    type Service = SessionMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionMiddleware {
            inner,
            sessions: self.sessions.clone(),
        }
    }
}

#[derive(Clone)]
pub struct SessionMiddleware<S> {
    inner: S,
    sessions: Arc<SessionService>,
}

impl<S, B> Service<axum::http::Request<B>> for SessionMiddleware<S>
where
    S: Service<axum::http::Request<B>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(self.sessions.clone());

        let future = self.inner.call(req);
        Box::pin(future)
    }
}
