// middleware/gate.rs - Route-level access gate
//
// Runs on every request before the handler. Only two path patterns are
// gated: the dashboard prefix and the login page. This steers navigation;
// it is not a security boundary for the content store.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::auth::{cookie, AuthState, Identity};
use crate::error::ApiError;
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const PUBLIC_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Continue,
    Redirect(&'static str),
}

fn is_protected(path: &str) -> bool {
    path == DASHBOARD_PATH
        || path
            .strip_prefix(DASHBOARD_PATH)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Where a request for `path` goes, given the caller's auth state
pub fn decide(path: &str, auth: &AuthState) -> GateDecision {
    match auth {
        AuthState::Unauthenticated if is_protected(path) => GateDecision::Redirect(LOGIN_PATH),
        AuthState::Authenticated(_) if path == LOGIN_PATH => GateDecision::Redirect(DASHBOARD_PATH),
        AuthState::Unauthenticated | AuthState::Authenticated(_) => GateDecision::Continue,
    }
}

/// Evaluate the session cookie, redirect if needed and expose the
/// resulting `AuthState` to handlers
pub async fn access_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let token = cookie::session_token(request.headers());
    let auth = AuthState::from_token(token.as_deref(), &state.config.security);

    match decide(request.uri().path(), &auth) {
        GateDecision::Redirect(to) => {
            debug!("Gate redirect {} -> {}", request.uri().path(), to);
            Redirect::temporary(to).into_response()
        }
        GateDecision::Continue => {
            request.extensions_mut().insert(auth);
            next.run(request).await
        }
    }
}

/// Extractor for handlers that need the signed-in identity
pub struct CurrentIdentity(pub Identity);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthState>() {
            Some(AuthState::Authenticated(identity)) => Ok(CurrentIdentity(identity.clone())),
            Some(AuthState::Unauthenticated) | None => Err(ApiError::unauthorized("Not signed in")),
        }
    }
}
