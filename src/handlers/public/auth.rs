// handlers/public/auth.rs - Login and logout
//
// A successful login issues the session token, sets it as a cookie and
// opens the dashboard workspace for the new session. Logout clears the
// cookie and tears the workspace down.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{cookie, issue_session_token, AuthError, AuthState, Claims, Identity};
use crate::error::ApiError;
use crate::middleware::gate::{DASHBOARD_PATH, LOGIN_PATH, PUBLIC_PATH};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginPage {
    pub action: &'static str,
    pub hint: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: Identity,
    pub redirect: &'static str,
}

/// GET /login - What the login form needs; signed-in callers never get here
pub async fn login_get(State(state): State<AppState>) -> ApiResult<LoginPage> {
    Ok(ApiResponse::success(LoginPage {
        action: LOGIN_PATH,
        hint: state.identity.hint().map(str::to_string),
    }))
}

/// POST /login - Verify credentials and start a session
pub async fn login_post(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let username = request.username.trim();
    if username.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let subject = match state.identity.verify(username, &request.password).await {
        Ok(subject) => subject,
        Err(AuthError::InvalidCredentials) => {
            warn!("Failed login for {}", username);
            return Err(ApiError::InvalidCredentials {
                hint: state.identity.hint().map(str::to_string),
            });
        }
        Err(e) => {
            warn!("Login for {} could not be verified: {}", username, e);
            return Err(e.into());
        }
    };

    let security = &state.config.security;
    let claims = Claims::new(subject, security.session_ttl_hours);
    let token = issue_session_token(&claims, security)?;

    let user = Identity::from(claims);
    state.workspaces.open(&user, &state.store).await;
    info!("{} signed in (session {})", user.username, user.session_id);

    let response = LoginResponse {
        user,
        redirect: DASHBOARD_PATH,
    };
    Ok(ApiResponse::success(response).with_cookie(cookie::session_cookie(&token, security)))
}

/// POST /logout - Clear the session and go back to the public docs
pub async fn logout_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
) -> Response {
    match auth {
        AuthState::Authenticated(identity) => {
            state.workspaces.remove(identity.session_id).await;
            info!("{} signed out", identity.username);
        }
        AuthState::Unauthenticated => {}
    }

    let cleared = cookie::cleared_cookie(&state.config.security);
    ([(header::SET_COOKIE, cleared)], Redirect::to(PUBLIC_PATH)).into_response()
}
