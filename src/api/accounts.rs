//! Registration and login handlers.
//!
//! Both accept classic urlencoded form posts and answer with redirects,
//! since they are driven by the served HTML pages rather than the JSON
//! API. Login failures are uniform: blank fields, unknown users, and
//! wrong passwords all read "Invalid credentials".

use axum::{
    extract::{Form, State},
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use super::auth;
use super::routes::AppState;
use super::types::CredentialsForm;

/// Handle registration form submissions.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        tracing::warn!("registration rejected: blank username or password");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Error registering user").into_response();
    }

    match state.users.create_user(username, &form.password).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, username = %user.username, "user registered");
            Redirect::to("/login").into_response()
        }
        Err(e) => {
            tracing::error!("registration failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error registering user").into_response()
        }
    }
}

/// Handle login form submissions; success sets the session cookie.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response();
    }

    let user = match state.users.verify_credentials(username, &form.password).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            // Unknown user and wrong password are indistinguishable.
            return (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response();
        }
        Err(e) => {
            tracing::error!("login failed: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error during login").into_response();
        }
    };

    let (token, _exp) = match auth::issue_token(
        user.id,
        &state.config.jwt_secret,
        state.config.token_ttl_hours,
    ) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("token issue failed: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error during login").into_response();
        }
    };

    tracing::info!(user_id = %user.id, username = %user.username, "user logged in");
    let cookie = auth::auth_cookie(&token, state.config.token_ttl_hours);
    (AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to("/tasks")).into_response()
}
