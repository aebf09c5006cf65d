//! Google account connection.
//!
//! Both handlers answer with `302 Found` redirects so a browser can be sent
//! straight through the consent screen and back to the admin UI.

use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use core_auth::Credential;
use serde::Deserialize;
use tracing::{info, warn};

/// Where the browser lands when no usable redirect target was supplied.
pub const DEFAULT_REDIRECT: &str = "/admin";

#[derive(Debug, Deserialize)]
pub struct StartQuery {
    pub redirect: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

fn found(location: impl Into<String>) -> Response {
    let location: String = location.into();
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Only local absolute paths are followed; anything else collapses to
/// [`DEFAULT_REDIRECT`].
pub fn safe_redirect_target(target: Option<&str>) -> &str {
    match target {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => DEFAULT_REDIRECT,
    }
}

fn with_connected_flag(target: &str) -> String {
    let separator = if target.contains('?') { '&' } else { '?' };
    format!("{target}{separator}google_connected=true")
}

/// `GET /api/auth/google?redirect=<path>`
pub async fn start(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StartQuery>,
) -> Response {
    if state.sessions.resolve(&headers).is_none() {
        return found("/login?error=not_authenticated");
    }

    let target = safe_redirect_target(query.redirect.as_deref());
    match state.oauth.build_auth_url(target) {
        Ok(url) => found(url),
        Err(err) => {
            warn!(error = %err, "Failed to build consent URL");
            found("/admin?error=oauth_failed")
        }
    }
}

/// `GET /api/auth/google/callback?code&state`
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return found("/admin?error=no_code");
    };

    let Some(principal) = state.sessions.resolve(&headers) else {
        return found("/login?error=not_authenticated");
    };

    let tokens = match state.oauth.exchange_code(&code).await {
        Ok(tokens) => tokens,
        Err(err) => {
            warn!(principal = %principal, error = %err, "Code exchange failed");
            return found("/admin?error=oauth_failed");
        }
    };

    let now = state.clock.unix_timestamp();
    let credential = Credential {
        principal_id: principal.clone(),
        expires_at: tokens.expires_at(now),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        connected: true,
        updated_at: now,
    };

    if let Err(err) = state.credentials.upsert(&credential).await {
        warn!(principal = %principal, error = %err, "Failed to store credential");
        return found("/admin?error=token_storage_failed");
    }

    info!(principal = %principal, "Google Drive connected");
    found(with_connected_flag(safe_redirect_target(query.state.as_deref())))
}
