//! Session-cookie middleware and the login rate limit.

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::header::COOKIE;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::net::SocketAddr;

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::auth::SESSION_COOKIE;

/// Extract the session token from the request's `Cookie` header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Reject requests without a live session before the handler runs.
pub async fn require_session(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let authenticated = session_token(request.headers())
        .and_then(|token| state.sessions.username(&token))
        .is_some();

    if authenticated {
        next.run(request).await
    } else {
        ApiError::Unauthorized.into_response()
    }
}

/// Count every login attempt against the client address and reject once
/// the window is exhausted, before credentials are even looked at.
pub async fn login_rate_limit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if state.login_limiter.check(&addr.ip().to_string()) {
        next.run(request).await
    } else {
        tracing::warn!(client = %addr.ip(), "login rate limit hit");
        ApiError::RateLimited.into_response()
    }
}
