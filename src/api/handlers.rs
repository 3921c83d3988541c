//! Request handlers for the console API.

use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use toml::Table;

use crate::api::auth::session_token;
use crate::api::error::ApiError;
use crate::api::AppState;
use crate::auth::{SESSION_COOKIE, SESSION_TTL};

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Deserialize)]
pub struct CreateProxyRequest {
    name: String,
    #[serde(rename = "proxyConfig")]
    proxy_config: Table,
}

#[derive(Deserialize)]
pub struct UpdateProxyRequest {
    #[serde(rename = "proxyConfig")]
    proxy_config: Table,
}

fn session_cookie(token: &str, secure: bool, max_age: u64) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE, token, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let auth = &state.settings.auth;
    let password_ok = bcrypt::verify(&body.password, &auth.password_hash)?;
    if body.username != auth.username || !password_ok {
        tracing::warn!(username = %body.username, "failed login attempt");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.sessions.create(&body.username);
    tracing::info!(username = %body.username, "login");
    let cookie = session_cookie(&token, auth.secure_cookie, SESSION_TTL.as_secs());
    Ok((
        [(SET_COOKIE, cookie)],
        Json(json!({ "success": true })),
    )
        .into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.sessions.remove(&token);
    }
    let cookie = session_cookie("", state.settings.auth.secure_cookie, 0);
    ([(SET_COOKIE, cookie)], Json(json!({ "success": true }))).into_response()
}

pub async fn auth_status(State(state): State<AppState>, headers: HeaderMap) -> Json<serde_json::Value> {
    let authenticated = session_token(&headers)
        .and_then(|token| state.sessions.username(&token))
        .is_some();
    Json(json!({ "authenticated": authenticated }))
}

pub async fn list_proxies(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let proxies = state.registry.list()?;
    Ok(Json(json!({ "proxies": proxies })))
}

pub async fn get_proxy(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let proxy = state.registry.get(&name)?;
    Ok(Json(json!({ "proxy": proxy })))
}

pub async fn create_proxy(
    State(state): State<AppState>,
    Json(body): Json<CreateProxyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.registry.create(&body.name, body.proxy_config).await?;
    Ok(Json(json!({ "success": true, "message": "Proxy created successfully" })))
}

pub async fn update_proxy(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<UpdateProxyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.registry.update(&name, body.proxy_config).await?;
    Ok(Json(json!({ "success": true, "message": "Proxy updated successfully" })))
}

pub async fn delete_proxy(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.registry.delete(&name).await?;
    Ok(Json(json!({ "success": true, "message": "Proxy deleted successfully" })))
}

pub async fn restart_service(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    state.service.restart().await?;
    Ok(Json(json!({ "success": true, "message": "Service restarted successfully" })))
}

/// Best-effort status: degrades to inactive instead of erroring.
pub async fn service_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let active = state.service.status().await;
    Json(json!({ "active": active, "service": state.service.name() }))
}
