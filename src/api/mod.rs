//! HTTP API for the console.
//!
//! # Responsibilities
//! - Build the Axum router with all endpoints and middleware
//! - Hold the shared application state
//! - Serve optional static console assets
//! - Run the server with graceful shutdown
//!
//! # Design Decisions
//! - Handlers are stateless; everything they need arrives via `AppState`
//! - The session check runs as route-layer middleware so unauthenticated
//!   requests never touch the tunnel config file
//! - The login rate limit sits on the login route alone

pub mod auth;
pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{LoginRateLimiter, SessionStore};
use crate::config::Settings;
use crate::registry::ProxyRegistry;
use crate::service::ServiceControl;
use self::auth::{login_rate_limit, require_session};
use self::handlers::*;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub registry: Arc<ProxyRegistry>,
    pub sessions: Arc<SessionStore>,
    pub login_limiter: Arc<LoginRateLimiter>,
    pub service: Arc<ServiceControl>,
}

/// Build the console router with all endpoints and middleware layers.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/proxies", get(list_proxies).post(create_proxy))
        .route(
            "/api/proxies/{name}",
            get(get_proxy).put(update_proxy).delete(delete_proxy),
        )
        .route("/api/logout", post(logout))
        .route("/api/restart", post(restart_service))
        .route("/api/status", get(service_status))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let mut router = Router::new()
        .route(
            "/api/login",
            post(login).route_layer(middleware::from_fn_with_state(
                state.clone(),
                login_rate_limit,
            )),
        )
        .route("/api/auth/status", get(auth_status))
        .merge(protected);

    if let Some(static_dir) = &state.settings.static_dir {
        router = router.fallback_service(ServeDir::new(static_dir));
    }

    router
        .with_state(state)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
}

/// Serve the router until a shutdown signal arrives.
pub async fn serve(router: Router, listener: TcpListener) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "console listening");

    let app = router.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("console stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
