use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use frpc_console::api::{build_router, serve, AppState};
use frpc_console::auth::{LoginRateLimiter, SessionStore};
use frpc_console::config::load_settings;
use frpc_console::registry::ProxyRegistry;
use frpc_console::service::ServiceControl;
use frpc_console::store::ConfigStore;

#[derive(Parser, Debug)]
#[command(name = "frpc-console", about = "Web admin console for frp tunnels")]
struct Args {
    /// Path to the console settings file.
    #[arg(short, long, default_value = "console.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "frpc_console=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // A broken settings file is fatal; there is nothing to serve without it.
    let settings = match load_settings(&args.config) {
        Ok(settings) => Arc::new(settings),
        Err(e) => {
            tracing::error!(path = %args.config.display(), error = %e, "failed to load settings");
            std::process::exit(1);
        }
    };

    let service = match ServiceControl::new(settings.service.name.clone()) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            tracing::error!(error = %e, "invalid service name in settings");
            std::process::exit(1);
        }
    };

    let store = ConfigStore::new(settings.frpc_config_path.clone(), settings.backups.clone());
    let state = AppState {
        settings: settings.clone(),
        registry: Arc::new(ProxyRegistry::new(store)),
        sessions: Arc::new(SessionStore::new()),
        login_limiter: Arc::new(LoginRateLimiter::new()),
        service,
    };

    let router = build_router(state);

    let listener = match TcpListener::bind(&settings.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(address = %settings.listen_addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(
        config = %settings.frpc_config_path.display(),
        service = %settings.service.name,
        "frpc console starting"
    );

    if let Err(e) = serve(router, listener).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
