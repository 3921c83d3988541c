//! Shared utilities for API integration tests.

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::net::TcpListener;

use frpc_console::api::{build_router, serve, AppState};
use frpc_console::auth::{LoginRateLimiter, SessionStore};
use frpc_console::config::schema::{AuthSettings, BackupSettings, ServiceSettings, Settings};
use frpc_console::registry::ProxyRegistry;
use frpc_console::service::ServiceControl;
use frpc_console::store::ConfigStore;

pub const TEST_USERNAME: &str = "admin";
pub const TEST_PASSWORD: &str = "correct-horse";

/// Tunnel config the test server starts with: system settings plus one
/// proxy and one type-less section.
pub const FIXTURE: &str = r#"
serverAddr = "frps.example.com"
serverPort = 7000

[log]
level = "info"

[ssh]
type = "tcp"
localIP = "127.0.0.1"
localPort = 22
remotePort = 6000

[stale]
localPort = 9999
"#;

pub struct TestApp {
    pub addr: SocketAddr,
    pub config_path: PathBuf,
    // Held so the fixture directory outlives the server task.
    _dir: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a console instance on an ephemeral port with a fresh fixture.
pub async fn spawn_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("frpc.toml");
    fs::write(&config_path, FIXTURE).unwrap();

    // Low bcrypt cost keeps login tests fast.
    let settings = Arc::new(Settings {
        listen_addr: "127.0.0.1:0".into(),
        frpc_config_path: config_path.clone(),
        auth: AuthSettings {
            username: TEST_USERNAME.into(),
            password_hash: bcrypt::hash(TEST_PASSWORD, 4).unwrap(),
            secure_cookie: false,
        },
        backups: BackupSettings {
            enabled: false,
            dir: None,
        },
        service: ServiceSettings::default(),
        static_dir: None,
    });

    let store = ConfigStore::new(config_path.clone(), settings.backups.clone());
    let state = AppState {
        settings: settings.clone(),
        registry: Arc::new(ProxyRegistry::new(store)),
        sessions: Arc::new(SessionStore::new()),
        login_limiter: Arc::new(LoginRateLimiter::new()),
        service: Arc::new(ServiceControl::new(settings.service.name.clone()).unwrap()),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = build_router(state);
    tokio::spawn(async move {
        let _ = serve(router, listener).await;
    });

    TestApp {
        addr,
        config_path,
        _dir: dir,
    }
}

/// A client with a cookie jar, optionally already logged in.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().cookie_store(true).build().unwrap()
}

#[allow(dead_code)]
pub async fn login(app: &TestApp) -> reqwest::Client {
    let client = client();
    let response = client
        .post(app.url("/api/login"))
        .json(&serde_json::json!({
            "username": TEST_USERNAME,
            "password": TEST_PASSWORD,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    client
}
