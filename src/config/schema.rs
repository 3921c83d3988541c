//! Settings schema definitions.
//!
//! This module defines the process-wide configuration for the console.
//! All types derive Serde traits for deserialization from the settings file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root settings for the console process.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Address the HTTP server binds to, e.g. "0.0.0.0:8080".
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Path to the frpc tunnel configuration file managed by the console.
    pub frpc_config_path: PathBuf,

    /// Admin credentials and cookie settings.
    pub auth: AuthSettings,

    /// Backup rotation for the tunnel configuration file.
    #[serde(default)]
    pub backups: BackupSettings,

    /// Managed systemd service.
    #[serde(default)]
    pub service: ServiceSettings,

    /// Optional directory of static console assets to serve at `/`.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

/// Admin credentials and session cookie settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    /// Admin username.
    pub username: String,

    /// Bcrypt hash of the admin password.
    pub password_hash: String,

    /// Mark the session cookie `Secure`. Enable when serving over HTTPS.
    #[serde(default)]
    pub secure_cookie: bool,
}

/// Backup settings for the tunnel configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackupSettings {
    /// Whether a timestamped backup is taken before every write.
    pub enabled: bool,

    /// Directory for backups. Defaults to the config file's directory.
    pub dir: Option<PathBuf>,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

/// Managed service settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// systemd unit name used for restart and status queries.
    pub name: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "frpc".to_string(),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}
