//! Proxy registry over the tunnel configuration document.
//!
//! # Data Flow
//! ```text
//! API handler
//!     → registry operation (list/get/create/update/delete)
//!     → store.read() (fresh document every call)
//!     → in-memory mutation, guarded by reserved-key and proxy checks
//!     → store.write() (mutations only, under the write lock)
//! ```
//!
//! # Design Decisions
//! - Top-level keys are either reserved system settings or proxy entries;
//!   reserved membership is a fixed list matched exactly
//! - A proxy entry is a table with a truthy `type` field; entries are
//!   otherwise opaque and both camelCase and snake_case field names pass
//!   through untouched
//! - Mutations run under a single process-wide async lock so two concurrent
//!   read-modify-write cycles cannot silently drop an update

use thiserror::Error;
use tokio::sync::Mutex;
use toml::{Table, Value};

use crate::store::{ConfigStore, Document, StoreError};

/// Top-level frpc configuration keys that hold system/transport settings
/// rather than proxies, and are exempt from CRUD operations.
pub const RESERVED_KEYS: &[&str] = &[
    "serverAddr",
    "serverPort",
    "auth",
    "user",
    "token",
    "log",
    "transport",
    "loginFailExit",
    "protocol",
    "tls",
    "dnsServer",
    "start",
    "adminAddr",
    "adminPort",
    "adminUser",
    "adminPwd",
    "assetsDir",
    "poolCount",
    "tcpMux",
    "tcpMuxKeepaliveInterval",
    "logFile",
    "logLevel",
    "logMaxDays",
];

/// Errors from registry operations, mapped to HTTP statuses at the API layer.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid proxy name. Use only alphanumeric characters, hyphens, and underscores.")]
    InvalidName,

    #[error("Cannot use reserved configuration key as proxy name")]
    ReservedKey,

    #[error("Proxy with this name already exists")]
    AlreadyExists,

    #[error("Proxy not found")]
    NotFound,

    #[error("Not a proxy configuration")]
    NotAProxy,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// True for names usable as proxy identities: `^[a-zA-Z0-9_-]+$`.
pub fn valid_proxy_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// True when a top-level entry is a proxy: not reserved, a table, and
/// carrying a truthy `type` field.
pub fn is_proxy_entry(key: &str, value: &Value) -> bool {
    if RESERVED_KEYS.contains(&key) {
        return false;
    }
    match value {
        Value::Table(table) => table.get("type").is_some_and(truthy),
        _ => false,
    }
}

/// Loose truthiness over TOML values: `false`, `0`, `0.0`, and `""` are
/// falsy, everything else present is truthy.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Boolean(b) => *b,
        Value::Integer(i) => *i != 0,
        Value::Float(f) => *f != 0.0 && !f.is_nan(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// CRUD operations over proxy entries in the tunnel config file.
pub struct ProxyRegistry {
    store: ConfigStore,
    write_lock: Mutex<()>,
}

impl ProxyRegistry {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// All proxy entries, keyed by name. Reserved keys and type-less tables
    /// are filtered out.
    pub fn list(&self) -> Result<Table, RegistryError> {
        let document = self.store.read()?;
        let proxies = document
            .into_iter()
            .filter(|(key, value)| is_proxy_entry(key, value))
            .collect();
        Ok(proxies)
    }

    /// The entry at `name`, whatever its shape, or `NotFound`.
    pub fn get(&self, name: &str) -> Result<Value, RegistryError> {
        let mut document = self.store.read()?;
        document.remove(name).ok_or(RegistryError::NotFound)
    }

    /// Insert a new proxy entry and persist the document.
    pub async fn create(&self, name: &str, entry: Table) -> Result<(), RegistryError> {
        if !valid_proxy_name(name) {
            return Err(RegistryError::InvalidName);
        }
        if RESERVED_KEYS.contains(&name) {
            return Err(RegistryError::ReservedKey);
        }

        let _guard = self.write_lock.lock().await;
        let mut document = self.store.read()?;
        if document.contains_key(name) {
            return Err(RegistryError::AlreadyExists);
        }
        document.insert(name.to_string(), Value::Table(entry));
        self.store.write(&document)?;
        tracing::info!(proxy = %name, "proxy created");
        Ok(())
    }

    /// Replace an existing proxy entry and persist the document.
    pub async fn update(&self, name: &str, entry: Table) -> Result<(), RegistryError> {
        if RESERVED_KEYS.contains(&name) {
            return Err(RegistryError::ReservedKey);
        }

        let _guard = self.write_lock.lock().await;
        let mut document = self.store.read()?;
        self.require_proxy(&document, name)?;
        document.insert(name.to_string(), Value::Table(entry));
        self.store.write(&document)?;
        tracing::info!(proxy = %name, "proxy updated");
        Ok(())
    }

    /// Remove a proxy entry and persist the document.
    pub async fn delete(&self, name: &str) -> Result<(), RegistryError> {
        if RESERVED_KEYS.contains(&name) {
            return Err(RegistryError::ReservedKey);
        }

        let _guard = self.write_lock.lock().await;
        let mut document = self.store.read()?;
        self.require_proxy(&document, name)?;
        document.remove(name);
        self.store.write(&document)?;
        tracing::info!(proxy = %name, "proxy deleted");
        Ok(())
    }

    /// Guard for update/delete: the target must exist and already be a
    /// proxy, so a system section cannot be replaced by name.
    fn require_proxy(&self, document: &Document, name: &str) -> Result<(), RegistryError> {
        match document.get(name) {
            None => Err(RegistryError::NotFound),
            Some(value) if is_proxy_entry(name, value) => Ok(()),
            Some(_) => Err(RegistryError::NotAProxy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::BackupSettings;
    use std::fs;
    use std::path::Path;

    const FIXTURE: &str = r#"
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

    fn registry_in(dir: &Path) -> ProxyRegistry {
        let path = dir.join("frpc.toml");
        fs::write(&path, FIXTURE).unwrap();
        ProxyRegistry::new(ConfigStore::new(
            path,
            BackupSettings {
                enabled: false,
                dir: None,
            },
        ))
    }

    fn tcp_entry(port: i64) -> Table {
        let mut entry = Table::new();
        entry.insert("type".into(), Value::String("tcp".into()));
        entry.insert("localPort".into(), Value::Integer(port));
        entry
    }

    #[test]
    fn test_valid_proxy_names() {
        assert!(valid_proxy_name("web-1"));
        assert!(valid_proxy_name("ssh_tunnel"));
        assert!(!valid_proxy_name(""));
        assert!(!valid_proxy_name("web.1"));
        assert!(!valid_proxy_name("web 1"));
        assert!(!valid_proxy_name("wéb"));
    }

    #[test]
    fn test_proxy_predicate() {
        let fixture: Table = FIXTURE.parse().unwrap();
        assert!(is_proxy_entry("ssh", &fixture["ssh"]));
        // reserved, even though it is a table
        assert!(!is_proxy_entry("log", &fixture["log"]));
        // scalar
        assert!(!is_proxy_entry("serverAddr", &fixture["serverAddr"]));
        // table without a type field
        assert!(!is_proxy_entry("stale", &fixture["stale"]));
        // falsy type field
        let mut empty_type = Table::new();
        empty_type.insert("type".into(), Value::String(String::new()));
        assert!(!is_proxy_entry("x", &Value::Table(empty_type)));
    }

    #[test]
    fn test_numeric_type_truthiness() {
        let entry = |value: Value| {
            let mut table = Table::new();
            table.insert("type".into(), value);
            Value::Table(table)
        };
        assert!(is_proxy_entry("x", &entry(Value::Integer(1))));
        assert!(!is_proxy_entry("x", &entry(Value::Integer(0))));
        assert!(!is_proxy_entry("x", &entry(Value::Float(0.0))));
        assert!(!is_proxy_entry("x", &entry(Value::Float(f64::NAN))));
        assert!(!is_proxy_entry("x", &entry(Value::Boolean(false))));
    }

    #[test]
    fn test_list_filters_non_proxies() {
        let dir = tempfile::tempdir().unwrap();
        let proxies = registry_in(dir.path()).list().unwrap();
        assert_eq!(proxies.keys().collect::<Vec<_>>(), vec!["ssh"]);
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_in(dir.path());

        registry.create("web", tcp_entry(80)).await.unwrap();
        let fetched = registry.get("web").unwrap();
        assert_eq!(fetched, Value::Table(tcp_entry(80)));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates_and_reserved() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_in(dir.path());

        let err = registry.create("ssh", tcp_entry(22)).await.unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyExists));

        let err = registry.create("serverAddr", tcp_entry(1)).await.unwrap_err();
        assert!(matches!(err, RegistryError::ReservedKey));

        let err = registry.create("bad name!", tcp_entry(1)).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidName));
    }

    #[tokio::test]
    async fn test_update_guards() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_in(dir.path());

        let err = registry.update("missing", tcp_entry(1)).await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound));

        let err = registry.update("log", tcp_entry(1)).await.unwrap_err();
        assert!(matches!(err, RegistryError::ReservedKey));

        // exists but is not a proxy
        let err = registry.update("stale", tcp_entry(1)).await.unwrap_err();
        assert!(matches!(err, RegistryError::NotAProxy));

        registry.update("ssh", tcp_entry(2222)).await.unwrap();
        let fetched = registry.get("ssh").unwrap();
        assert_eq!(fetched["localPort"].as_integer(), Some(2222));
    }

    #[tokio::test]
    async fn test_delete_guards_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_in(dir.path());

        let err = registry.delete("serverAddr").await.unwrap_err();
        assert!(matches!(err, RegistryError::ReservedKey));
        let err = registry.delete("stale").await.unwrap_err();
        assert!(matches!(err, RegistryError::NotAProxy));
        let err = registry.delete("gone").await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound));

        registry.delete("ssh").await.unwrap();
        let err = registry.get("ssh").unwrap_err();
        assert!(matches!(err, RegistryError::NotFound));

        // system settings survive the rewrite
        let reread = fs::read_to_string(dir.path().join("frpc.toml")).unwrap();
        assert!(reread.contains("serverAddr = \"frps.example.com\""));
        assert!(reread.contains("[log]"));
    }

    #[tokio::test]
    async fn test_get_returns_reserved_sections_too() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_in(dir.path());

        let log = registry.get("log").unwrap();
        assert_eq!(log["level"].as_str(), Some("info"));
    }
}
