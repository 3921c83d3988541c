//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the listen address parses
//! - Check credentials are present and the hash looks like bcrypt
//! - Check the service name cannot be abused for command injection
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: Settings → Result<(), Vec<ValidationError>>
//! - Runs before settings are accepted into the process

use std::net::SocketAddr;

use crate::config::schema::Settings;
use crate::service::valid_service_name;

/// A single semantic problem found in the settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    BadListenAddr(String),
    EmptyConfigPath,
    EmptyUsername,
    BadPasswordHash,
    BadServiceName(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::BadListenAddr(addr) => {
                write!(f, "listen_addr {:?} is not a valid socket address", addr)
            }
            ValidationError::EmptyConfigPath => write!(f, "frpc_config_path must not be empty"),
            ValidationError::EmptyUsername => write!(f, "auth.username must not be empty"),
            ValidationError::BadPasswordHash => {
                write!(f, "auth.password_hash must be a bcrypt hash (starts with \"$2\")")
            }
            ValidationError::BadServiceName(name) => {
                write!(
                    f,
                    "service.name {:?} may only contain alphanumerics, hyphens, underscores, and dots",
                    name
                )
            }
        }
    }
}

/// Validate settings, collecting every problem found.
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.listen_addr.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BadListenAddr(settings.listen_addr.clone()));
    }

    if settings.frpc_config_path.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyConfigPath);
    }

    if settings.auth.username.is_empty() {
        errors.push(ValidationError::EmptyUsername);
    }

    if !settings.auth.password_hash.starts_with("$2") {
        errors.push(ValidationError::BadPasswordHash);
    }

    if !valid_service_name(&settings.service.name) {
        errors.push(ValidationError::BadServiceName(settings.service.name.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{AuthSettings, BackupSettings, ServiceSettings};

    fn valid_settings() -> Settings {
        Settings {
            listen_addr: "127.0.0.1:8080".into(),
            frpc_config_path: "/etc/frp/frpc.toml".into(),
            auth: AuthSettings {
                username: "admin".into(),
                password_hash: "$2b$12$abcdefghijklmnopqrstuv".into(),
                secure_cookie: false,
            },
            backups: BackupSettings::default(),
            service: ServiceSettings::default(),
            static_dir: None,
        }
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_all_errors_collected() {
        let mut settings = valid_settings();
        settings.listen_addr = "not-an-addr".into();
        settings.auth.username = String::new();
        settings.service.name = "frpc; rm -rf /".into();

        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::EmptyUsername));
    }

    #[test]
    fn test_plaintext_password_rejected() {
        let mut settings = valid_settings();
        settings.auth.password_hash = "hunter2".into();

        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors, vec![ValidationError::BadPasswordHash]);
    }
}
