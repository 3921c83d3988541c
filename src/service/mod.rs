//! Control of the managed systemd service.
//!
//! # Responsibilities
//! - Restart the frpc unit after configuration changes
//! - Report whether the unit is currently active
//!
//! # Design Decisions
//! - The unit name is validated against a strict character set before it is
//!   ever placed on a command line
//! - Every invocation has a timeout so a hung systemctl cannot pin a
//!   request handler
//! - Status is best-effort: any failure reads as inactive

use std::process::Output;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

const RESTART_TIMEOUT: Duration = Duration::from_secs(30);
const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from restarting the managed service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid service name")]
    InvalidName,

    #[error("systemctl exited with {status}: {stderr}")]
    CommandFailed { status: i32, stderr: String },

    #[error("systemctl did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("failed to run systemctl: {0}")]
    Spawn(#[from] std::io::Error),
}

/// True for unit names safe to place on a command line:
/// `^[a-zA-Z0-9_.-]+$`.
pub fn valid_service_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
}

/// Handle on the systemd unit managed by the console.
pub struct ServiceControl {
    name: String,
}

impl ServiceControl {
    /// Create a handle for `name`, rejecting names outside the allow-listed
    /// character set.
    pub fn new(name: impl Into<String>) -> Result<Self, ServiceError> {
        let name = name.into();
        if !valid_service_name(&name) {
            return Err(ServiceError::InvalidName);
        }
        Ok(Self { name })
    }

    /// Unit name this handle controls.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Restart the unit via `sudo systemctl restart`.
    pub async fn restart(&self) -> Result<(), ServiceError> {
        let output = run(
            Command::new("sudo").args(["systemctl", "restart", &self.name]),
            RESTART_TIMEOUT,
        )
        .await?;

        if output.status.success() {
            tracing::info!(service = %self.name, "service restarted");
            Ok(())
        } else {
            Err(ServiceError::CommandFailed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    /// Whether the unit is active, per `systemctl is-active`.
    ///
    /// Never errors: spawn failures, timeouts, and nonzero exits all read
    /// as inactive.
    pub async fn status(&self) -> bool {
        let result = run(
            Command::new("systemctl").args(["is-active", &self.name]),
            STATUS_TIMEOUT,
        )
        .await;

        match result {
            Ok(output) => String::from_utf8_lossy(&output.stdout).trim() == "active",
            Err(e) => {
                tracing::debug!(service = %self.name, error = %e, "status query failed");
                false
            }
        }
    }
}

async fn run(command: &mut Command, limit: Duration) -> Result<Output, ServiceError> {
    match tokio::time::timeout(limit, command.kill_on_drop(true).output()).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(ServiceError::TimedOut(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_service_names() {
        assert!(valid_service_name("frpc"));
        assert!(valid_service_name("frpc-client.service"));
        assert!(valid_service_name("frpc_2"));
        assert!(!valid_service_name(""));
        assert!(!valid_service_name("frpc; rm -rf /"));
        assert!(!valid_service_name("frpc client"));
    }

    #[test]
    fn test_new_rejects_injection() {
        assert!(matches!(
            ServiceControl::new("frpc && true"),
            Err(ServiceError::InvalidName)
        ));
        assert!(ServiceControl::new("frpc").is_ok());
    }

    #[tokio::test]
    async fn test_status_degrades_to_inactive() {
        // A unit that cannot exist on the test host.
        let control = ServiceControl::new("frpc-console-test-no-such-unit").unwrap();
        assert!(!control.status().await);
    }
}
