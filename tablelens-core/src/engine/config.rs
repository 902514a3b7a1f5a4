//! Engine connection configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::EngineKind;

/// Configuration for engine connections.
///
/// # Security
/// This struct intentionally does NOT store credentials. Connection strings
/// are passed separately and only logged after redaction.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use tablelens_core::engine::ConnectionConfig;
///
/// let config = ConnectionConfig::new()
///     .with_request_timeout(Duration::from_secs(10))
///     .with_max_connections(4);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Per-request timeout for HTTP engines
    pub request_timeout: Duration,
    /// Maximum number of connections in pool
    pub max_connections: u32,
    /// Whether to open databases read-only
    pub read_only: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
            max_connections: 10,
            read_only: true,
        }
    }
}

impl ConnectionConfig {
    /// Creates a new connection config with safe defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults suited to an engine kind.
    ///
    /// SQLite uses a single connection; everything else uses the defaults.
    pub fn for_kind(kind: EngineKind) -> Self {
        match kind {
            EngineKind::Sqlite => Self::default().with_max_connections(1),
            EngineKind::Http => Self::default(),
        }
    }

    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns error if configuration values are invalid or unsafe
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_connections == 0 {
            return Err(crate::error::TableLensError::configuration(
                "max_connections must be greater than 0",
            ));
        }

        if self.max_connections > 100 {
            return Err(crate::error::TableLensError::configuration(
                "max_connections should not exceed 100 for safety",
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(crate::error::TableLensError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(crate::error::TableLensError::configuration(
                "request_timeout must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Builder method to set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Builder method to set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builder method to set the pool size.
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Builder method to enable or disable read-only mode.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_config_default() {
        let config = ConnectionConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_connections, 10);
        assert!(config.read_only);
    }

    #[test]
    fn test_sqlite_uses_single_connection() {
        assert_eq!(ConnectionConfig::for_kind(EngineKind::Sqlite).max_connections, 1);
        assert_eq!(ConnectionConfig::for_kind(EngineKind::Http).max_connections, 10);
    }

    #[test]
    fn test_connection_config_validation() {
        assert!(ConnectionConfig::new().validate().is_ok());
        assert!(ConnectionConfig::new().with_max_connections(0).validate().is_err());
        assert!(ConnectionConfig::new().with_max_connections(101).validate().is_err());
        assert!(
            ConnectionConfig::new()
                .with_connect_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            ConnectionConfig::new()
                .with_request_timeout(Duration::from_millis(0))
                .validate()
                .is_err()
        );
    }
}
