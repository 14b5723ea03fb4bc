//! Configuration for the JSON-RPC client.
//!
//! ```
//! use rpc_client::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig::default().with_timeout(Duration::from_secs(60));
//! ```

use std::time::Duration;

use crate::error::RpcError;

/// Default timeout for HTTP requests to the RPC endpoint.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimum allowed timeout.
pub const MIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Maximum allowed timeout.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration options for [`RpcClient`](crate::RpcClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout for HTTP calls.
    ///
    /// Default: 30 seconds. Range: 1-300 seconds.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is out of the `1s..=300s` range.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.timeout < MIN_TIMEOUT || self.timeout > MAX_TIMEOUT {
            return Err(RpcError::InvalidConfig(format!(
                "timeout must be between {MIN_TIMEOUT:?} and {MAX_TIMEOUT:?}, got {:?}",
                self.timeout
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_pattern() {
        let config = ClientConfig::new().with_timeout(Duration::from_secs(60));
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_timeout_too_low() {
        let config = ClientConfig::new().with_timeout(Duration::from_millis(500));
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_timeout_too_high() {
        let config = ClientConfig::new().with_timeout(Duration::from_secs(600));
        assert!(config.validate().is_err());
    }
}
