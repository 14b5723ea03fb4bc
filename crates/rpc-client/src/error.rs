//! Error types for the raw JSON-RPC client.
//!
//! - [`RpcError`] - The primary error type for all client operations
//!
//! # Error Philosophy
//!
//! These errors are designed to be:
//! - **Actionable**: Each variant tells you what went wrong
//! - **Convertible**: Easy to convert into the binary's top-level error type
//! - **Informative**: Contains enough context for debugging without leaking secrets

use thiserror::Error;

/// Result type alias using [`RpcError`].
pub type Result<T> = std::result::Result<T, RpcError>;

/// Errors that can occur when talking to a JSON-RPC endpoint.
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | Network | `Connection`, `Timeout`, `Http` | Network issues, server down |
/// | Protocol | `Rpc`, `MethodNotSupported` | Server rejected request |
/// | Data | `Serialization`, `InvalidResponse`, `BatchMismatch` | Malformed data |
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RpcError {
    /// Failed to establish connection to RPC endpoint.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Request timed out waiting for response.
    #[error("request timed out")]
    Timeout,

    /// HTTP-level error (non-2xx status code, TLS issues, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC error returned by the server.
    #[error("RPC error ({code}): {message}")]
    Rpc {
        /// JSON-RPC error code (e.g., -32601 for method not found).
        code: i64,
        /// Human-readable error message from the server.
        message: String,
    },

    /// The requested RPC method is not supported by this endpoint.
    ///
    /// A specific case of [`RpcError::Rpc`] for method-not-found errors,
    /// separated because callers (e.g. the collector falling back from
    /// `txpool_status`) often want to handle it specially.
    #[error("method not supported: {method}")]
    MethodNotSupported {
        /// The method name that was not supported.
        method: String,
    },

    /// Failed to serialize request or deserialize response.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Response was valid JSON but had unexpected structure.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid client configuration (e.g. timeout out of range).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A batch response had a different length than the batch request.
    #[error("batch response mismatch: sent {sent} requests, got {received} responses")]
    BatchMismatch {
        /// Number of requests sent.
        sent: usize,
        /// Number of responses received.
        received: usize,
    },
}

impl RpcError {
    /// Create an RPC error from code and message.
    #[must_use]
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    /// Check if this error indicates the method is not supported.
    #[must_use]
    pub const fn is_method_not_supported(&self) -> bool {
        match self {
            Self::MethodNotSupported { .. } => true,
            Self::Rpc { code, .. } => *code == -32601 || *code == -32600,
            _ => false,
        }
    }

    /// Check if this error is likely transient and retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout => true,
            Self::Http(msg) => {
                msg.contains("500") || msg.contains("502") || msg.contains("503") || msg.contains("504")
            }
            Self::Rpc { code, .. } => *code == -32005 || *code == -32000,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

/// Detailed information from a JSON-RPC error response.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RpcErrorDetail {
    /// JSON-RPC error code.
    pub code: i64,
    /// Human-readable error message.
    pub message: String,
}

impl RpcErrorDetail {
    /// Convert this detail into an [`RpcError`], recognizing method-not-found codes.
    pub fn into_error(self, method: &str) -> RpcError {
        if self.code == -32601 || self.code == -32600 {
            return RpcError::MethodNotSupported {
                method: method.to_string(),
            };
        }
        RpcError::Rpc {
            code: self.code,
            message: self.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_method_not_supported() {
        let explicit = RpcError::MethodNotSupported {
            method: "txpool_status".into(),
        };
        assert!(explicit.is_method_not_supported());

        let rpc_32601 = RpcError::rpc(-32601, "Method not found");
        assert!(rpc_32601.is_method_not_supported());

        let rpc_other = RpcError::rpc(-32000, "Server error");
        assert!(!rpc_other.is_method_not_supported());
    }

    #[test]
    fn error_is_retryable() {
        assert!(RpcError::Timeout.is_retryable());
        assert!(RpcError::Connection("connection refused".into()).is_retryable());
        assert!(RpcError::Http("503 Service Unavailable".into()).is_retryable());
        assert!(!RpcError::MethodNotSupported { method: "test".into() }.is_retryable());
    }

    #[test]
    fn rpc_error_detail_into_method_not_supported() {
        let detail = RpcErrorDetail {
            code: -32601,
            message: "Method not found".into(),
        };
        let error = detail.into_error("txpool_status");
        assert!(matches!(error, RpcError::MethodNotSupported { method } if method == "txpool_status"));
    }
}
