//! Platform error types

/// Errors raised synchronously when a platform request cannot be issued
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlatformError {
    /// The requested system service does not exist on this device
    #[error("{service} service not found")]
    ServiceNotFound { service: String },
    /// The named location provider is unknown or disabled
    #[error("location provider '{provider}' is not available")]
    ProviderUnavailable { provider: String },
}

/// Result type for platform requests
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Why an issued fix request produced no position
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AcquisitionFailure {
    /// No fix arrived before the deadline
    #[error("no fix within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
    /// The provider was switched off while the request was outstanding
    #[error("provider '{provider}' was disabled")]
    ProviderDisabled { provider: String },
    /// The provider reported an error
    #[error("{message}")]
    Provider { message: String },
}
