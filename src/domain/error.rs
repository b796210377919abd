use std::fmt;
use thiserror::Error;

/// Failures reported by a beacon provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("beacon service is not bound")]
    NotBound,
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("beacon service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderOperation {
    StartMonitoring,
    StopMonitoring,
    StartRanging,
    StopRanging,
}

impl fmt::Display for ProviderOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StartMonitoring => "start monitoring",
            Self::StopMonitoring => "stop monitoring",
            Self::StartRanging => "start ranging",
            Self::StopRanging => "stop ranging",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{operation} failed for region {region}: {source}")]
    ProviderCall {
        operation: ProviderOperation,
        region: String,
        #[source]
        source: ProviderError,
    },
    #[error("failed to release beacon service: {0}")]
    Unbind(#[source] ProviderError),
    #[error("failed to process ranging update: {0}")]
    RangingHandler(String),
    #[error("invalid beacon UUID: {0:?}")]
    InvalidUuid(String),
}
