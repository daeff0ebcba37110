use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("Kubernetes error: {0}")]
    KubernetesError(String),

    #[error("Metrics error: {0}")]
    MetricsError(String),

    #[error("Failed to bind metrics endpoint on {0}: {1}")]
    BindFailed(SocketAddr, std::io::Error),

    #[error("Metrics server error: {0}")]
    ServerError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<prometheus::Error> for ExporterError {
    fn from(e: prometheus::Error) -> Self {
        ExporterError::MetricsError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;
