pub mod config;
pub mod logging;
pub mod session;
pub mod schema;
pub mod catalog;
pub mod service;
pub mod adapters;
pub mod server;
pub mod lambda;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query execution error: {0}")]
    Query(String),

    #[error("Item {0} not found")]
    NotFound(i32),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

// One failed connect attempt is reported to every caller that waited on it
impl Clone for CatalogError {
    fn clone(&self) -> Self {
        match self {
            CatalogError::Config(msg) => CatalogError::Config(msg.clone()),
            CatalogError::Connection(msg) => CatalogError::Connection(msg.clone()),
            CatalogError::Query(msg) => CatalogError::Query(msg.clone()),
            CatalogError::NotFound(id) => CatalogError::NotFound(*id),
            CatalogError::InvalidParameter(msg) => CatalogError::InvalidParameter(msg.clone()),
            CatalogError::Json(e) => CatalogError::Json(serde::de::Error::custom(e.to_string())),
            CatalogError::Io(e) => CatalogError::Io(std::io::Error::new(e.kind(), e.to_string())),
        }
    }
}

impl CatalogError {
    /// Get the HTTP status code adapters report for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CatalogError::Config(_) => 500,
            CatalogError::Connection(_) => 503, // service_unavailable
            CatalogError::Query(_) => 500,
            CatalogError::NotFound(_) => 404,
            CatalogError::InvalidParameter(_) => 400,
            CatalogError::Json(_) => 400,
            CatalogError::Io(_) => 500,
        }
    }

    /// Stable machine-readable name used in error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::Config(_) => "configuration_error",
            CatalogError::Connection(_) => "connection_error",
            CatalogError::Query(_) => "query_error",
            CatalogError::NotFound(_) => "not_found",
            CatalogError::InvalidParameter(_) => "invalid_parameter",
            CatalogError::Json(_) => "invalid_json",
            CatalogError::Io(_) => "io_error",
        }
    }
}
