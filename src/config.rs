use clap::{Parser, ValueEnum};
use std::env;
use std::time::Duration;

use crate::adapters::Operation;
use crate::{CatalogError, Result};

/// HTTP convention spoken by the `catalog-faas` server binary
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Google Cloud Functions style: plain HTTP routes per function
    Gcp,
    /// Azure Functions custom handler: `POST /{function}` invoke payloads
    Azure,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "catalog-faas")]
#[command(about = "Catalog data access for serverless handlers in front of a Cassandra-compatible store", long_about = None)]
pub struct Config {
    // Connection
    #[arg(long, env = "CONTACT_POINTS", help = "Comma-separated list of store contact points")]
    pub contact_points: Option<String>,

    #[arg(long, env = "LOCAL_DC", help = "Local data center used for routing and replication")]
    pub local_dc: Option<String>,

    // Session tuning
    #[arg(long, default_value = "0", env = "HEARTBEAT_INTERVAL_SECS", help = "CQL keep-alive interval in seconds, 0 disables heartbeats")]
    pub heartbeat_interval_secs: u64,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set, env = "METADATA_SYNC", help = "Fetch schema metadata from the cluster (disable to cut cold start latency)")]
    pub metadata_sync: bool,

    // Runtime
    #[arg(long, default_value = "info", env = "CATALOG_LOG_LEVEL")]
    pub log_level: String,

    #[arg(short, long, env = "CATALOG_PORT", help = "HTTP listen port (falls back to FUNCTIONS_CUSTOMHANDLER_PORT, PORT, then 8080)")]
    pub port: Option<u16>,

    #[arg(long, value_enum, default_value = "gcp", env = "CATALOG_PLATFORM")]
    pub platform: Platform,

    #[arg(long, env = "CATALOG_IN_MEMORY", help = "Use the in-process store instead of a cluster (for local runs only)")]
    pub in_memory: bool,

    #[arg(long, env = "CATALOG_OPERATION", help = "Fixed operation for a single-purpose Lambda function")]
    pub operation: Option<String>,

    #[arg(long, env = "_HANDLER", hide = true)]
    pub handler: Option<String>,
}

impl Config {
    /// Get a configuration instance with all values resolved from CLI args and environment variables
    pub fn load() -> Self {
        Config::parse()
    }

    /// Validate the required connection values and bundle them with the session tuning
    pub fn connection_settings(&self) -> Result<ConnectionSettings> {
        let settings = ConnectionSettings::resolve(
            self.contact_points.as_deref(),
            self.local_dc.as_deref(),
        )?;
        Ok(settings.with_tuning(self.session_tuning()))
    }

    pub fn session_tuning(&self) -> SessionTuning {
        SessionTuning {
            heartbeat_interval: match self.heartbeat_interval_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            metadata_sync: self.metadata_sync,
        }
    }

    /// Port to listen on, honouring the variables the hosting platforms inject
    pub fn listen_port(&self) -> u16 {
        if let Some(port) = self.port {
            return port;
        }
        ["FUNCTIONS_CUSTOMHANDLER_PORT", "PORT"]
            .iter()
            .filter_map(|key| env::var(key).ok())
            .find_map(|value| value.trim().parse().ok())
            .unwrap_or(8080)
    }

    /// Function this Lambda deployment serves, if pinned.
    ///
    /// An explicit `CATALOG_OPERATION` must name a real function. The
    /// `_HANDLER` suffix is only a hint: `handler.addItem` pins `addItem`,
    /// while `bootstrap` or `main.handler` pin nothing.
    pub fn pinned_operation(&self) -> Result<Option<Operation>> {
        if let Some(operation) = self.operation.as_deref() {
            return operation.parse().map(Some);
        }
        Ok(self
            .handler
            .as_deref()
            .and_then(|handler| handler.rsplit_once('.'))
            .and_then(|(_, name)| name.parse().ok()))
    }
}

/// Behaviour knobs for sessions living in freezable containers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTuning {
    /// `None` keeps the driver from sending keep-alives while the container is frozen
    pub heartbeat_interval: Option<Duration>,
    pub metadata_sync: bool,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            heartbeat_interval: None,
            metadata_sync: true,
        }
    }
}

/// Validated connection parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub contact_points: Vec<String>,
    pub local_dc: String,
    pub tuning: SessionTuning,
}

impl ConnectionSettings {
    /// Resolve raw `CONTACT_POINTS` / `LOCAL_DC` values, failing on absent or blank input
    pub fn resolve(contact_points: Option<&str>, local_dc: Option<&str>) -> Result<Self> {
        let contact_points: Vec<String> = contact_points
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .map(str::to_string)
            .collect();
        if contact_points.is_empty() {
            return Err(CatalogError::Config(
                "Environment variable CONTACT_POINTS not set".to_string(),
            ));
        }

        let local_dc = local_dc.map(str::trim).unwrap_or_default();
        if local_dc.is_empty() {
            return Err(CatalogError::Config(
                "Environment variable LOCAL_DC not set".to_string(),
            ));
        }

        Ok(Self {
            contact_points,
            local_dc: local_dc.to_string(),
            tuning: SessionTuning::default(),
        })
    }

    pub fn with_tuning(mut self, tuning: SessionTuning) -> Self {
        self.tuning = tuning;
        self
    }
}
