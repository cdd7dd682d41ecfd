use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use scylla::frame::response::result::CqlValue;
use scylla::frame::value::CqlDecimal;
use scylla::load_balancing::DefaultPolicy;
use scylla::prepared_statement::PreparedStatement;
use scylla::query::Query;
use scylla::transport::errors::{NewSessionError, QueryError};
use scylla::{ExecutionProfile, Session, SessionBuilder};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use tracing::{debug, info};

use crate::catalog::CatalogItem;
use crate::config::ConnectionSettings;
use crate::session::store::{CatalogStore, Connector, CqlStatement, ItemRow};
use crate::{CatalogError, Result};

/// Largest scale `rust_decimal` can represent
const MAX_DECIMAL_SCALE: i32 = 28;

/// Native protocol port assumed for contact points given without one
pub const DEFAULT_CQL_PORT: u16 = 9042;

impl From<NewSessionError> for CatalogError {
    fn from(e: NewSessionError) -> Self {
        CatalogError::Connection(e.to_string())
    }
}

impl From<QueryError> for CatalogError {
    fn from(e: QueryError) -> Self {
        CatalogError::Query(e.to_string())
    }
}

/// Builds `scylla` sessions tuned for containers that get frozen between invocations
#[derive(Debug, Default, Clone, Copy)]
pub struct ScyllaConnector;

#[async_trait]
impl Connector for ScyllaConnector {
    type Store = ScyllaStore;

    async fn connect(&self, settings: &ConnectionSettings) -> Result<ScyllaStore> {
        // Route to replicas in the local data center only; the keyspace
        // replicates there and nowhere else.
        let policy = DefaultPolicy::builder()
            .prefer_datacenter(settings.local_dc.clone())
            .token_aware(true)
            .permit_dc_failover(false)
            .build();
        let profile = ExecutionProfile::builder()
            .load_balancing_policy(policy)
            .build();

        let nodes: Vec<String> = settings
            .contact_points
            .iter()
            .map(String::as_str)
            .map(with_default_port)
            .collect();

        let mut builder = SessionBuilder::new()
            .known_nodes(&nodes)
            .fetch_schema_metadata(settings.tuning.metadata_sync)
            .default_execution_profile_handle(profile.into_handle());

        // A frozen container cannot answer keep-alives; a heartbeat that fires
        // on resume would tear down a healthy connection.
        builder.config.keepalive_interval = settings.tuning.heartbeat_interval;
        if settings.tuning.heartbeat_interval.is_none() {
            builder.config.keepalive_timeout = None;
        }

        info!(
            "Opening session to {:?} (local dc {}, heartbeat {:?}, metadata sync {})",
            nodes, settings.local_dc, settings.tuning.heartbeat_interval, settings.tuning.metadata_sync
        );
        let session = builder.build().await?;
        Ok(ScyllaStore::new(session))
    }
}

/// Append the native protocol port to contact points that lack one
pub fn with_default_port(host: &str) -> String {
    if host.parse::<SocketAddr>().is_ok() {
        return host.to_string();
    }
    if let Ok(ip) = host.parse::<IpAddr>() {
        return SocketAddr::new(ip, DEFAULT_CQL_PORT).to_string();
    }
    if host.contains(':') {
        return host.to_string();
    }
    format!("{host}:{DEFAULT_CQL_PORT}")
}

/// A connected `scylla` session with a process-lifetime prepared statement cache
pub struct ScyllaStore {
    session: Session,
    prepared: RwLock<HashMap<String, PreparedStatement>>,
}

impl ScyllaStore {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            prepared: RwLock::new(HashMap::new()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    async fn prepare(&self, statement: &CqlStatement) -> Result<PreparedStatement> {
        if let Some(prepared) = self.prepared.read().get(&statement.text) {
            return Ok(prepared.clone());
        }

        // Two invocations may race to prepare the same text; both results are
        // equivalent and the later insert simply wins.
        let mut prepared = self.session.prepare(statement.text.clone()).await?;
        prepared.set_is_idempotent(statement.idempotent);
        debug!("Prepared statement: {}", statement.text);

        self.prepared
            .write()
            .insert(statement.text.clone(), prepared.clone());
        Ok(prepared)
    }
}

#[async_trait]
impl CatalogStore for ScyllaStore {
    async fn execute_schema(&self, statement: &CqlStatement) -> Result<()> {
        let mut query = Query::new(statement.text.clone());
        query.set_is_idempotent(statement.idempotent);
        self.session.query_unpaged(query, ()).await?;
        Ok(())
    }

    async fn write_item(&self, statement: &CqlStatement, item: &CatalogItem) -> Result<()> {
        let prepared = self.prepare(statement).await?;
        let values = (
            item.item_id,
            item.name.as_str(),
            item.description.as_deref(),
            to_cql_decimal(&item.price),
        );
        self.session.execute_unpaged(&prepared, values).await?;
        Ok(())
    }

    async fn read_item(&self, statement: &CqlStatement, item_id: i32) -> Result<Option<ItemRow>> {
        let prepared = self.prepare(statement).await?;
        let result = self.session.execute_unpaged(&prepared, (item_id,)).await?;

        let Some(row) = result.rows_or_empty().into_iter().next() else {
            return Ok(None);
        };
        let mut columns = row.columns.into_iter();
        let name = text_column(columns.next().flatten(), "name")?;
        let description = text_column(columns.next().flatten(), "description")?;
        let price = match columns.next().flatten() {
            None => None,
            Some(CqlValue::Decimal(value)) => Some(from_cql_decimal(&value)?),
            Some(other) => {
                return Err(CatalogError::Query(format!(
                    "unexpected type for column price: {other:?}"
                )));
            }
        };

        Ok(Some(ItemRow {
            name,
            description,
            price,
        }))
    }

    fn node_count(&self) -> usize {
        self.session.get_cluster_data().get_nodes_info().len()
    }
}

fn text_column(value: Option<CqlValue>, column: &str) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(CqlValue::Text(text)) | Some(CqlValue::Ascii(text)) => Ok(Some(text)),
        Some(other) => Err(CatalogError::Query(format!(
            "unexpected type for column {column}: {other:?}"
        ))),
    }
}

/// Encode as CQL `decimal`: minimal two's complement unscaled value plus scale
pub fn to_cql_decimal(value: &Decimal) -> CqlDecimal {
    let bytes = value.mantissa().to_be_bytes();
    let mut start = 0;
    while start < bytes.len() - 1 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    CqlDecimal::from_signed_be_bytes_slice_and_exponent(&bytes[start..], value.scale() as i32)
}

/// Decode a CQL `decimal`, failing when it does not fit `rust_decimal`'s 96-bit mantissa
pub fn from_cql_decimal(value: &CqlDecimal) -> Result<Decimal> {
    let (bytes, scale) = value.as_signed_be_bytes_slice_and_exponent();
    if bytes.is_empty() || bytes.len() > 16 {
        return Err(CatalogError::Query(format!(
            "decimal with {}-byte unscaled value is out of range",
            bytes.len()
        )));
    }

    let fill = if bytes[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    let mut buf = [fill; 16];
    buf[16 - bytes.len()..].copy_from_slice(bytes);
    let mut mantissa = i128::from_be_bytes(buf);

    // Zero under any exponent is zero; the scale only matters for display
    if mantissa == 0 {
        return Ok(Decimal::new(0, scale.clamp(0, MAX_DECIMAL_SCALE) as u32));
    }

    let out_of_range = || CatalogError::Query("decimal value out of range".to_string());
    if scale < 0 {
        // A non-zero i128 times 10^39 always overflows
        let exponent = u32::try_from(-i64::from(scale))
            .ok()
            .filter(|exponent| *exponent <= 38)
            .ok_or_else(out_of_range)?;
        mantissa = 10i128
            .checked_pow(exponent)
            .and_then(|factor| mantissa.checked_mul(factor))
            .ok_or_else(out_of_range)?;
        return Decimal::try_from_i128_with_scale(mantissa, 0).map_err(|_| out_of_range());
    }
    Decimal::try_from_i128_with_scale(mantissa, scale as u32).map_err(|_| out_of_range())
}
