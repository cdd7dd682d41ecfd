use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::Result;
use crate::catalog::CatalogItem;
use crate::config::ConnectionSettings;

/// CQL text plus the execution flags it is prepared with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CqlStatement {
    pub text: String,
    /// Safe for the driver to retry transparently (speculative execution, timeouts)
    pub idempotent: bool,
}

impl CqlStatement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            idempotent: false,
        }
    }

    pub fn idempotent(mut self) -> Self {
        self.idempotent = true;
        self
    }
}

/// Raw catalog columns as the store returned them; nulls are preserved
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRow {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
}

/// A live, pooled handle to the store. Shared by every in-flight invocation,
/// so implementations must be safe for concurrent statement execution.
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    /// Run a DDL statement unprepared
    async fn execute_schema(&self, statement: &CqlStatement) -> Result<()>;

    /// Run the prepared upsert bound to `(item_id, name, description, price)`
    async fn write_item(&self, statement: &CqlStatement, item: &CatalogItem) -> Result<()>;

    /// Run the prepared point lookup bound to `(item_id)` and return the first row, if any
    async fn read_item(&self, statement: &CqlStatement, item_id: i32) -> Result<Option<ItemRow>>;

    /// Number of nodes discovered at connect time
    fn node_count(&self) -> usize;
}

/// Opens a store from validated settings. One call per successful session.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Store: CatalogStore;

    async fn connect(&self, settings: &ConnectionSettings) -> Result<Self::Store>;
}
