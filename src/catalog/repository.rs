use std::sync::Arc;
use tracing::debug;

use crate::catalog::item::{CatalogItem, ItemPayload};
use crate::schema::CatalogStatements;
use crate::session::{CatalogStore, Connector, SessionManager};
use crate::{CatalogError, Result};

/// The only component that touches catalog rows.
///
/// Both operations run prepared statements bound positionally; values never
/// end up in CQL text.
pub struct CatalogRepository<C: Connector> {
    sessions: Arc<SessionManager<C>>,
    statements: Arc<CatalogStatements>,
}

impl<C: Connector> CatalogRepository<C> {
    pub fn new(sessions: Arc<SessionManager<C>>, statements: Arc<CatalogStatements>) -> Self {
        Self {
            sessions,
            statements,
        }
    }

    /// Upsert `item`. The write is flagged idempotent: replaying it leaves the
    /// same row, so the driver may retry it on transient failures.
    pub async fn add_item(&self, item: CatalogItem) -> Result<ItemPayload> {
        let session = self.sessions.session().await?;
        let statement = &self.statements.write_item;

        session.write_item(statement, &item).await?;
        debug!("Stored catalog item {}", item.item_id);

        Ok(ItemPayload::new(&statement.text, item))
    }

    /// Point lookup by id. A missing row is `CatalogError::NotFound`.
    pub async fn get_item(&self, item_id: i32) -> Result<ItemPayload> {
        let session = self.sessions.session().await?;
        let statement = &self.statements.read_item;

        let row = session
            .read_item(statement, item_id)
            .await?
            .ok_or(CatalogError::NotFound(item_id))?;

        // Cassandra does not enforce required columns; a row written by
        // another client may still have nulls here.
        let name = row
            .name
            .ok_or_else(|| CatalogError::Query(format!("item {item_id} has no name")))?;
        let price = row
            .price
            .ok_or_else(|| CatalogError::Query(format!("item {item_id} has no price")))?;

        let item = CatalogItem {
            item_id,
            name,
            description: row.description,
            price,
        };
        Ok(ItemPayload::new(&statement.text, item))
    }
}
