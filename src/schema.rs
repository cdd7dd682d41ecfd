use std::sync::Arc;
use tracing::info;

use crate::Result;
use crate::session::{CatalogStore, Connector, CqlStatement, SessionManager};

pub const KEYSPACE: &str = "shopping";
pub const TABLE: &str = "catalog";

/// Every statement the catalog runs, rendered once per process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStatements {
    pub create_keyspace: CqlStatement,
    pub create_table: CqlStatement,
    pub write_item: CqlStatement,
    pub read_item: CqlStatement,
}

impl CatalogStatements {
    /// Render the statements for a cluster whose local data center is `local_dc`
    pub fn new(local_dc: &str) -> Self {
        // The data center name is the only value spliced into CQL text; it
        // lands inside a string literal, so quotes are doubled.
        let dc = local_dc.replace('\'', "''");

        Self {
            create_keyspace: CqlStatement::new(format!(
                "CREATE KEYSPACE IF NOT EXISTS {KEYSPACE} \
                 WITH REPLICATION = {{'class':'NetworkTopologyStrategy','{dc}': 1}}"
            ))
            .idempotent(),
            create_table: CqlStatement::new(format!(
                "CREATE TABLE IF NOT EXISTS {KEYSPACE}.{TABLE} \
                 (item_id int, name text, description text, price decimal, PRIMARY KEY (item_id))"
            ))
            .idempotent(),
            write_item: CqlStatement::new(format!(
                "INSERT INTO {KEYSPACE}.{TABLE} (item_id, name, description, price) VALUES (?, ?, ?, ?)"
            ))
            .idempotent(),
            read_item: CqlStatement::new(format!(
                "SELECT name, description, price FROM {KEYSPACE}.{TABLE} WHERE item_id = ?"
            ))
            .idempotent(),
        }
    }
}

/// Creates the keyspace and table if they are missing
pub struct SchemaBootstrapper<C: Connector> {
    sessions: Arc<SessionManager<C>>,
    statements: Arc<CatalogStatements>,
}

impl<C: Connector> SchemaBootstrapper<C> {
    pub fn new(sessions: Arc<SessionManager<C>>, statements: Arc<CatalogStatements>) -> Self {
        Self {
            sessions,
            statements,
        }
    }

    /// Run the keyspace statement, then the table statement. A keyspace
    /// failure is returned as-is and the table statement is never sent.
    pub async fn create_schema(&self) -> Result<String> {
        let session = self.sessions.session().await?;

        session.execute_schema(&self.statements.create_keyspace).await?;
        session.execute_schema(&self.statements.create_table).await?;

        info!("Schema {}.{} is in place", KEYSPACE, TABLE);
        Ok(format!("Successfully created {KEYSPACE}.{TABLE} schema"))
    }
}
