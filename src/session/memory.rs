use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::catalog::CatalogItem;
use crate::config::ConnectionSettings;
use crate::session::store::{CatalogStore, Connector, CqlStatement, ItemRow};
use crate::{CatalogError, Result};

static CREATE_KEYSPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*CREATE\s+KEYSPACE\s+IF\s+NOT\s+EXISTS\s+(\w+)\s+WITH\s+REPLICATION\s*=\s*\{(.*)\}\s*;?\s*$")
        .unwrap()
});

static CREATE_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*CREATE\s+TABLE\s+IF\s+NOT\s+EXISTS\s+(\w+)\.(\w+)\s*\(").unwrap()
});

static TARGET_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:INTO|FROM)\s+(\w+)\.(\w+)").unwrap()
});

static REPLICATION_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"'((?:[^']|'')*)'\s*:\s*(?:'((?:[^']|'')*)'|(\d+))").unwrap()
});

#[derive(Default)]
struct Cluster {
    keyspaces: HashSet<String>,
    tables: HashMap<String, BTreeMap<i32, ItemRow>>,
    executed: Vec<CqlStatement>,
}

/// In-process stand-in for a wide-column cluster.
///
/// Keeps the semantics the catalog relies on: `IF NOT EXISTS` DDL, a
/// keyspace must exist before its tables, replication may only name known
/// data centers, and writes replace the whole row for a primary key.
/// Clones share the same data.
#[derive(Clone)]
pub struct MemoryStore {
    datacenters: Arc<Vec<String>>,
    cluster: Arc<Mutex<Cluster>>,
}

impl MemoryStore {
    pub fn new<I, S>(datacenters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            datacenters: Arc::new(datacenters.into_iter().map(Into::into).collect()),
            cluster: Arc::new(Mutex::new(Cluster::default())),
        }
    }

    /// Every statement executed so far, in order
    pub fn executed_statements(&self) -> Vec<CqlStatement> {
        self.cluster.lock().executed.clone()
    }

    pub fn has_keyspace(&self, keyspace: &str) -> bool {
        self.cluster.lock().keyspaces.contains(keyspace)
    }

    pub fn has_table(&self, keyspace: &str, table: &str) -> bool {
        self.cluster.lock().tables.contains_key(&format!("{keyspace}.{table}"))
    }

    pub fn row_count(&self, keyspace: &str, table: &str) -> usize {
        self.cluster
            .lock()
            .tables
            .get(&format!("{keyspace}.{table}"))
            .map_or(0, BTreeMap::len)
    }

    fn create_keyspace(&self, cluster: &mut Cluster, keyspace: &str, replication: &str) -> Result<()> {
        for entry in REPLICATION_ENTRY.captures_iter(replication) {
            let key = entry[1].replace("''", "'");
            if key == "class" {
                continue;
            }
            if !self.datacenters.iter().any(|dc| *dc == key) {
                return Err(CatalogError::Query(format!(
                    "Unrecognized strategy option {{{key}}} passed to NetworkTopologyStrategy for keyspace {keyspace}"
                )));
            }
        }
        cluster.keyspaces.insert(keyspace.to_string());
        Ok(())
    }

    fn table_key(statement: &CqlStatement) -> Result<String> {
        let caps = TARGET_TABLE.captures(&statement.text).ok_or_else(|| {
            CatalogError::Query(format!("no table in statement: {}", statement.text))
        })?;
        Ok(format!("{}.{}", &caps[1], &caps[2]))
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn execute_schema(&self, statement: &CqlStatement) -> Result<()> {
        let mut cluster = self.cluster.lock();
        cluster.executed.push(statement.clone());

        if let Some(caps) = CREATE_KEYSPACE.captures(&statement.text) {
            let keyspace = caps[1].to_string();
            if cluster.keyspaces.contains(&keyspace) {
                return Ok(());
            }
            return self.create_keyspace(&mut cluster, &keyspace, &caps[2]);
        }

        if let Some(caps) = CREATE_TABLE.captures(&statement.text) {
            let keyspace = &caps[1];
            if !cluster.keyspaces.contains(keyspace) {
                return Err(CatalogError::Query(format!("Keyspace {keyspace} doesn't exist")));
            }
            let key = format!("{}.{}", keyspace, &caps[2]);
            cluster.tables.entry(key).or_default();
            return Ok(());
        }

        Err(CatalogError::Query(format!("unsupported schema statement: {}", statement.text)))
    }

    async fn write_item(&self, statement: &CqlStatement, item: &CatalogItem) -> Result<()> {
        let key = Self::table_key(statement)?;
        let mut cluster = self.cluster.lock();
        cluster.executed.push(statement.clone());

        let rows = cluster
            .tables
            .get_mut(&key)
            .ok_or_else(|| CatalogError::Query(format!("unconfigured table {key}")))?;
        rows.insert(
            item.item_id,
            ItemRow {
                name: Some(item.name.clone()),
                description: item.description.clone(),
                price: Some(item.price),
            },
        );
        debug!("upserted item {} into {}", item.item_id, key);
        Ok(())
    }

    async fn read_item(&self, statement: &CqlStatement, item_id: i32) -> Result<Option<ItemRow>> {
        let key = Self::table_key(statement)?;
        let mut cluster = self.cluster.lock();
        cluster.executed.push(statement.clone());

        let rows = cluster
            .tables
            .get(&key)
            .ok_or_else(|| CatalogError::Query(format!("unconfigured table {key}")))?;
        Ok(rows.get(&item_id).cloned())
    }

    fn node_count(&self) -> usize {
        self.datacenters.len()
    }
}

/// Hands out handles to one [`MemoryStore`], optionally failing or stalling first
pub struct MemoryConnector {
    store: MemoryStore,
    failures_remaining: AtomicUsize,
    delay: Option<Duration>,
}

impl MemoryConnector {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            failures_remaining: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Refuse the first `count` connection attempts
    pub fn failing_first(self, count: usize) -> Self {
        self.failures_remaining.store(count, Ordering::SeqCst);
        self
    }

    /// Take `delay` to answer each connection attempt
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Store = MemoryStore;

    async fn connect(&self, settings: &ConnectionSettings) -> Result<MemoryStore> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let refused = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(CatalogError::Connection(format!(
                "All host(s) tried for query failed: {:?}",
                settings.contact_points
            )));
        }

        Ok(self.store.clone())
    }
}
