// Module for session management
pub mod store;
pub mod manager;
pub mod cluster;
pub mod memory;

pub use store::{CatalogStore, Connector, CqlStatement, ItemRow};
pub use manager::SessionManager;
pub use cluster::{ScyllaConnector, ScyllaStore};
pub use memory::{MemoryConnector, MemoryStore};
