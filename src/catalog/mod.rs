// Catalog items and the repository that reads and writes them
pub mod item;
pub mod repository;

pub use item::{CatalogItem, ItemPayload};
pub use repository::CatalogRepository;
