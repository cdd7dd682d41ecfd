use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of `shopping.catalog`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub item_id: i32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
}

/// Confirmation body for both writes and reads: the fields plus the statement that ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPayload {
    pub query: String,
    pub item_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

impl ItemPayload {
    pub fn new(query: &str, item: CatalogItem) -> Self {
        Self {
            query: query.to_string(),
            item_id: item.item_id,
            name: item.name,
            description: item.description,
            price: item.price,
        }
    }
}
