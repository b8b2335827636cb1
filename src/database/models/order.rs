use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::database::repository::{Record, Repository};
use crate::database::storage::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: i64,
    /// Missing or zero means one unit
    #[serde(default)]
    pub quantity: u32,
    /// Anything else the client put on the line item
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CartItem {
    pub fn normalized(self) -> Self {
        Self {
            quantity: self.quantity.max(1),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub items: Vec<CartItem>,
    pub total: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Order {
    const COLLECTION: &'static str = "orders";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Repository<Order> {
    pub async fn select_by_user(&self, user_id: i64) -> Result<Vec<Order>, StoreError> {
        self.select_any(|o| o.user_id == user_id).await
    }
}
