use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::database::repository::{Record, Repository};
use crate::database::storage::StoreError;

pub const DEFAULT_CATEGORY: &str = "General";

/// Fields the server owns; clients may not overwrite them on update
pub const SYSTEM_FIELDS: [&str; 3] = ["id", "createdBy", "createdAt"];

/// Set by the server at creation no matter what the body says
const SERVER_SET_FIELDS: [&str; 5] = ["id", "createdBy", "createdAt", "updatedAt", "deleteRequested"];

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub image: Vec<Value>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub reviews: Vec<Value>,
    #[serde(default)]
    pub tags: Vec<Value>,
    /// Percentage off `price`, 0-100
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub delete_requested: bool,
    pub created_by: i64,
    /// Client-supplied fields outside the known schema, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Product {
    const COLLECTION: &'static str = "products";

    fn id(&self) -> i64 {
        self.id
    }
}

/// POST /products body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub stock: Option<i64>,
    pub image: Option<Vec<Value>>,
    pub rating: Option<f64>,
    pub reviews: Option<Vec<Value>>,
    pub tags: Option<Vec<Value>>,
    pub discount: Option<f64>,
    pub is_featured: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ProductError {
    #[error("Product name and price are required.")]
    MissingRequired,

    #[error("System field '{0}' cannot be set via API")]
    SystemField(String),

    #[error("Invalid product data: {0}")]
    Invalid(String),
}

impl Product {
    pub fn create(
        new: NewProduct,
        id: i64,
        created_by: i64,
        now: DateTime<Utc>,
    ) -> Result<Product, ProductError> {
        let name = new.name.filter(|n| !n.trim().is_empty());
        let (Some(name), Some(price)) = (name, new.price) else {
            return Err(ProductError::MissingRequired);
        };
        let now = now.trunc_subsecs(3);

        let mut extra = new.extra;
        extra.retain(|key, _| !SERVER_SET_FIELDS.contains(&key.as_str()));

        Ok(Product {
            id,
            name,
            price,
            category: new.category.filter(|c| !c.is_empty()).unwrap_or_else(default_category),
            description: new.description.unwrap_or_default(),
            brand: new.brand.unwrap_or_default(),
            stock: new.stock.unwrap_or(0),
            image: new.image.unwrap_or_default(),
            rating: new.rating.unwrap_or(0.0),
            reviews: new.reviews.unwrap_or_default(),
            tags: new.tags.unwrap_or_default(),
            discount: new.discount.unwrap_or(0.0),
            is_featured: new.is_featured.unwrap_or(false),
            created_at: now,
            updated_at: now,
            delete_requested: false,
            created_by,
            extra,
        })
    }

    /// Overlay `patch` on this record. Keys absent from `patch` keep their
    /// current values and `updatedAt` always moves forward.
    pub fn merged(&self, patch: Map<String, Value>, now: DateTime<Utc>) -> Result<Product, ProductError> {
        if let Some(field) = patch.keys().find(|k| SYSTEM_FIELDS.contains(&k.as_str())) {
            return Err(ProductError::SystemField(field.clone()));
        }

        let mut fields = match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => return Err(ProductError::Invalid("product is not an object".to_string())),
            Err(e) => return Err(ProductError::Invalid(e.to_string())),
        };

        for (key, value) in patch {
            if key != "updatedAt" {
                fields.insert(key, value);
            }
        }

        let updated_at = next_timestamp(self.updated_at, now);
        fields.insert(
            "updatedAt".to_string(),
            serde_json::to_value(updated_at).map_err(|e| ProductError::Invalid(e.to_string()))?,
        );

        serde_json::from_value(Value::Object(fields)).map_err(|e| ProductError::Invalid(e.to_string()))
    }
}

/// Millisecond-precision `now`, bumped past `previous` if the clock hasn't moved
fn next_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let candidate = now.trunc_subsecs(3);
    if candidate > previous {
        candidate
    } else {
        previous + Duration::milliseconds(1)
    }
}

impl Repository<Product> {
    /// Products whose creator id matches the path segment textually
    pub async fn select_by_creator(&self, creator: &str) -> Result<Vec<Product>, StoreError> {
        self.select_any(|p| p.created_by.to_string() == creator).await
    }

    pub async fn select_delete_requested(&self) -> Result<Vec<Product>, StoreError> {
        self.select_any(|p| p.delete_requested).await
    }
}
