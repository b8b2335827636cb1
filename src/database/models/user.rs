use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::database::repository::{Record, Repository};
use crate::database::storage::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// bcrypt hash, never the plain text
    pub password: String,
    pub role: String,
    /// Fields written by other tools, kept across rewrites of the file
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> i64 {
        self.id
    }
}

/// User as exposed over the API: everything except the password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            extra: user.extra,
        }
    }
}

impl Repository<User> {
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.select_one(|u| u.email == email).await
    }

    /// Append `user` unless its email is already taken; returns false on a
    /// duplicate. The check and the append happen under one lock.
    pub async fn insert_unique_email(&self, user: User) -> Result<bool, StoreError> {
        self.modify(|users| {
            if users.iter().any(|u| u.email == user.email) {
                return Ok(false);
            }
            users.push(user);
            Ok(true)
        })
        .await
    }
}
