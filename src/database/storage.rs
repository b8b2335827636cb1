use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Errors from a storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on collection '{collection}': {source}")]
    Io {
        collection: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Collection '{collection}' is corrupt: {message}")]
    Corrupt { collection: String, message: String },

    #[error("Failed to encode collection '{collection}': {message}")]
    Encode { collection: String, message: String },
}

/// Whole-collection persistence: every read returns the full ordered
/// sequence and every write replaces it entirely.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn load(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    async fn save(&self, collection: &str, records: Vec<Value>) -> Result<(), StoreError>;

    /// Cheap liveness probe used by GET /health
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// One pretty-printed `<collection>.json` array per collection
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    root: PathBuf,
}

impl JsonFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{}.json", collection))
    }

    /// Write an empty array for `collection` unless a file already exists.
    /// Returns whether a file was written.
    pub async fn ensure_collection(&self, collection: &str, overwrite: bool) -> Result<bool, StoreError> {
        let path = self.collection_path(collection);
        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|source| io_error(collection, source))?;

        if exists && !overwrite {
            return Ok(false);
        }

        self.save(collection, Vec::new()).await?;
        Ok(true)
    }
}

fn io_error(collection: &str, source: std::io::Error) -> StoreError {
    StoreError::Io {
        collection: collection.to_string(),
        source,
    }
}

#[async_trait]
impl Storage for JsonFileStorage {
    async fn load(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let path = self.collection_path(collection);

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            // Not created yet: behaves as an empty collection until first save
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(collection, e)),
        };

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str::<Vec<Value>>(&contents).map_err(|e| StoreError::Corrupt {
            collection: collection.to_string(),
            message: e.to_string(),
        })
    }

    async fn save(&self, collection: &str, records: Vec<Value>) -> Result<(), StoreError> {
        let encoded = serde_json::to_string_pretty(&records).map_err(|e| StoreError::Encode {
            collection: collection.to_string(),
            message: e.to_string(),
        })?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| io_error(collection, source))?;

        // Write a sibling then rename so readers never see a partial document
        let path = self.collection_path(collection);
        let tmp = self.root.join(format!(".{}.json.tmp", collection));
        tokio::fs::write(&tmp, encoded)
            .await
            .map_err(|source| io_error(collection, source))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| io_error(collection, source))?;

        debug!("Saved {} records to {}", records.len(), path.display());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| io_error("*", source))?;
        let metadata = tokio::fs::metadata(&self.root)
            .await
            .map_err(|source| io_error("*", source))?;

        if metadata.permissions().readonly() {
            return Err(io_error(
                "*",
                std::io::Error::new(ErrorKind::PermissionDenied, "data directory is read-only"),
            ));
        }
        Ok(())
    }
}

/// Volatile storage for tests and throwaway runs
#[derive(Debug, Default)]
pub struct MemoryStorage {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        info!("Using in-memory storage; data will not survive a restart");
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn load(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    async fn save(&self, collection: &str, records: Vec<Value>) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        collections.insert(collection.to_string(), records);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
