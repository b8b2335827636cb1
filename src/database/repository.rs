use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::database::storage::{Storage, StoreError};

/// A persisted entity stored as one element of a named collection
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> i64;
}

/// Typed access to one collection.
///
/// Every operation loads the whole collection and mutations save it back.
/// The per-collection mutex is held across each load-modify-save so two
/// concurrent writers cannot drop each other's changes.
pub struct Repository<T> {
    storage: Arc<dyn Storage>,
    lock: Mutex<()>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Record> Repository<T> {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            lock: Mutex::new(()),
            _phantom: std::marker::PhantomData,
        }
    }

    async fn load(&self) -> Result<Vec<T>, StoreError> {
        self.storage
            .load(T::COLLECTION)
            .await?
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value(value).map_err(|e| StoreError::Corrupt {
                    collection: T::COLLECTION.to_string(),
                    message: format!("record {}: {}", index, e),
                })
            })
            .collect()
    }

    async fn save(&self, records: &[T]) -> Result<(), StoreError> {
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, _>>()
            .map_err(|e| StoreError::Encode {
                collection: T::COLLECTION.to_string(),
                message: e.to_string(),
            })?;
        self.storage.save(T::COLLECTION, values).await
    }

    pub async fn select_all(&self) -> Result<Vec<T>, StoreError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    pub async fn select_any<F>(&self, predicate: F) -> Result<Vec<T>, StoreError>
    where
        F: Fn(&T) -> bool + Send,
    {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_iter().filter(|r| predicate(r)).collect())
    }

    pub async fn select_one<F>(&self, predicate: F) -> Result<Option<T>, StoreError>
    where
        F: Fn(&T) -> bool + Send,
    {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_iter().find(|r| predicate(r)))
    }

    pub async fn select_id(&self, id: i64) -> Result<Option<T>, StoreError> {
        self.select_one(|r| r.id() == id).await
    }

    pub async fn insert(&self, record: T) -> Result<T, StoreError> {
        self.modify(|records| {
            records.push(record.clone());
            Ok::<_, StoreError>(record)
        })
        .await
    }

    /// Run `change` against the loaded collection and save the result.
    ///
    /// Nothing is written when `change` returns an error.
    pub async fn modify<R, E, F>(&self, change: F) -> Result<R, E>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, E> + Send,
        E: From<StoreError>,
    {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let result = change(&mut records)?;
        self.save(&records).await?;
        Ok(result)
    }

    /// Apply `change` to the record with `id` in place and save.
    ///
    /// Returns `Ok(None)` without writing when no record has that id.
    pub async fn modify_id<R, E, F>(&self, id: i64, change: F) -> Result<Option<R>, E>
    where
        F: FnOnce(&mut T) -> Result<R, E> + Send,
        E: From<StoreError>,
    {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let Some(record) = records.iter_mut().find(|r| r.id() == id) else {
            return Ok(None);
        };
        let result = change(record)?;
        self.save(&records).await?;
        Ok(Some(result))
    }

    /// Remove the record with `id` once `guard` accepts it.
    ///
    /// Returns `Ok(None)` when absent; a guard error leaves the collection untouched.
    pub async fn delete_id_if<E, F>(&self, id: i64, guard: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&T) -> Result<(), E> + Send,
        E: From<StoreError>,
    {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let Some(index) = records.iter().position(|r| r.id() == id) else {
            return Ok(None);
        };
        guard(&records[index])?;
        let removed = records.remove(index);
        self.save(&records).await?;
        Ok(Some(removed))
    }

    pub async fn delete_id(&self, id: i64) -> Result<Option<T>, StoreError> {
        self.delete_id_if(id, |_| Ok(())).await
    }
}
