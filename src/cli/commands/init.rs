use anyhow::Context;
use std::path::PathBuf;

use crate::config::config;
use crate::database::models::{Order, Product, User};
use crate::database::{JsonFileStorage, Record};

/// Collections the server reads and writes
const COLLECTIONS: [&str; 3] = [User::COLLECTION, Product::COLLECTION, Order::COLLECTION];

pub async fn handle(data_dir: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let data_dir = data_dir.unwrap_or_else(|| config().server.data_dir.clone());
    let storage = JsonFileStorage::new(&data_dir);

    for collection in COLLECTIONS {
        let written = storage
            .ensure_collection(collection, force)
            .await
            .with_context(|| format!("failed to initialize {}", collection))?;

        let path = storage.collection_path(collection);
        if written {
            println!("Created {}", path.display());
        } else {
            println!("Kept existing {}", path.display());
        }
    }

    Ok(())
}
