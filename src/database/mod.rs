pub mod ids;
pub mod models;
pub mod repository;
pub mod storage;

pub use ids::IdGenerator;
pub use repository::{Record, Repository};
pub use storage::{JsonFileStorage, MemoryStorage, Storage, StoreError};
