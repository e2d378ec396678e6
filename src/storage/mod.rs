//! Document store implementations for different backends

pub mod in_memory;
#[cfg(feature = "mongodb_backend")]
pub mod mongodb;

pub use in_memory::InMemoryDocumentStore;
#[cfg(feature = "mongodb_backend")]
pub use mongodb::MongoDocumentStore;

use crate::config::{StorageBackend, StorageConfig};
use crate::core::service::DocumentStore;
use anyhow::Result;
use std::sync::Arc;

/// Open the store selected by the configuration
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.backend {
        StorageBackend::InMemory => Ok(Arc::new(InMemoryDocumentStore::new())),
        #[cfg(feature = "mongodb_backend")]
        StorageBackend::Mongodb => {
            let store = MongoDocumentStore::connect(&config.uri, &config.database).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongodb_backend"))]
        StorageBackend::Mongodb => Err(anyhow::anyhow!(
            "mongodb backend requested but medstock was built without the `mongodb_backend` feature"
        )),
    }
}
