#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::{str::FromStr, sync::Arc};

use futures::future::BoxFuture;
use thiserror::Error;

use crate::dao::{
    match_store::memory::InMemoryMatchStore,
    models::MatchEntity,
    storage::StorageResult,
};

/// Environment variable selecting the storage backend.
pub const STORE_ENV: &str = "MATCHDAY_STORE";

/// Abstraction over the upstream document store holding match records.
pub trait MatchStore: Send + Sync {
    /// Fetch every known match.
    fn fetch_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Storage backend chosen at startup.
#[derive(Clone)]
pub enum StoreBackend {
    #[cfg(feature = "couch-store")]
    Couch,
    #[cfg(feature = "mongo-store")]
    Mongo,
    /// Process-local store; every connection attempt hands out the same instance.
    Memory(InMemoryMatchStore),
}

#[derive(Debug, Error)]
#[error("unsupported storage backend `{0}` (expected couch, mongo or memory, subject to enabled features)")]
pub struct UnknownBackend(pub String);

impl StoreBackend {
    /// Backend named by [`STORE_ENV`], or the default one when unset.
    pub fn from_env() -> Result<Self, UnknownBackend> {
        match std::env::var(STORE_ENV) {
            Ok(value) if !value.trim().is_empty() => value.parse(),
            _ => Ok(Self::default()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            #[cfg(feature = "couch-store")]
            StoreBackend::Couch => "couch",
            #[cfg(feature = "mongo-store")]
            StoreBackend::Mongo => "mongo",
            StoreBackend::Memory(_) => "memory",
        }
    }

    /// Open a connection to the backend.
    pub async fn connect(&self) -> StorageResult<Arc<dyn MatchStore>> {
        match self {
            #[cfg(feature = "couch-store")]
            StoreBackend::Couch => {
                let config = couchdb::CouchConfig::from_env()?;
                let store = couchdb::CouchMatchStore::connect(config).await?;
                Ok(Arc::new(store))
            }
            #[cfg(feature = "mongo-store")]
            StoreBackend::Mongo => {
                let manager = mongodb::connect_from_env().await?;
                mongodb::ensure_indexes(&manager.database().await).await?;
                Ok(Arc::new(mongodb::MongoMatchStore::new(manager)))
            }
            StoreBackend::Memory(store) => Ok(Arc::new(store.clone())),
        }
    }
}

impl Default for StoreBackend {
    fn default() -> Self {
        #[cfg(feature = "mongo-store")]
        return StoreBackend::Mongo;
        #[cfg(all(not(feature = "mongo-store"), feature = "couch-store"))]
        return StoreBackend::Couch;
        #[cfg(not(any(feature = "mongo-store", feature = "couch-store")))]
        return StoreBackend::Memory(InMemoryMatchStore::default());
    }
}

impl FromStr for StoreBackend {
    type Err = UnknownBackend;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            #[cfg(feature = "couch-store")]
            "couch" | "couchdb" => Ok(StoreBackend::Couch),
            #[cfg(feature = "mongo-store")]
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory(InMemoryMatchStore::default())),
            _ => Err(UnknownBackend(value.to_string())),
        }
    }
}
