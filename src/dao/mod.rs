/// Match source consumed by the sync core, backed by a local cache.
pub mod match_source;
/// Upstream match storage backends.
pub mod match_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
