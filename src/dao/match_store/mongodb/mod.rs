mod error;
mod manager;
mod models;
mod store;

pub use error::MongoDaoError;
pub use manager::{MongoManager, connect, connect_from_env, ensure_indexes};
pub use store::MongoMatchStore;
