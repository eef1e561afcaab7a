use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Collection, bson::doc};

use crate::dao::{match_store::MatchStore, models::MatchEntity, storage::StorageResult};

use super::{
    MongoDaoError, MongoManager,
    models::{MATCH_COLLECTION_NAME, MongoMatchDocument},
};

/// MongoDB-backed [`MatchStore`] reading the `matches` collection.
#[derive(Clone)]
pub struct MongoMatchStore {
    mongo: MongoManager,
}

impl MongoMatchStore {
    pub fn new(mongo: MongoManager) -> Self {
        Self { mongo }
    }

    async fn collection(&self) -> Collection<MongoMatchDocument> {
        self.mongo
            .database()
            .await
            .collection::<MongoMatchDocument>(MATCH_COLLECTION_NAME)
    }

    async fn list_matches(&self) -> Result<Vec<MatchEntity>, MongoDaoError> {
        let docs: Vec<MongoMatchDocument> = self
            .collection()
            .await
            .find(doc! {})
            .sort(doc! {"start_time": 1})
            .await
            .map_err(|source| MongoDaoError::ListMatches { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListMatches { source })?;

        Ok(docs.into_iter().map(Into::into).collect())
    }
}

impl MatchStore for MongoMatchStore {
    fn fetch_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_matches().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let mongo = self.mongo.clone();
        Box::pin(async move { mongo.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let mongo = self.mongo.clone();
        Box::pin(async move { mongo.reconnect_once().await.map_err(Into::into) })
    }
}
