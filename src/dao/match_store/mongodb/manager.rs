use std::{sync::Arc, time::Duration};

use mongodb::{
    Client, Database,
    bson::doc,
    options::{ClientOptions, IndexOptions},
};
use tokio::{sync::RwLock, time::sleep};
use tracing::{debug, info};

use super::{
    error::{MongoDaoError, Result},
    models::MATCH_COLLECTION_NAME,
};

const DEFAULT_DB: &str = "matchday";
const START_TIME_INDEX: &str = "match_start_time_idx";
const MAX_PING_ATTEMPTS: u32 = 5;
const FIRST_PING_RETRY: Duration = Duration::from_millis(250);
const MAX_PING_RETRY: Duration = Duration::from_secs(5);

/// Shared MongoDB handle whose client can be swapped after a reconnect.
///
/// Health checks and reconnect scheduling belong to the storage supervisor; the manager only
/// knows how to ping and how to rebuild its client.
#[derive(Clone)]
pub struct MongoManager {
    inner: Arc<Connection>,
}

struct Connection {
    handles: RwLock<(Client, Database)>,
    options: ClientOptions,
    database_name: String,
}

/// Connect using `MONGO_URI` and the optional `MONGO_DB` environment variables.
pub async fn connect_from_env() -> Result<MongoManager> {
    let uri = std::env::var("MONGO_URI")
        .map_err(|_| MongoDaoError::MissingEnvVar { var: "MONGO_URI" })?;
    let db = std::env::var("MONGO_DB").ok().filter(|db| !db.is_empty());
    connect(&uri, db.as_deref()).await
}

/// Parse `uri` and open a client whose first ping succeeded.
pub async fn connect(uri: &str, db_name: Option<&str>) -> Result<MongoManager> {
    let options = ClientOptions::parse(uri)
        .await
        .map_err(|source| MongoDaoError::InvalidUri {
            uri: uri.to_owned(),
            source,
        })?;
    let database_name = db_name.unwrap_or(DEFAULT_DB).to_owned();

    let handles = open(&options, &database_name).await?;
    info!(database = %database_name, "connected to MongoDB");

    Ok(MongoManager {
        inner: Arc::new(Connection {
            handles: RwLock::new(handles),
            options,
            database_name,
        }),
    })
}

/// Create the `start_time` index the match listing sorts on.
pub async fn ensure_indexes(database: &Database) -> Result<()> {
    let index = mongodb::IndexModel::builder()
        .keys(doc! {"start_time": 1})
        .options(
            IndexOptions::builder()
                .name(Some(START_TIME_INDEX.to_string()))
                .build(),
        )
        .build();

    database
        .collection::<mongodb::bson::Document>(MATCH_COLLECTION_NAME)
        .create_index(index)
        .await
        .map_err(|source| MongoDaoError::EnsureIndex {
            collection: MATCH_COLLECTION_NAME,
            index: START_TIME_INDEX,
            source,
        })?;
    Ok(())
}

impl MongoManager {
    /// Clone the current database handle.
    pub async fn database(&self) -> Database {
        self.inner.handles.read().await.1.clone()
    }

    /// Ping the current connection once.
    pub async fn ping(&self) -> Result<()> {
        self.database()
            .await
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    /// Replace the current client with a freshly opened one.
    pub async fn reconnect_once(&self) -> Result<()> {
        let handles = open(&self.inner.options, &self.inner.database_name).await?;
        *self.inner.handles.write().await = handles;
        info!("MongoDB client replaced after reconnect");
        Ok(())
    }
}

async fn open(options: &ClientOptions, database_name: &str) -> Result<(Client, Database)> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    let mut retry = FIRST_PING_RETRY;
    let mut attempt = 1;
    loop {
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => return Ok((client, database)),
            Err(source) if attempt >= MAX_PING_ATTEMPTS => {
                return Err(MongoDaoError::InitialPing {
                    attempts: attempt,
                    source,
                });
            }
            Err(err) => {
                debug!(attempt, error = %err, "MongoDB ping failed; retrying");
                sleep(retry).await;
                retry = (retry * 2).min(MAX_PING_RETRY);
                attempt += 1;
            }
        }
    }
}
