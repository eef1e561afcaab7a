//! CouchDB connection settings read from the process environment.

use super::error::{CouchDaoError, CouchResult};

const DEFAULT_DATABASE: &str = "matchday";

/// Where the match documents live and how to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouchConfig {
    /// Server URL without a trailing slash.
    pub base_url: String,
    pub database: String,
    /// Basic-auth pair, set only when both halves are present.
    pub credentials: Option<(String, String)>,
}

impl CouchConfig {
    /// Read `COUCH_BASE_URL` (required), `COUCH_DB` (defaults to `matchday`) and the optional
    /// `COUCH_USERNAME`/`COUCH_PASSWORD` pair.
    pub fn from_env() -> CouchResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CouchResult<Self> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let base_url = non_empty("COUCH_BASE_URL").ok_or(CouchDaoError::MissingEnvVar {
            var: "COUCH_BASE_URL",
        })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            database: non_empty("COUCH_DB").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            credentials: non_empty("COUCH_USERNAME").zip(non_empty("COUCH_PASSWORD")),
        })
    }
}
