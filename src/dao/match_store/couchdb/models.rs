use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::{match_store::couchdb::error::CouchDaoError, models::MatchEntity};

pub const MATCH_PREFIX: &str = "match::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    pub id: String,
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Match document as stored in CouchDB (`_id = "match::<id>"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchMatchDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub body: MatchEntity,
}

impl TryFrom<CouchMatchDocument> for MatchEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchMatchDocument) -> Result<Self, Self::Error> {
        let id = extract_match_id(&doc.id)?;
        if id != doc.body.id {
            return Err(CouchDaoError::InvalidDocId {
                doc_id: doc.id,
                kind: "document ID does not match the match id",
            });
        }
        Ok(doc.body)
    }
}

pub fn extract_match_id(doc_id: &str) -> Result<&str, CouchDaoError> {
    doc_id
        .strip_prefix(MATCH_PREFIX)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CouchDaoError::InvalidDocId {
            doc_id: doc_id.to_string(),
            kind: "missing `match::` prefix",
        })
}
