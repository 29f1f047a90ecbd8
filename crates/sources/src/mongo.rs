//! MongoDB document store
//!
//! Wraps the `movies` collection of an mflix-style database. Documents are
//! read as raw BSON and mapped into [`MovieRecord`]s so the payload keeps
//! whatever fields the collection carries.

use std::time::Duration;

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use catalog::{MoviePatch, MovieRecord, MovieSearch, MovieSource, UpdateOutcome};
use futures_util::TryStreamExt;
use mongodb::{
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection, Cursor,
};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::store::{DocumentStore, StoreError, StoreResult};

/// Connection settings for the document store
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// Connection string (`mongodb://` or `mongodb+srv://`)
    pub uri: String,
    pub database: String,
    pub collection: String,
    /// Bound on server selection and connection establishment
    pub connect_timeout: Duration,
}

/// Document store backed by a MongoDB collection
#[derive(Clone)]
pub struct MongoMovieStore {
    collection: Collection<Document>,
}

impl MongoMovieStore {
    /// Connect, pin the stable server API and verify with a `ping`
    pub async fn connect(config: &MongoConfig) -> StoreResult<Self> {
        info!(
            "Connecting to MongoDB database '{}' (collection '{}')",
            config.database, config.collection
        );

        let mut options = ClientOptions::parse(config.uri.as_str())
            .await
            .map_err(unavailable)?;
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
        options.server_selection_timeout = Some(config.connect_timeout);
        options.connect_timeout = Some(config.connect_timeout);
        options.app_name = Some("movie-bridge".to_string());

        let client = Client::with_options(options).map_err(unavailable)?;
        let database = client.database(&config.database);

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::unavailable(MovieSource::Mongo, format!("ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", config.database);

        Ok(Self {
            collection: database.collection(&config.collection),
        })
    }

    /// Wrap an existing collection handle
    pub fn from_collection(collection: Collection<Document>) -> Self {
        Self { collection }
    }

    async fn collect_records(cursor: Cursor<Document>) -> StoreResult<Vec<MovieRecord>> {
        let documents: Vec<Document> = cursor.try_collect().await.map_err(unavailable)?;
        let total = documents.len();

        let records: Vec<MovieRecord> = documents.into_iter().filter_map(document_to_record).collect();
        if records.len() != total {
            warn!(
                "Skipped {} of {} documents without a string title",
                total - records.len(),
                total
            );
        }
        Ok(records)
    }
}

#[async_trait]
impl DocumentStore for MongoMovieStore {
    #[instrument(skip(self))]
    async fn find_all(&self) -> StoreResult<Vec<MovieRecord>> {
        let cursor = self.collection.find(doc! {}).await.map_err(unavailable)?;
        let records = Self::collect_records(cursor).await?;
        debug!("Read {} movie documents", records.len());
        Ok(records)
    }

    #[instrument(skip(self))]
    async fn find_by_title(&self, title: &str) -> StoreResult<Option<MovieRecord>> {
        let document = self
            .collection
            .find_one(doc! { "title": title })
            .await
            .map_err(unavailable)?;
        Ok(document.and_then(document_to_record))
    }

    #[instrument(skip(self))]
    async fn search(&self, search: &MovieSearch) -> StoreResult<Vec<MovieRecord>> {
        let cursor = self
            .collection
            .find(search_filter(search))
            .await
            .map_err(unavailable)?;
        Self::collect_records(cursor).await
    }

    #[instrument(skip(self, patch), fields(fields = patch.len()))]
    async fn update_by_title(&self, title: &str, patch: &MoviePatch) -> StoreResult<UpdateOutcome> {
        let set = set_document(patch)?;

        let result = self
            .collection
            .update_one(doc! { "title": title }, doc! { "$set": set })
            .await
            .map_err(unavailable)?;

        debug!(
            "Update on '{}': matched {}, modified {}",
            title, result.matched_count, result.modified_count
        );
        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }
}

fn unavailable(err: mongodb::error::Error) -> StoreError {
    StoreError::unavailable(MovieSource::Mongo, err.to_string())
}

/// `$set` body for a validated patch
pub(crate) fn set_document(patch: &MoviePatch) -> StoreResult<Document> {
    bson::to_document(patch.fields()).map_err(|e| StoreError::Encode {
        store: MovieSource::Mongo,
        message: e.to_string(),
    })
}

/// Case-insensitive, literal filter on `title` and/or any `cast` member
pub(crate) fn search_filter(search: &MovieSearch) -> Document {
    let mut filter = Document::new();
    if let Some(title) = &search.title {
        filter.insert("title", literal_regex(title));
    }
    if let Some(actor) = &search.actor {
        filter.insert("cast", literal_regex(actor));
    }
    filter
}

fn literal_regex(term: &str) -> Document {
    doc! { "$regex": regex::escape(term), "$options": "i" }
}

/// Map a raw document into a record.
///
/// Returns `None` for documents without a string `title`; those cannot take
/// part in title matching.
pub(crate) fn document_to_record(document: Document) -> Option<MovieRecord> {
    let mut title = None;
    let mut payload = Map::new();

    for (key, value) in document {
        if key == "title" {
            match value {
                Bson::String(t) => title = Some(t),
                _ => return None,
            }
        } else {
            payload.insert(key, bson_to_json(value));
        }
    }

    title.map(|title| MovieRecord { title, payload })
}

/// ObjectIds become hex strings and datetimes RFC 3339 strings, at any depth.
/// Everything else uses relaxed extended JSON.
fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(datetime) => datetime
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or_else(|_| Value::from(datetime.timestamp_millis())),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(document) => Value::Object(
            document
                .into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect(),
        ),
        other => other.into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use serde_json::json;

    #[test]
    fn test_document_to_record_maps_payload() {
        let oid = ObjectId::parse_str("573a1390f29313caabcd42e8").unwrap();
        let document = doc! {
            "_id": oid,
            "title": "The Great Train Robbery",
            "year": 1903,
            "genres": ["Short", "Western"],
            "imdb": { "rating": 7.4, "votes": 9847 },
            "released": bson::DateTime::from_millis(0),
        };

        let record = document_to_record(document).unwrap();

        assert_eq!(record.title, "The Great Train Robbery");
        assert_eq!(record.field("_id"), Some(&json!("573a1390f29313caabcd42e8")));
        assert_eq!(record.field("year"), Some(&json!(1903)));
        assert_eq!(record.field("genres"), Some(&json!(["Short", "Western"])));
        assert_eq!(record.field("imdb"), Some(&json!({ "rating": 7.4, "votes": 9847 })));
        assert_eq!(record.field("released"), Some(&json!("1970-01-01T00:00:00Z")));
        assert!(record.field("title").is_none());
    }

    #[test]
    fn test_nested_datetimes_are_strings() {
        let document = doc! {
            "title": "Blacksmith Scene",
            "tomatoes": { "lastUpdated": bson::DateTime::from_millis(0) },
        };

        let record = document_to_record(document).unwrap();

        assert_eq!(
            record.field("tomatoes"),
            Some(&json!({ "lastUpdated": "1970-01-01T00:00:00Z" }))
        );
    }

    #[test]
    fn test_document_without_string_title_is_skipped() {
        assert!(document_to_record(doc! { "year": 1999 }).is_none());
        assert!(document_to_record(doc! { "title": 1999 }).is_none());
        assert!(document_to_record(doc! { "title": Bson::Null }).is_none());
    }

    #[test]
    fn test_search_filter_escapes_terms() {
        let filter = search_filter(&MovieSearch {
            title: Some("Se7en (1995)".into()),
            actor: Some("Brad Pitt".into()),
        });

        assert_eq!(
            filter,
            doc! {
                "title": { "$regex": "Se7en \\(1995\\)", "$options": "i" },
                "cast": { "$regex": "Brad Pitt", "$options": "i" },
            }
        );
    }

    #[test]
    fn test_set_document_from_patch() {
        let patch = MoviePatch::from_json(json!({
            "num_mflix_comments": i64::MAX,
            "imdb": { "rating": 8.1 },
            "plot": null
        }))
        .unwrap();

        let set = set_document(&patch).unwrap();

        assert_eq!(set.get_i64("num_mflix_comments").unwrap(), i64::MAX);
        assert_eq!(set.get_document("imdb").unwrap().get_f64("rating").unwrap(), 8.1);
        assert!(!set.contains_key("plot"));
    }

    #[test]
    fn test_empty_search_matches_everything() {
        assert_eq!(search_filter(&MovieSearch::default()), Document::new());
    }
}
