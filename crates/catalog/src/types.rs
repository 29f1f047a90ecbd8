//! Core domain types shared by both stores.
//!
//! A movie looks different in each store: the document store carries the
//! full mflix schema, the graph store only a handful of node properties. The
//! types here keep the one field everything agrees on (`title`) typed, and
//! carry the rest as an open JSON payload.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::error::{PatchError, RecordError};

// =============================================================================
// Provenance
// =============================================================================

/// Which store a record came from, or which store an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MovieSource {
    /// MongoDB collection of movie documents
    Mongo,
    /// Neo4j `:Movie` nodes
    Graph,
}

impl MovieSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieSource::Mongo => "mongo",
            MovieSource::Graph => "graph",
        }
    }
}

impl fmt::Display for MovieSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// MovieRecord
// =============================================================================

/// One movie as read from either store.
///
/// `title` is the join key used by reconciliation. Every other field is
/// opaque payload and is serialized next to `title` unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MovieRecord {
    pub title: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl MovieRecord {
    /// Create a record with a title and no payload
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            payload: Map::new(),
        }
    }

    /// Add a payload field (builder style)
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(name.into(), value.into());
        self
    }

    /// Look up a payload field
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// Build a record from an arbitrary JSON value.
    ///
    /// The value must be an object with a string `title`; everything else
    /// becomes payload.
    pub fn from_json(value: Value) -> Result<Self, RecordError> {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(RecordError::NotAnObject {
                    kind: json_kind(&other),
                });
            }
        };

        match object.remove("title") {
            Some(Value::String(title)) => Ok(Self {
                title,
                payload: object,
            }),
            _ => Err(RecordError::MissingTitle),
        }
    }
}

// =============================================================================
// Updates
// =============================================================================

/// A validated partial update for a document-store record.
///
/// Null members are dropped so only provided fields are set. The remaining
/// fields are guaranteed non-empty and safe to use as `$set` keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MoviePatch {
    fields: Map<String, Value>,
}

impl MoviePatch {
    /// Validate a JSON body into a patch
    pub fn from_json(value: Value) -> Result<Self, PatchError> {
        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(PatchError::NotAnObject {
                    kind: json_kind(&other),
                });
            }
        };

        let fields: Map<String, Value> = object
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .collect();

        for (name, value) in &fields {
            if name.is_empty() || name.starts_with('$') || name.contains('.') || name == "_id" {
                return Err(PatchError::ForbiddenField { name: name.clone() });
            }
            if name == "title" && !matches!(value, Value::String(t) if !t.trim().is_empty()) {
                return Err(PatchError::InvalidTitle);
            }
            if !fits_signed_64(value) {
                return Err(PatchError::NumberOutOfRange { name: name.clone() });
            }
        }

        if fields.is_empty() {
            return Err(PatchError::Empty);
        }

        Ok(Self { fields })
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// New title, when the patch renames the movie
    pub fn title(&self) -> Option<&str> {
        self.fields.get("title").and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Apply the patch on top of an existing record (used by in-memory stores)
    pub fn apply_to(&self, record: &mut MovieRecord) {
        for (name, value) in &self.fields {
            match (name.as_str(), value) {
                ("title", Value::String(title)) => record.title = title.clone(),
                _ => {
                    record.payload.insert(name.clone(), value.clone());
                }
            }
        }
    }
}

/// Counts reported by an update.
///
/// A title that matches nothing yields `matched == 0`; this is a normal
/// outcome, not an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

impl UpdateOutcome {
    pub fn is_noop(&self) -> bool {
        self.matched == 0
    }
}

// =============================================================================
// Search and graph-only shapes
// =============================================================================

/// Title and/or actor search over the document store.
///
/// Both terms are literal, case-insensitive substrings. With neither set the
/// search matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSearch {
    pub title: Option<String>,
    pub actor: Option<String>,
}

impl MovieSearch {
    pub fn by_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            actor: None,
        }
    }

    pub fn by_actor(actor: impl Into<String>) -> Self {
        Self {
            title: None,
            actor: Some(actor.into()),
        }
    }

    /// Drop blank terms so `?title=` behaves like an absent parameter
    pub fn normalized(self) -> Self {
        let keep = |term: Option<String>| term.filter(|t| !t.trim().is_empty());
        Self {
            title: keep(self.title),
            actor: keep(self.actor),
        }
    }

    /// In-memory evaluation of the search, mirroring the store query
    pub fn matches(&self, record: &MovieRecord) -> bool {
        let title_ok = self
            .title
            .as_deref()
            .is_none_or(|term| contains_ignore_case(&record.title, term));

        let actor_ok = self.actor.as_deref().is_none_or(|term| {
            record
                .field("cast")
                .and_then(Value::as_array)
                .is_some_and(|cast| {
                    cast.iter()
                        .filter_map(Value::as_str)
                        .any(|member| contains_ignore_case(member, term))
                })
        });

        title_ok && actor_ok
    }
}

/// A person who reviewed a movie in the graph store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Reviewer {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub born: Option<i64>,
}

/// Every integer, at any depth, fits an `i64` (BSON has no unsigned 64-bit type)
fn fits_signed_64(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_f64(),
        Value::Array(items) => items.iter().all(fits_signed_64),
        Value::Object(object) => object.values().all(fits_signed_64),
        _ => true,
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
