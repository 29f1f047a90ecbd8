//! Error types for the catalog crate.
//!
//! Both enums describe input that is rejected before any store is touched:
//! a record without a usable title, or an update body that cannot be applied.

use thiserror::Error;

/// Errors raised while building a [`MovieRecord`](crate::MovieRecord) from raw JSON
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The value was not a JSON object
    #[error("movie record must be a JSON object, got {kind}")]
    NotAnObject { kind: &'static str },

    /// No `title` member, or the member is not a string
    #[error("movie record has no string `title` field")]
    MissingTitle,
}

/// Errors raised while validating a partial update
///
/// These map to the validation failures of the update route: the request is
/// refused before reaching the document store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// Update body was not a JSON object
    #[error("update body must be a JSON object, got {kind}")]
    NotAnObject { kind: &'static str },

    /// Nothing left to set once null members are dropped
    #[error("update body contains no fields to set")]
    Empty,

    /// Field name that the document store would interpret as an operator or path
    #[error("field name {name:?} is not allowed in an update")]
    ForbiddenField { name: String },

    /// A `title` member that would leave the record without a join key
    #[error("`title` must be a non-empty string")]
    InvalidTitle,

    /// An integer outside the signed 64-bit range the document store can hold
    #[error("field {name:?} holds an integer too large to store")]
    NumberOutOfRange { name: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T, E = RecordError> = std::result::Result<T, E>;
