//! Error taxonomy for the conversion engine.
//!
//! [`TransformError`] covers malformed envelopes and I/O failures and aborts
//! the whole batch. [`EntityError`] covers identity validation of a single
//! entity; callers log it and continue with the next entity.

use std::io;
use thiserror::Error;

/// Fatal, batch-aborting failures.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("expected JSON array opening bracket '[', but found '{found}'")]
    ExpectedArrayOpen { found: char },

    #[error("expected ',' or ']' inside JSON array, but found '{found}'")]
    ExpectedArrayDelimiter { found: char },

    #[error("expected JSON value inside array, but found '{found}'")]
    ExpectedValue { found: char },

    #[error("expected JSON object inside array, but got: {0}")]
    ExpectedObject(String),

    #[error("expected the entity field '{field}' to be a JSON array")]
    EntityFieldNotArray { field: String },

    #[error("expected the map of namespaces '{field}' to be a JSON object with string values")]
    InvalidNamespaceMap { field: String },

    #[error("unexpected end of input inside JSON array")]
    UnterminatedArray,

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("error writing output: {0}")]
    Io(#[from] io::Error),
}

/// Identity validation failures, local to one entity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    #[error("expected '$ids' to be a JSON array of string values")]
    IdsNotStrings,

    #[error("expected 'rdf:type' to be a JSON string value or JSON array of string values")]
    TypeNotStrings,

    #[error("expected '_id' to be a JSON string value")]
    IdNotString,

    #[error("expected '_id' to be a valid RFC 4122 urn:uuid-scheme value")]
    InvalidUrnUuid,

    #[error("expected '$ids' to contain the '_id' urn:uuid-scheme value")]
    IdNotListed,

    #[error("expected '$ids' to contain the class of '_id' as a namespace indicator '~:class:UUID'")]
    ClassNotListed,

    #[error("expected 'rdf:type' to contain the class namespace indicator '~:<name>:{class}'")]
    TypeMissingClass { class: String },
}

pub type Result<T, E = TransformError> = std::result::Result<T, E>;
