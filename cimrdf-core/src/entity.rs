//! Entity and record field conventions shared by both processing paths.

use serde_json::{Map, Value};

/// One decoded JSON entity or record: a string-keyed mapping.
pub type Entity = Map<String, Value>;

/// Reserved key holding the canonical urn:uuid identity.
pub const ID_FIELD: &str = "_id";

/// Reserved key listing alternate identifiers.
pub const IDS_FIELD: &str = "$ids";

/// Reserved key carrying RDF type pointers.
pub const TYPE_FIELD: &str = "rdf:type";

/// Render a JSON value as plain text the way it appears inside markup and
/// derivation input: strings verbatim, everything else as compact JSON.
pub fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Drop internal underscore-prefixed fields (other than `_id`) before
/// re-emission.
pub fn strip_internal(entity: &mut Entity) {
    entity.retain(|key, _| key == ID_FIELD || !key.starts_with('_'));
}
