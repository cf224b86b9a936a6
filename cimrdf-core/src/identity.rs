//! Entity identity resolution.
//!
//! A renderable entity must carry one consistent identity across three
//! fields: `_id` holds the canonical urn:uuid value, `$ids` repeats it
//! verbatim and adds a `~:class:UUID` indicator naming the entity's CIM
//! class, and `rdf:type` adds a `~:name:class` indicator naming the
//! namespace prefix the element is rendered under. Resolution extracts the
//! `(renderedName, cimClass, canonicalID)` triple or reports the unmet
//! invariant.

use crate::entity::{Entity, ID_FIELD, IDS_FIELD, TYPE_FIELD};
use crate::error::EntityError;
use crate::ni;
use serde_json::Value;

/// The resolved identity triple of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Namespace prefix the element is rendered under.
    pub rendered_name: String,
    /// CIM class of the entity.
    pub cim_class: String,
    /// Canonical urn:uuid identity, equal to the entity's `_id`.
    pub canonical_id: String,
}

impl Identity {
    /// The 36-character UUID text of the canonical identity.
    pub fn uuid_suffix(&self) -> &str {
        ni::uuid_suffix(&self.canonical_id)
    }
}

/// Resolve and validate the identity triple of one entity.
pub fn resolve(entity: &Entity) -> Result<Identity, EntityError> {
    let ids = match entity.get(IDS_FIELD) {
        None => Vec::new(),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => out.push(s.as_str()),
                    _ => return Err(EntityError::IdsNotStrings),
                }
            }
            out
        }
        Some(_) => return Err(EntityError::IdsNotStrings),
    };

    let types = match entity.get(TYPE_FIELD) {
        None => Vec::new(),
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => out.push(s.as_str()),
                    _ => return Err(EntityError::TypeNotStrings),
                }
            }
            out
        }
        Some(_) => return Err(EntityError::TypeNotStrings),
    };

    let id = match entity.get(ID_FIELD) {
        None => "",
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(EntityError::IdNotString),
    };
    if !ni::is_urn_uuid(id) {
        return Err(EntityError::InvalidUrnUuid);
    }
    let suffix = ni::uuid_suffix(id);

    let mut has_id = false;
    let mut cim_class = None;
    for entry in &ids {
        if *entry == id {
            has_id = true;
        }
        if cim_class.is_none() {
            if let Some(pointer) = ni::parse_ni(entry) {
                if pointer.value == suffix {
                    cim_class = Some(pointer.namespace);
                }
            }
        }
    }

    let mut rendered_name = None;
    if let Some(class) = cim_class {
        for entry in &types {
            if let Some(pointer) = ni::parse_ni(entry) {
                if pointer.value == class {
                    rendered_name = Some(pointer.namespace);
                    break;
                }
            }
        }
    }

    match (has_id, cim_class, rendered_name) {
        (true, Some(class), Some(name)) => Ok(Identity {
            rendered_name: name.to_string(),
            cim_class: class.to_string(),
            canonical_id: id.to_string(),
        }),
        _ => {
            // Later checks overwrite earlier error state: the last unmet
            // invariant is the one reported.
            let mut err = EntityError::IdNotListed;
            if cim_class.is_none() {
                err = EntityError::ClassNotListed;
            }
            if rendered_name.is_none() {
                err = EntityError::TypeMissingClass {
                    class: cim_class.unwrap_or("").to_string(),
                };
            }
            Err(err)
        }
    }
}
