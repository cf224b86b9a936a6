//! Namespace resolution for identifier derivation.
//!
//! A derivation request names one or more fields (separated by `;`) and an
//! optional namespace specification. Each field specification is resolved
//! independently against the entity, left to right, into a concrete
//! namespace string and an effective entity key. The specification grammar:
//!
//! - a leading `_` (except on the `_id` field itself) requests local
//!   reference output (`#_` prefix on derived values);
//! - a leading `:` marks a property-style key or shortcut;
//! - a key that names no entity field verbatim is a shortcut, expanded by
//!   suffix match over the entity's keys;
//! - namespace `rdf:type` means "infer from the entity's type field";
//! - a namespace ending in `:` selects the unique `rdf:type` entry with that
//!   prefix; anything else is used verbatim.
//!
//! Shortcut suffix matching adopts the first matching key in the entity
//! map's iteration order; with several matching keys the outcome is
//! non-deterministic by design.

use crate::entity::{text_of, Entity, ID_FIELD, TYPE_FIELD};
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

/// Namespace specification meaning "infer from the entity's rdf:type".
pub const TYPE_NAMESPACE: &str = "rdf:type";

/// Separator between field specifications in one request.
pub const FIELD_SPEC_SEPARATOR: char = ';';

/// Outcome of resolving one field specification against one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Entity key to derive, possibly expanded from a shortcut.
    pub key: String,
    /// Fully resolved namespace, `:`-terminated when non-empty.
    pub namespace: String,
    /// Output prefix for local-reference formatting (`#_` or empty).
    pub ref_prefix: &'static str,
}

/// Ambiguity categories, each warned at most once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ambiguity {
    MissingType,
    EmptyType,
    MultipleTypes,
    PrefixUnmatched,
    PrefixAmbiguous,
}

/// Per-request warning deduplication.
#[derive(Debug, Default)]
pub struct Warnings {
    seen: HashSet<Ambiguity>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// True the first time a category is noted within this request.
    fn note(&mut self, kind: Ambiguity) -> bool {
        self.seen.insert(kind)
    }
}

/// Split a multi-field specification into its individual field specs.
pub fn split_field_spec(spec: &str) -> impl Iterator<Item = &str> {
    spec.split(FIELD_SPEC_SEPARATOR)
}

/// Resolve one field specification and namespace specification against an
/// entity. Returns `None` for a specification with no usable key.
pub fn resolve(
    keyspec: &str,
    namespace_spec: &str,
    entity: &Entity,
    warnings: &mut Warnings,
) -> Option<ResolvedField> {
    let mut ref_prefix = "";
    let mut key = keyspec.to_string();
    if key.starts_with('_') && key != ID_FIELD {
        ref_prefix = "#_";
        key = key.split_off(1);
    }
    if key.is_empty() {
        return None;
    }

    let mut ns = namespace_spec.to_string();
    if key.starts_with(':') && ns.is_empty() {
        ns = TYPE_NAMESPACE.to_string();
    }

    let property_key = key.strip_prefix(':').map(str::to_string);
    if let Some(inner) = property_key.filter(|inner| entity.contains_key(inner)) {
        key = inner;
    } else if !entity.contains_key(&key) {
        // shortcut needing expansion against the entity's keys
        let suffix = if key.starts_with(':') {
            if key.starts_with(":.") {
                key[1..].to_string()
            } else {
                key.clone()
            }
        } else {
            ns.clear(); // no automatic namespace for bare shortcuts
            if key.starts_with('.') {
                key.clone()
            } else {
                format!(":{key}")
            }
        };
        if let Some(expanded) = entity.keys().find(|candidate| candidate.ends_with(&suffix)) {
            key = expanded.clone();
        }
    } else if let Some(value) = entity.get(&key) {
        if text_of(value).contains(':') {
            ns.clear(); // the value is already fully qualified
        }
    }

    let ns = if ns == TYPE_NAMESPACE {
        resolve_type_namespace(keyspec, entity, warnings)
    } else if ns.ends_with(':') {
        resolve_prefix_namespace(keyspec, &ns, entity, warnings)
    } else {
        ns // a complete namespace was given
    };

    let mut namespace = ns
        .strip_prefix("~:")
        .unwrap_or(ns.as_str())
        .trim_matches(' ')
        .to_string();
    if !namespace.is_empty() && !namespace.ends_with(':') {
        namespace.push(':');
    }

    Some(ResolvedField {
        key,
        namespace,
        ref_prefix,
    })
}

/// Infer the namespace from the entity's `rdf:type` field.
fn resolve_type_namespace(keyspec: &str, entity: &Entity, warnings: &mut Warnings) -> String {
    match entity.get(TYPE_FIELD) {
        None => {
            if warnings.note(Ambiguity::MissingType) {
                warn!(field = keyspec, "no 'rdf:type' found");
            }
            String::new()
        }
        Some(value) => {
            let ns = match value {
                Value::Array(types) if types.is_empty() => String::new(),
                Value::Array(types) => {
                    if types.len() > 1 && warnings.note(Ambiguity::MultipleTypes) {
                        warn!(
                            field = keyspec,
                            using = %text_of(&types[0]),
                            all = %serde_json::Value::Array(types.clone()),
                            "multiple 'rdf:type' entries, using the first"
                        );
                    }
                    text_of(&types[0])
                }
                scalar => text_of(scalar),
            };
            if ns.is_empty() && warnings.note(Ambiguity::EmptyType) {
                warn!(field = keyspec, "empty 'rdf:type'");
            }
            ns
        }
    }
}

/// Select the unique `rdf:type` entry starting with the given prefix.
/// Zero or multiple matches fall back to an empty namespace.
fn resolve_prefix_namespace(
    keyspec: &str,
    ns: &str,
    entity: &Entity,
    warnings: &mut Warnings,
) -> String {
    let wanted = if ns.starts_with("~:") {
        ns.to_string()
    } else {
        format!("~:{ns}")
    };
    match entity.get(TYPE_FIELD) {
        None => {
            if warnings.note(Ambiguity::MissingType) {
                warn!(field = keyspec, "no 'rdf:type' found");
            }
            String::new()
        }
        Some(Value::Array(types)) => {
            let mut matches = types
                .iter()
                .map(text_of)
                .filter(|entry| entry.starts_with(&wanted));
            let first = matches.next();
            let rest = matches.count();
            match (first, rest) {
                (None, _) => {
                    if warnings.note(Ambiguity::PrefixUnmatched) {
                        warn!(field = keyspec, prefix = %wanted, "prefix not found in 'rdf:type'");
                    }
                    String::new()
                }
                (Some(only), 0) => only,
                (Some(_), _) => {
                    if warnings.note(Ambiguity::PrefixAmbiguous) {
                        warn!(
                            field = keyspec,
                            prefix = %wanted,
                            all = %serde_json::Value::Array(types.clone()),
                            "multiple 'rdf:type' entries match prefix"
                        );
                    }
                    String::new()
                }
            }
        }
        Some(scalar) => {
            let choice = text_of(scalar);
            if choice.starts_with(&wanted) {
                choice
            } else {
                if warnings.note(Ambiguity::PrefixUnmatched) {
                    warn!(
                        field = keyspec,
                        prefix = %wanted,
                        value = %choice,
                        "prefix does not match 'rdf:type'"
                    );
                }
                String::new()
            }
        }
    }
}
