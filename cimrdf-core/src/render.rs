//! RDF/XML rendering of validated entities.
//!
//! One entity becomes one element named by its identity triple. Attribute
//! values are rendered as literals, in-document back-references, or external
//! references expanded through the namespace map; nested objects become
//! deterministic sub-identifier references.

use crate::entity::{text_of, Entity, TYPE_FIELD};
use crate::identity::Identity;
use crate::ni;
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// Prefix to base-URI table used to expand external references.
pub type NamespaceMap = HashMap<String, String>;

/// Fixed XML declaration emitted before the root element.
pub const HEADER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Fixed RDF root element open tag carrying the standard CIM namespace set.
pub const HEADER_RDF: &str = r#"<rdf:RDF xmlns:cim="http://iec.ch/TC57/2017/CIM-schema-cim100#" xmlns:md="http://iec.ch/TC57/61970-552/ModelDescription/1#" xmlns:nek="http://nek.no/NK57/CIM/CIM100-Extension/1/0#" xmlns:entsoe="http://entsoe.eu/CIM/SchemaExtension/3/2#" xmlns:iev="http://iec.ch/TC1/60050-6xx/Electropedia/1#" xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">"#;

/// RDF root element close tag.
pub const FOOTER_RDF: &str = "</rdf:RDF>";

/// Append one rendered entity element to `out`.
///
/// Only keys of the form `prefix:attribute` with a prefix registered in the
/// namespace map are rendered; everything else, `rdf:type` included, is
/// ignored. Attribute order follows the entity map's iteration order, which
/// callers must not depend on.
pub fn render_entity(
    identity: &Identity,
    entity: &Entity,
    namespaces: &NamespaceMap,
    out: &mut String,
) {
    let suffix = identity.uuid_suffix();
    out.push_str(&format!(
        "  <{}:{} rdf:about=\"_{}\">\n",
        identity.rendered_name, identity.cim_class, suffix
    ));

    for (key, value) in entity {
        if key == TYPE_FIELD {
            continue;
        }
        let Some((prefix, attr)) = split_qualified(key) else {
            continue;
        };
        if !namespaces.contains_key(prefix) {
            continue;
        }
        match value {
            Value::Null => {}
            Value::Array(_) => {}
            Value::String(s) => render_string(prefix, attr, s, namespaces, out),
            Value::Object(fields) => render_nested(identity, prefix, attr, fields, out),
            other => {
                out.push_str(&format!(
                    "    <{prefix}:{attr}>{}</{prefix}:{attr}>\n",
                    text_of(other)
                ));
            }
        }
    }

    out.push_str(&format!(
        "  </{}:{}>\n",
        identity.rendered_name, identity.cim_class
    ));
}

/// Split a `prefix:attribute` key. Keys with zero or more than one colon are
/// not namespaced properties.
fn split_qualified(key: &str) -> Option<(&str, &str)> {
    let mut parts = key.split(':');
    let prefix = parts.next()?;
    let attr = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((prefix, attr))
}

/// A string value is an in-document back-reference when it is a namespace
/// indicator whose value has full UUID shape, an external reference when its
/// namespace is registered, and a plain literal otherwise.
fn render_string(
    prefix: &str,
    attr: &str,
    value: &str,
    namespaces: &NamespaceMap,
    out: &mut String,
) {
    if let Some(pointer) = ni::parse_ni(value) {
        if ni::hyphen_groups(pointer.value) == 5 {
            out.push_str(&format!(
                "    <{prefix}:{attr} rdf:resource=\"#_{}\"/>\n",
                pointer.value
            ));
            return;
        }
        if let Some(base) = namespaces.get(pointer.namespace) {
            out.push_str(&format!(
                "    <{prefix}:{attr} rdf:resource=\"{base}{}\"/>\n",
                pointer.value
            ));
            return;
        }
    }
    out.push_str(&format!("    <{prefix}:{attr}>{value}</{prefix}:{attr}>\n"));
}

/// A nested object is referenced through a sub-identifier derived from the
/// owning identity and attribute name. The secondary block built for the
/// object's own fields is appended only when it stayed empty; a populated
/// block is discarded, so the reference line is the only observable output.
fn render_nested(
    identity: &Identity,
    prefix: &str,
    attr: &str,
    fields: &Map<String, Value>,
    out: &mut String,
) {
    let sub_id = Uuid::new_v5(
        &Uuid::nil(),
        format!("{}:{}:{}", identity.canonical_id, prefix, attr).as_bytes(),
    );
    out.push_str(&format!(
        "    <{prefix}:{attr} rdf:resource=\"#_{sub_id}\"/>\n"
    ));

    let mut block = String::new();
    let mut sub_name = identity.rendered_name.as_str();
    let mut sub_key = "";
    for (count, (local_key, local_value)) in fields.iter().enumerate() {
        sub_name = identity.rendered_name.as_str();
        sub_key = local_key.as_str();
        if let Some((name, key)) = split_qualified(local_key) {
            sub_name = name;
            sub_key = key;
        }
        if count == 0 {
            block.push_str(&format!(
                "    <{sub_name}:{sub_key} rdf:about=\"_{sub_id}\">\n"
            ));
        }
        let local_dots: Vec<&str> = local_key.split('.').collect();
        let attr_dots: Vec<&str> = attr.split('.').collect();
        if local_dots.len() == 2 && attr_dots.len() == 2 && local_dots[0] == attr_dots[1] {
            block.push_str(&format!(
                "        <{sub_name}:{attr}>{}</{sub_name}:{attr}>\n",
                text_of(local_value)
            ));
        }
    }
    if !fields.is_empty() {
        block.push_str(&format!("    </{sub_name}:{sub_key}>\n"));
    }
    if block.is_empty() {
        out.push_str(&block);
    }
}
