//! Batch conversion of JSON records to records carrying RDF/XML documents.
//!
//! Each record of the input array may hold an entity array under the
//! configured entity field. The entities are validated and rendered into one
//! RDF/XML document per record, spliced back under the configured output
//! field, and the record is streamed out immediately.

use crate::entity::{strip_internal, Entity};
use crate::error::TransformError;
use crate::identity;
use crate::render::{self, NamespaceMap, FOOTER_RDF, HEADER_RDF, HEADER_XML};
use crate::stream::JsonArrayReader;
use serde_json::Value;
use std::io::{BufRead, Write};
use tracing::warn;

/// Static per-batch conversion settings.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Record field holding the entity array.
    pub entity_field: String,
    /// Record field receiving the rendered document.
    pub output_field: String,
    /// Record field optionally carrying a per-record namespace map.
    pub namespace_field: String,
    /// Fallback namespace table for records carrying none.
    pub namespaces: NamespaceMap,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            entity_field: "json".to_string(),
            output_field: "xml".to_string(),
            namespace_field: "ns".to_string(),
            namespaces: default_namespaces(),
        }
    }
}

/// The standard CIM prefix table used when neither the record nor the caller
/// supplies one.
pub fn default_namespaces() -> NamespaceMap {
    [
        ("cim", "http://iec.ch/TC57/2017/CIM-schema-cim100#"),
        ("cim15", "http://iec.ch/TC57/2010/CIM-schema-cim15#"),
        ("cim16", "http://iec.ch/TC57/2013/CIM-schema-cim16#"),
        ("cim17", "http://iec.ch/TC57/2016/CIM-schema-cim17#"),
        ("dm", "http://iec.ch/TC57/61970-552/DifferenceModel/1#"),
        ("entsoe", "http://entsoe.eu/CIM/SchemaExtension/3/2#"),
        ("iev", "http://iec.ch/TC1/60050-6xx/Electropedia/1#"),
        ("md", "http://iec.ch/TC57/61970-552/ModelDescription/1#"),
        ("nek", "http://nek.no/NK57/CIM/CIM100-Extension/1/0#"),
        ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
        ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
        ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ]
    .into_iter()
    .map(|(prefix, base)| (prefix.to_string(), base.to_string()))
    .collect()
}

/// Converts one batch of records, streaming each out as it completes.
pub struct ModelTransformer {
    options: TransformOptions,
}

impl ModelTransformer {
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Convert one batch from `reader` to `writer`.
    ///
    /// The output array mirrors the input record count and order. The writer
    /// is flushed after every record, so output memory stays bounded
    /// regardless of batch size. Malformed envelopes abort the batch;
    /// entities with an incomplete identity are logged and skipped.
    pub fn convert<R: BufRead, W: Write>(
        &self,
        reader: R,
        mut writer: W,
    ) -> Result<(), TransformError> {
        let mut batch = JsonArrayReader::new(reader);
        batch.begin()?;
        writer.write_all(b"[")?;

        let mut total = 0usize;
        while batch.more()? {
            let record: Entity = batch.next_value().map_err(object_expected)?;
            let transformed = self.transform_record(record)?;
            if total != 0 {
                writer.write_all(b",")?;
            }
            serde_json::to_writer(&mut writer, &Value::Object(transformed))?;
            writer.flush()?;
            total += 1;
        }

        writer.write_all(b"]")?;
        writer.flush()?;
        Ok(())
    }

    fn transform_record(&self, mut record: Entity) -> Result<Entity, TransformError> {
        let namespaces = self.record_namespaces(&record)?;

        let document = match record.remove(&self.options.entity_field) {
            None => None,
            Some(Value::Array(entities)) => Some(self.render_document(&entities, &namespaces)?),
            Some(_) => {
                return Err(TransformError::EntityFieldNotArray {
                    field: self.options.entity_field.clone(),
                })
            }
        };

        strip_internal(&mut record);
        if let Some(document) = document {
            record.insert(self.options.output_field.clone(), Value::String(document));
        }
        Ok(record)
    }

    /// The record's own namespace map when present, else the static table.
    fn record_namespaces(&self, record: &Entity) -> Result<NamespaceMap, TransformError> {
        match record.get(&self.options.namespace_field) {
            None => Ok(self.options.namespaces.clone()),
            Some(value) => {
                serde_json::from_value(value.clone()).map_err(|_| {
                    TransformError::InvalidNamespaceMap {
                        field: self.options.namespace_field.clone(),
                    }
                })
            }
        }
    }

    fn render_document(
        &self,
        entities: &[Value],
        namespaces: &NamespaceMap,
    ) -> Result<String, TransformError> {
        let mut document = String::new();
        let mut rendered = 0usize;
        for element in entities {
            let Value::Object(entity) = element else {
                return Err(TransformError::ExpectedObject(json_type(element).to_string()));
            };
            if entity.is_empty() {
                continue;
            }
            let identity = match identity::resolve(entity) {
                Ok(identity) => identity,
                Err(err) => {
                    warn!(
                        error = %err,
                        entity = %serde_json::Value::Object(entity.clone()),
                        "skipping entity with incomplete identity"
                    );
                    continue;
                }
            };
            if rendered == 0 {
                document.push_str(HEADER_XML);
                document.push('\n');
                document.push_str(HEADER_RDF);
                document.push('\n');
            }
            render::render_entity(&identity, entity, namespaces, &mut document);
            rendered += 1;
        }
        if rendered != 0 {
            document.push_str(FOOTER_RDF);
        }
        Ok(document)
    }
}

fn object_expected(err: TransformError) -> TransformError {
    match err {
        TransformError::Json(e) => TransformError::ExpectedObject(e.to_string()),
        other => other,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn convert(input: &str) -> Result<Value, TransformError> {
        let transformer = ModelTransformer::new(TransformOptions::default());
        let mut out = Vec::new();
        transformer.convert(input.as_bytes(), &mut out)?;
        Ok(serde_json::from_slice(&out).expect("valid output JSON"))
    }

    const NS: &str = r#""ns": {
        "cim": "http://iec.ch/TC57/2017/CIM-schema-cim100#",
        "rdf": "http://www.w3.org/1999/02/22-rdf-syntax-ns#"
    }"#;

    #[test]
    fn converts_empty_batch() {
        assert_eq!(convert("[]").expect("empty batch"), json!([]));
    }

    #[test]
    fn converts_empty_entity_array_to_empty_document() {
        let out = convert(r#"[{"json":[]}]"#).expect("batch");
        assert_eq!(out, json!([{ "xml": "" }]));
    }

    #[test]
    fn skips_empty_entity() {
        let out = convert(r#"[{"json":[{}]}]"#).expect("batch");
        assert_eq!(out, json!([{ "xml": "" }]));
    }

    #[test]
    fn renders_single_component() {
        let input = format!(
            r#"[{{{NS},"json":[
                {{
                    "$ids": [
                        "urn:uuid:00000000-0000-0000-0000-000000000000",
                        "~:cim-class:00000",
                        "~:Class:00000000-0000-0000-0000-000000000000"
                    ],
                    "_id": "urn:uuid:00000000-0000-0000-0000-000000000000",
                    "cim:Class.property": "value",
                    "rdf:type": "~:cim:Class"
                }}
            ]}}]"#
        );
        let out = convert(&input).expect("batch");
        let document = out[0]["xml"].as_str().expect("xml string");

        let expected = format!(
            "{HEADER_XML}\n{HEADER_RDF}\n  \
             <cim:Class rdf:about=\"_00000000-0000-0000-0000-000000000000\">\n    \
             <cim:Class.property>value</cim:Class.property>\n  \
             </cim:Class>\n{FOOTER_RDF}"
        );
        assert_eq!(document, expected);
        // the entity array is replaced, the namespace map passes through
        assert!(out[0].get("json").is_none());
        assert!(out[0].get("ns").is_some());
    }

    #[test]
    fn renders_references_between_components() {
        let input = format!(
            r#"[{{{NS},"json":[
                {{
                    "$ids": [
                        "urn:uuid:00000000-0000-0000-0000-000000000000",
                        "~:Class:00000000-0000-0000-0000-000000000000"
                    ],
                    "_id": "urn:uuid:00000000-0000-0000-0000-000000000000",
                    "cim:Class.ref": "~:cim:Values.item",
                    "cim:Class.Other": "~:AltClass:00000000-1100-0000-0011-000000000000",
                    "rdf:type": "~:cim:Class"
                }},
                {{
                    "$ids": [
                        "urn:uuid:00000000-1100-0000-0011-000000000000",
                        "~:AltClass:00000000-1100-0000-0011-000000000000"
                    ],
                    "_id": "urn:uuid:00000000-1100-0000-0011-000000000000",
                    "cim:AltClass.Other": "~:Class:00000000-0000-0000-0000-000000000000",
                    "rdf:type": ["~:cim:AltClass", "~:cim:Ident"]
                }}
            ]}}]"#
        );
        let out = convert(&input).expect("batch");
        let document = out[0]["xml"].as_str().expect("xml string");

        assert!(document.contains(
            "<cim:Class.ref rdf:resource=\"http://iec.ch/TC57/2017/CIM-schema-cim100#Values.item\"/>"
        ));
        assert!(document.contains(
            "<cim:Class.Other rdf:resource=\"#_00000000-1100-0000-0011-000000000000\"/>"
        ));
        assert!(document.contains(
            "<cim:AltClass rdf:about=\"_00000000-1100-0000-0011-000000000000\">"
        ));
        assert!(document.contains(
            "<cim:AltClass.Other rdf:resource=\"#_00000000-0000-0000-0000-000000000000\"/>"
        ));
        // header once, footer once
        assert_eq!(document.matches(HEADER_XML).count(), 1);
        assert_eq!(document.matches(FOOTER_RDF).count(), 1);
    }

    #[test]
    fn skips_entity_with_incomplete_identity() {
        let input = format!(
            r#"[{{{NS},"json":[
                {{ "_id": "not-a-urn", "cim:Class.property": "dropped" }},
                {{
                    "$ids": [
                        "urn:uuid:00000000-0000-0000-0000-000000000000",
                        "~:Class:00000000-0000-0000-0000-000000000000"
                    ],
                    "_id": "urn:uuid:00000000-0000-0000-0000-000000000000",
                    "cim:Class.property": "kept",
                    "rdf:type": "~:cim:Class"
                }}
            ]}}]"#
        );
        let out = convert(&input).expect("batch");
        let document = out[0]["xml"].as_str().expect("xml string");
        assert!(!document.contains("dropped"));
        assert!(document.contains("<cim:Class.property>kept</cim:Class.property>"));
    }

    #[test]
    fn strips_internal_record_fields() {
        let out = convert(
            r#"[{"json":[], "_id": "keep", "_updated": 3, "_deleted": false, "note": "pass"}]"#,
        )
        .expect("batch");
        assert_eq!(
            out,
            json!([{ "_id": "keep", "note": "pass", "xml": "" }])
        );
    }

    #[test]
    fn passes_through_record_without_entity_field() {
        let out = convert(r#"[{"note": "pass", "_hidden": 1}]"#).expect("batch");
        assert_eq!(out, json!([{ "note": "pass" }]));
    }

    #[test]
    fn preserves_record_count_and_order() {
        let out = convert(r#"[{"n":1,"json":[]},{"n":2},{"n":3,"json":[]}]"#).expect("batch");
        assert_eq!(out[0]["n"], 1);
        assert_eq!(out[1]["n"], 2);
        assert_eq!(out[2]["n"], 3);
    }

    #[test]
    fn fails_on_non_array_input() {
        assert!(matches!(
            convert(r#"{"not":"array"}"#),
            Err(TransformError::ExpectedArrayOpen { .. })
        ));
    }

    #[test]
    fn fails_on_non_object_record() {
        assert!(matches!(
            convert("[42]"),
            Err(TransformError::ExpectedObject(_))
        ));
    }

    #[test]
    fn fails_on_non_array_entity_field() {
        assert!(matches!(
            convert(r#"[{"json":"oops"}]"#),
            Err(TransformError::EntityFieldNotArray { .. })
        ));
    }

    #[test]
    fn fails_on_malformed_namespace_map() {
        assert!(matches!(
            convert(r#"[{"ns":{"cim":7},"json":[]}]"#),
            Err(TransformError::InvalidNamespaceMap { .. })
        ));
    }

    #[test]
    fn record_namespaces_override_static_table() {
        // "cim" is absent from the record's map, so the attribute is dropped
        let input = r#"[{"ns":{"x":"http://example.org/"},"json":[
            {
                "$ids": [
                    "urn:uuid:00000000-0000-0000-0000-000000000000",
                    "~:Class:00000000-0000-0000-0000-000000000000"
                ],
                "_id": "urn:uuid:00000000-0000-0000-0000-000000000000",
                "cim:Class.property": "value",
                "rdf:type": "~:cim:Class"
            }
        ]}]"#;
        let out = convert(input).expect("batch");
        let document = out[0]["xml"].as_str().expect("xml string");
        assert!(!document.contains("Class.property"));
        assert!(document.contains("<cim:Class rdf:about="));
    }
}
