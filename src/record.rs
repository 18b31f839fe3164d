//! Typed metadata records and their conversions
//!
//! Every record type implements [`MetadataRecord`], which ties a serde
//! struct to its static [`RecordSpec`]. All conversions go through the
//! untyped functions below so that callers holding only a spec (the CLI,
//! for one) get the same behavior as typed callers.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{GraphIntegrityError, MetadataError, ValidationError};
use crate::graph::{Graph, GraphRecord, Subject};
use crate::mapper;
use crate::schema::{json_schema, FieldKind, RecordSpec, SchemaOptions};
use crate::validate::{self, Validator};

pub trait MetadataRecord: Serialize + DeserializeOwned {
    fn spec() -> &'static RecordSpec;

    /// Build a record from trusted flat JSON
    fn from_json(value: &Value) -> Result<Self, MetadataError> {
        let record = validate_json(value, Self::spec())?;
        Ok(serde_json::from_value(Value::Object(record))?)
    }

    /// Build a record from user-supplied JSON, ignoring read-only fields
    fn from_untrusted_json(value: &Value) -> Result<Self, MetadataError> {
        Self::from_json(&strip_read_only(value, Self::spec()))
    }

    /// Flat wire form: nulls omitted, dictionary fields as `{key, value}` lists
    fn to_json(&self) -> Result<Value, MetadataError> {
        Ok(to_wire_json(&serde_json::to_value(self)?, Self::spec()))
    }

    fn to_graph_record(&self) -> Result<GraphRecord, MetadataError> {
        let record = validate_json(&serde_json::to_value(self)?, Self::spec())?;
        Ok(mapper::to_graph_record(&record, Self::spec()))
    }

    fn to_graph(&self) -> Result<Graph, MetadataError> {
        Ok(self.to_graph_record()?.to_graph())
    }

    fn from_graph_record(node: &GraphRecord) -> Result<Self, MetadataError> {
        let record = json_from_graph_record(node, Self::spec())?;
        Ok(serde_json::from_value(Value::Object(record))?)
    }

    fn from_graph(graph: &Graph, subject: &Subject) -> Result<Self, MetadataError> {
        Self::from_graph_record(&GraphRecord::from_graph(graph, subject)?)
    }

    /// Read the record whose subject carries this type's class
    fn from_graph_root(graph: &Graph) -> Result<Self, MetadataError> {
        let subject = find_root_subject(graph, Self::spec())?;
        Self::from_graph(graph, &subject)
    }

    fn json_schema() -> std::sync::Arc<Value> {
        json_schema(Self::spec(), &SchemaOptions::default())
    }
}

/// Validate and coerce flat JSON against `spec`
pub fn validate_json(value: &Value, spec: &RecordSpec) -> Result<Map<String, Value>, ValidationError> {
    validate::coerce_record(value, spec)
}

/// Drop read-only fields from `value`, recursing into nested records
///
/// Variant discriminators are kept: they are constant per variant and
/// select which variant the input describes.
pub fn strip_read_only(value: &Value, spec: &RecordSpec) -> Value {
    let Some(input) = value.as_object() else {
        return value.clone();
    };
    let mut out = input.clone();
    for field in spec.fields {
        if field.read_only && !matches!(field.kind, FieldKind::Discriminator { .. }) {
            if out.remove(field.name).is_some() {
                tracing::debug!(record = spec.name, field = field.name, "ignoring read-only field");
            }
            continue;
        }
        if let FieldKind::Nested { record, .. } = field.kind {
            if let Some(nested) = out.get_mut(field.name) {
                let stripped = match &*nested {
                    Value::Array(items) => {
                        Value::Array(items.iter().map(|item| strip_read_only(item, record)).collect())
                    }
                    other => strip_read_only(other, record),
                };
                *nested = stripped;
            }
        }
    }
    Value::Object(out)
}

/// Flat wire form of an already-valid record
pub fn to_wire_json(value: &Value, spec: &RecordSpec) -> Value {
    let Some(input) = value.as_object() else {
        return value.clone();
    };
    let mut out = Map::new();
    for (key, field_value) in input {
        if field_value.is_null() {
            continue;
        }
        let converted = match spec.field(key).map(|f| f.kind) {
            Some(FieldKind::Dictionary { .. }) => dictionary_as_list(field_value),
            Some(FieldKind::Nested { record, .. }) => match field_value {
                Value::Array(items) => Value::Array(items.iter().map(|item| to_wire_json(item, record)).collect()),
                other => to_wire_json(other, record),
            },
            _ => drop_nulls(field_value),
        };
        out.insert(key.clone(), converted);
    }
    Value::Object(out)
}

fn dictionary_as_list(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Array(
            map.iter()
                .map(|(k, v)| serde_json::json!({ "key": k, "value": v }))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn drop_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), drop_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(drop_nulls).collect()),
        other => other.clone(),
    }
}

/// Validate flat JSON and map it to triples
pub fn graph_from_json(value: &Value, spec: &RecordSpec) -> Result<Graph, MetadataError> {
    let record = validate_json(value, spec)?;
    Ok(mapper::to_graph_record(&record, spec).to_graph())
}

/// Rebuild and validate the flat form of a graph record
pub fn json_from_graph_record(node: &GraphRecord, spec: &RecordSpec) -> Result<Map<String, Value>, ValidationError> {
    let mut validator = Validator::new();
    let raw = mapper::read_graph_record(node, spec, &mut validator);
    let record = validate::coerce_into(&Value::Object(raw), spec, &mut validator);
    validator.finish(spec.title)?;
    Ok(record)
}

/// Rebuild the flat form of the record rooted at `subject`
pub fn json_from_graph(graph: &Graph, subject: &Subject, spec: &RecordSpec) -> Result<Map<String, Value>, MetadataError> {
    let node = GraphRecord::from_graph(graph, subject)?;
    Ok(json_from_graph_record(&node, spec)?)
}

/// Locate the subject a record of type `spec` is rooted at
///
/// Types with a class tag are found by `rdf:type`; others fall back to the
/// first IRI subject of the graph.
pub fn find_root_subject(graph: &Graph, spec: &RecordSpec) -> Result<Subject, GraphIntegrityError> {
    let found = match spec.class() {
        Some((iri, _)) => graph.subjects_of_type(iri).into_iter().next(),
        None => graph.subjects().into_iter().find(|s| s.as_iri().is_some()),
    };
    found.cloned().ok_or_else(|| {
        let wanted = spec.class().map(|(iri, _)| iri).unwrap_or(spec.name);
        GraphIntegrityError::MissingSubject(wanted.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, Scalar};
    use crate::vocab::{HSTERMS_KEY, HSTERMS_VALUE};
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::BTreeMap;

    static NOTE: RecordSpec = RecordSpec {
        name: "Note",
        title: "Note Metadata",
        fields: &[
            FieldSpec::new("url", FieldKind::Subject).read_only(),
            FieldSpec::new(
                "type",
                FieldKind::Class {
                    iri: "http://p/Note",
                    value: "Note",
                },
            )
            .read_only(),
            FieldSpec::plain("title", "http://p/title", Scalar::String).required(),
            FieldSpec::new(
                "additional_metadata",
                FieldKind::Dictionary {
                    predicate: "http://p/extended",
                    key: HSTERMS_KEY,
                    value: HSTERMS_VALUE,
                },
            ),
        ],
        rules: &[],
    };

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(rename = "type")]
        note_type: String,
        title: String,
        #[serde(default)]
        additional_metadata: BTreeMap<String, String>,
    }

    impl MetadataRecord for Note {
        fn spec() -> &'static RecordSpec {
            &NOTE
        }
    }

    #[test]
    fn test_from_json_fills_class_tag() {
        let note = Note::from_json(&json!({"title": "hello"})).unwrap();
        assert_eq!(note.note_type, "Note");
        assert!(note.url.is_none());
    }

    #[test]
    fn test_untrusted_json_ignores_read_only_fields() {
        let input = json!({"url": "http://example.org/notes/1", "type": "Note", "title": "hello"});
        let note = Note::from_untrusted_json(&input).unwrap();
        assert!(note.url.is_none());

        let trusted = Note::from_json(&input).unwrap();
        assert_eq!(trusted.url.as_deref(), Some("http://example.org/notes/1"));
    }

    #[test]
    fn test_wire_json_lists_dictionary_entries() {
        let note = Note::from_json(&json!({
            "title": "hello",
            "additional_metadata": {"a": "1", "b": "2"}
        }))
        .unwrap();
        let wire = note.to_json().unwrap();
        assert_eq!(
            wire["additional_metadata"],
            json!([{"key": "a", "value": "1"}, {"key": "b", "value": "2"}])
        );
        assert!(wire.get("url").is_none());

        // the wire form is accepted back as input
        assert_eq!(Note::from_json(&wire).unwrap(), note);
    }

    #[test]
    fn test_graph_round_trip_by_class() {
        let note = Note::from_json(&json!({
            "url": "http://example.org/notes/1",
            "title": "hello",
            "additional_metadata": {"a": "1"}
        }))
        .unwrap();
        let graph = note.to_graph().unwrap();
        let back = Note::from_graph_root(&graph).unwrap();
        assert_eq!(back, note);
    }

    #[test]
    fn test_graph_errors_are_aggregated() {
        let mut node = GraphRecord::new(Subject::iri("http://example.org/notes/1"));
        node.push(crate::vocab::RDF_TYPE, crate::graph::GraphValue::Iri("http://p/Note".to_string()));
        let err = Note::from_graph_record(&node).unwrap_err();
        match err {
            MetadataError::Validation(e) => assert_eq!(e.at("title").unwrap().message, "field required"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_missing_root() {
        let err = find_root_subject(&Graph::new(), &NOTE).unwrap_err();
        assert_eq!(err, GraphIntegrityError::MissingSubject("http://p/Note".to_string()));
    }
}
