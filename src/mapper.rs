//! Mapping between flat records and graph records
//!
//! [`to_graph_record`] walks a coerced flat record alongside its
//! [`RecordSpec`] and emits one edge per declared field value.
//! [`read_graph_record`] goes the other way: it gathers each field's edges
//! back into an untyped flat map, which the caller then coerces and
//! validates like any other input.

use serde_json::{json, Map, Number, Value};

use crate::coverage;
use crate::graph::{GraphRecord, GraphValue, Literal, Subject};
use crate::schema::{Cardinality, FieldKind, FieldSpec, RecordSpec, Scalar};
use crate::validate::Validator;
use crate::vocab::{HSTERMS_KEY, HSTERMS_VALUE, RDF_TYPE, RDF_VALUE, XSD_BOOLEAN, XSD_DATETIME, XSD_DOUBLE, XSD_INTEGER};

/// Build the graph record of a coerced flat record
///
/// The subject is the record's subject field when it has one, otherwise a
/// fresh blank node.
pub fn to_graph_record(record: &Map<String, Value>, spec: &RecordSpec) -> GraphRecord {
    let subject = spec
        .fields
        .iter()
        .filter(|f| matches!(f.kind, FieldKind::Subject))
        .find_map(|f| record.get(f.name).and_then(Value::as_str))
        .map(Subject::iri)
        .unwrap_or_else(Subject::blank);

    let mut node = GraphRecord::new(subject);
    write_fields(record, spec, &mut node);
    node
}

fn write_fields(record: &Map<String, Value>, spec: &RecordSpec, node: &mut GraphRecord) {
    for field in spec.fields {
        if let FieldKind::Class { iri, .. } = field.kind {
            node.push(RDF_TYPE, GraphValue::Iri(iri.to_string()));
            continue;
        }
        let Some(value) = record.get(field.name).filter(|v| !v.is_null()) else {
            continue;
        };
        match value {
            Value::Array(items) if field.cardinality.is_list() => {
                for item in items {
                    write_value(field, item, node);
                }
            }
            single => write_value(field, single, node),
        }
    }
}

fn write_value(field: &FieldSpec, value: &Value, node: &mut GraphRecord) {
    match field.kind {
        FieldKind::Subject | FieldKind::Class { .. } | FieldKind::Discriminator { .. } => {}
        FieldKind::Plain { predicate, scalar } => {
            if let Some(object) = scalar_object(scalar, value) {
                node.push(predicate, object);
            }
        }
        FieldKind::Nested { predicate, record } => {
            if let Some(obj) = value.as_object() {
                let mut child = GraphRecord::blank();
                write_fields(obj, record, &mut child);
                node.push(predicate, GraphValue::Node(child));
            }
        }
        FieldKind::Composite { predicate, union } => {
            let Some(obj) = value.as_object() else {
                return;
            };
            let variant = match obj.get("type").and_then(Value::as_str) {
                Some(tag) => union.by_tag(tag),
                None => union.variants.first(),
            };
            if let Some(variant) = variant {
                let mut child = GraphRecord::blank();
                child.push(RDF_TYPE, GraphValue::Iri(variant.class.to_string()));
                child.push(
                    RDF_VALUE,
                    GraphValue::Literal(Literal::plain(coverage::encode(obj, variant.record))),
                );
                node.push(predicate, GraphValue::Node(child));
            }
        }
        FieldKind::Dictionary { predicate, key, value: value_predicate } => {
            for (k, v) in value.as_object().into_iter().flatten() {
                let mut child = GraphRecord::blank();
                child.push(key, GraphValue::Literal(Literal::plain(k.clone())));
                child.push(value_predicate, GraphValue::Literal(Literal::plain(text(v))));
                node.push(predicate, GraphValue::Node(child));
            }
        }
        FieldKind::Identifiers { known, other } => {
            for (name, url) in value.as_object().into_iter().flatten() {
                let url = text(url);
                match known.iter().find(|(known_name, _)| *known_name == name.as_str()) {
                    Some((_, predicate)) => node.push(predicate, GraphValue::Iri(url)),
                    None => {
                        let mut child = GraphRecord::blank();
                        child.push(HSTERMS_KEY, GraphValue::Literal(Literal::plain(name.clone())));
                        child.push(HSTERMS_VALUE, GraphValue::Literal(Literal::plain(url)));
                        node.push(other, GraphValue::Node(child));
                    }
                }
            }
        }
        FieldKind::Wrapped { predicate, inner, scalar } => {
            if let Some(object) = scalar_object(scalar, value) {
                let mut child = GraphRecord::blank();
                child.push(inner, object);
                node.push(predicate, GraphValue::Node(child));
            }
        }
        FieldKind::Typed { predicate, class, scalar } => {
            if let Some(object) = scalar_object(scalar, value) {
                let mut child = GraphRecord::blank();
                child.push(RDF_TYPE, GraphValue::Iri(class.to_string()));
                child.push(RDF_VALUE, object);
                node.push(predicate, GraphValue::Node(child));
            }
        }
        FieldKind::Relations { predicate, types } => {
            let relation_type = value.get("type").and_then(Value::as_str);
            let target = types.iter().find(|(name, _)| Some(*name) == relation_type);
            if let (Some((_, relation_predicate)), Some(related)) =
                (target, value.get("value").and_then(Value::as_str))
            {
                let mut child = GraphRecord::blank();
                child.push(relation_predicate, GraphValue::Literal(Literal::plain(related)));
                node.push(predicate, GraphValue::Node(child));
            }
        }
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn scalar_object(scalar: Scalar, value: &Value) -> Option<GraphValue> {
    let literal = match (scalar, value) {
        (Scalar::Url, Value::String(s)) => return Some(GraphValue::Iri(s.clone())),
        (Scalar::Integer | Scalar::PositiveInteger, Value::Number(n)) => {
            Literal::typed(n.to_string(), XSD_INTEGER)
        }
        (Scalar::Number, Value::Number(n)) => {
            let lexical = match n.as_f64() {
                Some(f) if n.is_f64() => coverage::format_number(f),
                _ => n.to_string(),
            };
            Literal::typed(lexical, XSD_DOUBLE)
        }
        (Scalar::Boolean, Value::Bool(b)) => Literal::typed(b.to_string(), XSD_BOOLEAN),
        (Scalar::DateTime, Value::String(s)) => Literal::typed(s.clone(), XSD_DATETIME),
        (_, Value::Null) => return None,
        (_, other) => Literal::plain(text(other)),
    };
    Some(GraphValue::Literal(literal))
}

/// Rebuild the untyped flat form of `node`
///
/// Structural problems (a literal where a node is expected, a node with no
/// value) are reported into `v`; value-level checks are left to coercion.
pub fn read_graph_record(node: &GraphRecord, spec: &RecordSpec, v: &mut Validator) -> Map<String, Value> {
    let mut out = Map::new();
    for field in spec.fields {
        let value = v.field(field.name, |v| read_field(node, field, v));
        if let Some(value) = value {
            out.insert(field.name.to_string(), value);
        }
    }
    out
}

fn read_field(node: &GraphRecord, field: &FieldSpec, v: &mut Validator) -> Option<Value> {
    match field.kind {
        FieldKind::Subject => node.subject.as_iri().map(|iri| json!(iri)),
        FieldKind::Class { iri, value } => node.has_type(iri).then(|| json!(value)),
        FieldKind::Discriminator { .. } => None,
        FieldKind::Plain { predicate, scalar } => {
            let values: Vec<Value> = node
                .values(predicate)
                .filter_map(|object| match object {
                    GraphValue::Node(_) => {
                        v.report("expected a literal value, found a node");
                        None
                    }
                    other => Some(object_to_json(scalar, other)),
                })
                .collect();
            collect(field, values)
        }
        FieldKind::Nested { predicate, record } => {
            let values = nodes(node, predicate, v)
                .into_iter()
                .enumerate()
                .map(|(i, child)| {
                    let read = |v: &mut Validator| Value::Object(read_graph_record(child, record, v));
                    if field.cardinality.is_list() {
                        v.index(i, read)
                    } else {
                        read(v)
                    }
                })
                .collect();
            collect(field, values)
        }
        FieldKind::Composite { predicate, union } => {
            let values = node
                .values(predicate)
                .filter_map(|object| match object {
                    GraphValue::Node(child) => Some(child),
                    _ => None,
                })
                .filter_map(|child| {
                    let variant = child.types().find_map(|class| union.by_class(class))?;
                    let Some(encoded) = child.rdf_value() else {
                        v.report("composite node has no rdf:value");
                        return None;
                    };
                    let mut decoded = coverage::decode(encoded);
                    if variant.record.fields.iter().any(|f| f.name == "type") {
                        decoded.insert("type".to_string(), json!(variant.tag));
                    }
                    Some(Value::Object(decoded))
                })
                .collect();
            collect(field, values)
        }
        FieldKind::Dictionary { predicate, key, value } => {
            let mut map = Map::new();
            for (i, child) in nodes(node, predicate, v).into_iter().enumerate() {
                v.index(i, |v| {
                    let Some(k) = first_text(child, key) else {
                        v.report("Missing the 'key' key");
                        return;
                    };
                    let Some(val) = first_text(child, value) else {
                        v.report(format!("Missing the 'value' key for {}", k));
                        return;
                    };
                    if map.contains_key(&k) {
                        v.report(format!("Found a duplicate key {}", k));
                        return;
                    }
                    map.insert(k, Value::String(val));
                });
            }
            (!map.is_empty()).then_some(Value::Object(map))
        }
        FieldKind::Identifiers { known, other } => {
            let mut map = Map::new();
            for (name, predicate) in known {
                if let Some(url) = node.values(predicate).find_map(object_text) {
                    map.insert(name.to_string(), Value::String(url));
                }
            }
            for child in nodes(node, other, v) {
                if let (Some(k), Some(url)) = (first_text(child, HSTERMS_KEY), first_text(child, HSTERMS_VALUE)) {
                    map.insert(k, Value::String(url));
                }
            }
            (!map.is_empty()).then_some(Value::Object(map))
        }
        FieldKind::Wrapped { predicate, inner, scalar } => {
            let values = nodes(node, predicate, v)
                .into_iter()
                .filter_map(|child| child.values(inner).next())
                .map(|object| object_to_json(scalar, object))
                .collect();
            collect(field, values)
        }
        FieldKind::Typed { predicate, class, scalar } => {
            let values = node
                .values(predicate)
                .filter_map(|object| match object {
                    GraphValue::Node(child) if child.has_type(class) => child.values(RDF_VALUE).next(),
                    _ => None,
                })
                .map(|object| object_to_json(scalar, object))
                .collect();
            collect(field, values)
        }
        FieldKind::Relations { predicate, types } => {
            let values = nodes(node, predicate, v)
                .into_iter()
                .filter_map(|child| {
                    child.edges.iter().find_map(|edge| {
                        let (name, _) = types.iter().find(|(_, p)| *p == edge.predicate)?;
                        let related = object_text(&edge.value)?;
                        Some(json!({ "type": name, "value": related }))
                    })
                })
                .collect();
            collect(field, values)
        }
    }
}

/// Child nodes under `predicate`, reporting any non-node objects
fn nodes<'a>(node: &'a GraphRecord, predicate: &'a str, v: &mut Validator) -> Vec<&'a GraphRecord> {
    node.values(predicate)
        .filter_map(|object| match object {
            GraphValue::Node(child) => Some(child),
            GraphValue::Iri(iri) => {
                v.report(format!("expected a nested node, found reference <{}>", iri));
                None
            }
            GraphValue::Literal(lit) => {
                v.report(format!("expected a nested node, found literal '{}'", lit.value));
                None
            }
        })
        .collect()
}

fn collect(field: &FieldSpec, values: Vec<Value>) -> Option<Value> {
    match field.cardinality {
        Cardinality::Many | Cardinality::AtLeastOne => Some(Value::Array(values)),
        Cardinality::Optional | Cardinality::Required => values.into_iter().next(),
    }
}

fn object_text(object: &GraphValue) -> Option<String> {
    match object {
        GraphValue::Literal(lit) => Some(lit.value.clone()),
        GraphValue::Iri(iri) => Some(iri.clone()),
        GraphValue::Node(_) => None,
    }
}

fn first_text(node: &GraphRecord, predicate: &str) -> Option<String> {
    node.values(predicate).find_map(object_text)
}

/// Convert a literal or IRI back into JSON, parsing typed lexical forms
///
/// Values that fail to parse stay strings so coercion can report them.
fn object_to_json(scalar: Scalar, object: &GraphValue) -> Value {
    let Some(lexical) = object_text(object) else {
        return Value::Null;
    };
    match scalar {
        Scalar::Integer | Scalar::PositiveInteger => match lexical.trim().parse::<i64>() {
            Ok(n) => json!(n),
            Err(_) => Value::String(lexical),
        },
        Scalar::Number => match lexical.trim().parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Value::Number(n),
            None => Value::String(lexical),
        },
        Scalar::Boolean => match lexical.trim() {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => Value::String(lexical),
        },
        _ => Value::String(lexical),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CompositeSpec, CompositeVariant};
    use crate::validate::coerce_record;

    static POINT: RecordSpec = RecordSpec {
        name: "Point",
        title: "Point",
        fields: &[
            FieldSpec::new("type", FieldKind::Discriminator { value: "point" }),
            FieldSpec::plain("north", "", Scalar::Number).required(),
            FieldSpec::plain("east", "", Scalar::Number).required(),
            FieldSpec::plain("units", "", Scalar::String).required(),
        ],
        rules: &[],
    };

    static SPATIAL: CompositeSpec = CompositeSpec {
        name: "Spatial",
        variants: &[CompositeVariant {
            tag: "point",
            class: "http://p/Point",
            record: &POINT,
        }],
        infer: None,
    };

    static PERIOD: RecordSpec = RecordSpec {
        name: "Period",
        title: "Period",
        fields: &[
            FieldSpec::plain("start", "", Scalar::DateTime),
            FieldSpec::plain("end", "", Scalar::DateTime),
        ],
        rules: &[],
    };

    static TEMPORAL: CompositeSpec = CompositeSpec {
        name: "Temporal",
        variants: &[CompositeVariant {
            tag: "period",
            class: "http://p/Period",
            record: &PERIOD,
        }],
        infer: None,
    };

    static THING: RecordSpec = RecordSpec {
        name: "Thing",
        title: "Thing",
        fields: &[
            FieldSpec::new("url", FieldKind::Subject),
            FieldSpec::new(
                "type",
                FieldKind::Class {
                    iri: "http://p/Thing",
                    value: "Thing",
                },
            ),
            FieldSpec::plain("title", "http://p/title", Scalar::String).required(),
            FieldSpec::plain("count", "http://p/count", Scalar::Integer),
            FieldSpec::plain("keywords", "http://p/subject", Scalar::String).many(),
            FieldSpec::new(
                "spatial",
                FieldKind::Composite {
                    predicate: "http://p/coverage",
                    union: &SPATIAL,
                },
            ),
            FieldSpec::new(
                "period",
                FieldKind::Composite {
                    predicate: "http://p/coverage",
                    union: &TEMPORAL,
                },
            ),
            FieldSpec::new(
                "created",
                FieldKind::Typed {
                    predicate: "http://p/date",
                    class: "http://p/created",
                    scalar: Scalar::DateTime,
                },
            ),
            FieldSpec::new(
                "extra",
                FieldKind::Dictionary {
                    predicate: "http://p/extended",
                    key: HSTERMS_KEY,
                    value: HSTERMS_VALUE,
                },
            ),
            FieldSpec::new(
                "ids",
                FieldKind::Identifiers {
                    known: &[("ORCID", "http://p/ORCID")],
                    other: "http://p/identifier",
                },
            ),
            FieldSpec::new(
                "source",
                FieldKind::Wrapped {
                    predicate: "http://p/source",
                    inner: "http://p/derivedFrom",
                    scalar: Scalar::String,
                },
            ),
        ],
        rules: &[],
    };

    fn sample() -> Map<String, Value> {
        coerce_record(
            &json!({
                "url": "http://example.org/res/1",
                "title": "A thing",
                "count": 3,
                "keywords": ["a", "b"],
                "spatial": {"type": "point", "north": 40.5, "east": -111, "units": "Decimal degrees"},
                "period": {"start": "2020-01-01T00:00:00Z", "end": "2020-02-01T00:00:00Z"},
                "created": "2021-05-06T07:08:09Z",
                "extra": {"k1": "v1", "k2": "v2"},
                "ids": {"ORCID": "https://orcid.org/0000-0001", "Scopus": "https://scopus.com/1"},
                "source": "the lab notebook"
            }),
            &THING,
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip() {
        let record = sample();
        let node = to_graph_record(&record, &THING);
        assert_eq!(node.subject, Subject::iri("http://example.org/res/1"));
        assert!(node.has_type("http://p/Thing"));

        let mut v = Validator::new();
        let raw = read_graph_record(&node, &THING, &mut v);
        assert!(v.is_clean());
        let back = coerce_record(&Value::Object(raw), &THING).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_one_edge_per_value() {
        let node = to_graph_record(&sample(), &THING);
        assert_eq!(node.values("http://p/subject").count(), 2);
        assert_eq!(node.values("http://p/extended").count(), 2);
        // both coverages share one predicate
        assert_eq!(node.values("http://p/coverage").count(), 2);
        // one known identifier on its own predicate, one opaque entry
        assert_eq!(node.values("http://p/ORCID").count(), 1);
        assert_eq!(node.values("http://p/identifier").count(), 1);
    }

    #[test]
    fn test_literal_datatypes() {
        let node = to_graph_record(&sample(), &THING);
        match node.values("http://p/count").next() {
            Some(GraphValue::Literal(lit)) => {
                assert_eq!(lit.value, "3");
                assert_eq!(lit.datatype.as_deref(), Some(XSD_INTEGER));
            }
            other => panic!("unexpected {:?}", other),
        };
    }

    #[test]
    fn test_composite_encoding_on_node() {
        let node = to_graph_record(&sample(), &THING);
        let spatial = node
            .values("http://p/coverage")
            .find_map(|v| match v {
                GraphValue::Node(child) if child.has_type("http://p/Point") => Some(child),
                _ => None,
            })
            .unwrap();
        assert_eq!(spatial.rdf_value(), Some("north=40.5; east=-111; units=Decimal degrees"));
    }

    #[test]
    fn test_literal_where_node_expected() {
        let mut node = GraphRecord::new(Subject::iri("http://example.org/res/1"));
        node.push("http://p/title", GraphValue::Literal(Literal::plain("t")));
        node.push("http://p/source", GraphValue::Literal(Literal::plain("oops")));

        let mut v = Validator::new();
        read_graph_record(&node, &THING, &mut v);
        assert_eq!(v.violations().len(), 1);
        assert_eq!(v.violations()[0].path, "source");
    }

    fn extended_entry(key: Option<&str>, value: Option<&str>) -> GraphValue {
        let mut entry = GraphRecord::blank();
        if let Some(key) = key {
            entry.push(HSTERMS_KEY, GraphValue::Literal(Literal::plain(key)));
        }
        if let Some(value) = value {
            entry.push(HSTERMS_VALUE, GraphValue::Literal(Literal::plain(value)));
        }
        GraphValue::Node(entry)
    }

    #[test]
    fn test_duplicate_extended_key_from_graph() {
        let mut node = to_graph_record(&sample(), &THING);
        node.push("http://p/extended", extended_entry(Some("k1"), Some("other")));

        let mut v = Validator::new();
        read_graph_record(&node, &THING, &mut v);
        assert_eq!(v.violations().len(), 1);
        assert_eq!(v.violations()[0].path, "extra[2]");
        assert_eq!(v.violations()[0].message, "Found a duplicate key k1");
    }

    #[test]
    fn test_incomplete_extended_entries_from_graph() {
        let mut node = to_graph_record(&sample(), &THING);
        node.push("http://p/extended", extended_entry(Some("k3"), None));
        node.push("http://p/extended", extended_entry(None, Some("v4")));

        let mut v = Validator::new();
        let raw = read_graph_record(&node, &THING, &mut v);
        let messages: Vec<&str> = v.violations().iter().map(|x| x.message.as_str()).collect();
        assert_eq!(messages, vec!["Missing the 'value' key for k3", "Missing the 'key' key"]);
        assert_eq!(raw["extra"], json!({"k1": "v1", "k2": "v2"}));
    }
}
