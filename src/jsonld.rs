//! JSON-LD output
//!
//! [`from_rdf`] turns a triple set into a flattened JSON-LD document, one
//! node object per subject. [`to_jsonld`] runs the flattened document
//! through the compactor, and [`to_bytes`] renders it as pretty, key-sorted
//! text in the requested encoding.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{json, Map, Number, Value};

use crate::compact::{compact, CompactOptions};
use crate::error::MetadataError;
use crate::graph::{Graph, Literal, Subject, Term};
use crate::id::INTERNAL_PREFIX;
use crate::vocab::{compact_iri, context, RDF_TYPE, XSD_BOOLEAN, XSD_DOUBLE, XSD_INTEGER, XSD_STRING};

/// Output text encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    /// Little-endian with a byte order mark
    Utf16,
}

/// Options for JSON-LD output
#[derive(Debug, Clone)]
pub struct JsonLdOptions {
    /// Spaces per indentation level
    pub indent: usize,
    pub encoding: Encoding,
    /// Inline internal nodes into their referrers
    pub compact: bool,
    /// Emit an `@context` and shorten IRIs to `prefix:local`
    pub use_context: bool,
    /// Identifier prefix marking internal nodes
    pub internal_prefix: String,
}

impl Default for JsonLdOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            encoding: Encoding::Utf8,
            compact: true,
            use_context: false,
            internal_prefix: INTERNAL_PREFIX.to_string(),
        }
    }
}

/// Convert triples to a flattened `{"@graph": [...]}` document
///
/// Subjects appear in order of first appearance. Blank subjects and objects
/// are written as `_:label`.
pub fn from_rdf(graph: &Graph, use_context: bool) -> Value {
    let key = |iri: &str| -> String {
        if use_context {
            compact_iri(iri).unwrap_or_else(|| iri.to_string())
        } else {
            iri.to_string()
        }
    };

    let mut nodes = Vec::new();
    for subject in graph.subjects() {
        let mut properties: Vec<(String, Vec<Value>)> = Vec::new();
        let mut slots: HashMap<String, usize> = HashMap::new();
        for (predicate, object) in graph.edges(subject) {
            let (name, value) = if predicate == RDF_TYPE {
                let class = match object {
                    Term::Iri(iri) => Value::String(key(iri)),
                    other => term_to_json(other),
                };
                ("@type".to_string(), class)
            } else {
                (key(predicate), term_to_json(object))
            };
            let slot = *slots.entry(name.clone()).or_insert_with(|| {
                properties.push((name, Vec::new()));
                properties.len() - 1
            });
            properties[slot].1.push(value);
        }

        let mut node = Map::new();
        node.insert("@id".to_string(), Value::String(subject_id(subject)));
        for (name, mut values) in properties {
            let value = if values.len() == 1 {
                values.remove(0)
            } else {
                Value::Array(values)
            };
            node.insert(name, value);
        }
        nodes.push(Value::Object(node));
    }

    let mut document = Map::new();
    if use_context {
        document.insert("@context".to_string(), context());
    }
    document.insert("@graph".to_string(), Value::Array(nodes));
    Value::Object(document)
}

fn subject_id(subject: &Subject) -> String {
    match subject {
        Subject::Iri(iri) => iri.clone(),
        Subject::Blank(label) => format!("_:{}", label),
    }
}

fn term_to_json(term: &Term) -> Value {
    match term {
        Term::Iri(iri) => json!({ "@id": iri }),
        Term::Blank(label) => json!({ "@id": format!("_:{}", label) }),
        Term::Literal(lit) => literal_to_json(lit),
    }
}

/// Native JSON for the xsd types JSON can hold, a value object otherwise
fn literal_to_json(lit: &Literal) -> Value {
    if let Some(language) = &lit.language {
        return json!({ "@value": lit.value, "@language": language });
    }
    let native = match lit.datatype.as_deref() {
        None | Some(XSD_STRING) => Some(Value::String(lit.value.clone())),
        Some(XSD_INTEGER) => lit.value.parse::<i64>().ok().map(Value::from),
        Some(XSD_DOUBLE) => lit
            .value
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        Some(XSD_BOOLEAN) => lit.value.parse::<bool>().ok().map(Value::Bool),
        Some(_) => None,
    };
    native.unwrap_or_else(|| {
        json!({
            "@value": lit.value,
            "@type": lit.datatype.as_deref().unwrap_or(XSD_STRING),
        })
    })
}

/// Build the JSON-LD document for `graph`, compacted unless disabled
pub fn to_jsonld(graph: &Graph, options: &JsonLdOptions) -> Result<Value, MetadataError> {
    let flattened = from_rdf(graph, options.use_context);
    if !options.compact {
        return Ok(flattened);
    }
    let compact_options = CompactOptions {
        internal_prefix: options.internal_prefix.clone(),
    };
    Ok(compact(&flattened, &compact_options)?)
}

/// Render a document as indented text with object keys in sorted order
///
/// serde_json's default map keeps keys sorted, so sorting falls out of
/// serializing through `Map`.
pub fn to_pretty_string(document: &Value, indent: usize) -> Result<String, MetadataError> {
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
    document.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Encode text, replacing anything the target encoding cannot represent
///
/// Both supported encodings cover all of Unicode, so replacement never
/// happens for input that is already a valid `str`.
pub fn encode(text: &str, encoding: Encoding) -> Vec<u8> {
    match encoding {
        Encoding::Utf8 => text.as_bytes().to_vec(),
        Encoding::Utf16 => {
            let mut out = Vec::with_capacity(2 + text.len() * 2);
            out.extend_from_slice(&[0xFF, 0xFE]);
            for unit in text.encode_utf16() {
                out.extend_from_slice(&unit.to_le_bytes());
            }
            out
        }
    }
}

/// Serialize `graph` as pretty JSON-LD bytes
pub fn to_bytes(graph: &Graph, options: &JsonLdOptions) -> Result<Vec<u8>, MetadataError> {
    let document = to_jsonld(graph, options)?;
    let text = to_pretty_string(&document, options.indent)?;
    Ok(encode(&text, options.encoding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphRecord, GraphValue, Triple};
    use crate::vocab::{dc, hsterms, XSD_DATETIME};

    fn sample_graph() -> Graph {
        let mut creator = GraphRecord::new(Subject::Blank("N1".to_string()));
        creator.push(hsterms!("name"), GraphValue::Literal(Literal::plain("Jane")));
        creator.push(hsterms!("creatorOrder"), GraphValue::Literal(Literal::typed("1", XSD_INTEGER)));

        let mut root = GraphRecord::new(Subject::iri("http://www.hydroshare.org/resource/abc"));
        root.push(RDF_TYPE, GraphValue::Iri(hsterms!("CompositeResource").to_string()));
        root.push(dc!("title"), GraphValue::Literal(Literal::plain("Logan")));
        root.push(dc!("subject"), GraphValue::Literal(Literal::plain("a")));
        root.push(dc!("subject"), GraphValue::Literal(Literal::plain("b")));
        root.push(dc!("creator"), GraphValue::Node(creator));
        root.to_graph()
    }

    #[test]
    fn test_from_rdf_flattens_one_node_per_subject() {
        let document = from_rdf(&sample_graph(), false);
        let nodes = document["@graph"].as_array().unwrap();
        assert_eq!(nodes.len(), 2);

        // a nested record's triples follow the referrer's first triple
        let root = &nodes[0];
        assert_eq!(root["@type"], hsterms!("CompositeResource"));
        assert_eq!(root[dc!("subject")], json!(["a", "b"]));
        assert_eq!(root[dc!("creator")], json!({"@id": "_:N1"}));
        assert!(document.get("@context").is_none());

        let creator = &nodes[1];
        assert_eq!(creator["@id"], "_:N1");
        assert_eq!(creator[hsterms!("creatorOrder")], json!(1));
    }

    #[test]
    fn test_context_shortens_iris() {
        let document = from_rdf(&sample_graph(), true);
        assert_eq!(document["@context"]["dc"], "http://purl.org/dc/elements/1.1/");
        let root = &document["@graph"][0];
        assert_eq!(root["@type"], "hsterms:CompositeResource");
        assert_eq!(root["dc:title"], "Logan");
    }

    #[test]
    fn test_literal_forms() {
        assert_eq!(literal_to_json(&Literal::typed("2.5", XSD_DOUBLE)), json!(2.5));
        assert_eq!(literal_to_json(&Literal::typed("true", XSD_BOOLEAN)), json!(true));
        assert_eq!(
            literal_to_json(&Literal::typed("2020-01-01T00:00:00Z", XSD_DATETIME)),
            json!({"@value": "2020-01-01T00:00:00Z", "@type": XSD_DATETIME})
        );
        assert_eq!(
            literal_to_json(&Literal::typed("many", XSD_INTEGER)),
            json!({"@value": "many", "@type": XSD_INTEGER})
        );
        let tagged = Literal {
            value: "Logan".to_string(),
            datatype: None,
            language: Some("en".to_string()),
        };
        assert_eq!(literal_to_json(&tagged), json!({"@value": "Logan", "@language": "en"}));
    }

    #[test]
    fn test_to_jsonld_inlines_nested_records() {
        let document = to_jsonld(&sample_graph(), &JsonLdOptions::default()).unwrap();
        let nodes = document["@graph"].as_array().unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(
            nodes[0][dc!("creator")],
            json!({hsterms!("name"): "Jane", hsterms!("creatorOrder"): 1})
        );
    }

    #[test]
    fn test_pretty_output_is_sorted_and_indented() {
        let text = to_pretty_string(&json!({"b": 1, "a": {"c": "ü"}}), 2).unwrap();
        assert_eq!(text, "{\n  \"a\": {\n    \"c\": \"ü\"\n  },\n  \"b\": 1\n}");

        let wide = to_pretty_string(&json!({"a": 1}), 4).unwrap();
        assert_eq!(wide, "{\n    \"a\": 1\n}");
    }

    #[test]
    fn test_utf16_output_has_bom() {
        let bytes = encode("{\"a\": \"é\"}", Encoding::Utf16);
        assert_eq!(&bytes[..2], &[0xFF, 0xFE]);
        assert_eq!(&bytes[2..4], &[b'{', 0]);
        assert_eq!(bytes.len(), 2 + 2 * 10);
        assert_eq!(encode("é", Encoding::Utf8), "é".as_bytes());
    }

    #[test]
    fn test_uncompacted_output_keeps_internal_nodes() {
        let mut graph = sample_graph();
        graph.insert(Triple::new(
            Subject::iri("http://example.org/x"),
            dc!("title"),
            Term::Literal(Literal::plain("x")),
        ));
        let options = JsonLdOptions {
            compact: false,
            ..JsonLdOptions::default()
        };
        let document = to_jsonld(&graph, &options).unwrap();
        assert_eq!(document["@graph"].as_array().unwrap().len(), 3);
    }
}
