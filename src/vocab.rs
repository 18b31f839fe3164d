//! Vocabulary definitions for the metadata graph
//!
//! Every graph-mapped field is tagged with a predicate IRI built from one of
//! the fixed namespaces below. These IRIs are the wire contract: renaming one
//! breaks every document written before the change.

use serde_json::{Map, Value};

/// HydroShare terms
pub const HSTERMS: &str = "https://www.hydroshare.org/terms/";

/// Resource landing pages
pub const HSRESOURCE: &str = "http://www.hydroshare.org/resource/";

/// HydroShare user pages
pub const HSUSER: &str = "http://www.hydroshare.org/user/";

pub const DCTERMS: &str = "http://purl.org/dc/terms/";
pub const DC: &str = "http://purl.org/dc/elements/1.1/";
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
pub const SCHEMA: &str = "http://schema.org/";
pub const FOAF: &str = "http://xmlns.com/foaf/0.1/";
pub const ORE: &str = "http://www.openarchives.org/ore/terms/";
pub const CITOTERMS: &str = "http://purl.org/spar/cito/";

macro_rules! hsterms {
    ($local:literal) => {
        concat!("https://www.hydroshare.org/terms/", $local)
    };
}

macro_rules! dcterms {
    ($local:literal) => {
        concat!("http://purl.org/dc/terms/", $local)
    };
}

macro_rules! dc {
    ($local:literal) => {
        concat!("http://purl.org/dc/elements/1.1/", $local)
    };
}

pub(crate) use dc;
pub(crate) use dcterms;
pub(crate) use hsterms;

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_VALUE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#value";

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
pub const XSD_DATETIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

/// Key of an extended metadata entry (also used for opaque identifiers)
pub const HSTERMS_KEY: &str = hsterms!("key");
/// Value of an extended metadata entry (also used for opaque identifiers)
pub const HSTERMS_VALUE: &str = hsterms!("value");

/// Literal datatypes that map onto native JSON values
pub const PLAIN_LITERAL_TYPES: &[&str] = &[XSD_BOOLEAN, XSD_INTEGER, XSD_DOUBLE, XSD_STRING];

/// Prefixes used when compacting IRIs in a JSON-LD context
pub const PREFIXES: &[(&str, &str)] = &[
    ("hsterms", HSTERMS),
    ("hsresource", HSRESOURCE),
    ("hsuser", HSUSER),
    ("dcterms", DCTERMS),
    ("dc", DC),
    ("rdf", RDF),
    ("rdfs", RDFS),
    ("xsd", XSD),
    ("schema", SCHEMA),
    ("foaf", FOAF),
    ("ore", ORE),
    ("citoterms", CITOTERMS),
];

/// Shorten an IRI to `prefix:local` if it falls in a known namespace
pub fn compact_iri(iri: &str) -> Option<String> {
    PREFIXES
        .iter()
        .filter(|(_, ns)| iri.starts_with(ns) && iri.len() > ns.len())
        // longest namespace wins
        .max_by_key(|(_, ns)| ns.len())
        .map(|(prefix, ns)| format!("{}:{}", prefix, &iri[ns.len()..]))
}

/// Expand `prefix:local` back into a full IRI
pub fn expand_iri(term: &str) -> Option<String> {
    let (prefix, local) = term.split_once(':')?;
    PREFIXES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, ns)| format!("{}{}", ns, local))
}

/// JSON-LD `@context` declaring every known prefix
pub fn context() -> Value {
    let mut ctx = Map::new();
    for (prefix, ns) in PREFIXES {
        ctx.insert(prefix.to_string(), Value::String(ns.to_string()));
    }
    Value::Object(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_macros() {
        assert_eq!(hsterms!("name"), "https://www.hydroshare.org/terms/name");
        assert_eq!(dcterms!("abstract"), "http://purl.org/dc/terms/abstract");
        assert_eq!(dc!("title"), "http://purl.org/dc/elements/1.1/title");
    }

    #[test]
    fn test_compact_and_expand() {
        let iri = "https://www.hydroshare.org/terms/cellSizeXValue";
        let short = compact_iri(iri).unwrap();
        assert_eq!(short, "hsterms:cellSizeXValue");
        assert_eq!(expand_iri(&short).unwrap(), iri);

        assert_eq!(compact_iri(RDF_TYPE).unwrap(), "rdf:type");
        assert!(compact_iri("https://example.org/other").is_none());
        assert!(compact_iri(HSTERMS).is_none());
    }

    #[test]
    fn test_context() {
        let ctx = context();
        assert_eq!(ctx["hsterms"], HSTERMS);
        assert_eq!(ctx.as_object().unwrap().len(), PREFIXES.len());
    }
}
