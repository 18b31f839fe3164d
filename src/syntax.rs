//! RDF text formats
//!
//! Parsing and writing of Turtle, N-Triples and RDF/XML through the rio
//! parsers and formatters. Blank nodes read from text are relabelled with
//! fresh internal labels, so that nested records parsed from any source
//! are recognized as internal nodes during JSON-LD compaction.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use rio_api::formatter::TriplesFormatter;
use rio_api::model::{
    BlankNode, Literal as RioLiteral, NamedNode, Subject as RioSubject, Term as RioTerm, Triple as RioTriple,
};
use rio_api::parser::TriplesParser;
use rio_turtle::{NTriplesFormatter, NTriplesParser, TurtleFormatter, TurtleParser};
use rio_xml::{RdfXmlFormatter, RdfXmlParser};

use crate::error::MetadataError;
use crate::graph::{Graph, Literal, Subject, Term, Triple};
use crate::id::new_blank_label;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    Turtle,
    NTriples,
    RdfXml,
}

impl RdfFormat {
    pub fn name(self) -> &'static str {
        match self {
            RdfFormat::Turtle => "Turtle",
            RdfFormat::NTriples => "N-Triples",
            RdfFormat::RdfXml => "RDF/XML",
        }
    }

    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "ttl" | "turtle" => Some(RdfFormat::Turtle),
            "nt" => Some(RdfFormat::NTriples),
            "rdf" | "xml" | "owl" => Some(RdfFormat::RdfXml),
            _ => None,
        }
    }

    /// Guess the format from the document text
    ///
    /// Anything that does not look like XML is read as Turtle, which also
    /// accepts N-Triples.
    pub fn sniff(content: &[u8]) -> Self {
        let head = String::from_utf8_lossy(&content[..content.len().min(512)]);
        let head = head.trim_start_matches('\u{feff}').trim_start();
        if head.starts_with("<?xml") || head.starts_with("<rdf:RDF") {
            RdfFormat::RdfXml
        } else {
            RdfFormat::Turtle
        }
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn rdf_error(format: RdfFormat, reason: impl fmt::Display) -> MetadataError {
    MetadataError::Rdf {
        format: format.name().to_string(),
        reason: reason.to_string(),
    }
}

/// Parse RDF text into a graph
pub fn parse(input: &[u8], format: RdfFormat) -> Result<Graph, MetadataError> {
    match format {
        RdfFormat::Turtle => collect(TurtleParser::new(input, None), format),
        RdfFormat::NTriples => collect(NTriplesParser::new(input), format),
        RdfFormat::RdfXml => collect(RdfXmlParser::new(input, None), format),
    }
}

/// Maps source blank node ids to fresh internal labels
#[derive(Default)]
struct Relabeler {
    labels: HashMap<String, String>,
}

impl Relabeler {
    fn label(&mut self, id: &str) -> String {
        self.labels
            .entry(id.to_string())
            .or_insert_with(new_blank_label)
            .clone()
    }
}

fn collect<P: TriplesParser>(mut parser: P, format: RdfFormat) -> Result<Graph, MetadataError> {
    let mut relabeler = Relabeler::default();
    let mut graph = Graph::new();
    let mut skipped = 0usize;
    parser
        .parse_all(&mut |t| -> Result<(), P::Error> {
            match convert(&t, &mut relabeler) {
                Some(triple) => {
                    graph.insert(triple);
                }
                None => skipped += 1,
            }
            Ok(())
        })
        .map_err(|e| rdf_error(format, e))?;

    if skipped > 0 {
        tracing::debug!(skipped, format = format.name(), "ignored quoted-triple statements");
    }
    tracing::debug!(triples = graph.len(), format = format.name(), "parsed RDF");
    Ok(graph)
}

fn convert(t: &RioTriple<'_>, relabeler: &mut Relabeler) -> Option<Triple> {
    let subject = match t.subject {
        RioSubject::NamedNode(node) => Subject::Iri(node.iri.to_string()),
        RioSubject::BlankNode(node) => Subject::Blank(relabeler.label(node.id)),
        RioSubject::Triple(_) => return None,
    };
    let object = match t.object {
        RioTerm::NamedNode(node) => Term::Iri(node.iri.to_string()),
        RioTerm::BlankNode(node) => Term::Blank(relabeler.label(node.id)),
        RioTerm::Literal(RioLiteral::Simple { value }) => Term::Literal(Literal::plain(value)),
        RioTerm::Literal(RioLiteral::LanguageTaggedString { value, language }) => Term::Literal(Literal {
            value: value.to_string(),
            datatype: None,
            language: Some(language.to_string()),
        }),
        RioTerm::Literal(RioLiteral::Typed { value, datatype }) => Term::Literal(Literal::typed(value, datatype.iri)),
        RioTerm::Triple(_) => return None,
    };
    Some(Triple::new(subject, t.predicate.iri, object))
}

fn format_all<F: TriplesFormatter>(formatter: &mut F, graph: &Graph) -> Result<(), F::Error> {
    for triple in graph.iter() {
        let subject = match &triple.subject {
            Subject::Iri(iri) => RioSubject::NamedNode(NamedNode { iri: iri.as_str() }),
            Subject::Blank(id) => RioSubject::BlankNode(BlankNode { id: id.as_str() }),
        };
        let object = match &triple.object {
            Term::Iri(iri) => RioTerm::NamedNode(NamedNode { iri: iri.as_str() }),
            Term::Blank(id) => RioTerm::BlankNode(BlankNode { id: id.as_str() }),
            Term::Literal(lit) => RioTerm::Literal(match (&lit.language, &lit.datatype) {
                (Some(language), _) => RioLiteral::LanguageTaggedString {
                    value: &lit.value,
                    language,
                },
                (None, Some(datatype)) => RioLiteral::Typed {
                    value: &lit.value,
                    datatype: NamedNode { iri: datatype },
                },
                (None, None) => RioLiteral::Simple { value: &lit.value },
            }),
        };
        formatter.format(&RioTriple {
            subject,
            predicate: NamedNode {
                iri: triple.predicate.as_str(),
            },
            object,
        })?;
    }
    Ok(())
}

/// Write a graph as RDF text
pub fn write(graph: &Graph, format: RdfFormat) -> Result<Vec<u8>, MetadataError> {
    let mut buf = Vec::new();
    match format {
        RdfFormat::Turtle => {
            let mut formatter = TurtleFormatter::new(&mut buf);
            format_all(&mut formatter, graph).map_err(|e| rdf_error(format, e))?;
            formatter.finish().map_err(|e| rdf_error(format, e))?;
        }
        RdfFormat::NTriples => {
            // every statement is written as soon as it is formatted
            let mut formatter = NTriplesFormatter::new(&mut buf);
            format_all(&mut formatter, graph).map_err(|e| rdf_error(format, e))?;
        }
        RdfFormat::RdfXml => {
            let mut formatter = RdfXmlFormatter::with_indentation(&mut buf, 2).map_err(|e| rdf_error(format, e))?;
            format_all(&mut formatter, graph).map_err(|e| rdf_error(format, e))?;
            formatter.finish().map_err(|e| rdf_error(format, e))?;
        }
    }
    Ok(buf)
}

/// Write a graph as RDF text into a `String`
pub fn write_string(graph: &Graph, format: RdfFormat) -> Result<String, MetadataError> {
    let bytes = write(graph, format)?;
    String::from_utf8(bytes).map_err(|e| rdf_error(format, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::INTERNAL_PREFIX;
    use crate::vocab::{dc, hsterms, XSD_INTEGER};

    const TURTLE: &str = r#"
@prefix dc: <http://purl.org/dc/elements/1.1/> .
@prefix hsterms: <https://www.hydroshare.org/terms/> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

<http://www.hydroshare.org/resource/abc> a hsterms:CompositeResource ;
    dc:title "Logan River"@en ;
    dc:creator [
        hsterms:name "Doe, Jane" ;
        hsterms:creatorOrder "1"^^xsd:integer
    ] .
"#;

    #[test]
    fn test_parse_turtle_relabels_blank_nodes() {
        let graph = parse(TURTLE.as_bytes(), RdfFormat::Turtle).unwrap();
        assert_eq!(graph.len(), 5);

        let root = Subject::iri("http://www.hydroshare.org/resource/abc");
        let creator = graph.objects(&root, dc!("creator")).next().unwrap();
        match creator {
            Term::Blank(label) => assert!(format!("_:{}", label).starts_with(INTERNAL_PREFIX)),
            other => panic!("expected a blank node, got {:?}", other),
        }

        let creator = creator.as_subject().unwrap();
        let order = graph.objects(&creator, hsterms!("creatorOrder")).next().unwrap();
        assert_eq!(order, &Term::Literal(Literal::typed("1", XSD_INTEGER)));

        let title = graph.objects(&root, dc!("title")).next().unwrap();
        match title {
            Term::Literal(lit) => assert_eq!(lit.language.as_deref(), Some("en")),
            other => panic!("expected a literal, got {:?}", other),
        }
    }

    #[test]
    fn test_turtle_write_and_reparse() {
        let graph = parse(TURTLE.as_bytes(), RdfFormat::Turtle).unwrap();
        for format in [RdfFormat::Turtle, RdfFormat::NTriples, RdfFormat::RdfXml] {
            let text = write(&graph, format).unwrap();
            let reparsed = parse(&text, format).unwrap();
            assert_eq!(reparsed.len(), graph.len(), "{}", format);
        }
    }

    #[test]
    fn test_parse_rdf_xml() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dc="http://purl.org/dc/elements/1.1/">
  <rdf:Description rdf:about="http://www.hydroshare.org/resource/abc">
    <dc:title>Logan River</dc:title>
  </rdf:Description>
</rdf:RDF>"#;
        assert_eq!(RdfFormat::sniff(xml.as_bytes()), RdfFormat::RdfXml);
        let graph = parse(xml.as_bytes(), RdfFormat::RdfXml).unwrap();
        let root = Subject::iri("http://www.hydroshare.org/resource/abc");
        assert_eq!(
            graph.objects(&root, dc!("title")).next(),
            Some(&Term::Literal(Literal::plain("Logan River")))
        );
    }

    #[test]
    fn test_syntax_errors_name_the_format() {
        let err = parse(b"<http://x> <http://y> .", RdfFormat::NTriples).unwrap_err();
        assert!(err.to_string().starts_with("Failed to process N-Triples data"));
    }

    #[test]
    fn test_format_guessing() {
        assert_eq!(RdfFormat::from_path(Path::new("resourcemetadata.xml")), Some(RdfFormat::RdfXml));
        assert_eq!(RdfFormat::from_path(Path::new("meta.TTL")), Some(RdfFormat::Turtle));
        assert_eq!(RdfFormat::from_path(Path::new("meta.json")), None);
        assert_eq!(RdfFormat::sniff(TURTLE.as_bytes()), RdfFormat::Turtle);
    }
}
