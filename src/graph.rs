//! RDF terms, triple storage and the record-shaped view of a graph
//!
//! [`Graph`] is a flat, insertion-ordered set of triples. [`GraphRecord`] is
//! the tree view used by the mapper: one subject with its predicate/object
//! edges, where objects that are blank nodes have been resolved into nested
//! records.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::GraphIntegrityError;
use crate::id::new_blank_label;
use crate::vocab::{RDF_TYPE, RDF_VALUE};

/// Subject position of a triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subject {
    Iri(String),
    /// Blank node label, without the `_:` marker
    Blank(String),
}

impl Subject {
    /// A fresh blank subject
    pub fn blank() -> Self {
        Subject::Blank(new_blank_label())
    }

    pub fn iri(iri: impl Into<String>) -> Self {
        Subject::Iri(iri.into())
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Subject::Iri(iri) => Some(iri),
            Subject::Blank(_) => None,
        }
    }

    /// The subject as an object term (for reference edges)
    pub fn to_term(&self) -> Term {
        match self {
            Subject::Iri(iri) => Term::Iri(iri.clone()),
            Subject::Blank(label) => Term::Blank(label.clone()),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Iri(iri) => write!(f, "<{}>", iri),
            Subject::Blank(label) => write!(f, "_:{}", label),
        }
    }
}

/// A literal value with optional datatype or language tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    pub value: String,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl Literal {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: &str) -> Self {
        Self {
            value: value.into(),
            datatype: Some(datatype.to_string()),
            language: None,
        }
    }
}

/// Object position of a triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Iri(String),
    Blank(String),
    Literal(Literal),
}

impl Term {
    /// The term as a subject, if it can be one
    pub fn as_subject(&self) -> Option<Subject> {
        match self {
            Term::Iri(iri) => Some(Subject::Iri(iri.clone())),
            Term::Blank(label) => Some(Subject::Blank(label.clone())),
            Term::Literal(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: Subject,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Subject, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

/// Insertion-ordered set of triples
#[derive(Debug, Clone, Default)]
pub struct Graph {
    triples: Vec<Triple>,
    seen: HashSet<Triple>,
    by_subject: HashMap<Subject, Vec<usize>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a triple; returns false if it was already present
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.seen.contains(&triple) {
            return false;
        }
        self.seen.insert(triple.clone());
        self.by_subject
            .entry(triple.subject.clone())
            .or_default()
            .push(self.triples.len());
        self.triples.push(triple);
        true
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.seen.contains(triple)
    }

    pub fn has_subject(&self, subject: &Subject) -> bool {
        self.by_subject.contains_key(subject)
    }

    /// Distinct subjects in order of first appearance
    pub fn subjects(&self) -> Vec<&Subject> {
        let mut seen = HashSet::new();
        self.triples
            .iter()
            .map(|t| &t.subject)
            .filter(|s| seen.insert(*s))
            .collect()
    }

    /// Predicate/object pairs of a subject, in insertion order
    pub fn edges<'a>(&'a self, subject: &Subject) -> impl Iterator<Item = (&'a str, &'a Term)> {
        self.by_subject
            .get(subject)
            .into_iter()
            .flatten()
            .map(move |&i| {
                let t = &self.triples[i];
                (t.predicate.as_str(), &t.object)
            })
    }

    /// Objects of one subject/predicate pair
    pub fn objects<'a>(
        &'a self,
        subject: &Subject,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a Term> {
        self.edges(subject)
            .filter(move |(p, _)| *p == predicate)
            .map(|(_, o)| o)
    }

    /// IRI subjects declaring `rdf:type <class>`
    pub fn subjects_of_type(&self, class: &str) -> Vec<&Subject> {
        self.triples
            .iter()
            .filter(|t| t.predicate == RDF_TYPE && t.object == Term::Iri(class.to_string()))
            .map(|t| &t.subject)
            .collect()
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for triple in iter {
            self.insert(triple);
        }
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = Graph::new();
        graph.extend(iter);
        graph
    }
}

/// Object of a [`GraphRecord`] edge
#[derive(Debug, Clone, PartialEq)]
pub enum GraphValue {
    Literal(Literal),
    Iri(String),
    /// A nested record, referenced by its own subject
    Node(GraphRecord),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub predicate: String,
    pub value: GraphValue,
}

/// One subject and its edges, with nested records resolved into sub-trees
#[derive(Debug, Clone, PartialEq)]
pub struct GraphRecord {
    pub subject: Subject,
    pub edges: Vec<Edge>,
}

impl GraphRecord {
    pub fn new(subject: Subject) -> Self {
        Self {
            subject,
            edges: Vec::new(),
        }
    }

    /// A record with a fresh blank subject
    pub fn blank() -> Self {
        Self::new(Subject::blank())
    }

    pub fn push(&mut self, predicate: &str, value: GraphValue) {
        self.edges.push(Edge {
            predicate: predicate.to_string(),
            value,
        });
    }

    /// Values of one predicate, in edge order
    pub fn values<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = &'a GraphValue> {
        self.edges
            .iter()
            .filter(move |e| e.predicate == predicate)
            .map(|e| &e.value)
    }

    /// Class IRIs declared with `rdf:type`
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.values(RDF_TYPE).filter_map(|v| match v {
            GraphValue::Iri(iri) => Some(iri.as_str()),
            _ => None,
        })
    }

    pub fn has_type(&self, class: &str) -> bool {
        self.types().any(|t| t == class)
    }

    /// Lexical form of the first `rdf:value`
    pub fn rdf_value(&self) -> Option<&str> {
        self.values(RDF_VALUE).find_map(|v| match v {
            GraphValue::Literal(lit) => Some(lit.value.as_str()),
            GraphValue::Iri(iri) => Some(iri.as_str()),
            GraphValue::Node(_) => None,
        })
    }

    /// Emit this record and every nested record as triples
    pub fn write_triples(&self, graph: &mut Graph) {
        for edge in &self.edges {
            let object = match &edge.value {
                GraphValue::Literal(lit) => Term::Literal(lit.clone()),
                GraphValue::Iri(iri) => Term::Iri(iri.clone()),
                GraphValue::Node(child) => {
                    child.write_triples(graph);
                    child.subject.to_term()
                }
            };
            graph.insert(Triple::new(self.subject.clone(), &edge.predicate, object));
        }
    }

    pub fn to_graph(&self) -> Graph {
        let mut graph = Graph::new();
        self.write_triples(&mut graph);
        graph
    }

    /// Build the tree rooted at `subject`, resolving blank-node objects
    ///
    /// IRI objects stay references. A blank node reachable from itself is a
    /// [`GraphIntegrityError::Cycle`].
    pub fn from_graph(graph: &Graph, subject: &Subject) -> Result<Self, GraphIntegrityError> {
        if !graph.has_subject(subject) {
            return Err(GraphIntegrityError::MissingSubject(subject.to_string()));
        }
        let mut path = Vec::new();
        build_record(graph, subject, &mut path)
    }
}

fn build_record(
    graph: &Graph,
    subject: &Subject,
    path: &mut Vec<Subject>,
) -> Result<GraphRecord, GraphIntegrityError> {
    if path.contains(subject) {
        return Err(GraphIntegrityError::Cycle(subject.to_string()));
    }
    path.push(subject.clone());

    let mut record = GraphRecord::new(subject.clone());
    for (predicate, object) in graph.edges(subject) {
        let value = match object {
            Term::Literal(lit) => GraphValue::Literal(lit.clone()),
            Term::Iri(iri) => GraphValue::Iri(iri.clone()),
            Term::Blank(label) => {
                let child = Subject::Blank(label.clone());
                GraphValue::Node(build_record(graph, &child, path)?)
            }
        };
        record.push(predicate, value);
    }

    path.pop();
    Ok(record)
}
