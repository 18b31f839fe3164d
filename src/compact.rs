//! Inlining of internal nodes in flattened JSON-LD
//!
//! A flattened document lists every node at the top level of `@graph`,
//! nested records included. Compaction moves each internal node (one whose
//! `@id` starts with the internal prefix) into every place it is referenced
//! from, leaving only externally addressable nodes at the top level.
//!
//! The transform is pure: the input document is never modified, and a
//! node referenced from several places is copied into each of them.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::GraphIntegrityError;
use crate::id::{is_internal, INTERNAL_PREFIX};

/// Options for compaction
#[derive(Debug, Clone)]
pub struct CompactOptions {
    /// Identifier prefix marking internal nodes
    pub internal_prefix: String,
}

impl Default for CompactOptions {
    fn default() -> Self {
        Self {
            internal_prefix: INTERNAL_PREFIX.to_string(),
        }
    }
}

/// Compact a `{"@graph": [...]}` document
///
/// Top-level keys other than `@graph` (such as `@context`) are kept as they
/// are. A document without `@graph` is returned unchanged.
pub fn compact(document: &Value, options: &CompactOptions) -> Result<Value, GraphIntegrityError> {
    let Some(doc) = document.as_object() else {
        return Err(GraphIntegrityError::NotANode(document.to_string()));
    };
    let Some(graph) = doc.get("@graph") else {
        return Ok(document.clone());
    };
    let Some(nodes) = graph.as_array() else {
        return Err(GraphIntegrityError::NotANode(graph.to_string()));
    };

    let mut out = doc.clone();
    out.insert("@graph".to_string(), Value::Array(compact_nodes(nodes, options)?));
    Ok(Value::Object(out))
}

/// Compact a list of graph nodes, returning the inlined root nodes
pub fn compact_nodes(nodes: &[Value], options: &CompactOptions) -> Result<Vec<Value>, GraphIntegrityError> {
    let mut internal: HashMap<&str, Map<String, Value>> = HashMap::new();
    let mut roots = Vec::new();

    for node in nodes {
        let Some(obj) = node.as_object() else {
            return Err(GraphIntegrityError::NotANode(node.to_string()));
        };
        match obj.get("@id").and_then(Value::as_str) {
            Some(id) if is_internal(id, &options.internal_prefix) => {
                let mut content = obj.clone();
                content.remove("@id");
                internal.insert(id, content);
            }
            Some(_) => roots.push(node),
            None => {
                tracing::debug!(node = %node, "dropping graph node without @id");
            }
        }
    }

    let inliner = Inliner {
        table: &internal,
        prefix: &options.internal_prefix,
    };
    let mut path = Vec::new();
    roots
        .into_iter()
        .map(|root| inliner.inline(root, &mut path))
        .collect()
}

struct Inliner<'a> {
    table: &'a HashMap<&'a str, Map<String, Value>>,
    prefix: &'a str,
}

impl Inliner<'_> {
    /// Rebuild `value` with every internal reference replaced by a copy of its node
    ///
    /// `path` holds the internal ids being inlined above this point; meeting
    /// one of them again means the references form a cycle.
    fn inline(&self, value: &Value, path: &mut Vec<String>) -> Result<Value, GraphIntegrityError> {
        match value {
            Value::Object(obj) => {
                if let Some(id) = obj.get("@id").and_then(Value::as_str) {
                    if is_internal(id, self.prefix) {
                        return self.resolve(id, path);
                    }
                }
                let mut out = Map::new();
                for (key, child) in obj {
                    out.insert(key.clone(), self.inline(child, path)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.inline(item, path))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn resolve(&self, id: &str, path: &mut Vec<String>) -> Result<Value, GraphIntegrityError> {
        let Some(content) = self.table.get(id) else {
            return Err(GraphIntegrityError::DanglingReference(id.to_string()));
        };
        if path.iter().any(|seen| seen == id) {
            return Err(GraphIntegrityError::Cycle(id.to_string()));
        }

        path.push(id.to_string());
        let mut out = Map::new();
        for (key, child) in content {
            match self.inline(child, path) {
                Ok(inlined) => {
                    out.insert(key.clone(), inlined);
                }
                Err(e) => {
                    path.pop();
                    return Err(e);
                }
            }
        }
        path.pop();
        Ok(Value::Object(out))
    }
}
