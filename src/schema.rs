//! Declarative record descriptions and schema export
//!
//! Each record type publishes a static [`RecordSpec`]: its fields, their
//! value kinds and constraints, which fields are read-only, and how each
//! field maps onto the graph. The validator, the graph mapper and the schema
//! exporter are all driven by these tables.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use serde_json::{json, Map, Value};

use crate::validate::Validator;

/// Cross-field rule, run on a record after its fields have been coerced
pub type Rule = fn(&Map<String, Value>, &mut Validator);

/// Picks a discriminator for an untagged composite value
pub type TagInference = fn(&Map<String, Value>) -> &'static str;

#[derive(Debug)]
pub struct RecordSpec {
    /// Type name, used for schema definitions
    pub name: &'static str,
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
    pub rules: &'static [Rule],
}

impl RecordSpec {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn read_only_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter(|f| f.read_only).map(|f| f.name)
    }

    pub fn dictionary_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::Dictionary { .. }))
            .map(|f| f.name)
    }

    /// The `(class IRI, flat value)` pair, for record types that carry one
    pub fn class(&self) -> Option<(&'static str, &'static str)> {
        self.fields.iter().find_map(|f| match f.kind {
            FieldKind::Class { iri, value } => Some((iri, value)),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Optional,
    Required,
    /// Zero or more values, serialized as a list
    Many,
    /// One or more values; an empty list is a validation failure
    AtLeastOne,
}

impl Cardinality {
    pub fn is_list(self) -> bool {
        matches!(self, Cardinality::Many | Cardinality::AtLeastOne)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    String,
    Integer,
    PositiveInteger,
    Number,
    Boolean,
    DateTime,
    Url,
    Email,
    Enum(&'static [&'static str]),
}

/// How a field is represented on the graph side
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Taken from the record's subject IRI
    Subject,
    /// Fixed type tag: `value` on the flat side, `rdf:type <iri>` on the graph
    Class {
        iri: &'static str,
        value: &'static str,
    },
    /// Fixed union tag of a composite variant; never written to the graph
    Discriminator { value: &'static str },
    /// One literal or IRI per value
    Plain {
        predicate: &'static str,
        scalar: Scalar,
    },
    /// A nested record on its own blank node
    Nested {
        predicate: &'static str,
        record: &'static RecordSpec,
    },
    /// A tagged union encoded as `key=value; ...` under `rdf:value`
    Composite {
        predicate: &'static str,
        union: &'static CompositeSpec,
    },
    /// A string map written as `{key, value}` nodes
    Dictionary {
        predicate: &'static str,
        key: &'static str,
        value: &'static str,
    },
    /// A map of identifier type to URL, one predicate per known type
    Identifiers {
        known: &'static [(&'static str, &'static str)],
        /// Predicate for `{key, value}` nodes holding unknown types
        other: &'static str,
    },
    /// A value wrapped in a node with a single identifying predicate
    Wrapped {
        predicate: &'static str,
        inner: &'static str,
        scalar: Scalar,
    },
    /// A value on a node typed with `class`, under `rdf:value`
    Typed {
        predicate: &'static str,
        class: &'static str,
        scalar: Scalar,
    },
    /// `{type, value}` entries, each a node with one predicate per type
    Relations {
        predicate: &'static str,
        types: &'static [(&'static str, &'static str)],
    },
}

#[derive(Debug)]
pub struct CompositeSpec {
    pub name: &'static str,
    pub variants: &'static [CompositeVariant],
    /// Fallback for input that omits the discriminator
    pub infer: Option<TagInference>,
}

impl CompositeSpec {
    pub fn by_tag(&self, tag: &str) -> Option<&CompositeVariant> {
        self.variants.iter().find(|v| v.tag == tag)
    }

    pub fn by_class(&self, class: &str) -> Option<&CompositeVariant> {
        self.variants.iter().find(|v| v.class == class)
    }

    pub fn tags(&self) -> Vec<&'static str> {
        self.variants.iter().map(|v| v.tag).collect()
    }
}

#[derive(Debug)]
pub struct CompositeVariant {
    pub tag: &'static str,
    /// Class IRI carried by the encoded node
    pub class: &'static str,
    pub record: &'static RecordSpec,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Constraints {
    pub max_length: Option<usize>,
    pub exclusive_min: Option<f64>,
    pub exclusive_max: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub title: &'static str,
    pub kind: FieldKind,
    pub cardinality: Cardinality,
    pub read_only: bool,
    pub constraints: Constraints,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            title: "",
            kind,
            cardinality: Cardinality::Optional,
            read_only: false,
            constraints: Constraints {
                max_length: None,
                exclusive_min: None,
                exclusive_max: None,
            },
        }
    }

    pub const fn plain(name: &'static str, predicate: &'static str, scalar: Scalar) -> Self {
        Self::new(name, FieldKind::Plain { predicate, scalar })
    }

    pub const fn nested(
        name: &'static str,
        predicate: &'static str,
        record: &'static RecordSpec,
    ) -> Self {
        Self::new(name, FieldKind::Nested { predicate, record })
    }

    pub const fn title(mut self, title: &'static str) -> Self {
        self.title = title;
        self
    }

    pub const fn required(mut self) -> Self {
        self.cardinality = Cardinality::Required;
        self
    }

    pub const fn many(mut self) -> Self {
        self.cardinality = Cardinality::Many;
        self
    }

    pub const fn at_least_one(mut self) -> Self {
        self.cardinality = Cardinality::AtLeastOne;
        self
    }

    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub const fn max_length(mut self, max: usize) -> Self {
        self.constraints.max_length = Some(max);
        self
    }

    /// Value must lie strictly between `min` and `max`
    pub const fn between(mut self, min: f64, max: f64) -> Self {
        self.constraints.exclusive_min = Some(min);
        self.constraints.exclusive_max = Some(max);
        self
    }

    /// Predicate this field is written under, if any
    pub fn predicate(&self) -> Option<&'static str> {
        match self.kind {
            FieldKind::Subject | FieldKind::Discriminator { .. } | FieldKind::Identifiers { .. } => {
                None
            }
            FieldKind::Class { .. } => Some(crate::vocab::RDF_TYPE),
            FieldKind::Plain { predicate, .. }
            | FieldKind::Nested { predicate, .. }
            | FieldKind::Composite { predicate, .. }
            | FieldKind::Dictionary { predicate, .. }
            | FieldKind::Wrapped { predicate, .. }
            | FieldKind::Typed { predicate, .. }
            | FieldKind::Relations { predicate, .. } => Some(predicate),
        }
    }
}

/// Options that change the exported schema
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaOptions {
    /// Template for `$ref` values; `{model}` is replaced by the type name
    pub ref_template: String,
    /// Annotate each property with its predicate IRI
    pub include_predicates: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            ref_template: "#/definitions/{model}".to_string(),
            include_predicates: false,
        }
    }
}

type SchemaCache = Mutex<HashMap<(&'static str, SchemaOptions), Arc<Value>>>;

static SCHEMA_CACHE: OnceLock<SchemaCache> = OnceLock::new();

/// Export the schema of a record type, memoized per (type, options)
pub fn json_schema(spec: &'static RecordSpec, options: &SchemaOptions) -> Arc<Value> {
    let cache = SCHEMA_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let key = (spec.name, options.clone());
    if let Ok(guard) = cache.lock() {
        if let Some(hit) = guard.get(&key) {
            return Arc::clone(hit);
        }
    }

    let schema = Arc::new(build_schema(spec, options));
    // a poisoned lock only means another thread panicked mid-insert; the
    // freshly built schema is still valid, so skip caching it
    if let Ok(mut guard) = cache.lock() {
        guard.entry(key).or_insert_with(|| Arc::clone(&schema));
    }
    schema
}

fn build_schema(spec: &'static RecordSpec, options: &SchemaOptions) -> Value {
    let mut definitions = Map::new();
    let mut schema = record_schema(spec, options, &mut definitions);
    if !definitions.is_empty() {
        if let Some(obj) = schema.as_object_mut() {
            obj.insert("definitions".to_string(), Value::Object(definitions));
        }
    }
    schema
}

fn reference(name: &str, options: &SchemaOptions) -> Value {
    json!({ "$ref": options.ref_template.replace("{model}", name) })
}

fn define(spec: &'static RecordSpec, options: &SchemaOptions, definitions: &mut Map<String, Value>) -> Value {
    if !definitions.contains_key(spec.name) {
        // placeholder first so self-referencing specs terminate
        definitions.insert(spec.name.to_string(), Value::Null);
        let body = record_schema(spec, options, definitions);
        definitions.insert(spec.name.to_string(), body);
    }
    reference(spec.name, options)
}

fn record_schema(
    spec: &'static RecordSpec,
    options: &SchemaOptions,
    definitions: &mut Map<String, Value>,
) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in spec.fields {
        let mut item = field_schema(field, options, definitions);
        if field.cardinality.is_list() {
            let mut list = json!({ "type": "array", "items": item });
            if field.cardinality == Cardinality::AtLeastOne {
                list["minItems"] = json!(1);
            }
            item = list;
        }

        if let Some(obj) = item.as_object_mut() {
            if !field.title.is_empty() {
                obj.insert("title".to_string(), json!(field.title));
            }
            if field.read_only {
                obj.insert("readOnly".to_string(), json!(true));
            }
            if options.include_predicates {
                if let Some(predicate) = field.predicate() {
                    obj.insert("predicate".to_string(), json!(predicate));
                }
            }
        }

        if matches!(field.cardinality, Cardinality::Required | Cardinality::AtLeastOne) {
            required.push(json!(field.name));
        }
        properties.insert(field.name.to_string(), item);
    }

    let mut schema = json!({
        "title": spec.title,
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        schema["required"] = Value::Array(required);
    }
    schema
}

fn field_schema(field: &FieldSpec, options: &SchemaOptions, definitions: &mut Map<String, Value>) -> Value {
    match field.kind {
        FieldKind::Subject => json!({ "type": "string", "format": "uri" }),
        FieldKind::Class { value, .. } | FieldKind::Discriminator { value } => {
            json!({ "type": "string", "const": value, "default": value })
        }
        FieldKind::Plain { scalar, .. }
        | FieldKind::Wrapped { scalar, .. }
        | FieldKind::Typed { scalar, .. } => scalar_schema(scalar, &field.constraints),
        FieldKind::Nested { record, .. } => define(record, options, definitions),
        FieldKind::Composite { union, .. } => {
            let variants: Vec<Value> = union
                .variants
                .iter()
                .map(|v| define(v.record, options, definitions))
                .collect();
            json!({ "anyOf": variants })
        }
        FieldKind::Dictionary { .. } => {
            definitions
                .entry("AdditionalMetadata".to_string())
                .or_insert_with(|| {
                    json!({
                        "title": "Additional Metadata",
                        "type": "object",
                        "properties": {
                            "key": { "title": "Key", "type": "string" },
                            "value": { "title": "Value", "type": "string" }
                        },
                        "required": ["key", "value"]
                    })
                });
            json!({ "type": "array", "items": reference("AdditionalMetadata", options) })
        }
        FieldKind::Identifiers { known, .. } => {
            let names: Vec<&str> = known.iter().map(|(name, _)| *name).collect();
            json!({
                "type": "object",
                "additionalProperties": { "type": "string", "format": "uri" },
                "knownKeys": names,
            })
        }
        FieldKind::Relations { types, .. } => {
            definitions.entry("Relation".to_string()).or_insert_with(|| {
                let names: Vec<&str> = types.iter().map(|(name, _)| *name).collect();
                json!({
                    "title": "Related Resource Metadata",
                    "type": "object",
                    "properties": {
                        "type": { "title": "Relation type", "enum": names },
                        "value": { "title": "Value", "type": "string", "maxLength": 500 }
                    },
                    "required": ["type", "value"]
                })
            });
            json!({ "type": "array", "items": reference("Relation", options) })
        }
    }
}

fn scalar_schema(scalar: Scalar, constraints: &Constraints) -> Value {
    let mut schema = match scalar {
        Scalar::String => json!({ "type": "string" }),
        Scalar::Integer => json!({ "type": "integer" }),
        Scalar::PositiveInteger => json!({ "type": "integer", "exclusiveMinimum": 0 }),
        Scalar::Number => json!({ "type": "number" }),
        Scalar::Boolean => json!({ "type": "boolean" }),
        Scalar::DateTime => json!({ "type": "string", "format": "date-time" }),
        Scalar::Url => json!({ "type": "string", "format": "uri" }),
        Scalar::Email => json!({ "type": "string", "format": "email" }),
        Scalar::Enum(values) => json!({ "type": "string", "enum": values }),
    };
    if let Some(max) = constraints.max_length {
        schema["maxLength"] = json!(max);
    }
    if let Some(min) = constraints.exclusive_min {
        schema["exclusiveMinimum"] = json!(min);
    }
    if let Some(max) = constraints.exclusive_max {
        schema["exclusiveMaximum"] = json!(max);
    }
    schema
}
