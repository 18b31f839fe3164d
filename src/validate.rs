//! Aggregated validation and coercion of flat records
//!
//! [`coerce_record`] walks a [`RecordSpec`] over an untyped JSON value,
//! coercing scalars the lenient way (numeric strings become numbers,
//! timestamps are normalized to RFC 3339 UTC) and collecting every
//! violation with its field path. Record rules run once a record's own
//! fields are clean.

use std::fmt::Write as _;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use serde_json::{json, Map, Number, Value};

use crate::coverage::format_number;
use crate::error::{ValidationError, Violation};
use crate::schema::{Cardinality, CompositeSpec, Constraints, FieldKind, FieldSpec, RecordSpec, Scalar};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+$")
        .expect("email pattern is valid")
});

#[derive(Debug, Clone)]
enum Segment {
    Field(String),
    Index(usize),
}

/// Collects violations while tracking the current field path
#[derive(Debug, Default)]
pub struct Validator {
    path: Vec<Segment>,
    violations: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current path, e.g. `creators[1].email`
    pub fn path(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            match segment {
                Segment::Field(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                Segment::Index(i) => {
                    let _ = write!(out, "[{}]", i);
                }
            }
        }
        out
    }

    /// Record a violation at the current path
    pub fn report(&mut self, message: impl Into<String>) {
        self.violations.push(Violation {
            path: self.path(),
            message: message.into(),
        });
    }

    /// Record a violation at `field` below the current path
    pub fn report_field(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        self.field(field, |v| v.report(message));
    }

    pub fn field<T>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        self.path.push(Segment::Field(name.to_string()));
        let result = f(self);
        self.path.pop();
        result
    }

    pub fn index<T>(&mut self, index: usize, f: impl FnOnce(&mut Self) -> T) -> T {
        self.path.push(Segment::Index(index));
        let result = f(self);
        self.path.pop();
        result
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Turn the collected violations into a result for a record titled `title`
    pub fn finish(self, title: &str) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                title: title.to_string(),
                violations: self.violations,
            })
        }
    }
}

/// Validate `value` against `spec`, returning the coerced record
pub fn coerce_record(value: &Value, spec: &RecordSpec) -> Result<Map<String, Value>, ValidationError> {
    let mut validator = Validator::new();
    let record = coerce_into(value, spec, &mut validator);
    validator.finish(spec.title)?;
    Ok(record)
}

/// Coerce `value` against `spec`, reporting into an existing validator
///
/// Unknown keys are dropped. The returned map is only meaningful if the
/// validator stayed clean.
pub fn coerce_into(value: &Value, spec: &RecordSpec, v: &mut Validator) -> Map<String, Value> {
    let Some(input) = value.as_object() else {
        v.report("value is not a valid dict");
        return Map::new();
    };

    let before = v.violations.len();
    let mut out = Map::new();
    for field in spec.fields {
        let raw = input.get(field.name).filter(|value| !value.is_null());
        v.field(field.name, |v| {
            if let Some(coerced) = coerce_field(field, raw, v) {
                out.insert(field.name.to_string(), coerced);
            }
        });
    }

    if v.violations.len() == before {
        for rule in spec.rules {
            rule(&out, v);
        }
    }
    out
}

fn coerce_field(field: &FieldSpec, raw: Option<&Value>, v: &mut Validator) -> Option<Value> {
    if let FieldKind::Class { value, .. } | FieldKind::Discriminator { value } = field.kind {
        return match raw {
            None => Some(json!(value)),
            Some(Value::String(s)) if s == value => Some(json!(value)),
            Some(_) => {
                v.report(format!("unexpected value; permitted: '{}'", value));
                None
            }
        };
    }

    let Some(raw) = raw else {
        if matches!(field.cardinality, Cardinality::Required | Cardinality::AtLeastOne) {
            v.report("field required");
        }
        return None;
    };

    if field.cardinality.is_list() {
        let Some(items) = raw.as_array() else {
            v.report("value is not a valid list");
            return None;
        };
        if items.is_empty() && field.cardinality == Cardinality::AtLeastOne {
            v.report("list must contain at least one entry");
            return None;
        }
        let coerced = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| v.index(i, |v| coerce_one(field, item, v)))
            .collect();
        return Some(Value::Array(coerced));
    }

    coerce_one(field, raw, v)
}

fn coerce_one(field: &FieldSpec, value: &Value, v: &mut Validator) -> Option<Value> {
    match field.kind {
        FieldKind::Subject => coerce_scalar(Scalar::Url, &field.constraints, value, v),
        FieldKind::Class { .. } | FieldKind::Discriminator { .. } => Some(value.clone()),
        FieldKind::Plain { scalar, .. }
        | FieldKind::Wrapped { scalar, .. }
        | FieldKind::Typed { scalar, .. } => coerce_scalar(scalar, &field.constraints, value, v),
        FieldKind::Nested { record, .. } => {
            if !value.is_object() {
                v.report("value is not a valid dict");
                return None;
            }
            Some(Value::Object(coerce_into(value, record, v)))
        }
        FieldKind::Composite { union, .. } => coerce_composite(union, value, v),
        FieldKind::Dictionary { .. } => normalize_dictionary(value, v).map(Value::Object),
        FieldKind::Identifiers { .. } => coerce_identifiers(value, v),
        FieldKind::Relations { types, .. } => coerce_relation(types, value, v),
    }
}

fn coerce_composite(union: &CompositeSpec, value: &Value, v: &mut Validator) -> Option<Value> {
    let Some(obj) = value.as_object() else {
        v.report("value is not a valid dict");
        return None;
    };

    let tag = if let [only] = union.variants {
        only.tag
    } else {
        match obj.get("type") {
            Some(Value::String(tag)) => tag.as_str(),
            Some(_) | None => match union.infer {
                Some(infer) if !obj.contains_key("type") => infer(obj),
                _ => {
                    v.report_field("type", permitted(&union.tags()));
                    return None;
                }
            },
        }
    };

    let Some(variant) = union.by_tag(tag) else {
        v.report_field("type", permitted(&union.tags()));
        return None;
    };
    let mut record = obj.clone();
    record.insert("type".to_string(), json!(variant.tag));
    Some(Value::Object(coerce_into(&Value::Object(record), variant.record, v)))
}

fn permitted(values: &[&str]) -> String {
    let quoted: Vec<String> = values.iter().map(|s| format!("'{}'", s)).collect();
    format!("unexpected value; permitted: {}", quoted.join(", "))
}

/// Accept a dictionary either as an object or as a list of `{key, value}` entries
pub fn normalize_dictionary(value: &Value, v: &mut Validator) -> Option<Map<String, Value>> {
    let mut out = Map::new();
    match value {
        Value::Object(map) => {
            for (key, entry) in map {
                match stringify(entry) {
                    Some(s) => {
                        out.insert(key.clone(), Value::String(s));
                    }
                    None => v.report_field(key, "str type expected"),
                }
            }
        }
        Value::Array(entries) => {
            for (i, entry) in entries.iter().enumerate() {
                v.index(i, |v| {
                    let Some(obj) = entry.as_object() else {
                        v.report(format!("List entry {} must be a dict", entry));
                        return;
                    };
                    let Some(key) = obj.get("key") else {
                        v.report(format!("Missing the 'key' key in {}", entry));
                        return;
                    };
                    let Some(val) = obj.get("value") else {
                        v.report(format!("Missing the 'value' key in {}", entry));
                        return;
                    };
                    let (Some(key), Some(val)) = (stringify(key), stringify(val)) else {
                        v.report("str type expected");
                        return;
                    };
                    if out.contains_key(&key) {
                        v.report(format!("Found a duplicate key {}", key));
                        return;
                    }
                    out.insert(key, Value::String(val));
                });
            }
        }
        _ => {
            v.report("value must be a dict or a list of key/value entries");
            return None;
        }
    }
    Some(out)
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_identifiers(value: &Value, v: &mut Validator) -> Option<Value> {
    let Some(map) = value.as_object() else {
        v.report("value is not a valid dict");
        return None;
    };
    let mut out = Map::new();
    for (key, url) in map {
        if let Some(url) = v.field(key, |v| coerce_scalar(Scalar::Url, &Constraints::default(), url, v)) {
            out.insert(key.clone(), url);
        }
    }
    Some(Value::Object(out))
}

fn coerce_relation(types: &[(&str, &str)], value: &Value, v: &mut Validator) -> Option<Value> {
    let Some(obj) = value.as_object() else {
        v.report("value is not a valid dict");
        return None;
    };
    let names: Vec<&str> = types.iter().map(|(name, _)| *name).collect();
    let mut out = Map::new();

    v.field("type", |v| match obj.get("type") {
        Some(Value::String(t)) if names.iter().any(|name| name == t) => {
            out.insert("type".to_string(), json!(t));
        }
        Some(_) => v.report(permitted(&names)),
        None => v.report("field required"),
    });

    let value_limit = Constraints {
        max_length: Some(500),
        ..Constraints::default()
    };
    v.field("value", |v| match obj.get("value").filter(|x| !x.is_null()) {
        Some(val) => {
            if let Some(s) = coerce_scalar(Scalar::String, &value_limit, val, v) {
                out.insert("value".to_string(), s);
            }
        }
        None => v.report("field required"),
    });

    Some(Value::Object(out))
}

/// Coerce one scalar value, checking its constraints
pub fn coerce_scalar(
    scalar: Scalar,
    constraints: &Constraints,
    value: &Value,
    v: &mut Validator,
) -> Option<Value> {
    match scalar {
        Scalar::String => {
            let Some(s) = stringify(value) else {
                v.report("str type expected");
                return None;
            };
            check_length(&s, constraints, v)?;
            Some(Value::String(s))
        }
        Scalar::Integer | Scalar::PositiveInteger => {
            let Some(n) = as_integer(value) else {
                v.report("value is not a valid integer");
                return None;
            };
            if scalar == Scalar::PositiveInteger && n <= 0 {
                v.report("ensure this value is greater than 0");
                return None;
            }
            check_bounds(n as f64, constraints, v)?;
            Some(json!(n))
        }
        Scalar::Number => {
            let Some(f) = as_number(value) else {
                v.report("value is not a valid float");
                return None;
            };
            check_bounds(f, constraints, v)?;
            Number::from_f64(f).map(Value::Number)
        }
        Scalar::Boolean => match as_bool(value) {
            Some(b) => Some(Value::Bool(b)),
            None => {
                v.report("value could not be parsed to a boolean");
                None
            }
        },
        Scalar::DateTime => {
            let parsed = value.as_str().and_then(parse_datetime);
            match parsed {
                Some(dt) => Some(Value::String(format_datetime(&dt))),
                None => {
                    v.report("invalid datetime format");
                    None
                }
            }
        }
        Scalar::Url => {
            let Some(s) = value.as_str() else {
                v.report("str type expected");
                return None;
            };
            if url::Url::parse(s).is_err() {
                v.report("invalid or missing URL scheme");
                return None;
            }
            check_length(s, constraints, v)?;
            Some(Value::String(s.to_string()))
        }
        Scalar::Email => {
            let Some(s) = value.as_str() else {
                v.report("str type expected");
                return None;
            };
            if !EMAIL.is_match(s) {
                v.report("value is not a valid email address");
                return None;
            }
            Some(Value::String(s.to_string()))
        }
        Scalar::Enum(values) => match value.as_str() {
            Some(s) if values.iter().any(|allowed| *allowed == s) => Some(Value::String(s.to_string())),
            _ => {
                v.report(permitted(values));
                None
            }
        },
    }
}

fn check_length(s: &str, constraints: &Constraints, v: &mut Validator) -> Option<()> {
    if let Some(max) = constraints.max_length {
        if s.chars().count() > max {
            v.report(format!("ensure this value has at most {} characters", max));
            return None;
        }
    }
    Some(())
}

fn check_bounds(f: f64, constraints: &Constraints, v: &mut Validator) -> Option<()> {
    if let Some(min) = constraints.exclusive_min {
        if f <= min {
            v.report(format!("ensure this value is greater than {}", format_number(min)));
            return None;
        }
    }
    if let Some(max) = constraints.exclusive_max {
        if f >= max {
            v.report(format!("ensure this value is less than {}", format_number(max)));
            return None;
        }
    }
    Some(())
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Parse an RFC 3339 timestamp, a naive timestamp (taken as UTC) or a bare date
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Canonical timestamp form: `YYYY-MM-DDTHH:MM:SSZ`, fractional seconds only when present
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
