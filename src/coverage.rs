//! Composite `key=value; key=value` encoding
//!
//! Coverages and spatial references travel on the graph as a single string
//! under `rdf:value`, with the variant carried separately as the node's
//! `rdf:type`. Decoding is lenient: segments that are not `key=value` pairs
//! are skipped.

use serde_json::{Map, Value};

use crate::schema::{FieldKind, RecordSpec};

/// Separator between encoded segments
pub const SEGMENT_SEPARATOR: &str = "; ";

/// Parse an encoded string into a key/value map
///
/// Keys and values are trimmed. Each segment is split at its first `=`, so
/// values may themselves contain `=`. Values cannot contain `;` and lose
/// surrounding whitespace, so such values do not survive an encode/decode
/// round trip unchanged.
pub fn decode(encoded: &str) -> Map<String, Value> {
    let mut map = Map::new();
    for segment in encoded.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        match segment.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                map.insert(key.trim().to_string(), Value::String(value.trim().to_string()));
            }
            _ => {
                tracing::debug!(segment, "skipping malformed composite segment");
            }
        }
    }
    map
}

/// Encode the fields of `spec` found in `values`, in declaration order
///
/// The discriminator, nulls, empty strings and `false` are omitted; numeric
/// zero is kept.
pub fn encode(values: &Map<String, Value>, spec: &RecordSpec) -> String {
    let mut segments = Vec::new();
    for field in spec.fields {
        if matches!(field.kind, FieldKind::Discriminator { .. }) {
            continue;
        }
        let Some(value) = values.get(field.name) else {
            continue;
        };
        let text = match value {
            Value::Null | Value::Bool(false) => continue,
            Value::String(s) if s.is_empty() => continue,
            Value::String(s) => s.clone(),
            Value::Number(n) => match n.as_f64() {
                Some(f) if n.is_f64() => format_number(f),
                _ => n.to_string(),
            },
            other => other.to_string(),
        };
        segments.push(format!("{}={}", field.name, text));
    }
    segments.join(SEGMENT_SEPARATOR)
}

/// Print a float without a fractional part when it is integral
///
/// 10.0 -> "10", -20.5 -> "-20.5"
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, Scalar};
    use serde_json::json;

    static BOX: RecordSpec = RecordSpec {
        name: "Box",
        title: "Box",
        fields: &[
            FieldSpec::new("type", FieldKind::Discriminator { value: "box" }),
            FieldSpec::plain("name", "", Scalar::String),
            FieldSpec::plain("northlimit", "", Scalar::Number),
            FieldSpec::plain("eastlimit", "", Scalar::Number),
            FieldSpec::plain("southlimit", "", Scalar::Number),
            FieldSpec::plain("westlimit", "", Scalar::Number),
            FieldSpec::plain("units", "", Scalar::String),
            FieldSpec::plain("projection", "", Scalar::String),
        ],
        rules: &[],
    };

    #[test]
    fn test_encode_box() {
        let values = json!({
            "type": "box",
            "northlimit": 10.0,
            "southlimit": 0,
            "eastlimit": 20,
            "westlimit": -20.0,
            "units": "Decimal degrees",
            "projection": "WGS 84 EPSG:4326"
        });
        let encoded = encode(values.as_object().unwrap(), &BOX);
        assert_eq!(
            encoded,
            "northlimit=10; eastlimit=20; southlimit=0; westlimit=-20; units=Decimal degrees; projection=WGS 84 EPSG:4326"
        );
    }

    #[test]
    fn test_encode_skips_empty_values() {
        let values = json!({"name": "", "northlimit": null, "units": "m", "projection": false});
        assert_eq!(encode(values.as_object().unwrap(), &BOX), "units=m");
    }

    #[test]
    fn test_decode_trims_and_splits_on_first_equals() {
        let map = decode(" northlimit = 10 ;projection=EPSG=4326; units=Decimal degrees ");
        assert_eq!(map["northlimit"], "10");
        assert_eq!(map["projection"], "EPSG=4326");
        assert_eq!(map["units"], "Decimal degrees");
    }

    #[test]
    fn test_decode_skips_malformed_segments() {
        let map = decode("northlimit=10; garbage; =orphan; ; eastlimit=20");
        assert_eq!(map.len(), 2);
        assert_eq!(map["eastlimit"], "20");
    }

    #[test]
    fn test_semicolons_and_padding_are_lost() {
        let values = json!({"name": " Logan; upper reach ", "units": "m"});
        let encoded = encode(values.as_object().unwrap(), &BOX);
        assert_eq!(encoded, "name= Logan; upper reach ; units=m");

        let decoded = decode(&encoded);
        assert_eq!(decoded["name"], "Logan");
        assert_eq!(decoded["units"], "m");
        assert_eq!(decoded.len(), 2);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(-20.0), "-20");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-112.25), "-112.25");
    }
}
