//! End-to-end conversions: flat JSON -> RDF text -> records, and graph -> JSON-LD

use hsmeta::aggregations::GeographicRasterMetadata;
use hsmeta::fields::Creator;
use hsmeta::jsonld::{self, JsonLdOptions};
use hsmeta::syntax::{self, RdfFormat};
use hsmeta::{record_spec, MetadataRecord, ResourceMetadata};
use serde_json::{json, Value};

const DC_CREATOR: &str = "http://purl.org/dc/elements/1.1/creator";
const DC_TITLE: &str = "http://purl.org/dc/elements/1.1/title";

fn resource_json() -> Value {
    json!({
        "url": "http://www.hydroshare.org/resource/1248abc1afc6454199e65c8f642b99a0",
        "title": "Logan River stream gauges",
        "abstract": "Discharge records for the Logan River.",
        "subjects": ["streamflow", "Logan River"],
        "creators": [
            {
                "name": "Doe, Jane",
                "creator_order": 1,
                "identifiers": {"ORCID": "https://orcid.org/0000-0001-2345-6789", "Scopus": "https://scopus.com/a/1"}
            },
            {"organization": "Utah Water Research Laboratory", "creator_order": 2}
        ],
        "additional_metadata": {"station": "10109000"},
        "created": "2021-01-05T16:00:00Z",
        "spatial_coverage": {"type": "point", "north": 41.74, "east": -111.79, "units": "Decimal degrees", "projection": "WGS 84 EPSG:4326"},
        "period_coverage": {"start": "2000-01-01T00:00:00Z", "end": "2020-12-31T00:00:00Z"}
    })
}

fn assert_no_internal_ids(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(id) = map.get("@id").and_then(Value::as_str) {
                assert!(!id.starts_with("_:N"), "internal node left in output: {}", id);
            }
            map.values().for_each(assert_no_internal_ids);
        }
        Value::Array(items) => items.iter().for_each(assert_no_internal_ids),
        _ => {}
    }
}

#[test]
fn test_resource_survives_turtle() {
    let resource = ResourceMetadata::from_json(&resource_json()).unwrap();
    let text = syntax::write_string(&resource.to_graph().unwrap(), RdfFormat::Turtle).unwrap();

    let graph = syntax::parse(text.as_bytes(), RdfFormat::Turtle).unwrap();
    let back = ResourceMetadata::from_graph_root(&graph).unwrap();
    assert_eq!(back, resource);
    assert_eq!(back.creators[0].identifiers["Scopus"], "https://scopus.com/a/1");
}

#[test]
fn test_raster_survives_rdf_xml() {
    let input = json!({
        "url": "http://www.hydroshare.org/resource/abc123/data/contents/logan.tif",
        "title": "Logan river DEM",
        "subjects": ["dem"],
        "band_information": {"name": "Band_1"},
        "cell_information": {"name": "logan.vrt", "rows": 1660, "columns": 980}
    });
    let raster = GeographicRasterMetadata::from_json(&input).unwrap();
    let bytes = syntax::write(&raster.to_graph().unwrap(), RdfFormat::RdfXml).unwrap();
    assert_eq!(RdfFormat::sniff(&bytes), RdfFormat::RdfXml);

    let graph = syntax::parse(&bytes, RdfFormat::RdfXml).unwrap();
    assert_eq!(GeographicRasterMetadata::from_graph_root(&graph).unwrap(), raster);
}

#[test]
fn test_parsed_resource_compacts_to_one_node() {
    let resource = ResourceMetadata::from_json(&resource_json()).unwrap();
    let text = syntax::write(&resource.to_graph().unwrap(), RdfFormat::NTriples).unwrap();
    let graph = syntax::parse(&text, RdfFormat::NTriples).unwrap();

    let document = jsonld::to_jsonld(&graph, &JsonLdOptions::default()).unwrap();
    let nodes = document["@graph"].as_array().unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0]["@id"], "http://www.hydroshare.org/resource/1248abc1afc6454199e65c8f642b99a0");
    assert_eq!(nodes[0][DC_TITLE], "Logan River stream gauges");
    assert_eq!(nodes[0][DC_CREATOR].as_array().unwrap().len(), 2);
    assert_no_internal_ids(&document);
}

#[test]
fn test_pretty_jsonld_bytes() {
    let creator = Creator {
        name: Some("Doe, Jane".to_string()),
        ..Creator::default()
    };
    let mut resource = ResourceMetadata::new("Logan River", creator);
    resource.url = Some("http://www.hydroshare.org/resource/abc".to_string());
    let graph = resource.to_graph().unwrap();

    let bytes = jsonld::to_bytes(&graph, &JsonLdOptions::default()).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.starts_with("{\n  \"@graph\": [\n"));

    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["@graph"][0][DC_TITLE], "Logan River");
}

#[test]
fn test_untyped_conversion_by_name() {
    let spec = record_spec("resource").unwrap();
    let graph = hsmeta::record::graph_from_json(&resource_json(), spec).unwrap();
    let subject = hsmeta::record::find_root_subject(&graph, spec).unwrap();
    let record = hsmeta::record::json_from_graph(&graph, &subject, spec).unwrap();
    let wire = hsmeta::record::to_wire_json(&Value::Object(record), spec);

    assert_eq!(wire["title"], "Logan River stream gauges");
    assert_eq!(wire["additional_metadata"], json!([{"key": "station", "value": "10109000"}]));
    assert_eq!(wire["spatial_coverage"]["type"], "point");
}
