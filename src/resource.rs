//! Resource-level metadata

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregations::{language_is_code, subjects_not_blank, EXTENDED_METADATA};
use crate::fields::{
    AwardInfo, Contributor, Creator, PeriodCoverage, Publisher, Relation, Rights, SpatialCoverage, AWARD_INFO,
    CONTRIBUTOR, CREATOR, PUBLISHER, RELATION_TYPES, RIGHTS, SPATIAL_COVERAGE, TEMPORAL_COVERAGE,
};
use crate::id::resource_id_from_iri;
use crate::record::MetadataRecord;
use crate::schema::{FieldKind, FieldSpec, RecordSpec, Scalar};
use crate::vocab::{dc, dcterms, hsterms};

/// Type tag of a resource; only composite resources are modeled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResourceType {
    #[default]
    CompositeResource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    #[serde(rename = "type", default)]
    pub resource_type: ResourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub subjects: Vec<String>,
    pub creators: Vec<Creator>,
    #[serde(default)]
    pub contributors: Vec<Contributor>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub additional_metadata: BTreeMap<String, String>,
    #[serde(default = "Rights::cc_by")]
    pub rights: Rights,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    #[serde(default)]
    pub awards: Vec<AwardInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatial_coverage: Option<SpatialCoverage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_coverage: Option<PeriodCoverage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<Publisher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
}

fn default_language() -> String {
    "eng".to_string()
}

pub static RESOURCE: RecordSpec = RecordSpec {
    name: "ResourceMetadata",
    title: "Resource Metadata",
    fields: &[
        FieldSpec::new(
            "type",
            FieldKind::Class {
                iri: hsterms!("CompositeResource"),
                value: "CompositeResource",
            },
        )
        .title("Resource Type")
        .read_only(),
        FieldSpec::new("url", FieldKind::Subject).title("URL").read_only(),
        FieldSpec::new(
            "identifier",
            FieldKind::Wrapped {
                predicate: dc!("identifier"),
                inner: hsterms!("hydroShareIdentifier"),
                scalar: Scalar::Url,
            },
        )
        .title("Identifier")
        .read_only(),
        FieldSpec::plain("title", dc!("title"), Scalar::String)
            .title("Title")
            .max_length(300)
            .required(),
        FieldSpec::new(
            "abstract",
            FieldKind::Wrapped {
                predicate: dc!("description"),
                inner: dcterms!("abstract"),
                scalar: Scalar::String,
            },
        )
        .title("Abstract"),
        FieldSpec::plain("language", dc!("language"), Scalar::String).title("Language"),
        FieldSpec::plain("subjects", dc!("subject"), Scalar::String)
            .title("Subject keywords")
            .many(),
        FieldSpec::nested("creators", dc!("creator"), &CREATOR)
            .title("Creators")
            .at_least_one(),
        FieldSpec::nested("contributors", dc!("contributor"), &CONTRIBUTOR)
            .title("Contributors")
            .many(),
        FieldSpec::new(
            "sources",
            FieldKind::Wrapped {
                predicate: dc!("source"),
                inner: hsterms!("isDerivedFrom"),
                scalar: Scalar::String,
            },
        )
        .title("Sources")
        .many(),
        FieldSpec::new(
            "relations",
            FieldKind::Relations {
                predicate: dc!("relation"),
                types: RELATION_TYPES,
            },
        )
        .title("Related resources")
        .many(),
        FieldSpec::new("additional_metadata", EXTENDED_METADATA).title("Additional metadata"),
        FieldSpec::nested("rights", dc!("rights"), &RIGHTS).title("Rights"),
        FieldSpec::new(
            "created",
            FieldKind::Typed {
                predicate: dc!("date"),
                class: dcterms!("created"),
                scalar: Scalar::DateTime,
            },
        )
        .title("Creation date")
        .read_only(),
        FieldSpec::new(
            "modified",
            FieldKind::Typed {
                predicate: dc!("date"),
                class: dcterms!("modified"),
                scalar: Scalar::DateTime,
            },
        )
        .title("Modified date")
        .read_only(),
        FieldSpec::new(
            "published",
            FieldKind::Typed {
                predicate: dc!("date"),
                class: dcterms!("published"),
                scalar: Scalar::DateTime,
            },
        )
        .title("Published date")
        .read_only(),
        FieldSpec::nested("awards", hsterms!("awardInfo"), &AWARD_INFO)
            .title("Funding agency information")
            .many(),
        FieldSpec::new(
            "spatial_coverage",
            FieldKind::Composite {
                predicate: dc!("coverage"),
                union: &SPATIAL_COVERAGE,
            },
        )
        .title("Spatial coverage"),
        FieldSpec::new(
            "period_coverage",
            FieldKind::Composite {
                predicate: dc!("coverage"),
                union: &TEMPORAL_COVERAGE,
            },
        )
        .title("Temporal coverage"),
        FieldSpec::nested("publisher", dc!("publisher"), &PUBLISHER)
            .title("Publisher")
            .read_only(),
        FieldSpec::plain("citation", dcterms!("bibliographicCitation"), Scalar::String)
            .title("Citation")
            .read_only(),
    ],
    rules: &[language_is_code, subjects_not_blank],
};

impl MetadataRecord for ResourceMetadata {
    fn spec() -> &'static RecordSpec {
        &RESOURCE
    }
}

impl ResourceMetadata {
    /// A resource with a title and its first creator; everything else defaulted
    pub fn new(title: impl Into<String>, creator: Creator) -> Self {
        Self {
            resource_type: ResourceType::CompositeResource,
            url: None,
            identifier: None,
            title: title.into(),
            abstract_text: None,
            language: default_language(),
            subjects: Vec::new(),
            creators: vec![creator],
            contributors: Vec::new(),
            sources: Vec::new(),
            relations: Vec::new(),
            additional_metadata: BTreeMap::new(),
            rights: Rights::cc_by(),
            created: None,
            modified: None,
            published: None,
            awards: Vec::new(),
            spatial_coverage: None,
            period_coverage: None,
            publisher: None,
            citation: None,
        }
    }

    /// Resource id parsed from the landing page URL
    pub fn resource_id(&self) -> Option<&str> {
        self.url.as_deref().and_then(resource_id_from_iri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetadataError;
    use crate::fields::RelationType;
    use crate::graph::Subject;
    use serde_json::json;

    fn resource_json() -> serde_json::Value {
        json!({
            "type": "CompositeResource",
            "url": "http://www.hydroshare.org/resource/1248abc1afc6454199e65c8f642b99a0",
            "identifier": "http://www.hydroshare.org/resource/1248abc1afc6454199e65c8f642b99a0",
            "title": "Logan River stream gauges",
            "abstract": "Discharge records for the Logan River.",
            "subjects": ["streamflow", "Logan River"],
            "creators": [
                {
                    "name": "Doe, Jane",
                    "email": "jane@example.org",
                    "creator_order": 1,
                    "identifiers": {"ORCID": "https://orcid.org/0000-0001-2345-6789", "Scopus": "https://scopus.com/a/1"}
                },
                {"organization": "Utah Water Research Laboratory", "creator_order": 2}
            ],
            "sources": ["USGS NWIS"],
            "relations": [{"type": "isPartOf", "value": "Logan River Observatory"}],
            "additional_metadata": {"station": "10109000"},
            "rights": {"statement": "CC BY", "url": "http://creativecommons.org/licenses/by/4.0/"},
            "created": "2021-01-05T16:00:00Z",
            "modified": "2021-02-05T16:00:00.123456Z",
            "awards": [{"funding_agency_name": "NSF", "number": "1234"}],
            "spatial_coverage": {"type": "point", "north": 41.74, "east": -111.79, "units": "Decimal degrees", "projection": "WGS 84 EPSG:4326"},
            "period_coverage": {"start": "2000-01-01", "end": "2020-12-31"},
            "citation": "Doe, J. (2021). Logan River stream gauges, HydroShare"
        })
    }

    #[test]
    fn test_resource_round_trip() {
        let resource = ResourceMetadata::from_json(&resource_json()).unwrap();
        assert_eq!(resource.resource_id(), Some("1248abc1afc6454199e65c8f642b99a0"));
        assert_eq!(resource.creators[0].identifiers.len(), 2);
        assert_eq!(resource.relations[0].relation_type, RelationType::IsPartOf);

        let graph = resource.to_graph().unwrap();
        let back = ResourceMetadata::from_graph_root(&graph).unwrap();
        assert_eq!(back, resource);
    }

    #[test]
    fn test_dates_share_a_predicate() {
        let resource = ResourceMetadata::from_json(&resource_json()).unwrap();
        let graph = resource.to_graph().unwrap();
        let root = Subject::iri(resource.url.clone().unwrap());
        assert_eq!(graph.objects(&root, dc!("date")).count(), 2);

        let back = ResourceMetadata::from_graph(&graph, &root).unwrap();
        assert_eq!(back.created, resource.created);
        assert_eq!(back.modified, resource.modified);
        assert!(back.published.is_none());
    }

    #[test]
    fn test_creators_may_not_be_empty() {
        let mut input = resource_json();
        input["creators"] = json!([]);
        let err = ResourceMetadata::from_json(&input).unwrap_err();
        let MetadataError::Validation(err) = err else {
            panic!("expected a validation error");
        };
        assert_eq!(err.at("creators").unwrap().message, "list must contain at least one entry");
    }

    #[test]
    fn test_untrusted_input_drops_system_fields() {
        let resource = ResourceMetadata::from_untrusted_json(&resource_json()).unwrap();
        assert!(resource.url.is_none());
        assert!(resource.created.is_none());
        assert!(resource.citation.is_none());
        assert_eq!(resource.title, "Logan River stream gauges");
        assert!(resource.creators[0].hydroshare_user_id.is_none());
    }

    #[test]
    fn test_errors_carry_nested_paths() {
        let mut input = resource_json();
        input["creators"][1]["email"] = json!("not an email");
        input["relations"][0]["type"] = json!("isFriendOf");
        let err = ResourceMetadata::from_json(&input).unwrap_err();
        let MetadataError::Validation(err) = err else {
            panic!("expected a validation error");
        };
        assert_eq!(err.violations.len(), 2);
        assert!(err.at("creators[1].email").is_some());
        assert!(err.at("relations[0].type").unwrap().message.starts_with("unexpected value"));
    }

    #[test]
    fn test_wire_json_lists_additional_metadata() {
        let resource = ResourceMetadata::from_json(&resource_json()).unwrap();
        let wire = resource.to_json().unwrap();
        assert_eq!(wire["additional_metadata"], json!([{"key": "station", "value": "10109000"}]));
        assert_eq!(wire["period_coverage"]["start"], "2000-01-01T00:00:00Z");
        assert!(wire.get("published").is_none());
    }

    #[test]
    fn test_new_resource_defaults() {
        let resource = ResourceMetadata::new(
            "A resource",
            Creator {
                name: Some("Doe, Jane".to_string()),
                ..Creator::default()
            },
        );
        assert_eq!(resource.rights, Rights::cc_by());
        assert!(resource.resource_id().is_none());
        let back = ResourceMetadata::from_json(&resource.to_json().unwrap()).unwrap();
        assert_eq!(back, resource);
    }

    #[test]
    fn test_graph_extended_metadata_is_checked() {
        use crate::graph::{GraphRecord, GraphValue, Literal};
        use crate::vocab::{HSTERMS_KEY, HSTERMS_VALUE};

        let entry = |key: &str, value: Option<&str>| {
            let mut node = GraphRecord::blank();
            node.push(HSTERMS_KEY, GraphValue::Literal(Literal::plain(key)));
            if let Some(value) = value {
                node.push(HSTERMS_VALUE, GraphValue::Literal(Literal::plain(value)));
            }
            GraphValue::Node(node)
        };
        let resource = ResourceMetadata::from_json(&resource_json()).unwrap();

        let mut node = resource.to_graph_record().unwrap();
        node.push(hsterms!("extendedMetadata"), entry("station", Some("2")));
        let err = ResourceMetadata::from_graph_record(&node).unwrap_err();
        assert!(matches!(err, MetadataError::Validation(ref e) if e.mentions("Found a duplicate key station")));

        let mut node = resource.to_graph_record().unwrap();
        node.push(hsterms!("extendedMetadata"), entry("gauge", None));
        let err = ResourceMetadata::from_graph_record(&node).unwrap_err();
        assert!(matches!(err, MetadataError::Validation(ref e) if e.mentions("Missing the 'value' key")));
    }
}
