//! Metadata models for scientific dataset resources
//!
//! This library describes a resource and the aggregations inside it as
//! typed records, validates them, and converts them between three forms:
//!
//! 1. Flat JSON, the shape the typed structs serialize to
//! 2. An RDF graph, through the per-type [`RecordSpec`] that maps every
//!    field to a predicate
//! 3. Pretty JSON-LD, with internal blank nodes inlined into the nodes
//!    that reference them
//!
//! # Usage
//!
//! ```ignore
//! use hsmeta::{MetadataRecord, ResourceMetadata, JsonLdOptions};
//!
//! let resource = ResourceMetadata::from_json(&input)?;
//! let graph = resource.to_graph()?;
//! let bytes = hsmeta::jsonld::to_bytes(&graph, &JsonLdOptions::default())?;
//!
//! // and back again
//! let restored = ResourceMetadata::from_graph_root(&graph)?;
//! ```
//!
//! RDF text is read and written with [`syntax`], and documents can be
//! loaded from files, zip archives and URLs with [`loader`].

pub mod aggregations;
pub mod compact;
pub mod coverage;
pub mod error;
pub mod fields;
pub mod graph;
pub mod id;
pub mod jsonld;
pub mod loader;
pub mod mapper;
pub mod record;
pub mod resource;
pub mod schema;
pub mod syntax;
pub mod validate;
pub mod vocab;

pub use crate::aggregations::{AggregationMetadata, AggregationType};
pub use crate::compact::{compact, CompactOptions};
pub use crate::error::{GraphIntegrityError, MetadataError, ValidationError, Violation};
pub use crate::graph::{Graph, GraphRecord, GraphValue, Literal, Subject, Term, Triple};
pub use crate::jsonld::{Encoding, JsonLdOptions};
pub use crate::loader::MetadataSource;
pub use crate::record::MetadataRecord;
pub use crate::resource::ResourceMetadata;
pub use crate::schema::{RecordSpec, SchemaOptions};
pub use crate::syntax::RdfFormat;

/// Every record type that can stand at the root of a document
pub fn record_specs() -> Vec<&'static RecordSpec> {
    let mut specs = vec![&resource::RESOURCE];
    specs.extend(
        [
            AggregationType::GeoRaster,
            AggregationType::GeoFeature,
            AggregationType::NetCDF,
            AggregationType::RefTimeseries,
            AggregationType::FileSet,
            AggregationType::SingleFile,
            AggregationType::TimeSeries,
            AggregationType::ModelProgram,
            AggregationType::ModelInstance,
        ]
        .into_iter()
        .map(AggregationType::spec),
    );
    specs
}

/// Look up a root record type by name
///
/// Accepts the type name with or without its `Metadata` suffix, the class
/// tag, or the local name of the class IRI. Matching ignores case and
/// `-`/`_` separators, so `geographic-raster`, `GeoRaster` and
/// `GeographicRasterAggregation` all name the same type.
pub fn record_spec(name: &str) -> Result<&'static RecordSpec, MetadataError> {
    let wanted = normalize_name(name);
    record_specs()
        .into_iter()
        .find(|spec| spec_names(spec).any(|candidate| normalize_name(candidate) == wanted))
        .ok_or_else(|| MetadataError::UnknownRecordType(name.to_string()))
}

fn spec_names(spec: &'static RecordSpec) -> impl Iterator<Item = &'static str> {
    let short = spec.name.strip_suffix("Metadata");
    let class = spec.class();
    let tag = class.map(|(_, value)| value);
    let local = class.and_then(|(iri, _)| iri.rsplit(['/', '#']).next());
    [Some(spec.name), short, tag, local].into_iter().flatten()
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_spec_lookup() {
        assert_eq!(record_spec("resource").unwrap().name, "ResourceMetadata");
        assert_eq!(record_spec("CompositeResource").unwrap().name, "ResourceMetadata");
        assert_eq!(record_spec("geographic-raster").unwrap().name, "GeographicRasterMetadata");
        assert_eq!(record_spec("GeoRaster").unwrap().name, "GeographicRasterMetadata");
        assert_eq!(record_spec("ModelInstanceAggregation").unwrap().name, "ModelInstanceMetadata");
        assert_eq!(record_spec("time_series").unwrap().name, "TimeSeriesMetadata");
    }

    #[test]
    fn test_unknown_record_type() {
        let err = record_spec("spreadsheet").unwrap_err();
        assert!(matches!(err, MetadataError::UnknownRecordType(ref n) if n == "spreadsheet"));
    }

    #[test]
    fn test_record_spec_names_are_unique() {
        let specs = record_specs();
        assert_eq!(specs.len(), 10);
        for spec in &specs {
            assert!(std::ptr::eq(record_spec(spec.name).unwrap(), *spec));
        }
    }
}
