//! Aggregation metadata
//!
//! An aggregation groups files within a resource. All aggregation types
//! share a common block of fields ([`AggregationMetadata`]) and add their
//! own type-specific descriptions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fields::{
    BandInformation, CellInformation, FieldInformation, GeometryInformation, ModelProgramFile, PeriodCoverage,
    Rights, SpatialCoverage, SpatialReference, TimeSeriesResult, Variable, BAND_INFORMATION, CELL_INFORMATION,
    FIELD_INFORMATION, GEOMETRY_INFORMATION, MODEL_PROGRAM_FILE, MULTIDIMENSIONAL_SPATIAL_REFERENCE, RIGHTS,
    SPATIAL_COVERAGE, SPATIAL_REFERENCE, TEMPORAL_COVERAGE, TIME_SERIES_RESULT, VARIABLE,
};
use crate::record::MetadataRecord;
use crate::schema::{FieldKind, FieldSpec, RecordSpec, Scalar};
use crate::validate::Validator;
use crate::vocab::{dc, dcterms, hsterms, HSTERMS_KEY, HSTERMS_VALUE};

/// Type tag of an aggregation, as found under `type` in flat records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationType {
    GeoRaster,
    GeoFeature,
    NetCDF,
    RefTimeseries,
    FileSet,
    SingleFile,
    TimeSeries,
    ModelProgram,
    ModelInstance,
}

impl AggregationType {
    pub fn spec(self) -> &'static RecordSpec {
        match self {
            AggregationType::GeoRaster => &GEOGRAPHIC_RASTER,
            AggregationType::GeoFeature => &GEOGRAPHIC_FEATURE,
            AggregationType::NetCDF => &MULTIDIMENSIONAL,
            AggregationType::RefTimeseries => &REFERENCED_TIME_SERIES,
            AggregationType::FileSet => &FILE_SET,
            AggregationType::SingleFile => &SINGLE_FILE,
            AggregationType::TimeSeries => &TIME_SERIES,
            AggregationType::ModelProgram => &MODEL_PROGRAM,
            AggregationType::ModelInstance => &MODEL_INSTANCE,
        }
    }
}

fn default_language() -> String {
    "eng".to_string()
}

/// Fields every aggregation carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub title: String,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub additional_metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatial_coverage: Option<SpatialCoverage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_coverage: Option<PeriodCoverage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rights: Option<Rights>,
}

impl AggregationMetadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            url: None,
            title: title.into(),
            subjects: Vec::new(),
            language: default_language(),
            additional_metadata: BTreeMap::new(),
            spatial_coverage: None,
            period_coverage: None,
            rights: None,
        }
    }
}

/// Language must be a three letter code
pub(crate) fn language_is_code(record: &Map<String, Value>, v: &mut Validator) {
    if let Some(language) = record.get("language").and_then(Value::as_str) {
        if language.chars().count() != 3 {
            v.report_field("language", format!("language code '{}' must be 3 characters", language));
        }
    }
}

/// Subject keywords must not be blank
pub(crate) fn subjects_not_blank(record: &Map<String, Value>, v: &mut Validator) {
    let Some(subjects) = record.get("subjects").and_then(Value::as_array) else {
        return;
    };
    for (i, subject) in subjects.iter().enumerate() {
        if subject.as_str().is_some_and(|s| s.trim().is_empty()) {
            v.field("subjects", |v| v.index(i, |v| v.report("keywords may not be blank")));
        }
    }
}

pub(crate) const EXTENDED_METADATA: FieldKind = FieldKind::Dictionary {
    predicate: hsterms!("extendedMetadata"),
    key: HSTERMS_KEY,
    value: HSTERMS_VALUE,
};

macro_rules! aggregation_spec {
    ($name:literal, $title:literal, $class:expr, $value:literal, [$($extra:expr),* $(,)?]) => {
        RecordSpec {
            name: $name,
            title: $title,
            fields: &[
                FieldSpec::new("type", FieldKind::Class { iri: $class, value: $value })
                    .title("Aggregation type")
                    .read_only(),
                FieldSpec::new("url", FieldKind::Subject).title("Aggregation URL").read_only(),
                FieldSpec::plain("title", dc!("title"), Scalar::String).title("Title").required(),
                FieldSpec::plain("subjects", dc!("subject"), Scalar::String)
                    .title("Subject keywords")
                    .many(),
                FieldSpec::plain("language", dc!("language"), Scalar::String).title("Language"),
                FieldSpec::new("additional_metadata", EXTENDED_METADATA).title("Additional metadata"),
                FieldSpec::new(
                    "spatial_coverage",
                    FieldKind::Composite { predicate: dc!("coverage"), union: &SPATIAL_COVERAGE },
                )
                .title("Spatial coverage"),
                FieldSpec::new(
                    "period_coverage",
                    FieldKind::Composite { predicate: dc!("coverage"), union: &TEMPORAL_COVERAGE },
                )
                .title("Temporal coverage"),
                FieldSpec::nested("rights", dc!("rights"), &RIGHTS).title("Rights statement"),
                $($extra,)*
            ],
            rules: &[language_is_code, subjects_not_blank],
        }
    };
}

macro_rules! aggregation {
    ($(#[$meta:meta])* $ty:ident, $spec:ident, $tag:ident { $($field:tt)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $ty {
            #[serde(rename = "type")]
            pub aggregation_type: AggregationType,
            #[serde(flatten)]
            pub base: AggregationMetadata,
            $($field)*
        }

        impl MetadataRecord for $ty {
            fn spec() -> &'static RecordSpec {
                &$spec
            }
        }

        impl $ty {
            pub const AGGREGATION_TYPE: AggregationType = AggregationType::$tag;
        }
    };
}

// ---------------------------------------------------------------------------
// Geographic raster
// ---------------------------------------------------------------------------

pub static GEOGRAPHIC_RASTER: RecordSpec = aggregation_spec!(
    "GeographicRasterMetadata",
    "Geographic Raster Aggregation Metadata",
    hsterms!("GeographicRasterAggregation"),
    "GeoRaster",
    [
        FieldSpec::nested("band_information", hsterms!("bandInformation"), &BAND_INFORMATION)
            .title("Band information")
            .required(),
        FieldSpec::new(
            "spatial_reference",
            FieldKind::Composite {
                predicate: hsterms!("spatialReference"),
                union: &SPATIAL_REFERENCE,
            },
        )
        .title("Spatial reference"),
        FieldSpec::nested("cell_information", hsterms!("cellInformation"), &CELL_INFORMATION)
            .title("Cell information")
            .required(),
    ]
);

aggregation!(
    /// Raster files and their band and cell descriptions
    GeographicRasterMetadata, GEOGRAPHIC_RASTER, GeoRaster {
        pub band_information: BandInformation,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub spatial_reference: Option<SpatialReference>,
        pub cell_information: CellInformation,
    }
);

// ---------------------------------------------------------------------------
// Geographic feature
// ---------------------------------------------------------------------------

pub static GEOGRAPHIC_FEATURE: RecordSpec = aggregation_spec!(
    "GeographicFeatureMetadata",
    "Geographic Feature Aggregation Metadata",
    hsterms!("GeographicFeatureAggregation"),
    "GeoFeature",
    [
        FieldSpec::nested("field_information", hsterms!("fieldInformation"), &FIELD_INFORMATION)
            .title("Field information")
            .many(),
        FieldSpec::nested("geometry_information", hsterms!("geometryInformation"), &GEOMETRY_INFORMATION)
            .title("Geometry information")
            .required(),
        FieldSpec::new(
            "spatial_reference",
            FieldKind::Composite {
                predicate: hsterms!("spatialReference"),
                union: &SPATIAL_REFERENCE,
            },
        )
        .title("Spatial reference"),
    ]
);

aggregation!(
    /// Shapefile-style vector features
    GeographicFeatureMetadata, GEOGRAPHIC_FEATURE, GeoFeature {
        #[serde(default)]
        pub field_information: Vec<FieldInformation>,
        pub geometry_information: GeometryInformation,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub spatial_reference: Option<SpatialReference>,
    }
);

// ---------------------------------------------------------------------------
// Multidimensional
// ---------------------------------------------------------------------------

pub static MULTIDIMENSIONAL: RecordSpec = aggregation_spec!(
    "MultidimensionalMetadata",
    "Multidimensional Aggregation Metadata",
    hsterms!("MultidimensionalAggregation"),
    "NetCDF",
    [
        FieldSpec::nested("variables", hsterms!("netcdfVariable"), &VARIABLE)
            .title("Variables")
            .many(),
        FieldSpec::new(
            "spatial_reference",
            FieldKind::Composite {
                predicate: hsterms!("spatialReference"),
                union: &MULTIDIMENSIONAL_SPATIAL_REFERENCE,
            },
        )
        .title("Spatial reference"),
    ]
);

aggregation!(
    /// NetCDF files and their variables
    MultidimensionalMetadata, MULTIDIMENSIONAL, NetCDF {
        #[serde(default)]
        pub variables: Vec<Variable>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub spatial_reference: Option<SpatialReference>,
    }
);

// ---------------------------------------------------------------------------
// Referenced time series, file set, single file
// ---------------------------------------------------------------------------

pub static REFERENCED_TIME_SERIES: RecordSpec = aggregation_spec!(
    "ReferencedTimeSeriesMetadata",
    "Referenced Time Series Aggregation Metadata",
    hsterms!("ReferencedTimeSeriesAggregation"),
    "RefTimeseries",
    []
);

aggregation!(ReferencedTimeSeriesMetadata, REFERENCED_TIME_SERIES, RefTimeseries {});

pub static FILE_SET: RecordSpec = aggregation_spec!(
    "FileSetMetadata",
    "File Set Aggregation Metadata",
    hsterms!("FileSetAggregation"),
    "FileSet",
    []
);

aggregation!(FileSetMetadata, FILE_SET, FileSet {});

pub static SINGLE_FILE: RecordSpec = aggregation_spec!(
    "SingleFileMetadata",
    "Single File Aggregation Metadata",
    hsterms!("SingleFileAggregation"),
    "SingleFile",
    []
);

aggregation!(SingleFileMetadata, SINGLE_FILE, SingleFile {});

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

pub static TIME_SERIES: RecordSpec = aggregation_spec!(
    "TimeSeriesMetadata",
    "Time Series Aggregation Metadata",
    hsterms!("TimeSeriesAggregation"),
    "TimeSeries",
    [
        FieldSpec::nested("time_series_results", hsterms!("timeSeriesResult"), &TIME_SERIES_RESULT)
            .title("Time series results")
            .many(),
        FieldSpec::new(
            "abstract",
            FieldKind::Wrapped {
                predicate: dc!("description"),
                inner: dcterms!("abstract"),
                scalar: Scalar::String,
            },
        )
        .title("Abstract"),
    ]
);

aggregation!(
    /// ODM2 time series results
    TimeSeriesMetadata, TIME_SERIES, TimeSeries {
        #[serde(default)]
        pub time_series_results: Vec<TimeSeriesResult>,
        #[serde(default, skip_serializing_if = "Option::is_none", rename = "abstract")]
        pub abstract_text: Option<String>,
    }
);

// ---------------------------------------------------------------------------
// Model program and instance
// ---------------------------------------------------------------------------

pub static MODEL_PROGRAM: RecordSpec = aggregation_spec!(
    "ModelProgramMetadata",
    "Model Program Aggregation Metadata",
    hsterms!("ModelProgramAggregation"),
    "ModelProgram",
    [
        FieldSpec::plain("version", hsterms!("modelVersion"), Scalar::String)
            .title("Version")
            .max_length(255),
        FieldSpec::plain("name", hsterms!("modelProgramName"), Scalar::String)
            .title("Name")
            .max_length(255),
        FieldSpec::plain("programming_languages", hsterms!("modelProgramLanguage"), Scalar::String)
            .title("Programming languages")
            .many(),
        FieldSpec::plain("operating_systems", hsterms!("modelOperatingSystem"), Scalar::String)
            .title("Operating systems")
            .many(),
        FieldSpec::plain("release_date", hsterms!("modelReleaseDate"), Scalar::DateTime).title("Release date"),
        FieldSpec::plain("website", hsterms!("modelWebsite"), Scalar::Url).title("Website"),
        FieldSpec::plain("code_repository", hsterms!("modelCodeRepository"), Scalar::Url)
            .title("Software repository"),
        FieldSpec::nested("file_types", hsterms!("modelProgramFile"), &MODEL_PROGRAM_FILE)
            .title("File types")
            .many(),
        FieldSpec::plain("program_schema_json", hsterms!("modelProgramSchema"), Scalar::Url)
            .title("Model program schema"),
    ]
);

aggregation!(
    /// Executable model code and its release information
    ModelProgramMetadata, MODEL_PROGRAM, ModelProgram {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub version: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(default)]
        pub programming_languages: Vec<String>,
        #[serde(default)]
        pub operating_systems: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub release_date: Option<DateTime<Utc>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub website: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub code_repository: Option<String>,
        #[serde(default)]
        pub file_types: Vec<ModelProgramFile>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub program_schema_json: Option<String>,
    }
);

pub static MODEL_INSTANCE: RecordSpec = aggregation_spec!(
    "ModelInstanceMetadata",
    "Model Instance Aggregation Metadata",
    hsterms!("ModelInstanceAggregation"),
    "ModelInstance",
    [
        FieldSpec::plain("includes_model_output", hsterms!("includesModelOutput"), Scalar::Boolean)
            .title("Includes model output"),
        FieldSpec::plain("executed_by", hsterms!("executedByModelProgram"), Scalar::Url).title("Executed by"),
        FieldSpec::plain("program_schema_json", hsterms!("modelProgramSchema"), Scalar::Url)
            .title("Model program schema"),
        FieldSpec::new("program_schema_json_values", EXTENDED_PROGRAM_VALUES).title("Model program schema values"),
    ]
);

const EXTENDED_PROGRAM_VALUES: FieldKind = FieldKind::Dictionary {
    predicate: hsterms!("modelProgramSchemaValues"),
    key: HSTERMS_KEY,
    value: HSTERMS_VALUE,
};

aggregation!(
    /// One run or configuration of a model program
    ModelInstanceMetadata, MODEL_INSTANCE, ModelInstance {
        #[serde(default)]
        pub includes_model_output: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub executed_by: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub program_schema_json: Option<String>,
        #[serde(default)]
        pub program_schema_json_values: BTreeMap<String, String>,
    }
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetadataError;
    use crate::fields::BoxCoverage;
    use serde_json::json;

    fn raster_json() -> Value {
        json!({
            "url": "http://www.hydroshare.org/resource/abc123/data/contents/logan.tif",
            "title": "Logan river DEM",
            "subjects": ["dem", "logan"],
            "additional_metadata": [{"key": "source", "value": "USGS"}],
            "spatial_coverage": {
                "type": "box",
                "northlimit": 42.05,
                "southlimit": 41.72,
                "eastlimit": -111.45,
                "westlimit": -111.82,
                "units": "Decimal degrees",
                "projection": "WGS 84 EPSG:4326"
            },
            "period_coverage": {"start": "2020-01-01T00:00:00Z", "end": "2020-12-31T00:00:00Z"},
            "rights": {"statement": "CC BY", "url": "http://creativecommons.org/licenses/by/4.0/"},
            "band_information": {"name": "Band_1", "no_data_value": "-3.4e+38"},
            "spatial_reference": {
                "type": "box",
                "northlimit": 4662377.0,
                "southlimit": 4612077.0,
                "eastlimit": 461827.0,
                "westlimit": 432404.0,
                "units": "meter",
                "projection_string": "PROJCS[\"NAD83 / UTM zone 12N\"]"
            },
            "cell_information": {"name": "logan.vrt", "rows": 1660, "columns": 980, "cell_size_x_value": 30.0}
        })
    }

    #[test]
    fn test_raster_round_trip() {
        let raster = GeographicRasterMetadata::from_json(&raster_json()).unwrap();
        assert_eq!(raster.aggregation_type, AggregationType::GeoRaster);
        assert_eq!(raster.base.language, "eng");
        assert_eq!(raster.base.additional_metadata["source"], "USGS");
        match &raster.base.spatial_coverage {
            Some(SpatialCoverage::Box(BoxCoverage { northlimit, .. })) => assert_eq!(*northlimit, 42.05),
            other => panic!("unexpected coverage {:?}", other),
        }

        let graph = raster.to_graph().unwrap();
        let back = GeographicRasterMetadata::from_graph_root(&graph).unwrap();
        assert_eq!(back, raster);
    }

    #[test]
    fn test_wrong_type_tag_is_rejected() {
        let mut input = raster_json();
        input["type"] = json!("GeoFeature");
        let err = GeographicRasterMetadata::from_json(&input).unwrap_err();
        let MetadataError::Validation(err) = err else {
            panic!("expected a validation error");
        };
        assert_eq!(err.at("type").unwrap().message, "unexpected value; permitted: 'GeoRaster'");
    }

    #[test]
    fn test_untrusted_input_drops_url_and_type() {
        let mut input = raster_json();
        input["type"] = json!("GeoFeature");
        let raster = GeographicRasterMetadata::from_untrusted_json(&input).unwrap();
        assert!(raster.base.url.is_none());
        assert_eq!(raster.aggregation_type, GeographicRasterMetadata::AGGREGATION_TYPE);
    }

    #[test]
    fn test_language_must_be_three_letters() {
        let err = FileSetMetadata::from_json(&json!({"title": "files", "language": "english"})).unwrap_err();
        assert!(err.to_string().contains("language code 'english' must be 3 characters"));
    }

    #[test]
    fn test_blank_keyword() {
        let err = SingleFileMetadata::from_json(&json!({"title": "file", "subjects": ["ok", " "]})).unwrap_err();
        let MetadataError::Validation(err) = err else {
            panic!("expected a validation error");
        };
        assert_eq!(err.at("subjects[1]").unwrap().message, "keywords may not be blank");
    }

    #[test]
    fn test_model_program_round_trip() {
        let program = ModelProgramMetadata::from_json(&json!({
            "title": "SWAT",
            "version": "2012",
            "programming_languages": ["Fortran"],
            "release_date": "2012-07-01",
            "website": "https://swat.tamu.edu/",
            "file_types": [{"type": "Software", "url": "http://www.hydroshare.org/resource/abc/data/contents/swat.exe"}]
        }))
        .unwrap();
        assert_eq!(program.release_date.unwrap().to_rfc3339(), "2012-07-01T00:00:00+00:00");

        let graph = program.to_graph().unwrap();
        assert_eq!(ModelProgramMetadata::from_graph_root(&graph).unwrap(), program);
    }

    #[test]
    fn test_every_type_has_a_class() {
        for tag in [
            AggregationType::GeoRaster,
            AggregationType::GeoFeature,
            AggregationType::NetCDF,
            AggregationType::RefTimeseries,
            AggregationType::FileSet,
            AggregationType::SingleFile,
            AggregationType::TimeSeries,
            AggregationType::ModelProgram,
            AggregationType::ModelInstance,
        ] {
            let (_, value) = tag.spec().class().unwrap();
            assert_eq!(json!(tag), json!(value));
        }
    }
}
