//! Field-level record types shared by resources and aggregations
//!
//! Each type pairs a serde struct with a static [`RecordSpec`] describing
//! its predicates and constraints. Coverages and spatial references are
//! tagged unions encoded on the graph as `key=value` strings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::MetadataRecord;
use crate::schema::{CompositeSpec, CompositeVariant, FieldKind, FieldSpec, RecordSpec, Scalar};
use crate::validate::{parse_datetime, Validator};
use crate::vocab::{dcterms, hsterms};

// ---------------------------------------------------------------------------
// Rights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rights {
    pub statement: String,
    pub url: String,
}

pub static RIGHTS: RecordSpec = RecordSpec {
    name: "Rights",
    title: "Rights Metadata",
    fields: &[
        FieldSpec::plain("statement", hsterms!("rightsStatement"), Scalar::String)
            .title("Statement")
            .required(),
        FieldSpec::plain("url", hsterms!("URL"), Scalar::Url).title("URL").required(),
    ],
    rules: &[],
};

impl Rights {
    fn preset(statement: &str, url: &str) -> Self {
        Self {
            statement: statement.to_string(),
            url: url.to_string(),
        }
    }

    pub fn cc_by() -> Self {
        Self::preset(
            "This resource is shared under the Creative Commons Attribution CC BY.",
            "http://creativecommons.org/licenses/by/4.0/",
        )
    }

    pub fn cc_by_sa() -> Self {
        Self::preset(
            "This resource is shared under the Creative Commons Attribution-ShareAlike CC BY-SA.",
            "http://creativecommons.org/licenses/by-sa/4.0/",
        )
    }

    pub fn cc_by_nd() -> Self {
        Self::preset(
            "This resource is shared under the Creative Commons Attribution-NoDerivs CC BY-ND.",
            "http://creativecommons.org/licenses/by-nd/4.0/",
        )
    }

    pub fn cc_by_nc_sa() -> Self {
        Self::preset(
            "This resource is shared under the Creative Commons Attribution-NoCommercial-ShareAlike CC BY-NC-SA.",
            "http://creativecommons.org/licenses/by-nc-sa/4.0/",
        )
    }

    pub fn cc_by_nc() -> Self {
        Self::preset(
            "This resource is shared under the Creative Commons Attribution-NoCommercial CC BY-NC.",
            "http://creativecommons.org/licenses/by-nc/4.0/",
        )
    }

    pub fn cc_by_nc_nd() -> Self {
        Self::preset(
            "This resource is shared under the Creative Commons Attribution-NoCommercial-NoDerivs CC BY-NC-ND.",
            "http://creativecommons.org/licenses/by-nc-nd/4.0/",
        )
    }

    pub fn other(statement: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            url: url.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// People and organizations
// ---------------------------------------------------------------------------

/// Identifier types with a dedicated predicate; others are kept as key/value nodes
const USER_IDENTIFIERS: &[(&str, &str)] = &[
    ("ORCID", hsterms!("ORCID")),
    ("GoogleScholarID", hsterms!("GoogleScholarID")),
    ("ResearchGateID", hsterms!("ResearchGateID")),
    ("ResearcherID", hsterms!("ResearcherID")),
];

const IDENTIFIERS: FieldKind = FieldKind::Identifiers {
    known: USER_IDENTIFIERS,
    other: hsterms!("identifier"),
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hydroshare_user_id: Option<i64>,
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
}

pub static CREATOR: RecordSpec = RecordSpec {
    name: "Creator",
    title: "Creator Metadata",
    fields: &[
        FieldSpec::plain("name", hsterms!("name"), Scalar::String).title("Name").max_length(100),
        FieldSpec::plain("phone", hsterms!("phone"), Scalar::String).title("Phone").max_length(25),
        FieldSpec::plain("address", hsterms!("address"), Scalar::String)
            .title("Address")
            .max_length(250),
        FieldSpec::plain("organization", hsterms!("organization"), Scalar::String)
            .title("Organization")
            .max_length(200),
        FieldSpec::plain("email", hsterms!("email"), Scalar::Email).title("Email"),
        FieldSpec::plain("homepage", hsterms!("homepage"), Scalar::Url).title("Homepage"),
        FieldSpec::plain("creator_order", hsterms!("creatorOrder"), Scalar::PositiveInteger)
            .title("Creator order"),
        FieldSpec::plain("hydroshare_user_id", hsterms!("hydroshare_user_id"), Scalar::Integer)
            .title("Hydroshare user id")
            .read_only(),
        FieldSpec::new("identifiers", IDENTIFIERS).title("Creator identifiers"),
    ],
    rules: &[],
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hydroshare_user_id: Option<i64>,
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
}

pub static CONTRIBUTOR: RecordSpec = RecordSpec {
    name: "Contributor",
    title: "Contributor Metadata",
    fields: &[
        FieldSpec::plain("name", hsterms!("name"), Scalar::String).title("Name"),
        FieldSpec::plain("phone", hsterms!("phone"), Scalar::String).title("Phone"),
        FieldSpec::plain("address", hsterms!("address"), Scalar::String).title("Address"),
        FieldSpec::plain("organization", hsterms!("organization"), Scalar::String).title("Organization"),
        FieldSpec::plain("email", hsterms!("email"), Scalar::Email).title("Email"),
        FieldSpec::plain("homepage", hsterms!("homepage"), Scalar::Url).title("Homepage"),
        FieldSpec::plain("hydroshare_user_id", hsterms!("hydroshare_user_id"), Scalar::Integer)
            .title("Hydroshare user id")
            .read_only(),
        FieldSpec::new("identifiers", IDENTIFIERS).title("Contributor identifiers"),
    ],
    rules: &[],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardInfo {
    pub funding_agency_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_agency_url: Option<String>,
}

pub static AWARD_INFO: RecordSpec = RecordSpec {
    name: "AwardInfo",
    title: "Funding Agency Metadata",
    fields: &[
        FieldSpec::plain("funding_agency_name", hsterms!("fundingAgencyName"), Scalar::String)
            .title("Agency name")
            .required(),
        FieldSpec::plain("title", hsterms!("awardTitle"), Scalar::String).title("Award title"),
        FieldSpec::plain("number", hsterms!("awardNumber"), Scalar::String).title("Award number"),
        FieldSpec::plain("funding_agency_url", hsterms!("fundingAgencyURL"), Scalar::Url)
            .title("Agency URL"),
    ],
    rules: &[],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
    pub name: String,
    pub url: String,
}

pub static PUBLISHER: RecordSpec = RecordSpec {
    name: "Publisher",
    title: "Publisher Metadata",
    fields: &[
        FieldSpec::plain("name", hsterms!("publisherName"), Scalar::String)
            .title("Publisher name")
            .max_length(200)
            .required(),
        FieldSpec::plain("url", hsterms!("publisherURL"), Scalar::Url)
            .title("Publisher URL")
            .required(),
    ],
    rules: &[],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationType {
    IsPartOf,
    HasPart,
    IsExecutedBy,
    IsCreatedBy,
    IsVersionOf,
    IsReplacedBy,
    IsDescribedBy,
    ConformsTo,
    HasFormat,
    IsFormatOf,
    IsRequiredBy,
    Requires,
    IsReferencedBy,
    References,
    Replaces,
    Source,
    IsSimilarTo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    pub value: String,
}

/// Relation types and the predicate each is written under
pub const RELATION_TYPES: &[(&str, &str)] = &[
    ("isPartOf", dcterms!("isPartOf")),
    ("hasPart", dcterms!("hasPart")),
    ("isExecutedBy", hsterms!("isExecutedBy")),
    ("isCreatedBy", hsterms!("isCreatedBy")),
    ("isVersionOf", dcterms!("isVersionOf")),
    ("isReplacedBy", dcterms!("isReplacedBy")),
    ("isDescribedBy", hsterms!("isDescribedBy")),
    ("conformsTo", dcterms!("conformsTo")),
    ("hasFormat", dcterms!("hasFormat")),
    ("isFormatOf", dcterms!("isFormatOf")),
    ("isRequiredBy", dcterms!("isRequiredBy")),
    ("requires", dcterms!("requires")),
    ("isReferencedBy", dcterms!("isReferencedBy")),
    ("references", dcterms!("references")),
    ("replaces", dcterms!("replaces")),
    ("source", dcterms!("source")),
    ("isSimilarTo", hsterms!("isSimilarTo")),
];

// ---------------------------------------------------------------------------
// Raster and feature descriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BandInformation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_data_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_value: Option<String>,
}

pub static BAND_INFORMATION: RecordSpec = RecordSpec {
    name: "BandInformation",
    title: "Raster Band Metadata",
    fields: &[
        FieldSpec::plain("name", hsterms!("name"), Scalar::String)
            .title("Name")
            .max_length(500)
            .required(),
        FieldSpec::plain("variable_name", hsterms!("variableName"), Scalar::String)
            .title("Variable name")
            .max_length(100),
        FieldSpec::plain("variable_unit", hsterms!("variableUnit"), Scalar::String)
            .title("Variable unit")
            .max_length(50),
        FieldSpec::plain("no_data_value", hsterms!("noDataValue"), Scalar::String).title("Nodata value"),
        FieldSpec::plain("maximum_value", hsterms!("maximumValue"), Scalar::String).title("Maximum value"),
        FieldSpec::plain("comment", hsterms!("comment"), Scalar::String).title("Comment"),
        FieldSpec::plain("method", hsterms!("method"), Scalar::String).title("Method"),
        FieldSpec::plain("minimum_value", hsterms!("minimumValue"), Scalar::String).title("Minimum value"),
    ],
    rules: &[],
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellInformation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_size_x_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_size_y_value: Option<f64>,
}

pub static CELL_INFORMATION: RecordSpec = RecordSpec {
    name: "CellInformation",
    title: "Raster Cell Metadata",
    fields: &[
        FieldSpec::plain("name", hsterms!("name"), Scalar::String).title("Name").max_length(500),
        FieldSpec::plain("rows", hsterms!("rows"), Scalar::Integer).title("Rows"),
        FieldSpec::plain("columns", hsterms!("columns"), Scalar::Integer).title("Columns"),
        FieldSpec::plain("cell_size_x_value", hsterms!("cellSizeXValue"), Scalar::Number)
            .title("Cell size x value"),
        FieldSpec::plain("cell_data_type", hsterms!("cellDataType"), Scalar::String)
            .title("Cell data type")
            .max_length(50),
        FieldSpec::plain("cell_size_y_value", hsterms!("cellSizeYValue"), Scalar::Number)
            .title("Cell size y value"),
    ],
    rules: &[],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInformation {
    pub field_name: String,
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_width: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_precision: Option<i64>,
}

pub static FIELD_INFORMATION: RecordSpec = RecordSpec {
    name: "FieldInformation",
    title: "Geographic Feature Field Metadata",
    fields: &[
        FieldSpec::plain("field_name", hsterms!("fieldName"), Scalar::String)
            .title("Field name")
            .max_length(128)
            .required(),
        FieldSpec::plain("field_type", hsterms!("fieldType"), Scalar::String)
            .title("Field type")
            .max_length(128)
            .required(),
        FieldSpec::plain("field_type_code", hsterms!("fieldTypeCode"), Scalar::String)
            .title("Field type code")
            .max_length(50),
        FieldSpec::plain("field_width", hsterms!("fieldWidth"), Scalar::Integer).title("Field width"),
        FieldSpec::plain("field_precision", hsterms!("fieldPrecision"), Scalar::Integer)
            .title("Field precision"),
    ],
    rules: &[],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryInformation {
    #[serde(default)]
    pub feature_count: i64,
    pub geometry_type: String,
}

pub static GEOMETRY_INFORMATION: RecordSpec = RecordSpec {
    name: "GeometryInformation",
    title: "Geographic Feature Geometry Metadata",
    fields: &[
        FieldSpec::plain("feature_count", hsterms!("featureCount"), Scalar::Integer).title("Feature count"),
        FieldSpec::plain("geometry_type", hsterms!("geometryType"), Scalar::String)
            .title("Geometry type")
            .max_length(128)
            .required(),
    ],
    rules: &[],
};

// ---------------------------------------------------------------------------
// Multidimensional variables
// ---------------------------------------------------------------------------

const VARIABLE_TYPES: &[&str] = &[
    "Char",
    "Byte",
    "Short",
    "Int",
    "Float",
    "Double",
    "Int64",
    "Unsigned Byte",
    "Unsigned Short",
    "Unsigned Int",
    "Unsigned Int64",
    "String",
    "User Defined Type",
    "Unknown",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableType {
    Char,
    Byte,
    Short,
    Int,
    Float,
    Double,
    Int64,
    #[serde(rename = "Unsigned Byte")]
    UnsignedByte,
    #[serde(rename = "Unsigned Short")]
    UnsignedShort,
    #[serde(rename = "Unsigned Int")]
    UnsignedInt,
    #[serde(rename = "Unsigned Int64")]
    UnsignedInt64,
    String,
    #[serde(rename = "User Defined Type")]
    UserDefinedType,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub unit: String,
    #[serde(rename = "type")]
    pub variable_type: VariableType,
    pub shape: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptive_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_value: Option<String>,
}

pub static VARIABLE: RecordSpec = RecordSpec {
    name: "Variable",
    title: "Multidimensional Variable Metadata",
    fields: &[
        FieldSpec::plain("name", hsterms!("name"), Scalar::String)
            .title("Variable name")
            .max_length(1000)
            .required(),
        FieldSpec::plain("unit", hsterms!("unit"), Scalar::String)
            .title("Units")
            .max_length(1000)
            .required(),
        FieldSpec::plain("type", hsterms!("type"), Scalar::Enum(VARIABLE_TYPES))
            .title("Type")
            .required(),
        FieldSpec::plain("shape", hsterms!("shape"), Scalar::String)
            .title("Shape")
            .max_length(1000)
            .required(),
        FieldSpec::plain("descriptive_name", hsterms!("descriptive_name"), Scalar::String)
            .title("Long name")
            .max_length(1000),
        FieldSpec::plain("method", hsterms!("method"), Scalar::String).title("Comment"),
        FieldSpec::plain("missing_value", hsterms!("missing_value"), Scalar::String)
            .title("Missing value")
            .max_length(1000),
    ],
    rules: &[],
};

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesVariable {
    pub variable_code: String,
    pub variable_name: String,
    pub variable_type: String,
    pub no_data_value: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speciation: Option<String>,
}

pub static TIME_SERIES_VARIABLE: RecordSpec = RecordSpec {
    name: "TimeSeriesVariable",
    title: "Time Series Variable Metadata",
    fields: &[
        FieldSpec::plain("variable_code", hsterms!("VariableCode"), Scalar::String)
            .title("Variable code")
            .max_length(50)
            .required(),
        FieldSpec::plain("variable_name", hsterms!("VariableName"), Scalar::String)
            .title("Variable name")
            .max_length(100)
            .required(),
        FieldSpec::plain("variable_type", hsterms!("VariableType"), Scalar::String)
            .title("Variable type")
            .max_length(100)
            .required(),
        FieldSpec::plain("no_data_value", hsterms!("NoDataValue"), Scalar::Integer)
            .title("NoData value")
            .required(),
        FieldSpec::plain("variable_definition", hsterms!("VariableDefinition"), Scalar::String)
            .title("Variable definition")
            .max_length(255),
        FieldSpec::plain("speciation", hsterms!("Speciation"), Scalar::String)
            .title("Speciation")
            .max_length(255),
    ],
    rules: &[],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesSite {
    pub site_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_datum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

pub static TIME_SERIES_SITE: RecordSpec = RecordSpec {
    name: "TimeSeriesSite",
    title: "Time Series Site Metadata",
    fields: &[
        FieldSpec::plain("site_code", hsterms!("SiteCode"), Scalar::String)
            .title("Site code")
            .max_length(200)
            .required(),
        FieldSpec::plain("site_name", hsterms!("SiteName"), Scalar::String)
            .title("Site name")
            .max_length(255),
        FieldSpec::plain("elevation_m", hsterms!("Elevation_m"), Scalar::Number).title("Elevation"),
        FieldSpec::plain("elevation_datum", hsterms!("ElevationDatum"), Scalar::String)
            .title("Elevation datum")
            .max_length(50),
        FieldSpec::plain("site_type", hsterms!("SiteType"), Scalar::String)
            .title("Site type")
            .max_length(100),
        FieldSpec::plain("latitude", hsterms!("Latitude"), Scalar::Number).title("Latitude"),
        FieldSpec::plain("longitude", hsterms!("Longitude"), Scalar::Number).title("Longitude"),
    ],
    rules: &[],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesMethod {
    pub method_code: String,
    pub method_name: String,
    pub method_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_link: Option<String>,
}

pub static TIME_SERIES_METHOD: RecordSpec = RecordSpec {
    name: "TimeSeriesMethod",
    title: "Time Series Method Metadata",
    fields: &[
        FieldSpec::plain("method_code", hsterms!("MethodCode"), Scalar::String)
            .title("Method code")
            .max_length(50)
            .required(),
        FieldSpec::plain("method_name", hsterms!("MethodName"), Scalar::String)
            .title("Method name")
            .max_length(200)
            .required(),
        FieldSpec::plain("method_type", hsterms!("MethodType"), Scalar::String)
            .title("Method type")
            .max_length(200)
            .required(),
        FieldSpec::plain("method_description", hsterms!("MethodDescription"), Scalar::String)
            .title("Method description"),
        FieldSpec::plain("method_link", hsterms!("MethodLink"), Scalar::Url).title("Method link"),
    ],
    rules: &[],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingLevel {
    pub processing_level_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

pub static PROCESSING_LEVEL: RecordSpec = RecordSpec {
    name: "ProcessingLevel",
    title: "Time Series Processing Level Metadata",
    fields: &[
        FieldSpec::plain("processing_level_code", hsterms!("ProcessingLevelCode"), Scalar::String)
            .title("Processing level code")
            .max_length(50)
            .required(),
        FieldSpec::plain("definition", hsterms!("Definition"), Scalar::String)
            .title("Definition")
            .max_length(200),
        FieldSpec::plain("explanation", hsterms!("Explanation"), Scalar::String).title("Explanation"),
    ],
    rules: &[],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    #[serde(rename = "type")]
    pub unit_type: String,
    pub name: String,
    pub abbreviation: String,
}

pub static UNIT: RecordSpec = RecordSpec {
    name: "Unit",
    title: "Time Series Units Metadata",
    fields: &[
        FieldSpec::plain("type", hsterms!("UnitsType"), Scalar::String)
            .title("Unit type")
            .max_length(255)
            .required(),
        FieldSpec::plain("name", hsterms!("UnitsName"), Scalar::String)
            .title("Unit name")
            .max_length(255)
            .required(),
        FieldSpec::plain("abbreviation", hsterms!("UnitsAbbreviation"), Scalar::String)
            .title("Unit abbreviation")
            .max_length(20)
            .required(),
    ],
    rules: &[],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesResult {
    pub series_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub sample_medium: String,
    pub value_count: i64,
    pub aggregation_statistic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_label: Option<String>,
    pub site: TimeSeriesSite,
    pub variable: TimeSeriesVariable,
    pub method: TimeSeriesMethod,
    pub processing_level: ProcessingLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<f64>,
}

pub static TIME_SERIES_RESULT: RecordSpec = RecordSpec {
    name: "TimeSeriesResult",
    title: "Time Series Result Metadata",
    fields: &[
        FieldSpec::plain("series_id", hsterms!("timeSeriesResultUUID"), Scalar::String)
            .title("Series ID")
            .max_length(36)
            .required(),
        FieldSpec::nested("unit", hsterms!("unit"), &UNIT).title("Units"),
        FieldSpec::plain("status", hsterms!("Status"), Scalar::String)
            .title("Status")
            .max_length(255),
        FieldSpec::plain("sample_medium", hsterms!("SampleMedium"), Scalar::String)
            .title("Sample medium")
            .max_length(255)
            .required(),
        FieldSpec::plain("value_count", hsterms!("ValueCount"), Scalar::Integer)
            .title("Value count")
            .required(),
        FieldSpec::plain("aggregation_statistic", hsterms!("AggregationStatistic"), Scalar::String)
            .title("Aggregation statistic")
            .max_length(255)
            .required(),
        FieldSpec::plain("series_label", hsterms!("SeriesLabel"), Scalar::String)
            .title("Series label")
            .max_length(255),
        FieldSpec::nested("site", hsterms!("site"), &TIME_SERIES_SITE)
            .title("Site")
            .required(),
        FieldSpec::nested("variable", hsterms!("variable"), &TIME_SERIES_VARIABLE)
            .title("Variable")
            .required(),
        FieldSpec::nested("method", hsterms!("method"), &TIME_SERIES_METHOD)
            .title("Method")
            .required(),
        FieldSpec::nested("processing_level", hsterms!("processingLevel"), &PROCESSING_LEVEL)
            .title("Processing level")
            .required(),
        FieldSpec::new(
            "utc_offset",
            FieldKind::Wrapped {
                predicate: hsterms!("UTCOffSet"),
                inner: hsterms!("value"),
                scalar: Scalar::Number,
            },
        )
        .title("UTC Offset"),
    ],
    rules: &[],
};

// ---------------------------------------------------------------------------
// Coverages and spatial references
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxCoverage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub northlimit: f64,
    pub eastlimit: f64,
    pub southlimit: f64,
    pub westlimit: f64,
    pub units: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCoverage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub east: f64,
    pub north: f64,
    pub units: String,
    pub projection: String,
}

/// Geographic coverage, tagged `"box"` or `"point"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SpatialCoverage {
    Box(BoxCoverage),
    Point(PointCoverage),
}

fn north_not_below_south(record: &Map<String, Value>, v: &mut Validator) {
    let north = record.get("northlimit").and_then(Value::as_f64);
    let south = record.get("southlimit").and_then(Value::as_f64);
    if let (Some(north), Some(south)) = (north, south) {
        if north < south {
            v.report(format!(
                "North latitude [{}] must be greater than or equal to South latitude [{}]",
                north, south
            ));
        }
    }
}

pub static BOX_COVERAGE: RecordSpec = RecordSpec {
    name: "BoxCoverage",
    title: "Box Coverage Metadata",
    fields: &[
        FieldSpec::new("type", FieldKind::Discriminator { value: "box" })
            .title("Geographic coverage type")
            .read_only(),
        FieldSpec::plain("name", "", Scalar::String).title("Name"),
        FieldSpec::plain("northlimit", "", Scalar::Number)
            .title("North limit")
            .between(-90.0, 90.0)
            .required(),
        FieldSpec::plain("eastlimit", "", Scalar::Number)
            .title("East limit")
            .between(-180.0, 180.0)
            .required(),
        FieldSpec::plain("southlimit", "", Scalar::Number)
            .title("South limit")
            .between(-90.0, 90.0)
            .required(),
        FieldSpec::plain("westlimit", "", Scalar::Number)
            .title("West limit")
            .between(-180.0, 180.0)
            .required(),
        FieldSpec::plain("units", "", Scalar::String).title("Units").required(),
        FieldSpec::plain("projection", "", Scalar::String).title("Projection"),
    ],
    rules: &[north_not_below_south],
};

pub static POINT_COVERAGE: RecordSpec = RecordSpec {
    name: "PointCoverage",
    title: "Point Coverage Metadata",
    fields: &[
        FieldSpec::new("type", FieldKind::Discriminator { value: "point" })
            .title("Geographic coverage type")
            .read_only(),
        FieldSpec::plain("name", "", Scalar::String).title("Name"),
        FieldSpec::plain("east", "", Scalar::Number)
            .title("East")
            .between(-180.0, 180.0)
            .required(),
        FieldSpec::plain("north", "", Scalar::Number)
            .title("North")
            .between(-90.0, 90.0)
            .required(),
        FieldSpec::plain("units", "", Scalar::String).title("Units").required(),
        FieldSpec::plain("projection", "", Scalar::String)
            .title("Projection")
            .required(),
    ],
    rules: &[],
};

/// Input without a `type` is a point if it names `north` or `east`, a box otherwise
fn infer_spatial_coverage(record: &Map<String, Value>) -> &'static str {
    if record.contains_key("north") || record.contains_key("east") {
        "point"
    } else {
        "box"
    }
}

pub static SPATIAL_COVERAGE: CompositeSpec = CompositeSpec {
    name: "SpatialCoverage",
    variants: &[
        CompositeVariant {
            tag: "box",
            class: dcterms!("box"),
            record: &BOX_COVERAGE,
        },
        CompositeVariant {
            tag: "point",
            class: dcterms!("point"),
            record: &POINT_COVERAGE,
        },
    ],
    infer: Some(infer_spatial_coverage),
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodCoverage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

fn start_before_end(record: &Map<String, Value>, v: &mut Validator) {
    let start = record.get("start").and_then(Value::as_str);
    let end = record.get("end").and_then(Value::as_str);
    match (start, end) {
        (Some(start), Some(end)) => {
            if let (Some(s), Some(e)) = (parse_datetime(start), parse_datetime(end)) {
                if s > e {
                    v.report(format!("start date [{}] is after end date [{}]", start, end));
                }
            }
        }
        (Some(start), None) => v.report(format!("An end date was not included with start date [{}]", start)),
        (None, Some(end)) => v.report(format!("A start date was not included with end date [{}]", end)),
        (None, None) => {}
    }
}

pub static PERIOD_COVERAGE: RecordSpec = RecordSpec {
    name: "PeriodCoverage",
    title: "Period Coverage Metadata",
    fields: &[
        FieldSpec::plain("name", "", Scalar::String).title("Name"),
        FieldSpec::plain("start", "", Scalar::DateTime).title("Start"),
        FieldSpec::plain("end", "", Scalar::DateTime).title("End"),
    ],
    rules: &[start_before_end],
};

pub static TEMPORAL_COVERAGE: CompositeSpec = CompositeSpec {
    name: "PeriodCoverage",
    variants: &[CompositeVariant {
        tag: "period",
        class: dcterms!("period"),
        record: &PERIOD_COVERAGE,
    }],
    infer: None,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSpatialReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub northlimit: f64,
    pub eastlimit: f64,
    pub southlimit: f64,
    pub westlimit: f64,
    pub units: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<String>,
    pub projection_string: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection_string_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSpatialReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub east: f64,
    pub north: f64,
    pub units: String,
    pub projection: String,
    pub projection_string: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection_string_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection_name: Option<String>,
}

/// Spatial reference of a raster, feature or multidimensional aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SpatialReference {
    Box(BoxSpatialReference),
    Point(PointSpatialReference),
}

const BOX_SPATIAL_REFERENCE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("type", FieldKind::Discriminator { value: "box" })
        .title("Spatial reference type")
        .read_only(),
    FieldSpec::plain("name", "", Scalar::String).title("Name"),
    FieldSpec::plain("northlimit", "", Scalar::Number).title("North limit").required(),
    FieldSpec::plain("eastlimit", "", Scalar::Number).title("East limit").required(),
    FieldSpec::plain("southlimit", "", Scalar::Number).title("South limit").required(),
    FieldSpec::plain("westlimit", "", Scalar::Number).title("West limit").required(),
    FieldSpec::plain("units", "", Scalar::String).title("Units").required(),
    FieldSpec::plain("projection", "", Scalar::String).title("Projection"),
    FieldSpec::plain("projection_string", "", Scalar::String)
        .title("Projection string")
        .required(),
    FieldSpec::plain("projection_string_type", "", Scalar::String).title("Projection string type"),
    FieldSpec::plain("datum", "", Scalar::String).title("Datum"),
    FieldSpec::plain("projection_name", "", Scalar::String).title("Projection name"),
];

const POINT_SPATIAL_REFERENCE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("type", FieldKind::Discriminator { value: "point" })
        .title("Spatial reference type")
        .read_only(),
    FieldSpec::plain("name", "", Scalar::String).title("Name"),
    FieldSpec::plain("east", "", Scalar::Number).title("East").required(),
    FieldSpec::plain("north", "", Scalar::Number).title("North").required(),
    FieldSpec::plain("units", "", Scalar::String).title("Units").required(),
    FieldSpec::plain("projection", "", Scalar::String)
        .title("Projection")
        .required(),
    FieldSpec::plain("projection_string", "", Scalar::String)
        .title("Projection string")
        .required(),
    FieldSpec::plain("projection_string_type", "", Scalar::String).title("Projection string type"),
    FieldSpec::plain("projection_name", "", Scalar::String).title("Projection name"),
];

pub static BOX_SPATIAL_REFERENCE: RecordSpec = RecordSpec {
    name: "BoxSpatialReference",
    title: "Box Spatial Reference Metadata",
    fields: BOX_SPATIAL_REFERENCE_FIELDS,
    rules: &[],
};

pub static POINT_SPATIAL_REFERENCE: RecordSpec = RecordSpec {
    name: "PointSpatialReference",
    title: "Point Spatial Reference Metadata",
    fields: POINT_SPATIAL_REFERENCE_FIELDS,
    rules: &[],
};

pub static MULTIDIMENSIONAL_BOX_SPATIAL_REFERENCE: RecordSpec = RecordSpec {
    name: "MultidimensionalBoxSpatialReference",
    title: "Multidimensional Box Spatial Reference Metadata",
    fields: BOX_SPATIAL_REFERENCE_FIELDS,
    rules: &[],
};

pub static MULTIDIMENSIONAL_POINT_SPATIAL_REFERENCE: RecordSpec = RecordSpec {
    name: "MultidimensionalPointSpatialReference",
    title: "Multidimensional Point Spatial Reference Metadata",
    fields: POINT_SPATIAL_REFERENCE_FIELDS,
    rules: &[],
};

pub static SPATIAL_REFERENCE: CompositeSpec = CompositeSpec {
    name: "SpatialReference",
    variants: &[
        CompositeVariant {
            tag: "box",
            class: hsterms!("box"),
            record: &BOX_SPATIAL_REFERENCE,
        },
        CompositeVariant {
            tag: "point",
            class: hsterms!("point"),
            record: &POINT_SPATIAL_REFERENCE,
        },
    ],
    infer: None,
};

pub static MULTIDIMENSIONAL_SPATIAL_REFERENCE: CompositeSpec = CompositeSpec {
    name: "MultidimensionalSpatialReference",
    variants: &[
        CompositeVariant {
            tag: "box",
            class: hsterms!("box"),
            record: &MULTIDIMENSIONAL_BOX_SPATIAL_REFERENCE,
        },
        CompositeVariant {
            tag: "point",
            class: hsterms!("point"),
            record: &MULTIDIMENSIONAL_POINT_SPATIAL_REFERENCE,
        },
    ],
    infer: None,
};

// ---------------------------------------------------------------------------
// Model program files
// ---------------------------------------------------------------------------

const MODEL_PROGRAM_FILE_TYPES: &[&str] = &["Computational Engine", "Documentation", "Release Notes", "Software"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelProgramFileType {
    #[serde(rename = "Computational Engine")]
    ComputationalEngine,
    Documentation,
    #[serde(rename = "Release Notes")]
    ReleaseNotes,
    Software,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProgramFile {
    #[serde(rename = "type")]
    pub file_type: ModelProgramFileType,
    pub url: String,
}

pub static MODEL_PROGRAM_FILE: RecordSpec = RecordSpec {
    name: "ModelProgramFile",
    title: "Model Program File Metadata",
    fields: &[
        FieldSpec::plain("type", hsterms!("modelProgramFileType"), Scalar::Enum(MODEL_PROGRAM_FILE_TYPES))
            .title("Model program file type")
            .required(),
        FieldSpec::plain("url", hsterms!("modelProgramFileURL"), Scalar::Url)
            .title("Model program file url")
            .required(),
    ],
    rules: &[],
};

macro_rules! impl_metadata_record {
    ($($ty:ty => $spec:ident),* $(,)?) => {
        $(
            impl MetadataRecord for $ty {
                fn spec() -> &'static RecordSpec {
                    &$spec
                }
            }
        )*
    };
}

impl_metadata_record! {
    Rights => RIGHTS,
    Creator => CREATOR,
    Contributor => CONTRIBUTOR,
    AwardInfo => AWARD_INFO,
    Publisher => PUBLISHER,
    BandInformation => BAND_INFORMATION,
    CellInformation => CELL_INFORMATION,
    FieldInformation => FIELD_INFORMATION,
    GeometryInformation => GEOMETRY_INFORMATION,
    Variable => VARIABLE,
    TimeSeriesVariable => TIME_SERIES_VARIABLE,
    TimeSeriesSite => TIME_SERIES_SITE,
    TimeSeriesMethod => TIME_SERIES_METHOD,
    ProcessingLevel => PROCESSING_LEVEL,
    Unit => UNIT,
    TimeSeriesResult => TIME_SERIES_RESULT,
    BoxCoverage => BOX_COVERAGE,
    PointCoverage => POINT_COVERAGE,
    PeriodCoverage => PERIOD_COVERAGE,
    BoxSpatialReference => BOX_SPATIAL_REFERENCE,
    PointSpatialReference => POINT_SPATIAL_REFERENCE,
    ModelProgramFile => MODEL_PROGRAM_FILE,
}
