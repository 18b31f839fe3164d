use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::MetadataError;
use crate::graph::Graph;
use crate::id::resource_iri;
use crate::syntax::{self, RdfFormat};

/// File name of the resource-level metadata document in a bag
pub const RESOURCE_METADATA_FILE: &str = "resourcemetadata.xml";

/// Source from which to load a metadata document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataSource {
    /// Local RDF file
    File(PathBuf),
    /// Zip archive; without an entry, the resource metadata file is looked up
    Zip { path: PathBuf, entry: Option<String> },
    /// Remote document or resource landing page
    Url(String),
}

impl MetadataSource {
    /// Interpret a command-line style location
    ///
    /// `http(s)://` locations are URLs, `*.zip` paths are archives and
    /// `archive.zip!inner/path.xml` names one entry of an archive.
    pub fn parse(location: &str) -> Self {
        if is_url(location) {
            return MetadataSource::Url(location.to_string());
        }
        if let Some((archive, entry)) = location.split_once(".zip!") {
            return MetadataSource::Zip {
                path: PathBuf::from(format!("{}.zip", archive)),
                entry: Some(entry.to_string()),
            };
        }
        let path = PathBuf::from(location);
        let is_zip = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("zip"));
        if is_zip {
            MetadataSource::Zip { path, entry: None }
        } else {
            MetadataSource::File(path)
        }
    }

    /// Metadata document of a published resource
    pub fn resource(resource_id: &str) -> Self {
        MetadataSource::Url(format!("{}/data/{}", resource_iri(resource_id), RESOURCE_METADATA_FILE))
    }

    /// Human-readable location, used in error messages
    pub fn describe(&self) -> String {
        match self {
            MetadataSource::File(p) => p.display().to_string(),
            MetadataSource::Zip { path, entry: Some(e) } => format!("{}!{}", path.display(), e),
            MetadataSource::Zip { path, entry: None } => path.display().to_string(),
            MetadataSource::Url(u) => u.clone(),
        }
    }
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn load_error(path: impl Into<String>, reason: impl Into<String>) -> MetadataError {
    MetadataError::LoadError {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Load the raw bytes of a document, with the name it was found under
pub fn load_bytes(source: &MetadataSource) -> Result<(String, Vec<u8>), MetadataError> {
    match source {
        MetadataSource::File(path) => {
            if !path.is_file() {
                return Err(MetadataError::InvalidPath(path.clone()));
            }
            let bytes = std::fs::read(path)?;
            Ok((path.display().to_string(), bytes))
        }
        MetadataSource::Zip { path, entry } => load_from_zip(path, entry.as_deref()),
        MetadataSource::Url(url) => fetch_metadata_from_url(url),
    }
}

/// Load and parse an RDF document
///
/// The format comes from the file extension when it has a known one and is
/// sniffed from the content otherwise.
pub fn load_graph(source: &MetadataSource) -> Result<Graph, MetadataError> {
    let (name, bytes) = load_bytes(source)?;
    let format = RdfFormat::from_path(Path::new(&name)).unwrap_or_else(|| RdfFormat::sniff(&bytes));
    tracing::info!(source = %source.describe(), format = format.name(), "loading metadata");
    syntax::parse(&bytes, format)
}

/// Read one entry of a zip archive, finding the resource metadata file if no entry is named
pub fn load_from_zip(path: &Path, entry: Option<&str>) -> Result<(String, Vec<u8>), MetadataError> {
    if !path.exists() {
        return Err(MetadataError::InvalidPath(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|e| load_error(path.display().to_string(), format!("Failed to open zip file: {}", e)))?;
    read_zip_entry(file, entry).map_err(|e| match e {
        MetadataError::LoadError { reason, .. } => load_error(path.display().to_string(), reason),
        other => other,
    })
}

fn read_zip_entry<R: Read + Seek>(reader: R, entry: Option<&str>) -> Result<(String, Vec<u8>), MetadataError> {
    let mut archive =
        ZipArchive::new(reader).map_err(|e| load_error("zip", format!("Failed to read zip archive: {}", e)))?;

    let name = match entry {
        Some(name) => name.to_string(),
        None => {
            let names: Vec<String> = archive.file_names().map(str::to_string).collect();
            find_resource_metadata(&names)
                .ok_or_else(|| load_error("zip", format!("No {} found in archive", RESOURCE_METADATA_FILE)))?
                .to_string()
        }
    };

    let mut file = archive
        .by_name(&name)
        .map_err(|e| load_error("zip", format!("Failed to extract {}: {}", name, e)))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| load_error("zip", format!("Failed to read {}: {}", name, e)))?;
    Ok((name, bytes))
}

/// Pick the resource metadata file among archive entries
///
/// Bags keep it at `<id>/data/resourcemetadata.xml`; the shallowest match
/// wins so that nested archives do not shadow the outer resource.
fn find_resource_metadata(names: &[String]) -> Option<&str> {
    names
        .iter()
        .filter(|name| name.rsplit('/').next() == Some(RESOURCE_METADATA_FILE))
        .min_by_key(|name| (name.matches('/').count(), name.len()))
        .map(String::as_str)
}

/// Fetch a metadata document, resolving resource landing pages
fn fetch_metadata_from_url(url: &str) -> Result<(String, Vec<u8>), MetadataError> {
    let content = fetch_url(url)?;
    if looks_like_rdf(&content) {
        return Ok((url.to_string(), content));
    }

    // a landing page serves HTML; the document lives under data/
    let metadata_url = format!("{}/data/{}", url.trim_end_matches('/'), RESOURCE_METADATA_FILE);
    tracing::debug!(url, %metadata_url, "response is not RDF, trying the resource metadata file");
    let content = fetch_url(&metadata_url)?;
    if looks_like_rdf(&content) {
        Ok((metadata_url, content))
    } else {
        Err(load_error(url, "URL does not serve RDF metadata"))
    }
}

fn looks_like_rdf(content: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&content[..content.len().min(512)]).to_ascii_lowercase();
    let head = head.trim_start_matches('\u{feff}').trim_start();
    if head.starts_with("<!doctype html") || head.starts_with("<html") {
        return false;
    }
    head.starts_with('<') || head.starts_with('@') || head.starts_with('#') || head.contains("@prefix")
}

fn fetch_url(url: &str) -> Result<Vec<u8>, MetadataError> {
    let response = reqwest::blocking::get(url).map_err(|e| load_error(url, format!("HTTP request failed: {}", e)))?;
    if !response.status().is_success() {
        return Err(load_error(url, format!("HTTP status {}", response.status())));
    }
    response
        .bytes()
        .map(|b| b.to_vec())
        .map_err(|e| load_error(url, format!("Failed to read response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn archive(entries: &[(&str, &str)]) -> Cursor<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        let mut cursor = writer.finish().unwrap();
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn test_parse_locations() {
        assert_eq!(
            MetadataSource::parse("https://www.hydroshare.org/resource/abc/"),
            MetadataSource::Url("https://www.hydroshare.org/resource/abc/".to_string())
        );
        assert_eq!(
            MetadataSource::parse("bags/abc.zip"),
            MetadataSource::Zip {
                path: PathBuf::from("bags/abc.zip"),
                entry: None
            }
        );
        assert_eq!(
            MetadataSource::parse("abc.zip!abc/data/contents/logan_meta.xml"),
            MetadataSource::Zip {
                path: PathBuf::from("abc.zip"),
                entry: Some("abc/data/contents/logan_meta.xml".to_string())
            }
        );
        assert_eq!(
            MetadataSource::parse("meta.ttl"),
            MetadataSource::File(PathBuf::from("meta.ttl"))
        );
    }

    #[test]
    fn test_resource_source() {
        assert_eq!(
            MetadataSource::resource("abc").describe(),
            "http://www.hydroshare.org/resource/abc/data/resourcemetadata.xml"
        );
    }

    #[test]
    fn test_find_resource_metadata_prefers_shallowest() {
        let names = vec![
            "abc/data/contents/inner/data/resourcemetadata.xml".to_string(),
            "abc/data/resourcemetadata.xml".to_string(),
            "abc/data/resourcemap.xml".to_string(),
        ];
        assert_eq!(find_resource_metadata(&names), Some("abc/data/resourcemetadata.xml"));
        assert_eq!(find_resource_metadata(&names[2..]), None);
    }

    #[test]
    fn test_read_zip_entry_discovers_metadata() {
        let zip = archive(&[
            ("abc/bagit.txt", "BagIt-Version: 0.96"),
            ("abc/data/resourcemetadata.xml", "<rdf:RDF/>"),
        ]);
        let (name, bytes) = read_zip_entry(zip, None).unwrap();
        assert_eq!(name, "abc/data/resourcemetadata.xml");
        assert_eq!(bytes, b"<rdf:RDF/>");
    }

    #[test]
    fn test_read_zip_entry_missing() {
        let zip = archive(&[("abc/bagit.txt", "BagIt-Version: 0.96")]);
        let err = read_zip_entry(zip, None).unwrap_err();
        assert!(err.to_string().contains("No resourcemetadata.xml found"));

        let zip = archive(&[("abc/bagit.txt", "BagIt-Version: 0.96")]);
        assert!(read_zip_entry(zip, Some("abc/other.xml")).is_err());
    }

    #[test]
    fn test_missing_file_is_invalid_path() {
        let source = MetadataSource::File(PathBuf::from("/nonexistent/resourcemetadata.xml"));
        assert!(matches!(load_bytes(&source), Err(MetadataError::InvalidPath(_))));
    }

    #[test]
    fn test_looks_like_rdf() {
        assert!(looks_like_rdf(b"<?xml version=\"1.0\"?><rdf:RDF/>"));
        assert!(looks_like_rdf(b"@prefix dc: <http://purl.org/dc/elements/1.1/> ."));
        assert!(!looks_like_rdf(b"<!DOCTYPE html><html></html>"));
        assert!(!looks_like_rdf(b"{\"json\": true}"));
    }
}
