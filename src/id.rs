//! Node identifier classification
//!
//! A node in a serialized graph is either externally addressable (it carries
//! a persistent IRI) or internal (a blank node that only groups the fields of
//! a nested record). The two are told apart purely by identifier shape.

use ulid::Ulid;

use crate::vocab::HSRESOURCE;

/// Marker prefix of internal node identifiers in JSON-LD documents
pub const INTERNAL_PREFIX: &str = "_:N";

/// Classification of a node identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdKind {
    /// Internal node: "_:N0123..."
    Internal,
    /// Blank node produced by some other labelling scheme: "_:b0"
    Blank,
    /// Resource landing page: "http://www.hydroshare.org/resource/<id>"
    Resource,
    /// Any other absolute IRI
    Absolute,
    /// Anything else (relative references, bare strings)
    Relative,
}

/// Classify a node identifier
pub fn classify_id(id: &str) -> IdKind {
    if id.starts_with(INTERNAL_PREFIX) {
        IdKind::Internal
    } else if id.starts_with("_:") {
        IdKind::Blank
    } else if id.starts_with(HSRESOURCE) {
        IdKind::Resource
    } else if id.contains("://") || id.starts_with("urn:") || id.starts_with("mailto:") {
        IdKind::Absolute
    } else {
        IdKind::Relative
    }
}

/// Check whether an identifier names an internal node under `prefix`
pub fn is_internal(id: &str, prefix: &str) -> bool {
    id.starts_with(prefix)
}

/// Mint a fresh blank node label (without the `_:` marker)
///
/// Labels start with `N` so that, once written as `_:N...`, they match
/// [`INTERNAL_PREFIX`].
pub fn new_blank_label() -> String {
    format!("N{}", Ulid::new())
}

/// Build the landing-page IRI of a resource
pub fn resource_iri(resource_id: &str) -> String {
    format!("{}{}", HSRESOURCE, resource_id)
}

/// Extract the resource id from a landing-page IRI or aggregation IRI
///
/// "http://www.hydroshare.org/resource/abc/" -> "abc"
/// "http://www.hydroshare.org/resource/abc/data/contents/x.tif" -> "abc"
pub fn resource_id_from_iri(iri: &str) -> Option<&str> {
    let rest = iri.strip_prefix(HSRESOURCE)?;
    let id = rest.split('/').next()?;
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}
