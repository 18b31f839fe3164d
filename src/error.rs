//! Error types for metadata validation and graph conversion

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A single field-level constraint violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted field path, e.g. `creators[1].email` (empty for the record itself)
    pub path: String,
    /// Human-readable reason
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Every violation found while building or rebuilding one record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    /// Title of the record type that failed
    pub title: String,
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// Find the first violation reported at `path`
    pub fn at(&self, path: &str) -> Option<&Violation> {
        self.violations.iter().find(|v| v.path == path)
    }

    /// Check whether any violation message contains `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.violations.iter().any(|v| v.message.contains(needle))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.violations.len();
        write!(
            f,
            "{} validation error{} for {}",
            count,
            if count == 1 { "" } else { "s" },
            self.title
        )?;
        for violation in &self.violations {
            write!(f, "\n  {}", violation)?;
        }
        Ok(())
    }
}

/// Inconsistent node references found while walking a graph document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphIntegrityError {
    #[error("Dangling reference: no internal node with id '{0}'")]
    DanglingReference(String),

    #[error("Reference cycle through internal node '{0}'")]
    Cycle(String),

    #[error("No subject '{0}' in graph")]
    MissingSubject(String),

    #[error("Graph entry is not a node object: {0}")]
    NotANode(String),
}

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    GraphIntegrity(#[from] GraphIntegrityError),

    #[error("Failed to process {format} data: {reason}")]
    Rdf { format: String, reason: String },

    #[error("Failed to load metadata from {path}: {reason}")]
    LoadError { path: String, reason: String },

    #[error("Unknown record type '{0}'")]
    UnknownRecordType(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_violation() {
        let err = ValidationError {
            title: "Box Coverage Metadata".to_string(),
            violations: vec![
                Violation {
                    path: "northlimit".to_string(),
                    message: "ensure this value is less than 90".to_string(),
                },
                Violation {
                    path: String::new(),
                    message: "North latitude [1] must be greater than or equal to South latitude [2]"
                        .to_string(),
                },
            ],
        };

        let text = err.to_string();
        assert!(text.starts_with("2 validation errors for Box Coverage Metadata"));
        assert!(text.contains("northlimit: ensure this value is less than 90"));
        assert!(err.at("northlimit").is_some());
        assert!(err.mentions("South latitude [2]"));
    }
}
