//! Presets: the rule book persisted as one JSON document per file.

mod codec;
mod lint;
mod store;

pub use codec::{CategoryFailure, Encoded, decode, encode};
pub use lint::{LintIssue, Severity, lint};
pub use store::PresetStore;

use std::path::PathBuf;

use thiserror::Error;

/// Key reported when the document as a whole cannot be parsed or written
pub const DOCUMENT_KEY: &str = "document";

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("Preset file unavailable: {}", path.display())]
    FileUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write preset: {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed preset data under '{key}'")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Preset has no '{0}' section")]
    MissingKey(String),

    #[error("Uniform '{uniform}' under '{key}' carries {len} values, at most 4 are allowed")]
    InvalidUniform {
        key: String,
        uniform: String,
        len: usize,
    },

    #[error("Value '{field}' under '{key}' is not a finite number")]
    NonFinite { key: String, field: String },

    #[error("{} preset categories failed", .0.len())]
    Incomplete(Vec<CategoryFailure>),
}

impl PresetError {
    /// Failures of individual categories, empty for whole-document errors
    pub fn failures(&self) -> &[CategoryFailure] {
        match self {
            Self::Incomplete(failures) => failures,
            _ => &[],
        }
    }
}
