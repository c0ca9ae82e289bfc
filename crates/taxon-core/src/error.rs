use std::path::Path;

use thiserror::Error;

/// Errors that can occur during taxon core operations.
#[derive(Debug, Error)]
pub enum TaxonError {
    /// A file could not be read or written.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path of the file involved.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A JSON file could not be parsed.
    #[error("malformed JSON in {path}: {source}")]
    Json {
        /// Path of the file involved.
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The output directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The metadata file has no label vocabulary.
    #[error("metadata is missing the `y_vocab` key")]
    MissingVocab,

    /// The label vocabulary does not cover a dense index range.
    #[error("label vocabulary indices are not dense: {0}")]
    SparseVocab(String),

    /// A category path did not split into four integer tokens.
    #[error("malformed category path {path:?}: expected four integer tokens")]
    MalformedPath {
        /// The offending category-path string.
        path: String,
    },

    /// A class index has no entry in the vocabulary.
    #[error("class index {0} is outside the label vocabulary")]
    UnknownClass(usize),

    /// A dataset split lacks one of its required fields.
    #[error("dataset split {split:?} is missing field {field:?}")]
    MissingField { split: String, field: String },

    /// Fields of one split disagree on row count or shape.
    #[error("field mismatch in split {split:?}: {detail}")]
    FieldMismatch { split: String, detail: String },

    /// A zero-row split was handed to the batch generator.
    #[error("empty split: the batch generator requires at least one row")]
    EmptySplit,

    /// A zero batch size was handed to the batch generator.
    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    /// A configuration value failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Model loading was attempted without a required evaluation function.
    #[error("evaluation function {0:?} is not registered")]
    MissingMetric(String),

    /// Candle ML framework error.
    #[error("tensor error: {0}")]
    Candle(#[from] candle_core::Error),
}

impl TaxonError {
    /// Attach a path to an I/O error.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Attach a path to a JSON parse error.
    pub fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type alias for taxon operations.
pub type Result<T> = std::result::Result<T, TaxonError>;
