//! Label vocabulary (`meta.json`).
//!
//! The metadata file persists `y_vocab`, the mapping from a composite
//! category-path string (four hierarchical integer tokens joined by `>`) to
//! a dense class index. The same vocabulary must be used for training and
//! prediction; the index range `[0, len)` is validated on load.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, TaxonError};
use crate::taxonomy::NUM_LEVELS;

/// Separator between the four tokens of a category path.
pub const PATH_SEPARATOR: char = '>';

/// Dense mapping between category-path strings and class indices.
#[derive(Debug, Clone)]
pub struct LabelVocab {
    /// Class index to category-path string, indexed by class.
    labels: Vec<String>,
}

impl LabelVocab {
    /// Read the vocabulary from a metadata file holding a `y_vocab` key.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| TaxonError::io(path, e))?;
        let meta: serde_json::Value =
            serde_json::from_str(&raw).map_err(|e| TaxonError::json(path, e))?;
        let y_vocab = meta.get("y_vocab").ok_or(TaxonError::MissingVocab)?;
        let y_vocab: HashMap<String, usize> = serde_json::from_value(y_vocab.clone())
            .map_err(|e| TaxonError::json(path, e))?;
        Self::from_mapping(&y_vocab)
    }

    /// Build the vocabulary from a path-to-index mapping, checking density.
    pub fn from_mapping(y_vocab: &HashMap<String, usize>) -> Result<Self> {
        let mut labels = vec![None; y_vocab.len()];
        for (path, &index) in y_vocab {
            let Some(slot) = labels.get_mut(index) else {
                return Err(TaxonError::SparseVocab(format!(
                    "class index {index} outside [0, {})",
                    y_vocab.len()
                )));
            };
            if slot.is_some() {
                return Err(TaxonError::SparseVocab(format!(
                    "class index {index} is assigned twice"
                )));
            }
            *slot = Some(path.clone());
        }
        // Density follows from the pigeonhole: len slots, no duplicates.
        let labels = labels.into_iter().flatten().collect();
        Ok(Self { labels })
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Category-path string for a class index.
    pub fn label(&self, index: usize) -> Result<&str> {
        self.labels
            .get(index)
            .map(String::as_str)
            .ok_or(TaxonError::UnknownClass(index))
    }
}

/// Split a category path into its four integer tokens.
///
/// A path that does not consist of exactly four integer components is a
/// fatal format error.
pub fn parse_path(path: &str) -> Result<[i64; NUM_LEVELS]> {
    let mut tokens = [0i64; NUM_LEVELS];
    let mut count = 0;
    for part in path.split(PATH_SEPARATOR) {
        if count == NUM_LEVELS {
            return Err(TaxonError::MalformedPath { path: path.into() });
        }
        tokens[count] = part
            .parse()
            .map_err(|_| TaxonError::MalformedPath { path: path.into() })?;
        count += 1;
    }
    if count != NUM_LEVELS {
        return Err(TaxonError::MalformedPath { path: path.into() });
    }
    Ok(tokens)
}
