//! Driver configuration.
//!
//! Loaded once at process start from `config.json` and passed explicitly to
//! the orchestrators; there is no module-level shared state.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, TaxonError};

/// Recognized driver options.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Batch size used for training, validation, and prediction.
    pub batch_size: usize,
    /// Number of training epochs.
    pub num_epochs_train: usize,
}

impl Config {
    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| TaxonError::io(path, e))?;
        let config: Self =
            serde_json::from_str(&raw).map_err(|e| TaxonError::json(path, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).map_err(|e| {
            TaxonError::InvalidConfig(e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(TaxonError::InvalidConfig(
                "batch_size must be at least 1".into(),
            ));
        }
        if self.num_epochs_train == 0 {
            return Err(TaxonError::InvalidConfig(
                "num_epochs_train must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_config() {
        let config = Config::from_json(r#"{"batch_size": 32, "num_epochs_train": 10}"#).unwrap();
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.num_epochs_train, 10);
    }

    #[test]
    fn rejects_zero_batch_size() {
        let err = Config::from_json(r#"{"batch_size": 0, "num_epochs_train": 10}"#).unwrap_err();
        assert!(matches!(err, TaxonError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_zero_epochs() {
        let err = Config::from_json(r#"{"batch_size": 32, "num_epochs_train": 0}"#).unwrap_err();
        assert!(matches!(err, TaxonError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_missing_keys() {
        assert!(Config::from_json(r#"{"batch_size": 32}"#).is_err());
    }
}
