//! Category taxonomy (`cate1.json`).
//!
//! Four independent mappings from category name to numeric code, one per
//! hierarchy level (`b`, `m`, `s`, `d`). The driver only needs the reverse
//! direction, code to name, for human-readable output.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, TaxonError};

/// Number of hierarchy levels in a category path.
pub const NUM_LEVELS: usize = 4;

/// The four taxonomy levels from coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    B = 0,
    M = 1,
    S = 2,
    D = 3,
}

impl Level {
    /// All levels in path order.
    pub const ALL: [Level; NUM_LEVELS] = [Level::B, Level::M, Level::S, Level::D];
}

/// Category name to code mappings for the four hierarchy levels.
#[derive(Debug, Clone, Deserialize)]
pub struct Taxonomy {
    b: HashMap<String, i64>,
    m: HashMap<String, i64>,
    s: HashMap<String, i64>,
    d: HashMap<String, i64>,
}

impl Taxonomy {
    /// Read the taxonomy from a `cate1.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| TaxonError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|e| TaxonError::json(path, e))
    }

    fn level(&self, level: Level) -> &HashMap<String, i64> {
        match level {
            Level::B => &self.b,
            Level::M => &self.m,
            Level::S => &self.s,
            Level::D => &self.d,
        }
    }

    /// Build the code-to-name reverse lookups for all levels.
    pub fn inverted(&self) -> InvertedTaxonomy {
        let levels = Level::ALL.map(|l| {
            self.level(l)
                .iter()
                .map(|(name, &code)| (code, name.clone()))
                .collect()
        });
        InvertedTaxonomy { levels }
    }
}

/// Code-to-name lookups, one map per hierarchy level.
#[derive(Debug, Clone)]
pub struct InvertedTaxonomy {
    levels: [HashMap<i64, String>; NUM_LEVELS],
}

impl InvertedTaxonomy {
    /// Resolve a category code at the given level to its name.
    pub fn name(&self, level: Level, code: i64) -> Option<&str> {
        self.levels[level as usize].get(&code).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Taxonomy {
        serde_json::from_str(
            r#"{
                "b": {"fashion": 1, "food": 2},
                "m": {"shoes": 10},
                "s": {"sneakers": 100},
                "d": {"unknown": -1}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn inverted_lookup_per_level() {
        let inv = sample().inverted();
        assert_eq!(inv.name(Level::B, 1), Some("fashion"));
        assert_eq!(inv.name(Level::B, 2), Some("food"));
        assert_eq!(inv.name(Level::M, 10), Some("shoes"));
        assert_eq!(inv.name(Level::D, -1), Some("unknown"));
        assert_eq!(inv.name(Level::S, 999), None);
    }
}
