//! # Taxon Core
//!
//! Building blocks of the taxon product-category classification driver:
//! columnar dataset access with sequential batching, a thread-safe iterator
//! wrapper, the classification network with its evaluation-function
//! registry, and deterministic top-N extraction.
//!
//! ## Quick Start
//!
//! ```rust
//! use taxon_core::topk::top_n;
//!
//! let ranked = top_n(&[0.1, 0.5, 0.05, 0.3, 0.05], 3);
//! assert_eq!(ranked, vec![(1, 0.5), (3, 0.3), (0, 0.1)]);
//! ```
pub mod config;
pub mod dataset;
pub mod error;
pub mod model;
pub mod taxonomy;
pub mod topk;
pub mod vocab;

// Re-export primary API
pub use config::Config;
pub use dataset::{Batch, BatchCursor, DatasetFile, SampleGenerator, Split, ThreadsafeIter};
pub use error::{Result, TaxonError};
pub use model::{MainNet, MainNetConfig, MetricRegistry, REQUIRED_METRICS};
pub use taxonomy::{InvertedTaxonomy, Level, Taxonomy};
pub use vocab::{LabelVocab, parse_path};
