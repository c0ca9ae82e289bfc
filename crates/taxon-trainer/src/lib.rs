//! # Taxon Trainer
//!
//! Training and prediction drivers for the taxon category classifier. The
//! heavy lifting (dataset access, batching, the network) lives in
//! `taxon-core`; this crate orchestrates it: epoch loops with a
//! best-validation-loss checkpoint, the single-pass prediction driver, and
//! the delimited result writer.

pub mod checkpoint;
pub mod classifier;
pub mod writer;

pub use checkpoint::BestLossCheckpoint;
pub use classifier::{ClassifierBone, MODEL_FILE, META_FILE, TOP_N, WEIGHTS_FILE, steps_for};
pub use writer::{RowPrediction, write_prediction_result};
