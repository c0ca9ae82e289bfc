//! Evaluation functions and the registry gating model loads.
//!
//! Training registers its loss and metric under fixed names; loading a
//! trained model for prediction requires a registry carrying the same
//! identifiers. A missing identifier fails the load instead of silently
//! scoring with mismatched functions.

use std::collections::HashMap;

use candle_core::{D, Tensor};

use crate::error::{Result, TaxonError};

/// An evaluation function reducing `(logits, labels)` to a scalar.
pub type MetricFn = fn(&Tensor, &Tensor) -> Result<f32>;

/// Identifiers every trained model records and prediction must resolve.
pub const REQUIRED_METRICS: &[&str] = &["custom_loss", "top1_acc"];

/// Cross-entropy loss as a tensor, for the backward pass.
pub fn cross_entropy_loss(logits: &Tensor, labels: &Tensor) -> Result<Tensor> {
    Ok(candle_nn::loss::cross_entropy(logits, labels)?)
}

/// Mean cross-entropy over a batch.
pub fn custom_loss(logits: &Tensor, labels: &Tensor) -> Result<f32> {
    Ok(cross_entropy_loss(logits, labels)?.to_scalar::<f32>()?)
}

/// Fraction of rows whose arg-max logit matches the label.
pub fn top1_acc(logits: &Tensor, labels: &Tensor) -> Result<f32> {
    let preds = logits.argmax(D::Minus1)?.to_vec1::<u32>()?;
    let labels = labels.to_vec1::<u32>()?;
    if preds.is_empty() {
        return Ok(0.0);
    }
    let correct = preds
        .iter()
        .zip(labels.iter())
        .filter(|(p, l)| p == l)
        .count();
    Ok(correct as f32 / preds.len() as f32)
}

/// Named evaluation functions handed to the model-loading path.
pub struct MetricRegistry {
    metrics: HashMap<&'static str, MetricFn>,
}

impl MetricRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            metrics: HashMap::new(),
        }
    }

    /// The registry used at training time: `custom_loss` and `top1_acc`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("custom_loss", custom_loss);
        registry.register("top1_acc", top1_acc);
        registry
    }

    /// Register an evaluation function under a name.
    pub fn register(&mut self, name: &'static str, metric: MetricFn) {
        self.metrics.insert(name, metric);
    }

    /// Resolve a registered function by name.
    pub fn get(&self, name: &str) -> Result<MetricFn> {
        self.metrics
            .get(name)
            .copied()
            .ok_or_else(|| TaxonError::MissingMetric(name.into()))
    }

    /// Fail unless every named function is registered.
    pub fn require(&self, names: &[&str]) -> Result<()> {
        for name in names {
            self.get(name)?;
        }
        Ok(())
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}
