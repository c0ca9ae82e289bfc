//! The category classification network.
//!
//! Features arrive pre-extracted: a word-embedding vector and an image
//! feature vector per product. The network concatenates the two branches,
//! applies one hidden layer with ReLU, and projects to class logits.

use candle_core::{D, Tensor};
use candle_nn::{Linear, Module, VarBuilder, linear};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default hidden width between the feature branches and the class logits.
pub const DEFAULT_HIDDEN_DIM: usize = 256;

/// Shape parameters of [`MainNet`], persisted alongside the weights so
/// prediction rebuilds the exact training-time architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainNetConfig {
    /// Width of the word-embedding input.
    pub embd_dim: usize,
    /// Width of the image-feature input.
    pub img_dim: usize,
    /// Hidden layer width.
    pub hidden_dim: usize,
    /// Number of output classes.
    pub num_classes: usize,
}

impl MainNetConfig {
    /// Configuration with the default hidden width.
    pub fn new(embd_dim: usize, img_dim: usize, num_classes: usize) -> Self {
        Self {
            embd_dim,
            img_dim,
            hidden_dim: DEFAULT_HIDDEN_DIM,
            num_classes,
        }
    }
}

/// Two-branch feed-forward classifier over pre-extracted features.
pub struct MainNet {
    fc1: Linear,
    out: Linear,
}

impl MainNet {
    /// Build the network, creating or resolving variables through `vb`.
    pub fn new(config: &MainNetConfig, vb: VarBuilder) -> Result<Self> {
        let fc1 = linear(
            config.embd_dim + config.img_dim,
            config.hidden_dim,
            vb.pp("fc1"),
        )?;
        let out = linear(config.hidden_dim, config.num_classes, vb.pp("out"))?;
        Ok(Self { fc1, out })
    }

    /// Compute unnormalized class logits `[rows, num_classes]`.
    pub fn forward(&self, embd_word: &Tensor, img_feat: &Tensor) -> Result<Tensor> {
        let x = Tensor::cat(&[embd_word, img_feat], D::Minus1)?;
        let x = self.fc1.forward(&x)?.relu()?;
        Ok(self.out.forward(&x)?)
    }

    /// Per-row class probabilities via softmax over the logits.
    pub fn predict_proba(&self, embd_word: &Tensor, img_feat: &Tensor) -> Result<Tensor> {
        let logits = self.forward(embd_word, img_feat)?;
        Ok(candle_nn::ops::softmax(&logits, D::Minus1)?)
    }
}
