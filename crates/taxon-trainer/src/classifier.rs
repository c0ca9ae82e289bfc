//! Training and prediction drivers.
//!
//! [`ClassifierBone`] wires the columnar dataset, the batch generators, and
//! the network together: `train` fits the model with a best-validation-loss
//! checkpoint, `predict` runs one deterministic pass over a test split and
//! writes ranked top-N predictions.

use std::path::{Path, PathBuf};

use anyhow::Context;
use candle_core::{DType, Device};
use candle_nn::{AdamW, Optimizer, ParamsAdamW, VarBuilder, VarMap};

use taxon_core::dataset::{Batch, DatasetFile, SampleGenerator, Split, ThreadsafeIter};
use taxon_core::model::{MetricRegistry, REQUIRED_METRICS, cross_entropy_loss};
use taxon_core::{Config, LabelVocab, MainNet, MainNetConfig, TaxonError, topk};

use crate::checkpoint::BestLossCheckpoint;
use crate::writer::{RowPrediction, write_prediction_result};

/// File name of the persisted weights inside a model directory.
pub const WEIGHTS_FILE: &str = "weights.safetensors";
/// File name of the persisted architecture inside a model directory.
pub const MODEL_FILE: &str = "model.json";
/// File name of the metadata file inside a data directory.
pub const META_FILE: &str = "meta.json";

/// How many ranked classes each prediction line carries.
pub const TOP_N: usize = 5;

/// Number of training batches per epoch for a split.
pub fn steps_for(rows: usize, batch_size: usize) -> usize {
    rows.div_ceil(batch_size)
}

/// Orchestrates training and prediction for one network.
pub struct ClassifierBone {
    name: String,
    config: Config,
    device: Device,
}

impl ClassifierBone {
    pub fn new(name: &str, config: Config) -> Self {
        Self {
            name: name.into(),
            config,
            device: Device::Cpu,
        }
    }

    /// Train on the `train`/`dev` splits under `data_root`, writing the
    /// architecture and the best weights to `out_dir`.
    pub fn train(&self, data_root: &Path, out_dir: &Path) -> anyhow::Result<()> {
        let meta_path = data_root.join(META_FILE);
        let vocab = LabelVocab::load(&meta_path)
            .with_context(|| format!("loading metadata from {}", meta_path.display()))?;
        let num_classes = vocab.len();

        let dataset = DatasetFile::open(data_root, &self.device)
            .with_context(|| format!("opening dataset at {}", data_root.display()))?;
        let train = dataset.split("train")?;
        let dev = dataset.split("dev")?;

        std::fs::create_dir_all(out_dir).map_err(|e| TaxonError::CreateDir {
            path: out_dir.display().to_string(),
            source: e,
        })?;

        tracing::info!(net = %self.name, num_classes, "# of classes");
        tracing::info!(rows = train.rows(), "# of train samples");
        tracing::info!(rows = dev.rows(), "# of dev samples");

        let net_config =
            MainNetConfig::new(train.embd_dim(), train.img_dim(), num_classes);
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &self.device);
        let net = MainNet::new(&net_config, vb)?;
        let mut optimizer = AdamW::new(varmap.all_vars(), ParamsAdamW::default())?;

        let batch_size = self.config.batch_size;
        let steps_per_epoch = steps_for(train.rows(), batch_size);
        let validation_steps = steps_for(dev.rows(), batch_size);

        let model_path = out_dir.join(MODEL_FILE);
        let raw = serde_json::to_string_pretty(&net_config)?;
        std::fs::write(&model_path, raw).map_err(|e| TaxonError::io(&model_path, e))?;

        let weights_path = out_dir.join(WEIGHTS_FILE);
        let mut checkpoint = BestLossCheckpoint::new();
        let mut train_gen = SampleGenerator::new(&train, batch_size, false)?;

        for epoch in 0..self.config.num_epochs_train {
            let mut train_loss = 0f32;
            let mut train_rows = 0usize;
            for _ in 0..steps_per_epoch {
                let batch = next_batch(&mut train_gen)?;
                let logits = net.forward(&batch.embd_word, &batch.img_feat)?;
                let loss = cross_entropy_loss(&logits, &batch.cate)?;
                optimizer.backward_step(&loss)?;
                train_loss += loss.to_scalar::<f32>()? * batch.rows as f32;
                train_rows += batch.rows;
            }
            let train_loss = train_loss / train_rows as f32;

            let (val_loss, val_acc) =
                self.evaluate(&net, &dev, batch_size, validation_steps)?;
            tracing::info!(
                epoch = epoch + 1,
                epochs = self.config.num_epochs_train,
                train_loss,
                val_loss,
                val_acc,
                "epoch complete"
            );

            if checkpoint.improved(val_loss) {
                varmap.save(&weights_path)?;
                tracing::info!(
                    epoch = epoch + 1,
                    val_loss,
                    path = %weights_path.display(),
                    "checkpoint saved"
                );
            }
        }

        Ok(())
    }

    /// Validation loss and top-1 accuracy over one pass of `split`.
    fn evaluate(
        &self,
        net: &MainNet,
        split: &Split,
        batch_size: usize,
        steps: usize,
    ) -> anyhow::Result<(f32, f32)> {
        let mut generator = SampleGenerator::new(split, batch_size, true)?;
        let mut loss = 0f32;
        let mut correct = 0f32;
        let mut rows = 0usize;
        for _ in 0..steps {
            let batch = next_batch(&mut generator)?;
            let logits = net.forward(&batch.embd_word, &batch.img_feat)?;
            loss += taxon_core::model::custom_loss(&logits, &batch.cate)? * batch.rows as f32;
            correct += taxon_core::model::top1_acc(&logits, &batch.cate)? * batch.rows as f32;
            rows += batch.rows;
        }
        Ok((loss / rows as f32, correct / rows as f32))
    }

    /// Score `test_div` under `test_root` with the model in `model_root` and
    /// write ranked predictions to `out_path`.
    ///
    /// `registry` must resolve the evaluation functions registered at
    /// training time; a missing identifier fails the load.
    #[allow(clippy::too_many_arguments)]
    pub fn predict(
        &self,
        data_root: &Path,
        model_root: &Path,
        test_root: &Path,
        test_div: &str,
        out_path: &Path,
        registry: &MetricRegistry,
        readable: Option<&taxon_core::InvertedTaxonomy>,
    ) -> anyhow::Result<()> {
        let meta_path = data_root.join(META_FILE);
        let vocab = LabelVocab::load(&meta_path)
            .with_context(|| format!("loading metadata from {}", meta_path.display()))?;
        tracing::info!(net = %self.name, num_classes = vocab.len(), "# of classes(train)");

        let (net, net_config) = self.load_model(model_root, registry)?;
        anyhow::ensure!(
            net_config.num_classes == vocab.len(),
            "model predicts {} classes but the vocabulary holds {}",
            net_config.num_classes,
            vocab.len()
        );

        let dataset = DatasetFile::open(test_root, &self.device)
            .with_context(|| format!("opening dataset at {}", test_root.display()))?;
        let test = dataset.split(test_div)?;
        let total_rows = test.rows();

        let generator = SampleGenerator::new(&test, self.config.batch_size, true)?;
        // Defensive wrapper: the driving loop is single-threaded today, but
        // the generator contract allows concurrent consumers.
        let batches = ThreadsafeIter::new(generator);

        let mut predictions: Vec<RowPrediction> = Vec::with_capacity(total_rows);
        let mut processed = 0usize;
        while let Some(batch) = batches.next() {
            let batch = batch?;
            self.score_batch(&net, &batch, &mut predictions)?;
            processed += batch.rows;
            tracing::debug!(processed, total_rows, "prediction progress");
        }
        tracing::info!(processed, total_rows, "prediction pass complete");

        write_prediction_result(test.pids(), &predictions, &vocab, out_path, readable)?;
        Ok(())
    }

    /// Rebuild the architecture from `model.json` and load the checkpointed
    /// weights, gated on the evaluation-function registry.
    fn load_model(
        &self,
        model_root: &Path,
        registry: &MetricRegistry,
    ) -> anyhow::Result<(MainNet, MainNetConfig)> {
        registry.require(REQUIRED_METRICS)?;

        let model_path = model_root.join(MODEL_FILE);
        let raw = std::fs::read_to_string(&model_path)
            .map_err(|e| TaxonError::io(&model_path, e))?;
        let net_config: MainNetConfig =
            serde_json::from_str(&raw).map_err(|e| TaxonError::json(&model_path, e))?;

        let mut varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &self.device);
        let net = MainNet::new(&net_config, vb)?;
        let weights_path = model_root.join(WEIGHTS_FILE);
        varmap
            .load(&weights_path)
            .with_context(|| format!("loading weights from {}", weights_path.display()))?;
        Ok((net, net_config))
    }

    fn score_batch(
        &self,
        net: &MainNet,
        batch: &Batch,
        predictions: &mut Vec<RowPrediction>,
    ) -> anyhow::Result<()> {
        let probs = net.predict_proba(&batch.embd_word, &batch.img_feat)?;
        for row in probs.to_vec2::<f32>()? {
            let ranked = topk::top_n(&row, TOP_N);
            let top1 = ranked.first().map(|&(i, _)| i).unwrap_or_default();
            predictions.push(RowPrediction {
                top1,
                top_n: ranked.iter().map(|&(i, _)| i).collect(),
                confidences: ranked.iter().map(|&(_, c)| c).collect(),
            });
        }
        Ok(())
    }
}

fn next_batch(generator: &mut SampleGenerator<'_>) -> anyhow::Result<Batch> {
    match generator.next() {
        Some(batch) => Ok(batch?),
        None => anyhow::bail!("batch generator ended before the requested step count"),
    }
}

/// Paths of the artifacts a training run leaves in `out_dir`.
pub fn artifact_paths(out_dir: &Path) -> (PathBuf, PathBuf) {
    (out_dir.join(WEIGHTS_FILE), out_dir.join(MODEL_FILE))
}
