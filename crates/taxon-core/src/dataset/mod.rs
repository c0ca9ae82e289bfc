//! Columnar on-disk dataset access.
//!
//! A dataset directory holds `data.safetensors` with one tensor per
//! `<split>/<field>` key plus a `pids.json` sidecar mapping each split name
//! to its product ids. All fields of a split are aligned by row; any length
//! or shape disagreement is fatal.

pub mod batch;
pub mod threadsafe;

use std::collections::HashMap;
use std::path::Path;

use candle_core::{DType, Device, Tensor};

use crate::error::{Result, TaxonError};

pub use batch::{Batch, BatchCursor, SampleGenerator};
pub use threadsafe::ThreadsafeIter;

/// File name of the tensor container inside a dataset directory.
pub const DATA_FILE: &str = "data.safetensors";
/// File name of the product-id sidecar inside a dataset directory.
pub const PID_FILE: &str = "pids.json";

/// Numeric feature fields fed to the network, in input order.
pub const FEATURE_FIELDS: [&str; 2] = ["embd_word", "img_feat"];
/// Label field.
pub const LABEL_FIELD: &str = "cate";

/// An opened dataset directory, read-only for the duration of one run.
pub struct DatasetFile {
    tensors: HashMap<String, Tensor>,
    pids: HashMap<String, Vec<String>>,
}

impl DatasetFile {
    /// Load all tensors and product ids from a dataset directory.
    pub fn open(dir: &Path, device: &Device) -> Result<Self> {
        let data_path = dir.join(DATA_FILE);
        let tensors = candle_core::safetensors::load(&data_path, device)?;

        let pid_path = dir.join(PID_FILE);
        let raw = std::fs::read_to_string(&pid_path)
            .map_err(|e| TaxonError::io(&pid_path, e))?;
        let pids: HashMap<String, Vec<String>> =
            serde_json::from_str(&raw).map_err(|e| TaxonError::json(&pid_path, e))?;

        Ok(Self { tensors, pids })
    }

    fn field(&self, split: &str, field: &str) -> Result<Tensor> {
        self.tensors
            .get(&format!("{split}/{field}"))
            .cloned()
            .ok_or_else(|| TaxonError::MissingField {
                split: split.into(),
                field: field.into(),
            })
    }

    /// Open one split as an aligned, validated view.
    pub fn split(&self, name: &str) -> Result<Split> {
        let embd_word = self.field(name, FEATURE_FIELDS[0])?;
        let img_feat = self.field(name, FEATURE_FIELDS[1])?;
        let cate = self.field(name, LABEL_FIELD)?;
        let pids = self
            .pids
            .get(name)
            .cloned()
            .ok_or_else(|| TaxonError::MissingField {
                split: name.into(),
                field: "pid".into(),
            })?;
        Split::from_parts(name, embd_word, img_feat, cate, pids)
    }
}

/// One named partition of the dataset with aligned fields.
#[derive(Debug)]
pub struct Split {
    name: String,
    embd_word: Tensor,
    img_feat: Tensor,
    cate: Tensor,
    pids: Vec<String>,
    rows: usize,
}

impl Split {
    /// Build a split from its fields, validating alignment.
    pub fn from_parts(
        name: &str,
        embd_word: Tensor,
        img_feat: Tensor,
        cate: Tensor,
        pids: Vec<String>,
    ) -> Result<Self> {
        let mismatch = |detail: String| TaxonError::FieldMismatch {
            split: name.into(),
            detail,
        };

        let (rows, _) = embd_word
            .dims2()
            .map_err(|_| mismatch("embd_word must be a rank-2 tensor".into()))?;
        let (img_rows, _) = img_feat
            .dims2()
            .map_err(|_| mismatch("img_feat must be a rank-2 tensor".into()))?;
        let cate_rows = cate
            .dims1()
            .map_err(|_| mismatch("cate must be a rank-1 tensor".into()))?;

        if img_rows != rows || cate_rows != rows || pids.len() != rows {
            return Err(mismatch(format!(
                "embd_word={rows} img_feat={img_rows} cate={cate_rows} pid={}",
                pids.len()
            )));
        }

        let cate = cate.to_dtype(DType::U32)?;
        tracing::debug!(split = name, rows, "opened dataset split");

        Ok(Self {
            name: name.into(),
            embd_word,
            img_feat,
            cate,
            pids,
            rows,
        })
    }

    /// Split name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows shared by all fields.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Width of the word-embedding field.
    pub fn embd_dim(&self) -> usize {
        self.embd_word.dim(1).unwrap_or(0)
    }

    /// Width of the image-feature field.
    pub fn img_dim(&self) -> usize {
        self.img_feat.dim(1).unwrap_or(0)
    }

    /// Product ids aligned with the rows of this split.
    pub fn pids(&self) -> &[String] {
        &self.pids
    }

    /// Materialize the `[left, right)` row slice of every field.
    pub fn slice(&self, left: usize, right: usize) -> Result<Batch> {
        let len = right - left;
        Ok(Batch {
            embd_word: self.embd_word.narrow(0, left, len)?,
            img_feat: self.img_feat.narrow(0, left, len)?,
            cate: self.cate.narrow(0, left, len)?,
            rows: len,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::split_with_rows;
    use super::*;

    #[test]
    fn split_reports_dimensions() {
        let split = split_with_rows(7);
        assert_eq!(split.rows(), 7);
        assert_eq!(split.embd_dim(), 3);
        assert_eq!(split.img_dim(), 2);
        assert_eq!(split.pids().len(), 7);
    }

    #[test]
    fn slice_keeps_row_alignment() {
        let split = split_with_rows(10);
        let batch = split.slice(4, 7).unwrap();
        assert_eq!(batch.rows, 3);
        assert_eq!(batch.embd_word.dims(), &[3, 3]);
        assert_eq!(batch.img_feat.dims(), &[3, 2]);
        assert_eq!(batch.cate.to_vec1::<u32>().unwrap(), vec![4, 5, 6]);
    }

    #[test]
    fn mismatched_fields_are_rejected() {
        let device = Device::Cpu;
        let embd = Tensor::zeros((4, 3), DType::F32, &device).unwrap();
        let img = Tensor::zeros((5, 2), DType::F32, &device).unwrap();
        let cate = Tensor::zeros(4, DType::U32, &device).unwrap();
        let pids = (0..4).map(|i| format!("P{i}")).collect();
        let err = Split::from_parts("bad", embd, img, cate, pids).unwrap_err();
        assert!(matches!(err, TaxonError::FieldMismatch { .. }));
    }

    #[test]
    fn pid_count_must_match_rows() {
        let device = Device::Cpu;
        let embd = Tensor::zeros((4, 3), DType::F32, &device).unwrap();
        let img = Tensor::zeros((4, 2), DType::F32, &device).unwrap();
        let cate = Tensor::zeros(4, DType::U32, &device).unwrap();
        let err = Split::from_parts("bad", embd, img, cate, vec!["P0".into()]).unwrap_err();
        assert!(matches!(err, TaxonError::FieldMismatch { .. }));
    }
}
