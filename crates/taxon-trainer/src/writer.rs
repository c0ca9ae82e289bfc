//! Delimited prediction output.
//!
//! One line per product id: the pid followed by, for each top-N class, the
//! confidence and the four decoded category-path tokens, all tab-separated.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use taxon_core::taxonomy::Level;
use taxon_core::vocab::parse_path;
use taxon_core::{InvertedTaxonomy, LabelVocab, Result, TaxonError};

/// Ranked predictions for one row.
pub struct RowPrediction {
    /// Arg-max class index.
    pub top1: usize,
    /// Top-N class indices, descending by confidence.
    pub top_n: Vec<usize>,
    /// Confidences aligned with `top_n`.
    pub confidences: Vec<f32>,
}

/// Fallback line for a pid with no prediction. Unreachable while every
/// batch completes, but part of the documented output contract.
fn no_answer(pid: &str) -> String {
    format!("{pid}\t-1\t-1\t-1\t-1")
}

fn format_line(
    pid: &str,
    prediction: &RowPrediction,
    vocab: &LabelVocab,
    readable: Option<&InvertedTaxonomy>,
) -> Result<String> {
    debug_assert_eq!(prediction.top_n.first(), Some(&prediction.top1));

    let mut line = pid.to_string();
    for (&class, &confidence) in prediction.top_n.iter().zip(&prediction.confidences) {
        let tokens = parse_path(vocab.label(class)?)?;
        line.push_str(&format!("\t{confidence}"));
        for (level, token) in Level::ALL.into_iter().zip(tokens) {
            match readable.and_then(|inv| inv.name(level, token)) {
                Some(name) => line.push_str(&format!("\t{name}")),
                None => line.push_str(&format!("\t{token}")),
            }
        }
    }
    Ok(line)
}

/// Write one line per product id to `out_path`, truncating any existing
/// file.
///
/// Line order follows first-seen insertion order of the pids; a duplicate
/// pid silently overwrites the earlier record while keeping its original
/// position. Existing output consumers depend on this, so it is kept as a
/// documented quirk rather than fixed.
pub fn write_prediction_result(
    pids: &[String],
    predictions: &[RowPrediction],
    vocab: &LabelVocab,
    out_path: &Path,
    readable: Option<&InvertedTaxonomy>,
) -> Result<()> {
    let mut order: Vec<&str> = Vec::with_capacity(pids.len());
    let mut lines: HashMap<&str, String> = HashMap::with_capacity(pids.len());

    for (pid, prediction) in pids.iter().zip(predictions) {
        if !lines.contains_key(pid.as_str()) {
            order.push(pid);
        }
        lines.insert(pid, format_line(pid, prediction, vocab, readable)?);
    }

    let file = File::create(out_path).map_err(|e| TaxonError::io(out_path, e))?;
    let mut out = BufWriter::new(file);
    for pid in order {
        let line = lines.get(pid).cloned().unwrap_or_else(|| no_answer(pid));
        writeln!(out, "{line}").map_err(|e| TaxonError::io(out_path, e))?;
    }
    out.flush().map_err(|e| TaxonError::io(out_path, e))?;

    tracing::info!(rows = pids.len(), path = %out_path.display(), "wrote predictions");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;

    fn vocab(entries: &[(&str, usize)]) -> LabelVocab {
        let mapping: StdHashMap<String, usize> =
            entries.iter().map(|&(s, i)| (s.to_string(), i)).collect();
        LabelVocab::from_mapping(&mapping).unwrap()
    }

    fn tmp_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("taxon-writer-{tag}-{}.tsv", std::process::id()))
    }

    fn single(top_n: Vec<usize>, confidences: Vec<f32>) -> RowPrediction {
        RowPrediction {
            top1: top_n[0],
            top_n,
            confidences,
        }
    }

    #[test]
    fn round_trips_decoded_tokens() {
        let vocab = vocab(&[("1>2>3>4", 0)]);
        let path = tmp_path("roundtrip");
        write_prediction_result(
            &["P0001".to_string()],
            &[single(vec![0], vec![0.9])],
            &vocab,
            &path,
            None,
        )
        .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "P0001\t0.9\t1\t2\t3\t4\n");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn malformed_path_is_a_format_error() {
        let vocab = vocab(&[("1>2>3", 0)]);
        let path = tmp_path("malformed");
        let err = write_prediction_result(
            &["P0001".to_string()],
            &[single(vec![0], vec![0.9])],
            &vocab,
            &path,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, TaxonError::MalformedPath { .. }));
    }

    #[test]
    fn duplicate_pid_overwrites_but_keeps_position() {
        let vocab = vocab(&[("1>2>3>4", 0), ("5>6>7>8", 1)]);
        let path = tmp_path("dup");
        write_prediction_result(
            &["A".to_string(), "B".to_string(), "A".to_string()],
            &[
                single(vec![0], vec![0.9]),
                single(vec![1], vec![0.8]),
                single(vec![1], vec![0.7]),
            ],
            &vocab,
            &path,
            None,
        )
        .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        // A keeps the first position but carries the later prediction.
        assert_eq!(lines[0], "A\t0.7\t5\t6\t7\t8");
        assert_eq!(lines[1], "B\t0.8\t1\t2\t3\t4");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn output_is_overwritten_not_appended() {
        let vocab = vocab(&[("1>2>3>4", 0)]);
        let path = tmp_path("truncate");
        std::fs::write(&path, "stale contents\nstale line two\n").unwrap();
        write_prediction_result(
            &["P1".to_string()],
            &[single(vec![0], vec![0.5])],
            &vocab,
            &path,
            None,
        )
        .unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 1);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn multiple_top_n_groups_per_line() {
        let vocab = vocab(&[("1>2>3>4", 0), ("5>6>7>8", 1)]);
        let path = tmp_path("groups");
        write_prediction_result(
            &["P1".to_string()],
            &[single(vec![1, 0], vec![0.6, 0.4])],
            &vocab,
            &path,
            None,
        )
        .unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "P1\t0.6\t5\t6\t7\t8\t0.4\t1\t2\t3\t4\n");
        std::fs::remove_file(&path).ok();
    }
}
