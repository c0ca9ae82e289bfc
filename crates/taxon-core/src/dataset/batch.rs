//! Sequential batch generation over a split.
//!
//! The cursor state is explicit rather than hidden in closure captures: a
//! [`BatchCursor`] carries `{cursor, limit, batch_size, stop_on_end}` and a
//! pure transition yields the next `[left, right)` range. By default the
//! cursor wraps to row 0 after the final (possibly short) batch of a pass;
//! with `stop_on_end` it terminates there instead, giving exactly one
//! deterministic pass of `ceil(rows / batch_size)` batches.

use std::ops::Range;

use candle_core::Tensor;

use crate::dataset::Split;
use crate::error::{Result, TaxonError};

/// One contiguous row-range slice of a split's fields.
pub struct Batch {
    /// Word-embedding rows, f32 `[rows, embd_dim]`.
    pub embd_word: Tensor,
    /// Image-feature rows, f32 `[rows, img_dim]`.
    pub img_feat: Tensor,
    /// Class indices, u32 `[rows]`.
    pub cate: Tensor,
    /// Rows in this batch.
    pub rows: usize,
}

/// Explicit batch-cursor state with a pure next-range transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCursor {
    cursor: usize,
    limit: usize,
    batch_size: usize,
    stop_on_end: bool,
    done: bool,
}

impl BatchCursor {
    /// Create a cursor over `limit` rows.
    ///
    /// A zero-row limit or zero batch size is an input-validation error, not
    /// a degenerate loop.
    pub fn new(limit: usize, batch_size: usize, stop_on_end: bool) -> Result<Self> {
        if limit == 0 {
            return Err(TaxonError::EmptySplit);
        }
        if batch_size == 0 {
            return Err(TaxonError::ZeroBatchSize);
        }
        Ok(Self {
            cursor: 0,
            limit,
            batch_size,
            stop_on_end,
            done: false,
        })
    }

    /// Number of batches in one full pass.
    pub fn batches_per_pass(&self) -> usize {
        self.limit.div_ceil(self.batch_size)
    }

    /// Advance to the next `[left, right)` range.
    ///
    /// Returns `None` only for the `stop_on_end` variant, once the pass is
    /// complete; the wrapping variant never ends.
    pub fn advance(&mut self) -> Option<Range<usize>> {
        if self.done {
            return None;
        }
        let left = self.cursor;
        let right = (left + self.batch_size).min(self.limit);
        if right == self.limit {
            self.cursor = 0;
            if self.stop_on_end {
                self.done = true;
            }
        } else {
            self.cursor = right;
        }
        Some(left..right)
    }
}

/// Lazy sequence of `(features, labels)` batches over one split.
pub struct SampleGenerator<'a> {
    split: &'a Split,
    cursor: BatchCursor,
}

impl<'a> SampleGenerator<'a> {
    /// Create a generator over `split` with the given end-of-data behavior.
    pub fn new(split: &'a Split, batch_size: usize, stop_on_end: bool) -> Result<Self> {
        let cursor = BatchCursor::new(split.rows(), batch_size, stop_on_end)?;
        Ok(Self { split, cursor })
    }

    /// Number of batches in one full pass over the split.
    pub fn batches_per_pass(&self) -> usize {
        self.cursor.batches_per_pass()
    }
}

impl Iterator for SampleGenerator<'_> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        let range = self.cursor.advance()?;
        Some(self.split.slice(range.start, range.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::test_support::split_with_rows;

    fn ranges(mut cursor: BatchCursor, n: usize) -> Vec<Range<usize>> {
        (0..n).filter_map(|_| cursor.advance()).collect()
    }

    #[test]
    fn rejects_empty_split() {
        assert!(matches!(
            BatchCursor::new(0, 8, false).unwrap_err(),
            TaxonError::EmptySplit
        ));
    }

    #[test]
    fn rejects_zero_batch_size() {
        assert!(matches!(
            BatchCursor::new(10, 0, false).unwrap_err(),
            TaxonError::ZeroBatchSize
        ));
    }

    #[test]
    fn one_pass_reconstructs_row_order() {
        for (rows, batch) in [(10, 3), (10, 10), (10, 16), (1, 1), (7, 2)] {
            let cursor = BatchCursor::new(rows, batch, true).unwrap();
            let per_pass = cursor.batches_per_pass();
            assert_eq!(per_pass, rows.div_ceil(batch));

            let got = ranges(cursor, per_pass + 5);
            assert_eq!(got.len(), per_pass, "rows={rows} batch={batch}");
            let flat: Vec<usize> = got.iter().flat_map(|r| r.clone()).collect();
            assert_eq!(flat, (0..rows).collect::<Vec<_>>());
            assert!(got.iter().all(|r| r.len() <= batch));
        }
    }

    #[test]
    fn wrapping_cursor_restarts_at_zero() {
        let cursor = BatchCursor::new(5, 2, false).unwrap();
        let got = ranges(cursor, 6);
        // Two full passes: 0..2, 2..4, 4..5, then again from the top.
        assert_eq!(got, vec![0..2, 2..4, 4..5, 0..2, 2..4, 4..5]);
    }

    #[test]
    fn exhausting_cursor_stays_done() {
        let mut cursor = BatchCursor::new(3, 2, true).unwrap();
        assert_eq!(cursor.advance(), Some(0..2));
        assert_eq!(cursor.advance(), Some(2..3));
        assert_eq!(cursor.advance(), None);
        assert_eq!(cursor.advance(), None);
    }

    #[test]
    fn generator_yields_aligned_batches() {
        let split = split_with_rows(5);
        let generator = SampleGenerator::new(&split, 2, true).unwrap();
        let batches: Vec<Batch> = generator.map(|b| b.unwrap()).collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].rows, 2);
        assert_eq!(batches[2].rows, 1);
        assert_eq!(batches[1].cate.to_vec1::<u32>().unwrap(), vec![2, 3]);
    }

    #[test]
    fn generator_rejects_empty_split_via_cursor() {
        let split = split_with_rows(4);
        assert!(SampleGenerator::new(&split, 0, false).is_err());
    }
}
