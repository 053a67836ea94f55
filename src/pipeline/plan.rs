//! Batch planner: split the files to convert into bounded converter runs.

use crate::error::Md2PdfError;
use std::slice::Chunks;

/// Lazily split `items` into contiguous slices of `batch_size` (the last may
/// be shorter), keeping input order.
///
/// # Errors
/// [`Md2PdfError::InvalidBatchSize`] when `batch_size` is zero.
pub fn plan_batches<T>(items: &[T], batch_size: usize) -> Result<Chunks<'_, T>, Md2PdfError> {
    if batch_size == 0 {
        return Err(Md2PdfError::InvalidBatchSize(batch_size));
    }
    Ok(items.chunks(batch_size))
}

/// Number of batches [`plan_batches`] yields for `len` items.
pub fn batch_count(len: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    len.div_ceil(batch_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_batch_size_is_rejected() {
        let items = [1, 2, 3];
        assert!(matches!(
            plan_batches(&items, 0),
            Err(Md2PdfError::InvalidBatchSize(0))
        ));
    }

    #[test]
    fn batches_cover_input_in_order() {
        let items: Vec<u32> = (0..11).collect();
        let batches: Vec<&[u32]> = plan_batches(&items, 4).unwrap().collect();

        assert_eq!(batches.len(), batch_count(items.len(), 4));
        assert_eq!(batches.iter().map(|b| b.len()).sum::<usize>(), items.len());
        for b in &batches[..batches.len() - 1] {
            assert_eq!(b.len(), 4);
        }
        assert_eq!(batches.last().unwrap().len(), 3);
        assert_eq!(batches.concat(), items);
    }

    #[test]
    fn exact_multiple_has_no_short_tail() {
        let items = ["a", "b", "c", "d"];
        let batches: Vec<_> = plan_batches(&items, 2).unwrap().collect();
        assert_eq!(batches, vec![&["a", "b"][..], &["c", "d"][..]]);
    }

    #[test]
    fn empty_input_yields_no_batches() {
        let items: [u8; 0] = [];
        assert_eq!(plan_batches(&items, 3).unwrap().count(), 0);
        assert_eq!(batch_count(0, 3), 0);
    }

    #[test]
    fn oversized_batch_holds_everything() {
        let items = ["a", "b"];
        let batches: Vec<_> = plan_batches(&items, 5).unwrap().collect();
        assert_eq!(batches, vec![&["a", "b"][..]]);
    }
}
