//! Batch vectors and row-pointer tensors
//!
//! Batched inputs concatenate several examples along the row axis. A *batch
//! vector* tags every row with its example id (sorted, `I64`); a *ptr tensor*
//! of length `B + 1` stores where each example starts, so example `b` owns
//! rows `ptr[b]..ptr[b + 1]`. Examples with no rows ("skipped batches") show
//! up as empty ranges.

use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Row pointers for `x` and `y`, both of length `B + 1`
pub type PtrPair<R> = (Tensor<R>, Tensor<R>);

/// Read a batch vector to the host after checking it is 1-D `I64`
fn read_batch<R: Runtime>(batch: &Tensor<R>, arg: &'static str) -> Result<Vec<i64>> {
    if batch.ndim() != 1 {
        return Err(Error::invalid_argument(
            arg,
            format!("batch vector must be 1D, got {}D", batch.ndim()),
        ));
    }
    if batch.dtype() != DType::I64 {
        return Err(Error::invalid_argument(
            arg,
            format!("batch vector must be I64, got {}", batch.dtype()),
        ));
    }
    batch.try_to_vec::<i64>()
}

/// Bucketize `0..=batch_size` against a sorted batch vector
///
/// Entry `b` of the result is the number of rows whose example id is below
/// `b`, i.e. the left insertion point of `b`.
///
/// # Errors
///
/// `InvalidArgument` when the batch vector is unsorted, holds negative ids,
/// or holds ids `>= batch_size`.
pub fn ptr_from_batch(batch: &[i64], batch_size: usize, arg: &'static str) -> Result<Vec<i64>> {
    if let Some(&first) = batch.first() {
        if first < 0 {
            return Err(Error::invalid_argument(
                arg,
                format!("batch ids must be non-negative, got {}", first),
            ));
        }
    }
    if let Some(pos) = batch.windows(2).position(|w| w[0] > w[1]) {
        return Err(Error::invalid_argument(
            arg,
            format!(
                "batch vector must be sorted, got {} before {} at index {}",
                batch[pos],
                batch[pos + 1],
                pos + 1
            ),
        ));
    }
    if let Some(&last) = batch.last() {
        if last as u64 >= batch_size as u64 {
            return Err(Error::invalid_argument(
                arg,
                format!("batch id {} out of range for {} examples", last, batch_size),
            ));
        }
    }

    Ok((0..=batch_size as i64)
        .map(|b| batch.partition_point(|&v| v < b) as i64)
        .collect())
}

/// Convert a batch vector into a ptr tensor on the same device
pub fn batch_to_ptr<R: Runtime>(batch: &Tensor<R>, batch_size: usize) -> Result<Tensor<R>> {
    let host = read_batch(batch, "batch")?;
    let ptr = ptr_from_batch(&host, batch_size, "batch")?;
    Tensor::try_from_slice(&ptr, &[ptr.len()], batch.device())
}

/// Number of examples described by the given batch vectors
///
/// The largest id plus one across both vectors, or 1 when neither is given
/// (or both are empty).
pub fn batch_size<R: Runtime>(
    batch_x: Option<&Tensor<R>>,
    batch_y: Option<&Tensor<R>>,
) -> Result<usize> {
    let mut size = 1usize;
    for (batch, arg) in [(batch_x, "batch_x"), (batch_y, "batch_y")] {
        let Some(batch) = batch else { continue };
        let host = read_batch(batch, arg)?;
        if let Some(&max) = host.iter().max() {
            if max < 0 {
                return Err(Error::invalid_argument(
                    arg,
                    format!("batch ids must be non-negative, got {}", max),
                ));
            }
            size = size.max(max as usize + 1);
        }
    }
    Ok(size)
}

/// Turn optional batch vectors into ptr tensors
///
/// Each batch vector must tag every row of its tensor. When the inputs
/// describe more than one example, both batch vectors are required and
/// converted; a single example needs no ptrs and yields `None`.
pub fn resolve_ptrs<R: Runtime>(
    x_rows: usize,
    y_rows: usize,
    batch_x: Option<&Tensor<R>>,
    batch_y: Option<&Tensor<R>>,
) -> Result<Option<PtrPair<R>>> {
    if let Some(batch_x) = batch_x {
        if batch_x.numel() != x_rows {
            return Err(Error::shape_mismatch(&[x_rows], batch_x.shape()));
        }
    }
    if let Some(batch_y) = batch_y {
        if batch_y.numel() != y_rows {
            return Err(Error::shape_mismatch(&[y_rows], batch_y.shape()));
        }
    }

    let size = batch_size(batch_x, batch_y)?;
    if size <= 1 {
        log::debug!("single example, no row pointers needed");
        return Ok(None);
    }

    let (Some(batch_x), Some(batch_y)) = (batch_x, batch_y) else {
        let missing = if batch_x.is_none() { "batch_x" } else { "batch_y" };
        return Err(Error::invalid_argument(
            missing,
            format!("required when the inputs span {} examples", size),
        ));
    };

    log::debug!("resolved {} examples from batch vectors", size);
    Ok(Some((
        batch_to_ptr(batch_x, size)?,
        batch_to_ptr(batch_y, size)?,
    )))
}

/// Check a ptr tensor against the number of rows it partitions
///
/// A valid ptr tensor is 1-D `I64`, non-decreasing, starts at 0 and ends at
/// `rows`. Returns the offsets on the host.
pub fn validate_ptr<R: Runtime>(
    ptr: &Tensor<R>,
    rows: usize,
    arg: &'static str,
) -> Result<Vec<i64>> {
    if ptr.ndim() != 1 {
        return Err(Error::invalid_argument(
            arg,
            format!("ptr must be 1D, got {}D", ptr.ndim()),
        ));
    }
    if ptr.dtype() != DType::I64 {
        return Err(Error::invalid_argument(
            arg,
            format!("ptr must be I64, got {}", ptr.dtype()),
        ));
    }

    let host = ptr.try_to_vec::<i64>()?;
    validate_ptr_values(&host, rows, arg)?;
    Ok(host)
}

/// Host-side half of [`validate_ptr`]
pub fn validate_ptr_values(ptr: &[i64], rows: usize, arg: &'static str) -> Result<()> {
    if ptr.len() < 2 {
        return Err(Error::invalid_argument(
            arg,
            format!("ptr needs at least 2 entries, got {}", ptr.len()),
        ));
    }
    if ptr[0] != 0 {
        return Err(Error::invalid_argument(
            arg,
            format!("ptr must start at 0, got {}", ptr[0]),
        ));
    }
    if let Some(pos) = ptr.windows(2).position(|w| w[0] > w[1]) {
        return Err(Error::invalid_argument(
            arg,
            format!("ptr must be non-decreasing, decreases at index {}", pos + 1),
        ));
    }
    let last = ptr[ptr.len() - 1];
    if last != rows as i64 {
        return Err(Error::invalid_argument(
            arg,
            format!("ptr must end at the row count {}, got {}", rows, last),
        ));
    }
    Ok(())
}
