//! Shared validation and utility functions for cluster operations.
//!
//! Every backend runs the same checks before launching work, so CPU and CUDA
//! reject malformed input with identical errors.

use super::batch::validate_ptr;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::runtime::{Device, Runtime};
use crate::tensor::Tensor;

/// Default cap on neighbours per query row
pub const DEFAULT_MAX_NUM_NEIGHBORS: usize = 32;

/// Validates that a tensor is 2-dimensional.
#[inline]
pub fn validate_2d_tensor(shape: &[usize], arg_name: &'static str, op: &'static str) -> Result<()> {
    if shape.len() != 2 {
        return Err(Error::InvalidArgument {
            arg: arg_name,
            reason: format!("{} expects 2D tensor, got {}D", op, shape.len()),
        });
    }
    Ok(())
}

/// Validates that a dtype is a floating-point type.
#[inline]
pub fn validate_float_dtype(dtype: DType, op: &'static str) -> Result<()> {
    if !dtype.is_float() {
        return Err(Error::unsupported_dtype(dtype, op));
    }
    Ok(())
}

/// Validates that both operands share a dtype.
#[inline]
pub fn validate_same_dtype(lhs: DType, rhs: DType) -> Result<()> {
    if lhs != rhs {
        return Err(Error::DTypeMismatch { lhs, rhs });
    }
    Ok(())
}

/// Validates that every tensor lives on the device of the first one.
pub fn validate_same_device<R: Runtime>(tensors: &[Option<&Tensor<R>>]) -> Result<()> {
    let mut present = tensors.iter().flatten();
    let Some(first) = present.next() else {
        return Ok(());
    };
    for t in present {
        if !first.device().is_same(t.device()) {
            return Err(Error::DeviceMismatch {
                lhs: first.device().name(),
                rhs: t.device().name(),
            });
        }
    }
    Ok(())
}

/// Validates the search radius: finite and non-negative.
#[inline]
pub fn validate_radius(r: f64) -> Result<()> {
    if !r.is_finite() || r < 0.0 {
        return Err(Error::invalid_argument(
            "r",
            format!("radius must be finite and non-negative, got {}", r),
        ));
    }
    Ok(())
}

/// Validates the per-query cap and the worker count.
#[inline]
pub fn validate_counts(max_num_neighbors: usize, num_workers: usize) -> Result<()> {
    if max_num_neighbors == 0 {
        return Err(Error::invalid_argument(
            "max_num_neighbors",
            "must be greater than 0",
        ));
    }
    if num_workers == 0 {
        return Err(Error::invalid_argument("num_workers", "must be greater than 0"));
    }
    Ok(())
}

/// Validates `x`/`y` shapes and dtypes for `vector_radius`.
///
/// `x` is `[N, F]` points, `y` is `[M, 2F]` segments (start then end).
pub fn validate_vector_radius_inputs(
    x_shape: &[usize],
    y_shape: &[usize],
    x_dtype: DType,
    y_dtype: DType,
) -> Result<()> {
    const OP: &str = "vector_radius";
    validate_2d_tensor(x_shape, "x", OP)?;
    validate_2d_tensor(y_shape, "y", OP)?;
    validate_float_dtype(x_dtype, OP)?;
    validate_same_dtype(x_dtype, y_dtype)?;

    if y_shape[1] != 2 * x_shape[1] {
        return Err(Error::InvalidArgument {
            arg: "y",
            reason: format!(
                "{} expects segments with 2 * x.shape[1] = {} columns, got {}",
                OP,
                2 * x_shape[1],
                y_shape[1]
            ),
        });
    }
    Ok(())
}

/// Validates `x`/`y` shapes and dtypes for `centerline_group`.
///
/// `x` is `[N, 1]` centerline indices, `y` is `[M, L]` node masks.
pub fn validate_centerline_group_inputs(
    x_shape: &[usize],
    y_shape: &[usize],
    x_dtype: DType,
    y_dtype: DType,
) -> Result<()> {
    const OP: &str = "centerline_group";
    validate_2d_tensor(x_shape, "x", OP)?;
    validate_2d_tensor(y_shape, "y", OP)?;
    validate_same_dtype(x_dtype, y_dtype)?;

    if x_shape[1] != 1 {
        return Err(Error::InvalidArgument {
            arg: "x",
            reason: format!(
                "{} expects one centerline index per row, got {} columns",
                OP, x_shape[1]
            ),
        });
    }
    Ok(())
}

/// Validates an optional ptr pair and returns the host offsets.
///
/// Both ptrs must be given together and describe the same number of examples.
/// Without ptrs the whole input is one example: `[0, rows]`.
pub fn resolve_ptr_offsets<R: Runtime>(
    ptr_x: Option<&Tensor<R>>,
    ptr_y: Option<&Tensor<R>>,
    x_rows: usize,
    y_rows: usize,
) -> Result<(Vec<i64>, Vec<i64>, bool)> {
    match (ptr_x, ptr_y) {
        (None, None) => Ok((vec![0, x_rows as i64], vec![0, y_rows as i64], false)),
        (Some(ptr_x), Some(ptr_y)) => {
            let px = validate_ptr(ptr_x, x_rows, "ptr_x")?;
            let py = validate_ptr(ptr_y, y_rows, "ptr_y")?;
            if px.len() != py.len() {
                return Err(Error::invalid_argument(
                    "ptr_y",
                    format!(
                        "ptr_x and ptr_y describe different example counts ({} vs {})",
                        px.len() - 1,
                        py.len() - 1
                    ),
                ));
            }
            Ok((px, py, true))
        }
        (Some(_), None) => Err(Error::invalid_argument(
            "ptr_y",
            "must be given together with ptr_x",
        )),
        (None, Some(_)) => Err(Error::invalid_argument(
            "ptr_x",
            "must be given together with ptr_y",
        )),
    }
}

/// View a 1-D tensor as a single column, leaving other ranks untouched.
///
/// The result is contiguous. Scalars are rejected.
pub fn as_matrix<R: Runtime>(
    t: &Tensor<R>,
    arg_name: &'static str,
    op: &'static str,
) -> Result<Tensor<R>> {
    if t.ndim() == 0 {
        return Err(Error::InvalidArgument {
            arg: arg_name,
            reason: format!("{} expects 1D or 2D tensor, got a scalar", op),
        });
    }
    let t = t.contiguous()?;
    if t.ndim() == 1 {
        let len = t.numel();
        return t.reshape(&[len, 1]);
    }
    Ok(t)
}

/// Per-query row range into `x`, expanded from ptr offsets.
///
/// Entry `i` is the `x` row range of the example that owns query `i`.
pub fn query_ranges(ptr_x: &[i64], ptr_y: &[i64]) -> Vec<(usize, usize)> {
    let num_queries = ptr_y.last().copied().unwrap_or(0) as usize;
    let mut ranges = Vec::with_capacity(num_queries);
    for b in 0..ptr_y.len().saturating_sub(1) {
        let x_range = (ptr_x[b] as usize, ptr_x[b + 1] as usize);
        let count = (ptr_y[b + 1] - ptr_y[b]) as usize;
        ranges.extend(std::iter::repeat_n(x_range, count));
    }
    ranges
}

/// Flatten per-query neighbour lists into `[2, E]` edge-index data.
///
/// Row 0 repeats the query index once per neighbour, row 1 holds the
/// neighbour indices in the order they were found.
pub fn edge_index_data(neighbors: &[Vec<i64>]) -> (Vec<i64>, usize) {
    let num_edges: usize = neighbors.iter().map(Vec::len).sum();
    let mut data = Vec::with_capacity(2 * num_edges);
    for (i, cols) in neighbors.iter().enumerate() {
        data.extend(std::iter::repeat_n(i as i64, cols.len()));
    }
    for cols in neighbors {
        data.extend_from_slice(cols);
    }
    (data, num_edges)
}

/// Split fixed-width neighbour slots into per-query lists.
///
/// Each query owns `max_num_neighbors` consecutive slots; matches fill a
/// prefix and the remainder holds `-1`.
#[cfg_attr(not(feature = "cuda"), allow(dead_code))]
pub fn compact_slots(slots: &[i64], max_num_neighbors: usize) -> Vec<Vec<i64>> {
    slots
        .chunks(max_num_neighbors)
        .map(|row| row.iter().copied().take_while(|&j| j >= 0).collect())
        .collect()
}

/// Cap compacted rows at `max_num_neighbors`.
///
/// Rows come from slots one wider than the cap, so a row holding more than
/// `max_num_neighbors` entries had a match dropped. Returns the capped rows
/// and the number of such rows.
#[cfg_attr(not(feature = "cuda"), allow(dead_code))]
pub fn cap_rows(mut rows: Vec<Vec<i64>>, max_num_neighbors: usize) -> (Vec<Vec<i64>>, usize) {
    let mut truncated = 0;
    for row in &mut rows {
        if row.len() > max_num_neighbors {
            row.truncate(max_num_neighbors);
            truncated += 1;
        }
    }
    (rows, truncated)
}

/// Report queries whose matches were cut off at the cap
pub fn warn_truncated(op: &str, truncated: usize, num_queries: usize, max_num_neighbors: usize) {
    if truncated > 0 {
        log::warn!(
            "{}: {} of {} queries had more than max_num_neighbors={} matches, the rest were dropped",
            op,
            truncated,
            num_queries,
            max_num_neighbors
        );
    }
}

/// Build the `[2, E]` `I64` edge-index tensor from flattened data.
pub fn edge_index_tensor<R: Runtime>(
    data: &[i64],
    num_edges: usize,
    device: &R::Device,
) -> Result<Tensor<R>> {
    Tensor::try_from_slice(data, &[2, num_edges], device)
}

/// Empty `[2, 0]` result
pub fn empty_edge_index<R: Runtime>(device: &R::Device) -> Result<Tensor<R>> {
    Tensor::try_empty(&[2, 0], DType::I64, device)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_vector_radius_inputs() {
        assert!(validate_vector_radius_inputs(&[8, 2], &[4, 4], DType::F32, DType::F32).is_ok());
        assert!(validate_vector_radius_inputs(&[8, 2], &[4, 2], DType::F32, DType::F32).is_err());
        assert!(matches!(
            validate_vector_radius_inputs(&[8, 2], &[4, 4], DType::I64, DType::I64),
            Err(Error::UnsupportedDType { .. })
        ));
        assert!(matches!(
            validate_vector_radius_inputs(&[8, 2], &[4, 4], DType::F32, DType::F64),
            Err(Error::DTypeMismatch { .. })
        ));
        assert!(validate_vector_radius_inputs(&[8], &[4, 4], DType::F32, DType::F32).is_err());
    }

    #[test]
    fn test_validate_centerline_group_inputs() {
        assert!(
            validate_centerline_group_inputs(&[12, 1], &[4, 4], DType::I64, DType::I64).is_ok()
        );
        assert!(
            validate_centerline_group_inputs(&[12, 2], &[4, 4], DType::I64, DType::I64).is_err()
        );
        assert!(
            validate_centerline_group_inputs(&[12, 1], &[4], DType::I64, DType::I64).is_err()
        );
    }

    #[test]
    fn test_validate_radius() {
        assert!(validate_radius(0.0).is_ok());
        assert!(validate_radius(1.5).is_ok());
        assert!(validate_radius(-0.1).is_err());
        assert!(validate_radius(f64::NAN).is_err());
        assert!(validate_radius(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_counts() {
        assert!(validate_counts(1, 1).is_ok());
        assert!(matches!(
            validate_counts(0, 1),
            Err(Error::InvalidArgument { arg: "max_num_neighbors", .. })
        ));
        assert!(matches!(
            validate_counts(1, 0),
            Err(Error::InvalidArgument { arg: "num_workers", .. })
        ));
    }

    #[test]
    fn test_query_ranges() {
        // Example 1 owns no x rows and one query
        let ranges = query_ranges(&[0, 4, 4, 8], &[0, 2, 3, 4]);
        assert_eq!(ranges, vec![(0, 4), (0, 4), (4, 4), (4, 8)]);
        assert_eq!(query_ranges(&[0, 5], &[0, 2]), vec![(0, 5), (0, 5)]);
    }

    #[test]
    fn test_compact_slots() {
        let rows = compact_slots(&[3, 5, -1, -1, -1, -1, 0, 1, 2], 3);
        assert_eq!(rows, vec![vec![3, 5], vec![], vec![0, 1, 2]]);
    }

    #[test]
    fn test_cap_rows_counts_only_overfull_rows() {
        // Slots of width 3 for a cap of 2
        let rows = compact_slots(&[0, 1, -1, 2, 3, 4, -1, -1, -1], 3);
        let (rows, truncated) = cap_rows(rows, 2);
        assert_eq!(rows, vec![vec![0, 1], vec![2, 3], vec![]]);
        assert_eq!(truncated, 1);
    }

    #[test]
    fn test_edge_index_data() {
        let (data, e) = edge_index_data(&[vec![1, 3], vec![], vec![0]]);
        assert_eq!(e, 3);
        assert_eq!(data, vec![0, 0, 2, 1, 3, 0]);
    }
}
