//! Segment radius search and centerline grouping

use crate::error::Result;
use crate::ops::batch::resolve_ptrs;
use crate::ops::cluster_common::{DEFAULT_MAX_NUM_NEIGHBORS, as_matrix};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Tuning knobs shared by the batch-vector entry points
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NeighborOptions {
    /// Maximum number of neighbours returned per query row
    pub max_num_neighbors: usize,
    /// Worker threads for unbatched CPU queries; ignored on CUDA
    pub num_workers: usize,
}

impl Default for NeighborOptions {
    fn default() -> Self {
        Self {
            max_num_neighbors: DEFAULT_MAX_NUM_NEIGHBORS,
            num_workers: 1,
        }
    }
}

impl NeighborOptions {
    /// Set the per-query neighbour cap
    pub fn with_max_num_neighbors(mut self, max_num_neighbors: usize) -> Self {
        self.max_num_neighbors = max_num_neighbors;
        self
    }

    /// Set the CPU worker count
    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }
}

/// Neighbour queries over batched point sets
///
/// Both operations return an `I64` edge index of shape `[2, E]`: row 0 holds
/// the query (`y` row) index, row 1 the matched `x` row. Edges are ordered by
/// query, then by `x` row. Queries only see `x` rows of their own example.
///
/// The `_ptr` methods take row-pointer tensors directly; the provided methods
/// take batch vectors and convert them.
pub trait ClusterOps<R: Runtime> {
    /// Find the points of `x` within distance `r` of each segment of `y`
    ///
    /// # Arguments
    ///
    /// * `x` - Points `[N, F]`, float dtype
    /// * `y` - Segments `[M, 2F]`; row `i` is `start = y[i, ..F]`, `end = y[i, F..]`
    /// * `ptr_x`, `ptr_y` - Optional row pointers (`I64`, length `B + 1`), given together
    /// * `r` - Radius; a point matches when its squared distance to the closed
    ///   segment is strictly below `r * r`
    /// * `max_num_neighbors` - Cap per segment, the lowest `x` rows win
    /// * `num_workers` - CPU threads for unbatched input
    #[allow(clippy::too_many_arguments)]
    fn vector_radius_ptr(
        &self,
        x: &Tensor<R>,
        y: &Tensor<R>,
        ptr_x: Option<&Tensor<R>>,
        ptr_y: Option<&Tensor<R>>,
        r: f64,
        max_num_neighbors: usize,
        num_workers: usize,
    ) -> Result<Tensor<R>>;

    /// Group the points of `x` by the centerline nodes flagged in each row of `y`
    ///
    /// # Arguments
    ///
    /// * `x` - Centerline node index per point `[N, 1]`
    /// * `y` - Node masks `[M, L]`; `y[i, k] != 0` puts node `k` in group `i`
    /// * `ptr_x`, `ptr_y` - Optional row pointers (`I64`, length `B + 1`), given together
    /// * `max_num_neighbors` - Cap per group, the lowest `x` rows win
    /// * `num_workers` - CPU threads for unbatched input
    ///
    /// Points whose index is non-integral or outside `0..L` belong to no group.
    fn centerline_group_ptr(
        &self,
        x: &Tensor<R>,
        y: &Tensor<R>,
        ptr_x: Option<&Tensor<R>>,
        ptr_y: Option<&Tensor<R>>,
        max_num_neighbors: usize,
        num_workers: usize,
    ) -> Result<Tensor<R>>;

    /// [`Self::vector_radius_ptr`] taking sorted batch vectors instead of ptrs
    ///
    /// 1-D `x`/`y` are viewed as single-column matrices.
    ///
    /// # Example
    ///
    /// ```
    /// use topocluster::prelude::*;
    ///
    /// let client = CpuClient::default();
    /// let device = CpuDevice::new();
    /// let x = Tensor::<CpuRuntime>::from_slice(&[0.0f32, 1.0, 0.0, 3.0], &[2, 2], &device);
    /// let y = Tensor::<CpuRuntime>::from_slice(&[-1.0f32, 0.0, 1.0, 0.0], &[1, 4], &device);
    ///
    /// let edges = client
    ///     .vector_radius(&x, &y, 1.5, None, None, NeighborOptions::default())
    ///     .unwrap();
    /// assert_eq!(edges.to_vec::<i64>(), vec![0, 0]);
    /// ```
    fn vector_radius(
        &self,
        x: &Tensor<R>,
        y: &Tensor<R>,
        r: f64,
        batch_x: Option<&Tensor<R>>,
        batch_y: Option<&Tensor<R>>,
        options: NeighborOptions,
    ) -> Result<Tensor<R>> {
        let x = as_matrix(x, "x", "vector_radius")?;
        let y = as_matrix(y, "y", "vector_radius")?;
        let ptrs = resolve_ptrs(x.shape()[0], y.shape()[0], batch_x, batch_y)?;
        let (ptr_x, ptr_y) = match &ptrs {
            Some((px, py)) => (Some(px), Some(py)),
            None => (None, None),
        };
        self.vector_radius_ptr(
            &x,
            &y,
            ptr_x,
            ptr_y,
            r,
            options.max_num_neighbors,
            options.num_workers,
        )
    }

    /// [`Self::centerline_group_ptr`] taking sorted batch vectors instead of ptrs
    ///
    /// A 1-D `x` is viewed as `[N, 1]`.
    fn centerline_group(
        &self,
        x: &Tensor<R>,
        y: &Tensor<R>,
        batch_x: Option<&Tensor<R>>,
        batch_y: Option<&Tensor<R>>,
        options: NeighborOptions,
    ) -> Result<Tensor<R>> {
        let x = as_matrix(x, "x", "centerline_group")?;
        let y = as_matrix(y, "y", "centerline_group")?;
        let ptrs = resolve_ptrs(x.shape()[0], y.shape()[0], batch_x, batch_y)?;
        let (ptr_x, ptr_y) = match &ptrs {
            Some((px, py)) => (Some(px), Some(py)),
            None => (None, None),
        };
        self.centerline_group_ptr(
            &x,
            &y,
            ptr_x,
            ptr_y,
            options.max_num_neighbors,
            options.num_workers,
        )
    }
}
