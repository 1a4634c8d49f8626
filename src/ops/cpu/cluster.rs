//! CPU implementation of cluster operations.

use crate::error::Result;
use crate::ops::ClusterOps;
use crate::ops::cluster_common::*;
use crate::ops::dispatch::{dispatch_dtype, dispatch_float_dtype};
use crate::runtime::cpu::{CpuClient, CpuRuntime, kernels};
use crate::tensor::Tensor;

/// Neighbours of one query plus whether the cap cut it short
type QueryResult = (Vec<i64>, bool);

impl CpuClient {
    /// Run `query` for every query row and gather the results in query order
    ///
    /// `query(i, x_start, x_end, out)` appends the neighbours of query `i`
    /// found among `x[x_start..x_end]` and reports truncation.
    fn collect_neighbors<F>(
        &self,
        ranges: &[(usize, usize)],
        num_workers: usize,
        query: F,
    ) -> Vec<QueryResult>
    where
        F: Fn(usize, usize, usize, &mut Vec<i64>) -> bool + Sync + Send,
    {
        #[cfg(feature = "rayon")]
        {
            if self.should_parallelize(ranges.len(), num_workers) {
                use rayon::prelude::*;

                log::debug!(
                    "splitting {} queries across {} workers",
                    ranges.len(),
                    num_workers
                );
                return self.install_parallelism(num_workers, || {
                    ranges
                        .par_iter()
                        .enumerate()
                        .map(|(i, &(start, end))| {
                            let mut out = Vec::new();
                            let truncated = query(i, start, end, &mut out);
                            (out, truncated)
                        })
                        .collect()
                });
            }
        }

        #[cfg(not(feature = "rayon"))]
        let _ = num_workers;

        ranges
            .iter()
            .enumerate()
            .map(|(i, &(start, end))| {
                let mut out = Vec::new();
                let truncated = query(i, start, end, &mut out);
                (out, truncated)
            })
            .collect()
    }

    /// Assemble per-query results into the `[2, E]` edge index
    fn finish_edge_index(
        &self,
        results: Vec<QueryResult>,
        max_num_neighbors: usize,
        op: &'static str,
    ) -> Result<Tensor<CpuRuntime>> {
        let truncated = results.iter().filter(|(_, t)| *t).count();
        warn_truncated(op, truncated, results.len(), max_num_neighbors);

        let neighbors: Vec<Vec<i64>> = results.into_iter().map(|(n, _)| n).collect();
        let (data, num_edges) = edge_index_data(&neighbors);
        log::debug!("{}: {} edges", op, num_edges);
        edge_index_tensor::<CpuRuntime>(&data, num_edges, &self.device)
    }
}

/// Worker count actually used: batched input always runs on one thread
fn effective_workers(batched: bool, num_workers: usize, op: &'static str) -> usize {
    if batched && num_workers > 1 {
        log::debug!("{}: num_workers={} ignored for batched input", op, num_workers);
        return 1;
    }
    num_workers
}

impl ClusterOps<CpuRuntime> for CpuClient {
    fn vector_radius_ptr(
        &self,
        x: &Tensor<CpuRuntime>,
        y: &Tensor<CpuRuntime>,
        ptr_x: Option<&Tensor<CpuRuntime>>,
        ptr_y: Option<&Tensor<CpuRuntime>>,
        r: f64,
        max_num_neighbors: usize,
        num_workers: usize,
    ) -> Result<Tensor<CpuRuntime>> {
        const OP: &str = "vector_radius";

        validate_vector_radius_inputs(x.shape(), y.shape(), x.dtype(), y.dtype())?;
        validate_radius(r)?;
        validate_counts(max_num_neighbors, num_workers)?;
        validate_same_device(&[Some(x), Some(y), ptr_x, ptr_y])?;

        let (n, dim) = (x.shape()[0], x.shape()[1]);
        let m = y.shape()[0];
        let (px, py, batched) = resolve_ptr_offsets(ptr_x, ptr_y, n, m)?;

        if n == 0 || m == 0 {
            return empty_edge_index::<CpuRuntime>(&self.device);
        }

        let x = x.contiguous()?;
        let y = y.contiguous()?;
        let ranges = query_ranges(&px, &py);
        let workers = effective_workers(batched, num_workers, OP);

        log::debug!(
            "{}: {} points, {} segments, dim {}, {} examples, r={}",
            OP,
            n,
            m,
            dim,
            px.len() - 1,
            r
        );

        let x_addr = x.storage().ptr() as usize;
        let y_addr = y.storage().ptr() as usize;

        let results = dispatch_float_dtype!(x.dtype(), T => {
            let r2 = <T as crate::dtype::Element>::from_f64(r * r);
            self.collect_neighbors(&ranges, workers, |i, start, end, out| unsafe {
                kernels::vector_radius_query::<T>(
                    x_addr as *const T,
                    (y_addr as *const T).add(i * 2 * dim),
                    dim,
                    start,
                    end,
                    r2,
                    max_num_neighbors,
                    out,
                )
            })
        }, OP);

        self.finish_edge_index(results, max_num_neighbors, OP)
    }

    fn centerline_group_ptr(
        &self,
        x: &Tensor<CpuRuntime>,
        y: &Tensor<CpuRuntime>,
        ptr_x: Option<&Tensor<CpuRuntime>>,
        ptr_y: Option<&Tensor<CpuRuntime>>,
        max_num_neighbors: usize,
        num_workers: usize,
    ) -> Result<Tensor<CpuRuntime>> {
        const OP: &str = "centerline_group";

        validate_centerline_group_inputs(x.shape(), y.shape(), x.dtype(), y.dtype())?;
        validate_counts(max_num_neighbors, num_workers)?;
        validate_same_device(&[Some(x), Some(y), ptr_x, ptr_y])?;

        let n = x.shape()[0];
        let (m, num_nodes) = (y.shape()[0], y.shape()[1]);
        let (px, py, batched) = resolve_ptr_offsets(ptr_x, ptr_y, n, m)?;

        if n == 0 || m == 0 {
            return empty_edge_index::<CpuRuntime>(&self.device);
        }

        let x = x.contiguous()?;
        let y = y.contiguous()?;
        let ranges = query_ranges(&px, &py);
        let workers = effective_workers(batched, num_workers, OP);

        log::debug!(
            "{}: {} points, {} groups over {} nodes, {} examples",
            OP,
            n,
            m,
            num_nodes,
            px.len() - 1
        );

        let x_addr = x.storage().ptr() as usize;
        let y_addr = y.storage().ptr() as usize;

        let results = dispatch_dtype!(x.dtype(), T => {
            self.collect_neighbors(&ranges, workers, |i, start, end, out| unsafe {
                kernels::centerline_group_query::<T>(
                    x_addr as *const T,
                    (y_addr as *const T).add(i * num_nodes),
                    num_nodes,
                    start,
                    end,
                    max_num_neighbors,
                    out,
                )
            })
        }, OP);

        self.finish_edge_index(results, max_num_neighbors, OP)
    }
}
