//! CUDA implementation of cluster operations.

use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::ops::ClusterOps;
use crate::ops::cluster_common::*;
use crate::runtime::cuda::kernels::{launch_centerline_group, launch_vector_radius};
use crate::runtime::cuda::{CudaClient, CudaRuntime};
use crate::tensor::Tensor;

/// Device buffers for one launch: row pointers plus `-1`-filled result slots
///
/// Each query gets `max_num_neighbors + 1` slots; a filled last slot marks a
/// match past the cap.
struct LaunchBuffers {
    ptr_x: Tensor<CudaRuntime>,
    ptr_y: Tensor<CudaRuntime>,
    slots: Tensor<CudaRuntime>,
    slot_width: usize,
}

impl CudaClient {
    fn launch_buffers(
        &self,
        px: &[i64],
        py: &[i64],
        num_queries: usize,
        max_num_neighbors: usize,
    ) -> Result<LaunchBuffers> {
        let overflow = || {
            Error::invalid_argument(
                "max_num_neighbors",
                format!(
                    "{} queries x {} slots overflows",
                    num_queries, max_num_neighbors
                ),
            )
        };
        let slot_width = max_num_neighbors
            .checked_add(1)
            .filter(|&w| u32::try_from(w).is_ok())
            .ok_or_else(overflow)?;
        let num_slots = num_queries.checked_mul(slot_width).ok_or_else(overflow)?;

        Ok(LaunchBuffers {
            ptr_x: Tensor::try_from_slice(px, &[px.len()], &self.device)?,
            ptr_y: Tensor::try_from_slice(py, &[py.len()], &self.device)?,
            slots: Tensor::try_from_slice(&vec![-1i64; num_slots], &[num_slots], &self.device)?,
            slot_width,
        })
    }

    /// Wait for the kernel, then compact its slots into the `[2, E]` edge index
    fn finish_edge_index(
        &self,
        buffers: &LaunchBuffers,
        max_num_neighbors: usize,
        op: &'static str,
    ) -> Result<Tensor<CudaRuntime>> {
        self.try_synchronize()?;

        let rows = compact_slots(&buffers.slots.try_to_vec::<i64>()?, buffers.slot_width);
        let num_queries = rows.len();
        let (neighbors, truncated) = cap_rows(rows, max_num_neighbors);
        warn_truncated(op, truncated, num_queries, max_num_neighbors);

        let (data, num_edges) = edge_index_data(&neighbors);
        log::debug!("{}: {} edges", op, num_edges);
        edge_index_tensor::<CudaRuntime>(&data, num_edges, &self.device)
    }
}

fn note_ignored_workers(num_workers: usize, op: &'static str) {
    if num_workers > 1 {
        log::debug!("{}: num_workers={} has no effect on CUDA", op, num_workers);
    }
}

impl ClusterOps<CudaRuntime> for CudaClient {
    fn vector_radius_ptr(
        &self,
        x: &Tensor<CudaRuntime>,
        y: &Tensor<CudaRuntime>,
        ptr_x: Option<&Tensor<CudaRuntime>>,
        ptr_y: Option<&Tensor<CudaRuntime>>,
        r: f64,
        max_num_neighbors: usize,
        num_workers: usize,
    ) -> Result<Tensor<CudaRuntime>> {
        const OP: &str = "vector_radius";

        validate_vector_radius_inputs(x.shape(), y.shape(), x.dtype(), y.dtype())?;
        validate_radius(r)?;
        validate_counts(max_num_neighbors, num_workers)?;
        validate_same_device(&[Some(x), Some(y), ptr_x, ptr_y])?;
        if !matches!(x.dtype(), DType::F32 | DType::F64) {
            return Err(Error::unsupported_dtype(x.dtype(), OP));
        }
        note_ignored_workers(num_workers, OP);

        let (n, dim) = (x.shape()[0], x.shape()[1]);
        let m = y.shape()[0];
        let (px, py, _) = resolve_ptr_offsets(ptr_x, ptr_y, n, m)?;

        if n == 0 || m == 0 {
            return empty_edge_index::<CudaRuntime>(&self.device);
        }

        let x = x.contiguous()?;
        let y = y.contiguous()?;
        let buffers = self.launch_buffers(&px, &py, m, max_num_neighbors)?;

        unsafe {
            launch_vector_radius(
                &self.context,
                &self.stream,
                self.device.index,
                x.dtype(),
                x.storage().ptr(),
                y.storage().ptr(),
                buffers.ptr_x.storage().ptr(),
                buffers.ptr_y.storage().ptr(),
                buffers.slots.storage().ptr(),
                m,
                px.len() - 1,
                dim,
                r * r,
                buffers.slot_width,
            )?;
        }

        self.finish_edge_index(&buffers, max_num_neighbors, OP)
    }

    fn centerline_group_ptr(
        &self,
        x: &Tensor<CudaRuntime>,
        y: &Tensor<CudaRuntime>,
        ptr_x: Option<&Tensor<CudaRuntime>>,
        ptr_y: Option<&Tensor<CudaRuntime>>,
        max_num_neighbors: usize,
        num_workers: usize,
    ) -> Result<Tensor<CudaRuntime>> {
        const OP: &str = "centerline_group";

        validate_centerline_group_inputs(x.shape(), y.shape(), x.dtype(), y.dtype())?;
        validate_counts(max_num_neighbors, num_workers)?;
        validate_same_device(&[Some(x), Some(y), ptr_x, ptr_y])?;
        if !matches!(x.dtype(), DType::F32 | DType::F64 | DType::I32 | DType::I64) {
            return Err(Error::unsupported_dtype(x.dtype(), OP));
        }
        note_ignored_workers(num_workers, OP);

        let n = x.shape()[0];
        let (m, num_nodes) = (y.shape()[0], y.shape()[1]);
        let (px, py, _) = resolve_ptr_offsets(ptr_x, ptr_y, n, m)?;

        if n == 0 || m == 0 {
            return empty_edge_index::<CudaRuntime>(&self.device);
        }

        let x = x.contiguous()?;
        let y = y.contiguous()?;
        let buffers = self.launch_buffers(&px, &py, m, max_num_neighbors)?;

        unsafe {
            launch_centerline_group(
                &self.context,
                &self.stream,
                self.device.index,
                x.dtype(),
                x.storage().ptr(),
                y.storage().ptr(),
                buffers.ptr_x.storage().ptr(),
                buffers.ptr_y.storage().ptr(),
                buffers.slots.storage().ptr(),
                m,
                px.len() - 1,
                num_nodes,
                buffers.slot_width,
            )?;
        }

        self.finish_edge_index(&buffers, max_num_neighbors, OP)
    }
}
