//! Neighbour-search CUDA kernel launchers.
//!
//! Both kernels run one thread per query row. Thread `i` locates its example
//! by binary search over `ptr_y`, scans the example's `x` rows in order and
//! writes up to `max_neighbors` matches into `out[i * max_neighbors..]`.
//! Callers pass one slot more than the user cap to detect dropped matches.
//! `out` must be pre-filled with `-1`; unused slots stay `-1`.

use cudarc::driver::PushKernelArg;
use cudarc::driver::safe::{CudaContext, CudaStream};
use std::sync::Arc;

use super::loader::{get_kernel_function, get_or_load_module, kernel_name, per_item_launch_config};
use crate::dtype::DType;
use crate::error::{Error, Result};

/// Module name for segment radius kernels
pub const VECTOR_RADIUS_MODULE: &str = "vector_radius";

/// Module name for centerline grouping kernels
pub const CENTERLINE_GROUP_MODULE: &str = "centerline_group";

/// Launch the segment radius kernel.
///
/// # Safety
///
/// - All pointers must be valid device memory on the stream's device
/// - `x` holds `[N, dim]` and `y` holds `[num_queries, 2 * dim]` elements of `dtype`
/// - `ptr_x`, `ptr_y` hold `num_examples + 1` `i64` offsets
/// - `out` holds `num_queries * max_neighbors` `i64` slots filled with `-1`
#[allow(clippy::too_many_arguments)]
pub unsafe fn launch_vector_radius(
    context: &Arc<CudaContext>,
    stream: &CudaStream,
    device_index: usize,
    dtype: DType,
    x_ptr: u64,
    y_ptr: u64,
    ptr_x: u64,
    ptr_y: u64,
    out_ptr: u64,
    num_queries: usize,
    num_examples: usize,
    dim: usize,
    r2: f64,
    max_neighbors: usize,
) -> Result<()> {
    const OP: &str = "vector_radius";
    if !matches!(dtype, DType::F32 | DType::F64) {
        return Err(Error::UnsupportedDType { dtype, op: OP });
    }

    let module = get_or_load_module(context, device_index, VECTOR_RADIUS_MODULE)?;
    let func = get_kernel_function(&module, &kernel_name("vector_radius", dtype, OP)?)?;
    let cfg = per_item_launch_config(num_queries);

    let num_queries_u32 = num_queries as u32;
    let num_examples_u32 = num_examples as u32;
    let dim_u32 = dim as u32;
    let max_u32 = max_neighbors as u32;
    // Rounded the same way the CPU backend rounds `r * r` to the element type
    let r2_f32 = r2 as f32;

    let mut builder = stream.launch_builder(&func);
    builder.arg(&x_ptr);
    builder.arg(&y_ptr);
    builder.arg(&ptr_x);
    builder.arg(&ptr_y);
    builder.arg(&out_ptr);
    builder.arg(&num_queries_u32);
    builder.arg(&num_examples_u32);
    builder.arg(&dim_u32);
    match dtype {
        DType::F32 => builder.arg(&r2_f32),
        _ => builder.arg(&r2),
    };
    builder.arg(&max_u32);

    log::debug!(
        "launching vector_radius_{}: {} queries, grid {:?}",
        dtype.short_name(),
        num_queries,
        cfg.grid_dim
    );

    unsafe { builder.launch(cfg) }
        .map_err(|e| Error::Backend(format!("Failed to launch vector_radius kernel: {:?}", e)))?;

    Ok(())
}

/// Launch the centerline grouping kernel.
///
/// # Safety
///
/// - All pointers must be valid device memory on the stream's device
/// - `x` holds `N` and `y` holds `[num_queries, num_nodes]` elements of `dtype`
/// - `ptr_x`, `ptr_y` hold `num_examples + 1` `i64` offsets
/// - `out` holds `num_queries * max_neighbors` `i64` slots filled with `-1`
#[allow(clippy::too_many_arguments)]
pub unsafe fn launch_centerline_group(
    context: &Arc<CudaContext>,
    stream: &CudaStream,
    device_index: usize,
    dtype: DType,
    x_ptr: u64,
    y_ptr: u64,
    ptr_x: u64,
    ptr_y: u64,
    out_ptr: u64,
    num_queries: usize,
    num_examples: usize,
    num_nodes: usize,
    max_neighbors: usize,
) -> Result<()> {
    const OP: &str = "centerline_group";

    let module = get_or_load_module(context, device_index, CENTERLINE_GROUP_MODULE)?;
    let func = get_kernel_function(&module, &kernel_name("centerline_group", dtype, OP)?)?;
    let cfg = per_item_launch_config(num_queries);

    let num_queries_u32 = num_queries as u32;
    let num_examples_u32 = num_examples as u32;
    let num_nodes_u32 = num_nodes as u32;
    let max_u32 = max_neighbors as u32;

    let mut builder = stream.launch_builder(&func);
    builder.arg(&x_ptr);
    builder.arg(&y_ptr);
    builder.arg(&ptr_x);
    builder.arg(&ptr_y);
    builder.arg(&out_ptr);
    builder.arg(&num_queries_u32);
    builder.arg(&num_examples_u32);
    builder.arg(&num_nodes_u32);
    builder.arg(&max_u32);

    log::debug!(
        "launching centerline_group_{}: {} queries, grid {:?}",
        dtype.short_name(),
        num_queries,
        cfg.grid_dim
    );

    unsafe { builder.launch(cfg) }.map_err(|e| {
        Error::Backend(format!("Failed to launch centerline_group kernel: {:?}", e))
    })?;

    Ok(())
}
