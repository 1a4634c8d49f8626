//! Common test utilities
#![allow(dead_code)]

use std::collections::BTreeSet;

use topocluster::runtime::Runtime;
use topocluster::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use topocluster::tensor::Tensor;
#[cfg(feature = "cuda")]
use topocluster::runtime::cuda::{CudaClient, CudaDevice};

/// Create a CPU client and device for testing
pub fn create_cpu_client() -> (CpuClient, CpuDevice) {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);
    (client, device)
}

/// Create a CUDA client and device, returning None if CUDA is unavailable
#[cfg(feature = "cuda")]
pub fn create_cuda_client() -> Option<(CudaClient, CudaDevice)> {
    if !topocluster::runtime::cuda::is_cuda_available() {
        return None;
    }
    let device = CudaDevice::new(0);
    let client = topocluster::runtime::cuda::client_for(&device).ok()?;
    Some((client, device))
}

/// Install a test logger so `RUST_LOG=debug` shows dispatch decisions
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Edges of a `[2, E]` edge index as `(query, point)` pairs, in output order
pub fn edge_list<R: Runtime>(edge_index: &Tensor<R>) -> Vec<(i64, i64)> {
    assert_eq!(edge_index.ndim(), 2, "edge index must be 2-D");
    assert_eq!(edge_index.shape()[0], 2, "edge index must have two rows");
    let data = edge_index.to_vec::<i64>();
    let e = edge_index.shape()[1];
    (0..e).map(|k| (data[k], data[e + k])).collect()
}

/// Edges of a `[2, E]` edge index as a set
pub fn edge_set<R: Runtime>(edge_index: &Tensor<R>) -> BTreeSet<(i64, i64)> {
    edge_list(edge_index).into_iter().collect()
}

/// Build an expected edge set from a literal list
pub fn set_of(edges: &[(i64, i64)]) -> BTreeSet<(i64, i64)> {
    edges.iter().copied().collect()
}

/// Number of edges per query row
pub fn edges_per_query<R: Runtime>(edge_index: &Tensor<R>, num_queries: usize) -> Vec<usize> {
    let mut counts = vec![0; num_queries];
    for (q, _) in edge_list(edge_index) {
        counts[q as usize] += 1;
    }
    counts
}
