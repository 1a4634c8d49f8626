//! Shared helpers for backend parity tests: device upload and the CUDA lock.

use std::sync::{Mutex, OnceLock};

use topocluster::runtime::cpu::CpuRuntime;
use topocluster::runtime::cuda::{CudaClient, CudaDevice, CudaRuntime};
use topocluster::tensor::Tensor;

use crate::common::create_cuda_client;

static CUDA_BACKEND_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Copy a CPU tensor onto `device`
pub fn to_cuda(t: &Tensor<CpuRuntime>, device: &CudaDevice) -> Tensor<CudaRuntime> {
    t.to_runtime::<CudaRuntime>(device).unwrap()
}

/// Run `f` with the CUDA client, one test at a time; skipped without a device
pub fn with_cuda_backend<F>(f: F)
where
    F: FnOnce(CudaClient, CudaDevice),
{
    let _guard = CUDA_BACKEND_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let Some((client, device)) = create_cuda_client() else {
        return;
    };
    f(client, device);
}
