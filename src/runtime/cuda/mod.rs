//! CUDA runtime implementation
//!
//! GPU acceleration via NVIDIA CUDA using cudarc.
//!
//! - `CudaDevice` - a CUDA GPU ordinal
//! - `CudaClient` - owns the context and stream, launches kernels
//! - `CudaRuntime` - implements the generic Runtime trait
//!
//! Kernels are compiled to PTX by `build.rs` and loaded per device on first use.

mod cache;
mod client;
mod device;
pub(crate) mod kernels;
mod runtime;

pub use client::CudaClient;
pub use device::CudaDevice;
pub use runtime::CudaRuntime;

use crate::error::Result;

/// Get the cached client for a device, creating its context on first use
pub fn client_for(device: &CudaDevice) -> Result<CudaClient> {
    cache::get_or_create_client(device)
}

/// Check if a CUDA device can be used on this system
pub fn is_cuda_available() -> bool {
    match CudaDevice::count() {
        Ok(count) if count > 0 => client_for(&CudaDevice::new(0)).is_ok(),
        Ok(_) => false,
        Err(e) => {
            log::debug!("CUDA unavailable: {}", e);
            false
        }
    }
}
