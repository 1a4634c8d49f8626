//! CUDA Client implementation
//!
//! CudaClient owns stream and context for direct cudarc access.
//!
//! # Thread Safety
//!
//! `CudaClient` is `Clone` and can be shared across threads. The underlying
//! CUDA context and stream are reference-counted via `Arc`.

use cudarc::driver::safe::{CudaContext, CudaStream};
use std::sync::Arc;

use super::CudaRuntime;
use super::device::CudaDevice;
use crate::error::{Error, Result};
use crate::runtime::RuntimeClient;

/// CUDA Runtime Client
///
/// Owns CUDA context and stream for direct kernel launches.
/// Every allocation, copy and kernel for this device is issued on `stream`,
/// so work is ordered without extra synchronization.
#[derive(Clone)]
pub struct CudaClient {
    /// GPU device index
    pub(crate) device: CudaDevice,

    /// CUDA context for this device
    pub(crate) context: Arc<CudaContext>,

    /// Stream on which all kernels launch
    pub(crate) stream: Arc<CudaStream>,
}

impl std::fmt::Debug for CudaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CudaClient")
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl CudaClient {
    /// Create a new CUDA client for a device.
    ///
    /// Prefer [`super::client_for`], which reuses one client per device.
    ///
    /// # Errors
    ///
    /// Returns an error if context or stream creation fails (e.g. invalid
    /// device ordinal, no driver).
    pub fn new(device: CudaDevice) -> Result<Self> {
        let context = CudaContext::new(device.index).map_err(|e| {
            Error::Backend(format!(
                "failed to create CUDA context for device {}: {:?}",
                device.index, e
            ))
        })?;

        context.bind_to_thread().map_err(|e| {
            Error::Backend(format!("failed to bind CUDA context to thread: {:?}", e))
        })?;

        let stream = context
            .new_stream()
            .map_err(|e| Error::Backend(format!("failed to create CUDA stream: {:?}", e)))?;

        log::debug!("created CUDA client for device {}", device.index);

        Ok(Self {
            device,
            context,
            stream,
        })
    }

    /// Get reference to the CUDA stream.
    #[inline]
    pub fn stream(&self) -> &CudaStream {
        &self.stream
    }

    /// Get reference to the CUDA context.
    #[inline]
    pub fn context(&self) -> &Arc<CudaContext> {
        &self.context
    }

    /// Wait for all work on this client's stream
    pub fn try_synchronize(&self) -> Result<()> {
        self.stream.synchronize()?;
        Ok(())
    }
}

impl RuntimeClient<CudaRuntime> for CudaClient {
    fn device(&self) -> &CudaDevice {
        &self.device
    }

    fn synchronize(&self) {
        if let Err(e) = self.stream.synchronize() {
            log::error!("CUDA stream synchronization failed: {:?}", e);
        }
    }
}
