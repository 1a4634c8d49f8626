//! Capability-typed backend selection
//!
//! A [`Backend`] is chosen from a runtime-erased [`Placement`]. Builds
//! without the `cuda` feature have no accelerator variant at all, so a CUDA
//! placement is rejected with [`Error::UnsupportedDevice`] at selection time
//! instead of failing deep inside a kernel launch.

use crate::error::{Error, Result};
use crate::ops::ClusterOps;
use crate::registry::HostTensor;
use crate::runtime::Placement;
use crate::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

#[cfg(feature = "cuda")]
use crate::runtime::RuntimeClient;
#[cfg(feature = "cuda")]
use crate::runtime::cuda::{self, CudaClient, CudaDevice, CudaRuntime};

/// Compute backend able to run the cluster operations
#[derive(Clone, Debug)]
pub enum Backend {
    /// Host CPU
    Cpu(CpuClient),
    /// CUDA device
    #[cfg(feature = "cuda")]
    Accelerator(CudaClient),
}

impl Backend {
    /// Select the backend that serves `placement`
    ///
    /// # Errors
    ///
    /// `UnsupportedDevice` when `placement` names a CUDA device and the crate
    /// was built without CUDA support, or the device cannot be initialized.
    pub fn for_placement(placement: Placement, op: &'static str) -> Result<Self> {
        let backend = match placement {
            Placement::Cpu => Backend::Cpu(CpuClient::default()),
            #[cfg(feature = "cuda")]
            Placement::Cuda(ordinal) => {
                let client = cuda::client_for(&CudaDevice::new(ordinal)).map_err(|e| {
                    Error::unsupported_device(placement.to_string(), op, e.to_string())
                })?;
                Backend::Accelerator(client)
            }
            #[cfg(not(feature = "cuda"))]
            Placement::Cuda(_) => {
                return Err(Error::unsupported_device(
                    placement.to_string(),
                    op,
                    "not compiled with CUDA support",
                ));
            }
        };
        log::debug!("{}: dispatching to {} backend", op, backend.name());
        Ok(backend)
    }

    /// Placement served by this backend
    pub fn placement(&self) -> Placement {
        match self {
            Backend::Cpu(_) => Placement::Cpu,
            #[cfg(feature = "cuda")]
            Backend::Accelerator(client) => Placement::Cuda(client.device().index()),
        }
    }

    /// Runtime name of this backend
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Cpu(_) => CpuRuntime::name(),
            #[cfg(feature = "cuda")]
            Backend::Accelerator(_) => CudaRuntime::name(),
        }
    }

    /// Run `vector_radius` on host-staged tensors
    #[allow(clippy::too_many_arguments)]
    pub fn vector_radius(
        &self,
        x: &HostTensor,
        y: &HostTensor,
        ptr_x: Option<&HostTensor>,
        ptr_y: Option<&HostTensor>,
        r: f64,
        max_num_neighbors: usize,
        num_workers: usize,
    ) -> Result<HostTensor> {
        match self {
            Backend::Cpu(client) => {
                let out = client.vector_radius_ptr(
                    x.tensor(),
                    y.tensor(),
                    ptr_x.map(HostTensor::tensor),
                    ptr_y.map(HostTensor::tensor),
                    r,
                    max_num_neighbors,
                    num_workers,
                )?;
                Ok(HostTensor::new(out, self.placement()))
            }
            #[cfg(feature = "cuda")]
            Backend::Accelerator(client) => {
                let device = client.device();
                let x = upload::<CudaRuntime>(x, device)?;
                let y = upload::<CudaRuntime>(y, device)?;
                let ptr_x = ptr_x.map(|p| upload::<CudaRuntime>(p, device)).transpose()?;
                let ptr_y = ptr_y.map(|p| upload::<CudaRuntime>(p, device)).transpose()?;
                let out = client.vector_radius_ptr(
                    &x,
                    &y,
                    ptr_x.as_ref(),
                    ptr_y.as_ref(),
                    r,
                    max_num_neighbors,
                    num_workers,
                )?;
                download(&out, self.placement())
            }
        }
    }

    /// Run `centerline_group` on host-staged tensors
    pub fn centerline_group(
        &self,
        x: &HostTensor,
        y: &HostTensor,
        ptr_x: Option<&HostTensor>,
        ptr_y: Option<&HostTensor>,
        max_num_neighbors: usize,
        num_workers: usize,
    ) -> Result<HostTensor> {
        match self {
            Backend::Cpu(client) => {
                let out = client.centerline_group_ptr(
                    x.tensor(),
                    y.tensor(),
                    ptr_x.map(HostTensor::tensor),
                    ptr_y.map(HostTensor::tensor),
                    max_num_neighbors,
                    num_workers,
                )?;
                Ok(HostTensor::new(out, self.placement()))
            }
            #[cfg(feature = "cuda")]
            Backend::Accelerator(client) => {
                let device = client.device();
                let x = upload::<CudaRuntime>(x, device)?;
                let y = upload::<CudaRuntime>(y, device)?;
                let ptr_x = ptr_x.map(|p| upload::<CudaRuntime>(p, device)).transpose()?;
                let ptr_y = ptr_y.map(|p| upload::<CudaRuntime>(p, device)).transpose()?;
                let out = client.centerline_group_ptr(
                    &x,
                    &y,
                    ptr_x.as_ref(),
                    ptr_y.as_ref(),
                    max_num_neighbors,
                    num_workers,
                )?;
                download(&out, self.placement())
            }
        }
    }
}

/// Copy a host-staged tensor onto a device of runtime `R`
#[cfg_attr(not(feature = "cuda"), allow(dead_code))]
fn upload<R: Runtime>(t: &HostTensor, device: &R::Device) -> Result<Tensor<R>> {
    t.tensor().to_runtime::<R>(device)
}

/// Stage a device result back in host memory, tagged with `placement`
#[cfg_attr(not(feature = "cuda"), allow(dead_code))]
fn download<R: Runtime>(t: &Tensor<R>, placement: Placement) -> Result<HostTensor> {
    let host = t.to_runtime::<CpuRuntime>(&CpuDevice::new())?;
    Ok(HostTensor::new(host, placement))
}
