//! CUDA Device implementation

use crate::error::{Error, Result};
use crate::runtime::Device;

/// CUDA device, identified by its ordinal
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CudaDevice {
    /// Index of the GPU device (0, 1, 2, ...)
    pub(crate) index: usize,
}

impl CudaDevice {
    /// Create a new CUDA device handle
    ///
    /// This does not touch the driver; the context is created when the first
    /// client for this device is requested.
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    /// Ordinal of this device
    pub fn index(&self) -> usize {
        self.index
    }

    /// Get the compute capability of this CUDA device
    ///
    /// Returns (major, minor) version numbers (e.g., (8, 6) for sm_86).
    pub fn compute_capability(&self) -> Result<(u32, u32)> {
        use cudarc::driver::sys::CUdevice_attribute;

        cudarc::driver::result::init()?;
        let device = cudarc::driver::result::device::get(self.index as i32)?;

        let major = unsafe {
            cudarc::driver::result::device::get_attribute(
                device,
                CUdevice_attribute::CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MAJOR,
            )
        }?;
        let minor = unsafe {
            cudarc::driver::result::device::get_attribute(
                device,
                CUdevice_attribute::CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MINOR,
            )
        }?;

        Ok((major as u32, minor as u32))
    }

    /// Number of CUDA devices visible to the driver
    pub fn count() -> Result<usize> {
        cudarc::driver::result::init()?;
        let count = cudarc::driver::result::device::get_count()?;
        usize::try_from(count)
            .map_err(|_| Error::Backend(format!("driver reported {} devices", count)))
    }
}

impl Device for CudaDevice {
    fn id(&self) -> usize {
        self.index
    }

    fn name(&self) -> String {
        format!("cuda:{}", self.index)
    }
}

impl Default for CudaDevice {
    fn default() -> Self {
        Self::new(0)
    }
}
