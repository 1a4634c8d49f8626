//! CUDA runtime implementation

use super::cache::{
    get_or_create_client, is_cuda_context_valid, log_cuda_memory_error, try_get_cached_stream,
};
use super::client::CudaClient;
use super::device::CudaDevice;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::runtime::cpu::{CpuDevice, CpuRuntime};

use cudarc::driver::sys::{self, CUresult};

/// CUDA Runtime adapter
///
/// Implements the generic Runtime trait for the CUDA backend.
/// Memory is stream-ordered (`cuMemAllocAsync`/`cuMemFreeAsync`) on the
/// device's cached client stream.
#[derive(Clone, Debug, Default)]
pub struct CudaRuntime;

impl Runtime for CudaRuntime {
    type Device = CudaDevice;
    type Client = CudaClient;

    fn name() -> &'static str {
        "cuda"
    }

    /// Allocate GPU memory.
    ///
    /// Returns `Err(OutOfMemory)` if CUDA memory allocation fails.
    fn allocate(size_bytes: usize, device: &Self::Device) -> Result<u64> {
        if size_bytes == 0 {
            return Ok(0);
        }

        let client = get_or_create_client(device)?;

        unsafe {
            let mut ptr: u64 = 0;
            let result = sys::cuMemAllocAsync(&mut ptr, size_bytes, client.stream.cu_stream());
            if result == CUresult::CUDA_SUCCESS {
                return Ok(ptr);
            }

            // Flush pending frees and retry once
            let _ = client.stream.synchronize();

            let result = sys::cuMemAllocAsync(&mut ptr, size_bytes, client.stream.cu_stream());
            if result == CUresult::CUDA_SUCCESS {
                return Ok(ptr);
            }

            log::warn!(
                "cuMemAllocAsync failed for {} bytes on device {}: {:?}",
                size_bytes,
                device.index,
                result
            );
            Err(Error::OutOfMemory { size: size_bytes })
        }
    }

    fn deallocate(ptr: u64, _size_bytes: usize, device: &Self::Device) {
        if ptr == 0 {
            return;
        }

        unsafe {
            // Memory is reclaimed by the driver once the context is gone
            if !is_cuda_context_valid() {
                return;
            }

            let result = if let Some(stream) = try_get_cached_stream(device.index) {
                sys::cuMemFreeAsync(ptr, stream)
            } else {
                sys::cuMemFree_v2(ptr)
            };

            if result != CUresult::CUDA_SUCCESS && result != CUresult::CUDA_ERROR_ILLEGAL_ADDRESS {
                log_cuda_memory_error("cuMemFree", ptr, result);
            }
        }
    }

    /// Copy data from host to device.
    fn copy_to_device(src: &[u8], dst: u64, device: &Self::Device) -> Result<()> {
        if src.is_empty() || dst == 0 {
            return Ok(());
        }

        let client = get_or_create_client(device)?;

        unsafe {
            let result = sys::cuMemcpyHtoDAsync_v2(
                dst,
                src.as_ptr() as *const std::ffi::c_void,
                src.len(),
                client.stream.cu_stream(),
            );

            if result != CUresult::CUDA_SUCCESS {
                return Err(Error::Backend(format!(
                    "CUDA host-to-device copy failed: {} bytes ({:?})",
                    src.len(),
                    result
                )));
            }
        }

        // The host buffer may be dropped as soon as we return
        client.stream.synchronize()?;
        Ok(())
    }

    /// Copy data from device to host.
    fn copy_from_device(src: u64, dst: &mut [u8], device: &Self::Device) -> Result<()> {
        if dst.is_empty() || src == 0 {
            return Ok(());
        }

        let client = get_or_create_client(device)?;

        unsafe {
            let result = sys::cuMemcpyDtoHAsync_v2(
                dst.as_mut_ptr() as *mut std::ffi::c_void,
                src,
                dst.len(),
                client.stream.cu_stream(),
            );

            if result != CUresult::CUDA_SUCCESS {
                return Err(Error::Backend(format!(
                    "CUDA device-to-host copy failed: {} bytes ({:?})",
                    dst.len(),
                    result
                )));
            }
        }

        client.stream.synchronize()?;
        Ok(())
    }

    /// Gather a strided view into a contiguous buffer.
    ///
    /// Inputs here are small coordinate tensors, so the gather is staged
    /// through host memory: the touched byte span is downloaded, gathered by
    /// the CPU runtime, and uploaded into `dst_handle`.
    fn copy_strided(
        src_handle: u64,
        src_byte_offset: usize,
        dst_handle: u64,
        shape: &[usize],
        strides: &[isize],
        elem_size: usize,
        device: &Self::Device,
    ) -> Result<()> {
        if src_handle == 0 || dst_handle == 0 {
            return Ok(());
        }

        let numel: usize = shape.iter().product();
        if numel == 0 {
            return Ok(());
        }

        // Element offsets reachable from the view origin
        let mut lo: isize = 0;
        let mut hi: isize = 0;
        for (&dim, &stride) in shape.iter().zip(strides) {
            let reach = (dim as isize - 1) * stride;
            if reach < 0 {
                lo += reach;
            } else {
                hi += reach;
            }
        }

        let origin = src_byte_offset as isize + lo * elem_size as isize;
        if origin < 0 {
            return Err(Error::Internal(format!(
                "strided view reaches {} bytes before its buffer",
                -origin
            )));
        }

        let span_bytes = ((hi - lo) as usize + 1) * elem_size;
        let mut span = vec![0u8; span_bytes];
        Self::copy_from_device(src_handle + origin as u64, &mut span, device)?;

        let mut packed = vec![0u8; numel * elem_size];
        CpuRuntime::copy_strided(
            span.as_ptr() as u64,
            (-lo) as usize * elem_size,
            packed.as_mut_ptr() as u64,
            shape,
            strides,
            elem_size,
            &CpuDevice::new(),
        )?;

        log::trace!(
            "strided copy of {} elements staged through {} host bytes",
            numel,
            span_bytes
        );
        Self::copy_to_device(&packed, dst_handle, device)
    }

    fn default_device() -> Self::Device {
        CudaDevice::new(0)
    }

    /// Get the cached client for a device.
    ///
    /// # Panics
    ///
    /// Panics if the CUDA context cannot be created. Use
    /// [`super::client_for`] for a fallible version.
    fn default_client(device: &Self::Device) -> Self::Client {
        get_or_create_client(device).expect("failed to create CUDA client")
    }
}
