//! CUDA kernel loading and caching
//!
//! PTX files are compiled by `build.rs` with nvcc, loaded on first use and
//! cached per device.

pub use cudarc::driver::safe::LaunchConfig;
use cudarc::driver::safe::{CudaContext, CudaFunction, CudaModule};
use cudarc::nvrtc::Ptx;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use crate::dtype::DType;
use crate::error::{Error, Result};

/// Directory containing compiled PTX files (set by build.rs)
const KERNEL_DIR: &str = env!("CUDA_KERNEL_DIR");

/// Load PTX from compiled file.
fn load_ptx(name: &str) -> Ptx {
    let path = format!("{}/{}.ptx", KERNEL_DIR, name);
    Ptx::from_file(path)
}

/// Cache for loaded CUDA modules, keyed by (device_index, module_name)
static MODULE_CACHE: OnceLock<Mutex<HashMap<(usize, &'static str), Arc<CudaModule>>>> =
    OnceLock::new();

/// Get or load a CUDA module from PTX.
///
/// # Errors
///
/// Returns an error if the PTX file cannot be loaded or the module cannot be created.
pub fn get_or_load_module(
    context: &Arc<CudaContext>,
    device_index: usize,
    module_name: &'static str,
) -> Result<Arc<CudaModule>> {
    let cache = MODULE_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = cache.lock().map_err(|e| {
        Error::Internal(format!(
            "Failed to acquire module cache lock (Mutex poisoned): {}",
            e
        ))
    })?;

    let key = (device_index, module_name);
    if let Some(module) = guard.get(&key) {
        return Ok(module.clone());
    }

    let ptx = load_ptx(module_name);
    let module = context.load_module(ptx).map_err(|e| {
        Error::Internal(format!(
            "Failed to load CUDA module '{}': {:?}. \
             Ensure CUDA kernels were compiled correctly by build.rs.",
            module_name, e
        ))
    })?;

    log::debug!("loaded CUDA module '{}' on device {}", module_name, device_index);
    guard.insert(key, module.clone());

    Ok(module)
}

/// Get a kernel function from a loaded module.
pub fn get_kernel_function(module: &Arc<CudaModule>, kernel_name: &str) -> Result<CudaFunction> {
    module.load_function(kernel_name).map_err(|e| {
        Error::Internal(format!(
            "Failed to get kernel '{}': {:?}. \
             Check that the kernel name matches the CUDA source.",
            kernel_name, e
        ))
    })
}

/// Threads per block for one-thread-per-query kernels
pub const BLOCK_SIZE: u32 = 256;

/// One thread per item, `BLOCK_SIZE` threads per block
#[inline]
pub fn per_item_launch_config(items: usize) -> LaunchConfig {
    let grid = (items as u32).div_ceil(BLOCK_SIZE);
    LaunchConfig {
        grid_dim: (grid.max(1), 1, 1),
        block_dim: (BLOCK_SIZE, 1, 1),
        shared_mem_bytes: 0,
    }
}

/// Get the kernel name suffix for a given dtype.
pub fn dtype_suffix(dtype: DType) -> Option<&'static str> {
    match dtype {
        DType::F32 => Some("f32"),
        DType::F64 => Some("f64"),
        DType::I64 => Some("i64"),
        DType::I32 => Some("i32"),
        _ => None,
    }
}

/// Typed kernel name, e.g. `vector_radius_f32`
pub fn kernel_name(base: &str, dtype: DType, op: &'static str) -> Result<String> {
    let suffix = dtype_suffix(dtype).ok_or(Error::UnsupportedDType { dtype, op })?;
    Ok(format!("{}_{}", base, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_name() {
        assert_eq!(
            kernel_name("vector_radius", DType::F32, "vector_radius").unwrap(),
            "vector_radius_f32"
        );
        assert!(kernel_name("centerline_group", DType::U8, "centerline_group").is_err());
    }

    #[test]
    fn test_per_item_launch_config() {
        assert_eq!(per_item_launch_config(1).grid_dim, (1, 1, 1));
        assert_eq!(per_item_launch_config(256).grid_dim, (1, 1, 1));
        assert_eq!(per_item_launch_config(257).grid_dim, (2, 1, 1));
    }
}
