//! Runtime-erased device names

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Where a tensor lives, independent of the concrete runtime type
///
/// Parses and displays as `cpu`, `cuda` (ordinal 0) or `cuda:N`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Placement {
    /// Host memory
    #[default]
    Cpu,
    /// CUDA device with the given ordinal
    Cuda(usize),
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Cpu => write!(f, "cpu"),
            Placement::Cuda(ordinal) => write!(f, "cuda:{}", ordinal),
        }
    }
}

impl FromStr for Placement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s {
            "cpu" => return Ok(Placement::Cpu),
            "cuda" => return Ok(Placement::Cuda(0)),
            _ => {}
        }

        let ordinal = s
            .strip_prefix("cuda:")
            .ok_or_else(|| Error::invalid_argument("device", format!("unknown device '{}'", s)))?;
        ordinal.parse::<usize>().map(Placement::Cuda).map_err(|_| {
            Error::invalid_argument("device", format!("invalid CUDA ordinal in '{}'", s))
        })
    }
}

/// CUDA driver version as `major * 1000 + minor * 10`, or `-1` without CUDA
///
/// Builds without the `cuda` feature, and machines where the driver cannot
/// be queried, report `-1`.
pub fn cuda_version() -> i64 {
    #[cfg(feature = "cuda")]
    {
        if let Err(e) = cudarc::driver::result::init() {
            log::debug!("CUDA driver init failed: {:?}", e);
            return -1;
        }

        let mut version: std::os::raw::c_int = 0;
        // SAFETY: the driver is initialized and `version` is a valid out-pointer
        let result = unsafe { cudarc::driver::sys::cuDriverGetVersion(&mut version) };
        if result != cudarc::driver::sys::CUresult::CUDA_SUCCESS {
            log::debug!("cuDriverGetVersion failed: {:?}", result);
            return -1;
        }
        // The driver reports 1000 * major + 10 * minor already
        version as i64
    }

    #[cfg(not(feature = "cuda"))]
    {
        -1
    }
}

/// Check whether a CUDA device can be used by this build
pub fn is_cuda_available() -> bool {
    #[cfg(feature = "cuda")]
    {
        super::cuda::is_cuda_available()
    }

    #[cfg(not(feature = "cuda"))]
    {
        false
    }
}
