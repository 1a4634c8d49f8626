//! # topocluster
//!
//! **Batched neighbour queries for point clouds on CPU and CUDA tensors.**
//!
//! topocluster builds sparse `[2, E]` edge lists between a set of points `x` and a
//! set of queries `y`, where both sets may hold several examples packed along the
//! row dimension:
//!
//! - **vector_radius**: every point within radius `r` of a query line segment
//! - **centerline_group**: every point whose centerline node is active in a query mask
//!
//! Both operations share the same batching model (sorted batch vectors or ptr
//! offsets), a per-query neighbour cap, and an optional multi-threaded CPU path.
//!
//! ## Quick Start
//!
//! ```rust
//! use topocluster::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let device = CpuDevice::new();
//! let client = CpuClient::new(device.clone());
//!
//! let x = Tensor::<CpuRuntime>::from_slice(&[0.0f32, 0.0, 5.0, 5.0], &[2, 2], &device);
//! let y = Tensor::<CpuRuntime>::from_slice(&[-1.0f32, 0.0, 1.0, 0.0], &[1, 4], &device);
//!
//! let edges = client.vector_radius(&x, &y, 0.5, None, None, NeighborOptions::default())?;
//! assert_eq!(edges.shape(), &[2, 1]);
//! assert_eq!(edges.to_vec::<i64>(), vec![0, 0]);
//! # Ok(())
//! # }
//! ```
//!
//! Hosts that dispatch dynamically go through an explicit
//! [`OperatorRegistry`](registry::OperatorRegistry) instead.
//!
//! ## Feature Flags
//!
//! - `cpu` (default): CPU backend
//! - `rayon` (default): Multi-threaded CPU queries
//! - `cuda`: NVIDIA CUDA backend
//! - `f16`: Half-precision floats (F16, BF16)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod backend;
pub mod dtype;
pub mod error;
pub mod ops;
pub mod registry;
pub mod runtime;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backend::Backend;
    pub use crate::dtype::DType;
    pub use crate::error::{Error, Result};
    pub use crate::ops::{ClusterOps, NeighborOptions};
    pub use crate::registry::{HostTensor, IValue, OperatorRegistry};
    pub use crate::runtime::{Device, Placement, Runtime, RuntimeClient};
    pub use crate::tensor::{Layout, Tensor};

    pub use crate::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};

    #[cfg(feature = "cuda")]
    pub use crate::runtime::cuda::{CudaClient, CudaDevice, CudaRuntime};
}

/// Default runtime based on enabled features
///
/// - With `cuda` feature: `CudaRuntime`
/// - Otherwise: `CpuRuntime`
#[cfg(feature = "cuda")]
pub type DefaultRuntime = runtime::cuda::CudaRuntime;

/// Default runtime based on enabled features
#[cfg(not(feature = "cuda"))]
pub type DefaultRuntime = runtime::cpu::CpuRuntime;
