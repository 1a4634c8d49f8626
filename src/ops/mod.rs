//! Neighbour-search operations
//!
//! Operations are defined as traits in [`traits`] and implemented by each
//! backend client, so the same call works on `CpuClient` and `CudaClient`:
//!
//! ```
//! use topocluster::prelude::*;
//!
//! fn groups<R: Runtime>(
//!     client: &impl ClusterOps<R>,
//!     mapping: &Tensor<R>,
//!     mask: &Tensor<R>,
//! ) -> Result<Tensor<R>> {
//!     client.centerline_group(mapping, mask, None, None, NeighborOptions::default())
//! }
//! ```
//!
//! Shared validation lives in `cluster_common`; batch-vector handling in
//! [`batch`].

pub mod batch;
pub(crate) mod cluster_common;
mod dispatch;
mod traits;

mod cpu;

#[cfg(feature = "cuda")]
mod cuda;

pub use cluster_common::DEFAULT_MAX_NUM_NEIGHBORS;
pub use traits::{ClusterOps, NeighborOptions};
