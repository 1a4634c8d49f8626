//! CPU runtime implementation
//!
//! The CPU runtime uses standard heap allocation and provides the reference
//! implementation of every operation. With the `rayon` feature, queries are
//! split across a worker pool when the caller asks for more than one worker.

mod client;
mod device;
pub(crate) mod kernels;
mod runtime;

pub use client::{CpuClient, DEFAULT_PARALLEL_THRESHOLD};
pub use device::CpuDevice;
pub use runtime::CpuRuntime;
