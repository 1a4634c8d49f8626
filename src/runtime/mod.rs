//! Runtime backends for tensor computation
//!
//! This module defines the `Runtime` trait and provides implementations
//! for the CPU and (behind the `cuda` feature) CUDA backends.
//!
//! # Architecture
//!
//! ```text
//! Runtime (backend identity, memory model)
//! ├── Device (identifies a specific GPU/CPU)
//! └── Client (dispatches operations, owns stream)
//! ```
//!
//! [`Placement`] is the runtime-erased name of a device, used at dynamic
//! boundaries (the operator registry) where the concrete runtime is chosen.

mod placement;
mod traits;

pub mod cpu;

#[cfg(feature = "cuda")]
pub mod cuda;

pub use placement::{Placement, cuda_version, is_cuda_available};
pub use traits::{Device, Runtime, RuntimeClient};
