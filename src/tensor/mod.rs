//! Tensor types
//!
//! The core `Tensor` type represents an n-dimensional array stored on a
//! compute device (CPU or CUDA).

mod core;
mod layout;
mod storage;

pub use core::Tensor;
pub use layout::Layout;
pub use storage::Storage;
