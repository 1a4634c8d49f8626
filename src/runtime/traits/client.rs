//! Trait for runtime clients that handle operation dispatch

use super::Runtime;

/// Trait for runtime clients that handle operation dispatch
///
/// Operation traits (see [`crate::ops::ClusterOps`]) are implemented on the
/// client, which owns whatever the backend needs to launch work: a stream on
/// CUDA, a parallelism threshold on CPU.
pub trait RuntimeClient<R: Runtime>: Clone + Send + Sync {
    /// Get the device this client operates on
    fn device(&self) -> &R::Device;

    /// Synchronize: wait for all pending operations to complete
    fn synchronize(&self);
}
