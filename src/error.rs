//! Error types for topocluster

use crate::dtype::DType;
use thiserror::Error;

/// Result type alias using topocluster's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in topocluster operations
#[derive(Error, Debug)]
pub enum Error {
    /// Shape mismatch in an operation
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Invalid dimension index
    #[error("Invalid dimension {dim} for tensor with {ndim} dimensions")]
    InvalidDimension {
        /// The invalid dimension
        dim: isize,
        /// Number of dimensions
        ndim: usize,
    },

    /// Unsupported dtype for an operation
    #[error("Unsupported dtype {dtype:?} for operation '{op}'")]
    UnsupportedDType {
        /// The unsupported dtype
        dtype: DType,
        /// The operation name
        op: &'static str,
    },

    /// DType mismatch between operands
    #[error("DType mismatch: {lhs:?} vs {rhs:?}")]
    DTypeMismatch {
        /// Left-hand side dtype
        lhs: DType,
        /// Right-hand side dtype
        rhs: DType,
    },

    /// Device mismatch between operands
    #[error("Device mismatch: tensors must be on the same device, got {lhs} and {rhs}")]
    DeviceMismatch {
        /// Placement of the first tensor
        lhs: String,
        /// Placement of the conflicting tensor
        rhs: String,
    },

    /// Out of memory
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Tensor is not contiguous when contiguous memory is required
    #[error("Operation requires contiguous tensor")]
    NotContiguous,

    /// The requested device is not available in this build or on this machine
    #[error("Unsupported device '{device}' for operation '{op}': {reason}")]
    UnsupportedDevice {
        /// Device the caller asked for (e.g. `cuda:0`)
        device: String,
        /// The operation being dispatched
        op: &'static str,
        /// Why the device cannot be used
        reason: String,
    },

    /// No operator with this name is registered
    #[error("Unknown operator '{name}'")]
    UnknownOperator {
        /// Fully qualified operator name
        name: String,
    },

    /// An operator with this name is already registered
    #[error("Operator '{name}' is already registered")]
    DuplicateOperator {
        /// Fully qualified operator name
        name: String,
    },

    /// Dynamic call arguments do not match the operator schema
    #[error("Schema mismatch for '{op}': {reason}")]
    SchemaMismatch {
        /// Fully qualified operator name
        op: String,
        /// Description of the mismatch
        reason: String,
    },

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),

    /// CUDA-specific error
    #[cfg(feature = "cuda")]
    #[error("CUDA error: {0}")]
    Cuda(#[from] cudarc::driver::DriverError),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: DType, op: &'static str) -> Self {
        Self::UnsupportedDType { dtype, op }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create an unsupported device error
    pub fn unsupported_device(
        device: impl Into<String>,
        op: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnsupportedDevice {
            device: device.into(),
            op,
            reason: reason.into(),
        }
    }

    /// Create a schema mismatch error
    pub fn schema_mismatch(op: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            op: op.into(),
            reason: reason.into(),
        }
    }
}
