//! Dynamic values passed across the registry boundary

use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::runtime::Placement;
use crate::runtime::cpu::{CpuDevice, CpuRuntime};
use crate::tensor::Tensor;
use std::fmt;

/// A tensor handed over by a host, staged in CPU memory
///
/// `placement` records where the host keeps the tensor; it decides which
/// backend runs an operation and is carried over to the result.
#[derive(Clone, Debug)]
pub struct HostTensor {
    tensor: Tensor<CpuRuntime>,
    placement: Placement,
}

impl HostTensor {
    /// Wrap staged data with the placement the host reported
    pub fn new(tensor: Tensor<CpuRuntime>, placement: Placement) -> Self {
        Self { tensor, placement }
    }

    /// Stage a slice of data with the given placement
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize], placement: Placement) -> Result<Self> {
        let tensor = Tensor::try_from_slice(data, shape, &CpuDevice::new())?;
        Ok(Self::new(tensor, placement))
    }

    /// Staged data
    pub fn tensor(&self) -> &Tensor<CpuRuntime> {
        &self.tensor
    }

    /// Consume into the staged data
    pub fn into_tensor(self) -> Tensor<CpuRuntime> {
        self.tensor
    }

    /// Where the host keeps this tensor
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Shape of the staged data
    pub fn shape(&self) -> &[usize] {
        self.tensor.shape()
    }

    /// Element type of the staged data
    pub fn dtype(&self) -> DType {
        self.tensor.dtype()
    }
}

/// Kind tag of an [`IValue`], used in schema errors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// A tensor
    Tensor,
    /// The absent value
    None,
    /// A float
    Double,
    /// An integer
    Int,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Tensor => "Tensor",
            ValueKind::None => "None",
            ValueKind::Double => "float",
            ValueKind::Int => "int",
        };
        f.write_str(name)
    }
}

/// Dynamically typed operator argument or return value
#[derive(Clone, Debug)]
pub enum IValue {
    /// A host-staged tensor
    Tensor(HostTensor),
    /// Absent optional argument
    None,
    /// Floating-point scalar
    Double(f64),
    /// Integer scalar
    Int(i64),
}

impl IValue {
    /// Kind tag of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            IValue::Tensor(_) => ValueKind::Tensor,
            IValue::None => ValueKind::None,
            IValue::Double(_) => ValueKind::Double,
            IValue::Int(_) => ValueKind::Int,
        }
    }

    /// The tensor, if this is one
    pub fn as_tensor(&self) -> Option<&HostTensor> {
        match self {
            IValue::Tensor(t) => Some(t),
            _ => None,
        }
    }

    /// Consume into the tensor, if this is one
    pub fn into_tensor(self) -> Option<HostTensor> {
        match self {
            IValue::Tensor(t) => Some(t),
            _ => None,
        }
    }

    /// The float value; integers widen to float
    pub fn as_double(&self) -> Option<f64> {
        match self {
            IValue::Double(v) => Some(*v),
            IValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// The integer value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            IValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether this is [`IValue::None`]
    pub fn is_none(&self) -> bool {
        matches!(self, IValue::None)
    }
}

impl From<HostTensor> for IValue {
    fn from(t: HostTensor) -> Self {
        IValue::Tensor(t)
    }
}

impl From<Option<HostTensor>> for IValue {
    fn from(t: Option<HostTensor>) -> Self {
        t.map_or(IValue::None, IValue::Tensor)
    }
}

impl From<f64> for IValue {
    fn from(v: f64) -> Self {
        IValue::Double(v)
    }
}

impl From<i64> for IValue {
    fn from(v: i64) -> Self {
        IValue::Int(v)
    }
}

/// The placement shared by every given tensor
///
/// # Errors
///
/// `DeviceMismatch` naming the first two placements that differ.
pub fn common_placement(tensors: &[Option<&HostTensor>]) -> Result<Placement> {
    let mut present = tensors.iter().flatten();
    let Some(first) = present.next() else {
        return Ok(Placement::Cpu);
    };
    let placement = first.placement();
    for t in present {
        if t.placement() != placement {
            return Err(Error::DeviceMismatch {
                lhs: placement.to_string(),
                rhs: t.placement().to_string(),
            });
        }
    }
    Ok(placement)
}
