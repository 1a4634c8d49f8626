//! Core Tensor type

use super::{Layout, Storage};
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use std::fmt;

/// N-dimensional array stored on a compute device
///
/// A tensor is reference-counted [`Storage`] plus a [`Layout`] describing the
/// view into it. Views (`transpose`, `narrow`, `reshape`) share storage; kernels
/// require contiguous input and call [`Tensor::contiguous`] first.
///
/// # Example
///
/// ```
/// use topocluster::prelude::*;
///
/// let device = CpuDevice::new();
/// let points = Tensor::<CpuRuntime>::from_slice(&[0.0f32, 0.0, 1.0, 1.0], &[2, 2], &device);
/// assert_eq!(points.shape(), &[2, 2]);
/// ```
pub struct Tensor<R: Runtime> {
    storage: Storage<R>,
    layout: Layout,
}

impl<R: Runtime> Tensor<R> {
    /// Create a tensor from storage and layout
    pub fn from_parts(storage: Storage<R>, layout: Layout) -> Self {
        Self { storage, layout }
    }

    /// Create a tensor from a slice of data
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not equal the product of `shape` or the
    /// allocation fails. Use [`Self::try_from_slice`] for a fallible version.
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize], device: &R::Device) -> Self {
        Self::try_from_slice(data, shape, device).expect("Tensor::from_slice failed")
    }

    /// Create a tensor from a slice of data (fallible version)
    pub fn try_from_slice<T: Element>(
        data: &[T],
        shape: &[usize],
        device: &R::Device,
    ) -> Result<Self> {
        let expected_len: usize = shape.iter().product();
        if data.len() != expected_len {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }

        Ok(Self {
            storage: Storage::from_slice(data, device)?,
            layout: Layout::contiguous(shape),
        })
    }

    /// Create a tensor whose contents will be overwritten by a kernel
    ///
    /// # Panics
    ///
    /// Panics if the allocation fails. Use [`Self::try_empty`] for a fallible version.
    pub fn empty(shape: &[usize], dtype: DType, device: &R::Device) -> Self {
        Self::try_empty(shape, dtype, device).expect("Tensor::empty failed")
    }

    /// Allocate a tensor without initializing it for the caller (fallible version)
    pub fn try_empty(shape: &[usize], dtype: DType, device: &R::Device) -> Result<Self> {
        let len: usize = shape.iter().product();
        Ok(Self {
            storage: Storage::new(len, dtype, device)?,
            layout: Layout::contiguous(shape),
        })
    }

    /// Create a zero-filled tensor
    ///
    /// # Panics
    ///
    /// Panics if the allocation fails. Use [`Self::try_zeros`] for a fallible version.
    pub fn zeros(shape: &[usize], dtype: DType, device: &R::Device) -> Self {
        Self::try_zeros(shape, dtype, device).expect("Tensor::zeros failed")
    }

    /// Create a zero-filled tensor (fallible version)
    pub fn try_zeros(shape: &[usize], dtype: DType, device: &R::Device) -> Result<Self> {
        let len: usize = shape.iter().product();
        let bytes = vec![0u8; len * dtype.size_in_bytes()];
        Ok(Self {
            storage: Storage::from_bytes(&bytes, dtype, device)?,
            layout: Layout::contiguous(shape),
        })
    }

    // ===== Accessors =====

    /// Get the storage
    #[inline]
    pub fn storage(&self) -> &Storage<R> {
        &self.storage
    }

    /// Get the layout
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Get the strides
    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    /// Get the number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Get the total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.layout.elem_count()
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Get the device
    #[inline]
    pub fn device(&self) -> &R::Device {
        self.storage.device()
    }

    /// Check if the tensor is contiguous in memory
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    // ===== View Operations (Zero-Copy) =====

    /// Transpose two dimensions (zero-copy)
    pub fn transpose(&self, dim0: isize, dim1: isize) -> Result<Self> {
        let layout = self
            .layout
            .transpose(dim0, dim1)
            .ok_or(Error::InvalidDimension {
                dim: dim0,
                ndim: self.ndim(),
            })?;
        Ok(Self::from_parts(self.storage.clone(), layout))
    }

    /// Reshape to a new shape (zero-copy, requires contiguous input)
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        if !self.is_contiguous() {
            return Err(Error::NotContiguous);
        }
        let layout = self
            .layout
            .reshape(shape)
            .ok_or_else(|| Error::shape_mismatch(shape, self.shape()))?;
        Ok(Self::from_parts(self.storage.clone(), layout))
    }

    /// View tensor with different shape (alias for reshape)
    pub fn view(&self, shape: &[usize]) -> Result<Self> {
        self.reshape(shape)
    }

    /// Narrow a dimension to `start..start + length` (zero-copy)
    pub fn narrow(&self, dim: isize, start: usize, length: usize) -> Result<Self> {
        let dim_idx = self
            .layout
            .normalize_dim(dim)
            .ok_or(Error::InvalidDimension {
                dim,
                ndim: self.ndim(),
            })?;
        let layout = self
            .layout
            .narrow(dim_idx, start, length)
            .ok_or_else(|| Error::ShapeMismatch {
                expected: vec![self.shape()[dim_idx]],
                got: vec![start, length],
            })?;
        Ok(Self::from_parts(self.storage.clone(), layout))
    }

    /// Make the tensor contiguous, copying through `Runtime::copy_strided` if needed
    pub fn contiguous(&self) -> Result<Self> {
        if self.is_contiguous() {
            return Ok(self.clone());
        }

        let dtype = self.dtype();
        let device = self.storage.device();
        let storage = Storage::new(self.numel(), dtype, device)?;
        let elem_size = dtype.size_in_bytes();

        R::copy_strided(
            self.storage.ptr(),
            self.layout.offset() * elem_size,
            storage.ptr(),
            self.shape(),
            self.strides(),
            elem_size,
            device,
        )?;

        Ok(Self::from_parts(storage, Layout::contiguous(self.shape())))
    }

    // ===== Data Access =====

    /// Copy tensor data to a host Vec
    ///
    /// # Panics
    ///
    /// Panics if the device copy fails. Use [`Self::try_to_vec`] for a fallible version.
    pub fn to_vec<T: bytemuck::Pod>(&self) -> Vec<T> {
        self.try_to_vec().expect("Tensor::to_vec failed")
    }

    /// Copy tensor data to a host Vec (fallible version)
    ///
    /// Non-contiguous views are made contiguous first.
    pub fn try_to_vec<T: bytemuck::Pod>(&self) -> Result<Vec<T>> {
        if std::mem::size_of::<T>() != self.dtype().size_in_bytes() {
            return Err(Error::Internal(format!(
                "cannot read {} tensor as {}-byte elements",
                self.dtype(),
                std::mem::size_of::<T>()
            )));
        }

        let tensor = self.contiguous()?;
        // Allocate with T's alignment, then view as bytes for the copy
        let mut result = vec![T::zeroed(); tensor.numel()];
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut result);
        R::copy_from_device(tensor.storage.ptr(), bytes, tensor.storage.device())?;
        Ok(result)
    }

    /// Extract the value of a single-element tensor
    pub fn item<T: bytemuck::Pod>(&self) -> Result<T> {
        if self.numel() != 1 {
            return Err(Error::ShapeMismatch {
                expected: vec![1],
                got: self.shape().to_vec(),
            });
        }
        Ok(self.try_to_vec::<T>()?[0])
    }

    /// Copy this tensor into another runtime, staging through host memory
    pub fn to_runtime<R2: Runtime>(&self, device: &R2::Device) -> Result<Tensor<R2>> {
        let tensor = self.contiguous()?;
        let mut bytes = vec![0u8; tensor.numel() * tensor.dtype().size_in_bytes()];
        R::copy_from_device(tensor.storage.ptr(), &mut bytes, tensor.storage.device())?;
        let storage = Storage::<R2>::from_bytes(&bytes, tensor.dtype(), device)?;
        Ok(Tensor::from_parts(storage, Layout::contiguous(tensor.shape())))
    }
}

impl<R: Runtime> Clone for Tensor<R> {
    /// Clone creates a new tensor sharing the same storage (zero-copy)
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            layout: self.layout.clone(),
        }
    }
}

impl<R: Runtime> fmt::Debug for Tensor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("runtime", &R::name())
            .field("shape", &self.shape())
            .field("dtype", &self.dtype())
            .field("contiguous", &self.is_contiguous())
            .finish()
    }
}

impl<R: Runtime> fmt::Display for Tensor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor({:?}, dtype={})", self.shape(), self.dtype())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};

    #[test]
    fn test_zeros_and_item() {
        let device = CpuDevice::new();
        let t = Tensor::<CpuRuntime>::zeros(&[2, 3], DType::I64, &device);
        assert_eq!(t.to_vec::<i64>(), vec![0; 6]);
        assert!(t.item::<i64>().is_err());

        let one = Tensor::<CpuRuntime>::from_slice(&[7i32], &[1], &device);
        assert_eq!(one.item::<i32>().unwrap(), 7);
    }

    #[test]
    fn test_transpose_then_contiguous() {
        let device = CpuDevice::new();
        let t = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3], &device);
        let tt = t.transpose(0, 1).unwrap();
        assert!(!tt.is_contiguous());
        assert!(matches!(tt.reshape(&[6]), Err(Error::NotContiguous)));
        assert_eq!(tt.to_vec::<f32>(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert!(tt.contiguous().unwrap().is_contiguous());
    }

    #[test]
    fn test_narrow_rows() {
        let device = CpuDevice::new();
        let t = Tensor::<CpuRuntime>::from_slice(&[0i64, 1, 2, 3, 4, 5, 6, 7], &[4, 2], &device);
        let rows = t.narrow(0, 1, 2).unwrap();
        assert_eq!(rows.shape(), &[2, 2]);
        assert_eq!(rows.to_vec::<i64>(), vec![2, 3, 4, 5]);

        let head = t.narrow(-2, 0, 2).unwrap();
        assert_eq!(head.to_runtime::<CpuRuntime>(&device).unwrap().to_vec::<i64>(), vec![0, 1, 2, 3]);
        assert!(t.narrow(0, 3, 2).is_err());
    }

    #[test]
    fn test_wrong_element_size() {
        let device = CpuDevice::new();
        let t = Tensor::<CpuRuntime>::from_slice(&[1.0f64], &[1], &device);
        assert!(t.try_to_vec::<f32>().is_err());
        assert_eq!(t.to_string(), "Tensor([1], dtype=f64)");
    }
}
