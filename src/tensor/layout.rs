//! Layout: shape, strides, and offset for tensor memory layout

use smallvec::SmallVec;
use std::fmt;

/// Most coordinate tensors are 1-D or 2-D, so four inline dims is plenty
const STACK_DIMS: usize = 4;

/// Shape type: dimensions of a tensor
pub type Shape = SmallVec<[usize; STACK_DIMS]>;

/// Strides in ELEMENTS (not bytes) between consecutive elements along each dimension
pub type Strides = SmallVec<[isize; STACK_DIMS]>;

/// Memory layout of a tensor view
///
/// Address of element at indices `[i0, ..., in]`:
///   `offset + i0 * strides[0] + ... + in * strides[n]`
#[derive(Clone, PartialEq, Eq)]
pub struct Layout {
    shape: Shape,
    strides: Strides,
    offset: usize,
}

impl Layout {
    /// Create a new contiguous (row-major) layout from a shape
    ///
    /// # Example
    /// ```
    /// use topocluster::tensor::Layout;
    /// let layout = Layout::contiguous(&[4, 3]);
    /// assert_eq!(layout.strides(), &[3, 1]);
    /// ```
    pub fn contiguous(shape: &[usize]) -> Self {
        let shape: Shape = shape.iter().copied().collect();
        let strides = Self::compute_contiguous_strides(&shape);
        Self {
            shape,
            strides,
            offset: 0,
        }
    }

    /// Create a layout with explicit shape, strides, and offset
    pub fn new(shape: Shape, strides: Strides, offset: usize) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        Self {
            shape,
            strides,
            offset,
        }
    }

    fn compute_contiguous_strides(shape: &[usize]) -> Strides {
        let mut strides: Strides = SmallVec::with_capacity(shape.len());
        let mut stride = 1isize;
        for &dim in shape.iter().rev() {
            strides.push(stride);
            stride *= dim as isize;
        }
        strides.reverse();
        strides
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the strides
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Get the offset
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements
    #[inline]
    pub fn elem_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Row-major with zero offset, so the storage pointer addresses element 0
    pub fn is_contiguous(&self) -> bool {
        if self.offset != 0 {
            return false;
        }
        // Strides of size-1 dims never affect addressing
        let expected = Self::compute_contiguous_strides(&self.shape);
        self.shape
            .iter()
            .zip(self.strides.iter().zip(expected.iter()))
            .all(|(&dim, (&s, &e))| dim <= 1 || s == e)
    }

    /// Normalize a dimension index (handle negative indices)
    pub fn normalize_dim(&self, d: isize) -> Option<usize> {
        let ndim = self.ndim() as isize;
        let idx = if d < 0 { ndim + d } else { d };
        if idx >= 0 && idx < ndim {
            Some(idx as usize)
        } else {
            None
        }
    }

    /// Swap two dimensions
    pub fn transpose(&self, dim0: isize, dim1: isize) -> Option<Self> {
        let d0 = self.normalize_dim(dim0)?;
        let d1 = self.normalize_dim(dim1)?;

        let mut shape = self.shape.clone();
        let mut strides = self.strides.clone();
        shape.swap(d0, d1);
        strides.swap(d0, d1);

        Some(Self {
            shape,
            strides,
            offset: self.offset,
        })
    }

    /// Reshape without copying; `None` if not contiguous or element counts differ
    pub fn reshape(&self, new_shape: &[usize]) -> Option<Self> {
        if !self.is_contiguous() {
            return None;
        }
        let new_count: usize = new_shape.iter().product();
        if new_count != self.elem_count() {
            return None;
        }
        Some(Self::contiguous(new_shape))
    }

    /// Restrict `dim` to `start..start + length`
    pub fn narrow(&self, dim: usize, start: usize, length: usize) -> Option<Self> {
        if dim >= self.ndim() || start.checked_add(length)? > self.shape[dim] {
            return None;
        }
        let mut shape = self.shape.clone();
        shape[dim] = length;
        let offset = (self.offset as isize + start as isize * self.strides[dim]) as usize;
        Some(Self {
            shape,
            strides: self.strides.clone(),
            offset,
        })
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout")
            .field("shape", &self.shape.as_slice())
            .field("strides", &self.strides.as_slice())
            .field("offset", &self.offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_layout() {
        let layout = Layout::contiguous(&[2, 3, 4]);
        assert_eq!(layout.shape(), &[2, 3, 4]);
        assert_eq!(layout.strides(), &[12, 4, 1]);
        assert_eq!(layout.elem_count(), 24);
        assert!(layout.is_contiguous());
    }

    #[test]
    fn test_transpose() {
        let layout = Layout::contiguous(&[5, 2]);
        let transposed = layout.transpose(0, 1).unwrap();
        assert_eq!(transposed.shape(), &[2, 5]);
        assert_eq!(transposed.strides(), &[1, 2]);
        assert!(!transposed.is_contiguous());
    }

    #[test]
    fn test_reshape() {
        let layout = Layout::contiguous(&[8]);
        let reshaped = layout.reshape(&[8, 1]).unwrap();
        assert_eq!(reshaped.shape(), &[8, 1]);
        assert!(reshaped.is_contiguous());
        assert!(layout.reshape(&[3, 3]).is_none());
    }

    #[test]
    fn test_narrow_rows_keeps_strides() {
        let layout = Layout::contiguous(&[6, 2]);
        let rows = layout.narrow(0, 2, 3).unwrap();
        assert_eq!(rows.shape(), &[3, 2]);
        assert_eq!(rows.offset(), 4);
        // Non-zero offset means the view must be copied before kernels see it
        assert!(!rows.is_contiguous());
        assert!(layout.narrow(0, 5, 2).is_none());
    }

    #[test]
    fn test_unit_dims_ignore_strides() {
        // [1, 4] -> [4, 1] with strides [1, 4]: still row-major in memory
        let layout = Layout::contiguous(&[1, 4]).transpose(0, 1).unwrap();
        assert!(layout.is_contiguous());
        let column = Layout::contiguous(&[4, 1]);
        assert!(column.is_contiguous());
    }

    #[test]
    fn test_negative_dims() {
        let layout = Layout::contiguous(&[3, 7]);
        assert_eq!(layout.normalize_dim(-1), Some(1));
        assert_eq!(layout.normalize_dim(-3), None);
    }
}
