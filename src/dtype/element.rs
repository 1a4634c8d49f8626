//! Element trait binding Rust scalar types to [`DType`]

use super::DType;
use bytemuck::{Pod, Zeroable};

/// A Rust scalar that can live in tensor storage
///
/// Kernels are generic over `T: Element` and monomorphized per dtype.
/// `to_f64`/`from_f64` are the lossless-enough bridge used by validation and
/// by host-side staging; hot loops work in `T` directly.
pub trait Element: Copy + Send + Sync + Pod + Zeroable + PartialOrd + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Convert to f64
    fn to_f64(self) -> f64;

    /// Convert from f64 (saturating/truncating for integers)
    fn from_f64(v: f64) -> Self;
}

macro_rules! impl_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$dtype;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(v: f64) -> Self {
                    v as $ty
                }
            }
        )*
    };
}

impl_element!(f64 => F64, f32 => F32, i64 => I64, i32 => I32, u8 => U8);

#[cfg(feature = "f16")]
impl Element for half::f16 {
    const DTYPE: DType = DType::F16;

    #[inline]
    fn to_f64(self) -> f64 {
        half::f16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        half::f16::from_f64(v)
    }
}

#[cfg(feature = "f16")]
impl Element for half::bf16 {
    const DTYPE: DType = DType::BF16;

    #[inline]
    fn to_f64(self) -> f64 {
        half::bf16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        half::bf16::from_f64(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_binding() {
        assert_eq!(<f32 as Element>::DTYPE, DType::F32);
        assert_eq!(<i64 as Element>::DTYPE, DType::I64);
        assert_eq!(<u8 as Element>::DTYPE, DType::U8);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(<i64 as Element>::from_f64(3.9), 3);
        assert_eq!(<u8 as Element>::from_f64(-1.0), 0);
        assert_eq!(2.5f32.to_f64(), 2.5);
    }
}
