//! Borrowed typed array views
//!
//! A typed array is an arena span plus a shape payload in the envelope:
//!
//! ```text
//! shape:  [rank:u32][dim:u64 x rank]
//! arena:  product(dims) * dtype.size() bytes, little-endian elements
//! ```

use zera_core::le;
use zera_core::{DType, DecodeError, DecodeResult, Element};

/// Dimensions of a typed array, borrowed from the envelope
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ShapeRef<'a> {
    dims: &'a [u8],
}

impl<'a> ShapeRef<'a> {
    /// `dims` must hold exactly `8 * rank` bytes
    pub(crate) fn new(dims: &'a [u8]) -> Self {
        ShapeRef { dims }
    }

    /// Number of dimensions
    pub fn rank(&self) -> usize {
        self.dims.len() / 8
    }

    /// Dimension `i`, if in range
    pub fn dim(&self, i: usize) -> Option<u64> {
        self.dims.get(i * 8..i * 8 + 8).map(le::read_u64)
    }

    /// Iterate over the dimensions
    pub fn iter(&self) -> impl Iterator<Item = u64> + 'a {
        self.dims.chunks_exact(8).map(le::read_u64)
    }

    /// Copy the dimensions out
    pub fn to_vec(&self) -> Vec<u64> {
        self.iter().collect()
    }

    /// Product of the dimensions, `None` on overflow
    pub fn element_count(&self) -> Option<u64> {
        self.iter().try_fold(1u64, |acc, d| acc.checked_mul(d))
    }
}

impl std::fmt::Debug for ShapeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// A validated typed array: dtype, shape and the element bytes in the arena
///
/// Construction guarantees `product(shape) * dtype.size() == bytes.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedArrayRef<'a> {
    /// Element type
    pub dtype: DType,
    /// Dimensions
    pub shape: ShapeRef<'a>,
    /// Element bytes, borrowed from the arena
    pub bytes: &'a [u8],
}

impl<'a> TypedArrayRef<'a> {
    pub(crate) fn new(dtype: DType, shape: ShapeRef<'a>, bytes: &'a [u8]) -> DecodeResult<Self> {
        let expected = shape
            .element_count()
            .and_then(|n| n.checked_mul(dtype.size() as u64))
            .ok_or_else(|| {
                DecodeError::ShapeMismatch(format!("element count of {:?} overflows", shape))
            })?;
        if expected != bytes.len() as u64 {
            return Err(DecodeError::SizeMismatch {
                expected: usize::try_from(expected).unwrap_or(usize::MAX),
                actual: bytes.len(),
            });
        }
        Ok(TypedArrayRef {
            dtype,
            shape,
            bytes,
        })
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.bytes.len() / self.dtype.size()
    }

    /// True when the array has no elements
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Check that the stored element type is `T`
    pub fn expect_dtype<T: Element>(&self) -> DecodeResult<()> {
        if self.dtype != T::DTYPE {
            return Err(DecodeError::WrongType {
                expected: T::DTYPE.name(),
                actual: self.dtype.name(),
            });
        }
        Ok(())
    }

    /// Borrow the elements as `&[T]` when the bytes happen to be aligned
    ///
    /// Returns `Ok(None)` for a misaligned span; the `zera-tensor` crate
    /// handles the copy fallback.
    pub fn try_cast<T: Element>(&self) -> DecodeResult<Option<&'a [T]>> {
        self.expect_dtype::<T>()?;
        Ok(bytemuck::try_cast_slice(self.bytes).ok())
    }

    /// Decode the elements into an owned vector regardless of alignment
    pub fn to_vec<T: Element>(&self) -> DecodeResult<Vec<T>> {
        self.expect_dtype::<T>()?;
        Ok(self
            .bytes
            .chunks_exact(std::mem::size_of::<T>())
            .map(bytemuck::pod_read_unaligned::<T>)
            .collect())
    }
}
