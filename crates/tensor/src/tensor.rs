//! Tensor views
//!
//! A tensor reaches a reader in one of three shapes:
//!
//! | Layout | Encoding |
//! |--------|----------|
//! | native | typed array value: dtype in the reference, shape payload in the envelope |
//! | array | `[dtype_code, [dim, ...], blob]` |
//! | map | `{"dtype": code, "shape": [dim, ...], "data": blob}` |
//!
//! The array and map layouts number element types with the tensor codes of
//! [`Element::TENSOR_CODE`], not the dtype table. [`TensorView::from_view`]
//! accepts all three and routes the bytes through [`align_slice`].

use crate::aligned::{align_slice, AlignedSlice, BlobSource};
use crate::view_info::ViewInfo;
use serde::{Deserialize, Serialize};
use zera_core::{DecodeError, DecodeResult, Element, EncodeError, EncodeResult};
use zera_wire::{View, Writer};

/// Map key holding the shape
pub const SHAPE_KEY: &str = "shape";
/// Map key holding the element code
pub const DTYPE_KEY: &str = "dtype";
/// Map key holding the blob
pub const DATA_KEY: &str = "data";

/// Container layout used by [`write_tensor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TensorLayout {
    /// `[dtype_code, [dims], blob]`
    #[default]
    Array,
    /// `{"dtype", "shape", "data"}`
    Map,
}

/// Name of a tensor element code
pub fn tensor_code_name(code: i64) -> &'static str {
    match code {
        0 => "int8",
        1 => "int16",
        2 => "int32",
        3 => "int64",
        4 => "uint8",
        5 => "uint16",
        6 => "uint32",
        7 => "uint64",
        10 => "float",
        11 => "double",
        _ => "unknown",
    }
}

/// Product of `shape` with overflow checking
pub fn checked_element_count(shape: &[u64]) -> DecodeResult<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| {
            usize::try_from(d).ok().and_then(|d| acc.checked_mul(d))
        })
        .ok_or_else(|| DecodeError::ShapeMismatch(format!("element count of {:?} overflows", shape)))
}

/// Read a shape array; every entry must be a non-negative integer
pub fn tensor_shape(view: &View<'_>) -> DecodeResult<Vec<u64>> {
    if !view.is_array() {
        return Err(DecodeError::NotATensor(format!(
            "shape must be an array, found {}",
            view.type_name()
        )));
    }
    let mut shape = Vec::with_capacity(view.array_len()?);
    for dim in view.iter()? {
        let dim = dim?;
        if !dim.is_int() && !dim.is_uint() {
            return Err(DecodeError::NotATensor(format!(
                "shape entry must be an integer, found {}",
                dim.type_name()
            )));
        }
        shape.push(dim.as_u64()?);
    }
    Ok(shape)
}

/// The `(dtype, shape, data)` parts of an array or map layout tensor
fn convention_parts<'a>(view: &View<'a>) -> DecodeResult<Option<(View<'a>, View<'a>, View<'a>)>> {
    if view.is_array() {
        if view.array_len()? < 3 {
            return Ok(None);
        }
        return Ok(Some((view.at(0)?, view.at(1)?, view.at(2)?)));
    }
    if view.is_map() {
        let parts = (view.find(DTYPE_KEY)?, view.find(SHAPE_KEY)?, view.find(DATA_KEY)?);
        if let (Some(dtype), Some(shape), Some(data)) = parts {
            return Ok(Some((dtype, shape, data)));
        }
    }
    Ok(None)
}

/// True if `view` holds a tensor of `T` in any layout
pub fn is_tensor<T: Element>(view: &View<'_>) -> bool {
    if view.is_typed_array() {
        return view
            .as_typed_array()
            .map_or(false, |arr| arr.dtype == T::DTYPE);
    }
    match convention_parts(view) {
        Ok(Some((dtype, shape, data))) => {
            dtype.as_i64().map_or(false, |code| code == T::TENSOR_CODE)
                && shape.is_array()
                && data.is_blob()
        }
        _ => false,
    }
}

/// Write `data` as a tensor of the given shape
///
/// The blob is aligned to at least `align_of::<T>()` in the arena.
pub fn write_tensor<T: Element>(
    w: &mut Writer,
    shape: &[u64],
    data: &[T],
    layout: TensorLayout,
) -> EncodeResult<()> {
    let count = shape.iter().try_fold(1u64, |acc, &d| acc.checked_mul(d));
    if count != Some(data.len() as u64) {
        return Err(EncodeError::ShapeMismatch(format!(
            "shape {:?} does not hold {} elements",
            shape,
            data.len()
        )));
    }
    let bytes: &[u8] = bytemuck::cast_slice(data);
    let align = std::mem::align_of::<T>().max(w.options().blob_alignment);

    let write_shape = |w: &mut Writer| -> EncodeResult<()> {
        w.begin_array(shape.len())?;
        for &d in shape {
            w.uint64(d)?;
        }
        w.end_array()
    };

    match layout {
        TensorLayout::Array => {
            w.begin_array(3)?;
            w.int64(T::TENSOR_CODE)?;
            write_shape(w)?;
            w.binary_aligned(bytes, align)?;
            w.end_array()
        }
        TensorLayout::Map => {
            w.begin_map(3)?;
            w.key(DTYPE_KEY)?;
            w.int64(T::TENSOR_CODE)?;
            w.key(SHAPE_KEY)?;
            write_shape(w)?;
            w.key(DATA_KEY)?;
            w.binary_aligned(bytes, align)?;
            w.end_map()
        }
    }
}

/// Typed n-dimensional view, borrowed when alignment allows
#[derive(Debug, Clone)]
pub struct TensorView<'a, T: Element> {
    shape: Vec<u64>,
    data: AlignedSlice<'a, T>,
}

impl<'a, T: Element> TensorView<'a, T> {
    /// Decode a tensor of `T` in any layout
    pub fn from_view(view: &View<'a>) -> DecodeResult<Self> {
        Self::from_view_with_rank(view, None)
    }

    /// Like [`TensorView::from_view`], also requiring a rank
    pub fn from_view_with_rank(view: &View<'a>, rank: Option<usize>) -> DecodeResult<Self> {
        let (shape, bytes) = if view.is_typed_array() {
            let arr = view.as_typed_array()?;
            arr.expect_dtype::<T>()?;
            (arr.shape.to_vec(), arr.bytes)
        } else {
            let (dtype, shape, data) = convention_parts(view)?.ok_or_else(|| {
                DecodeError::NotATensor(format!("{} is not a tensor layout", view.type_name()))
            })?;
            let code = dtype.as_i64()?;
            if code != T::TENSOR_CODE {
                return Err(DecodeError::WrongType {
                    expected: T::DTYPE.name(),
                    actual: tensor_code_name(code),
                });
            }
            (tensor_shape(&shape)?, data.as_blob()?)
        };

        if let Some(rank) = rank {
            if shape.len() != rank {
                return Err(DecodeError::ShapeMismatch(format!(
                    "expected rank {}, found rank {}",
                    rank,
                    shape.len()
                )));
            }
        }
        Self::from_source(BlobSource::Span(bytes), shape)
    }

    /// Build from raw little-endian bytes and a shape
    pub fn from_source(source: BlobSource<'a>, shape: Vec<u64>) -> DecodeResult<Self> {
        let count = checked_element_count(&shape)?;
        let data = align_slice::<T>(source, count)?;
        Ok(TensorView { shape, data })
    }

    /// Dimensions
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Number of dimensions
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Elements in row-major order
    pub fn as_slice(&self) -> &[T] {
        self.data.as_slice()
    }

    /// How the elements were obtained
    pub fn view_info(&self) -> &ViewInfo {
        self.data.info()
    }

    /// True when the elements borrow the buffer
    pub fn is_zero_copy(&self) -> bool {
        self.data.is_zero_copy()
    }

    /// Owned elements
    pub fn into_vec(self) -> Vec<T> {
        self.data.into_vec()
    }
}
