//! Zero-copy or aligned copy
//!
//! Given bytes that should hold `n` elements of `T`:
//!
//! 1. `len != n * size_of::<T>()` is a decode error, not an alignment issue
//! 2. owned bytes are copied into `Vec<T>` (`NotSpanBacked`)
//! 3. borrowed bytes at an address that is a multiple of `align_of::<T>()`
//!    are reinterpreted in place (`Ok`); otherwise they are copied
//!    (`Misaligned`)
//!
//! The outcome is always reported in a [`ViewInfo`].
//!
//! Elements are little-endian on the wire; borrowing assumes a
//! little-endian host.

use crate::view_info::{ViewInfo, ViewReason};
use std::borrow::Cow;
use std::ops::Deref;
use tracing::debug;
use zera_core::{DecodeError, DecodeResult, Element};

/// Where typed bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobSource<'a> {
    /// Borrowed from a live buffer
    Span(&'a [u8]),
    /// Already materialized
    Owned(Vec<u8>),
}

impl BlobSource<'_> {
    fn bytes(&self) -> &[u8] {
        match self {
            BlobSource::Span(b) => b,
            BlobSource::Owned(v) => v,
        }
    }
}

/// Elements of `T`, either borrowed or held in aligned owned storage
#[derive(Debug, Clone)]
pub struct AlignedSlice<'a, T: Element> {
    data: Cow<'a, [T]>,
    info: ViewInfo,
}

impl<'a, T: Element> AlignedSlice<'a, T> {
    /// Element view
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// How this view was produced
    pub fn info(&self) -> &ViewInfo {
        &self.info
    }

    /// True when borrowing the source bytes
    pub fn is_zero_copy(&self) -> bool {
        self.info.zero_copy
    }

    /// Take the elements, copying only if still borrowed
    pub fn into_vec(self) -> Vec<T> {
        self.data.into_owned()
    }
}

impl<T: Element> Deref for AlignedSlice<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

/// Decide between borrowing and copying `element_count` elements of `T`
pub fn align_slice<T: Element>(
    source: BlobSource<'_>,
    element_count: usize,
) -> DecodeResult<AlignedSlice<'_, T>> {
    let size = std::mem::size_of::<T>();
    let align = std::mem::align_of::<T>();
    let bytes = source.bytes();
    let expected = element_count.checked_mul(size).ok_or_else(|| {
        DecodeError::ShapeMismatch(format!("{} elements of {} overflow", element_count, T::DTYPE.name()))
    })?;
    if bytes.len() != expected {
        return Err(DecodeError::SizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }
    let address = bytes.as_ptr() as usize;
    let byte_size = bytes.len();

    let (data, reason) = match source {
        BlobSource::Owned(ref owned) => (Cow::Owned(copy_elements(owned, element_count)), ViewReason::NotSpanBacked),
        BlobSource::Span(span) if address % align == 0 => match bytemuck::try_cast_slice::<u8, T>(span) {
            Ok(elements) => (Cow::Borrowed(elements), ViewReason::Ok),
            Err(_) => (Cow::Owned(copy_elements(span, element_count)), ViewReason::Misaligned),
        },
        BlobSource::Span(span) => (Cow::Owned(copy_elements(span, element_count)), ViewReason::Misaligned),
    };

    if reason != ViewReason::Ok {
        debug!(
            ?reason,
            address,
            required_alignment = align,
            byte_size,
            dtype = T::DTYPE.name(),
            "typed view falls back to copy"
        );
    }
    Ok(AlignedSlice {
        data,
        info: ViewInfo::new(reason, align, address, byte_size),
    })
}

fn copy_elements<T: Element>(bytes: &[u8], element_count: usize) -> Vec<T> {
    let mut out = vec![T::zeroed(); element_count];
    bytemuck::cast_slice_mut::<T, u8>(&mut out).copy_from_slice(bytes);
    out
}
