//! Zero-copy decision record

use serde::{Deserialize, Serialize};

/// Why a typed view does or does not borrow the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewReason {
    /// Borrowed directly
    Ok,
    /// The bytes arrived already owned, so there was nothing to borrow
    NotSpanBacked,
    /// The bytes are not aligned for the element type
    Misaligned,
}

/// How a typed view was produced
///
/// Callers that need zero-copy on a hot path check [`ViewInfo::zero_copy`]
/// (or `reason`) instead of silently paying for a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewInfo {
    /// True when the view borrows the source bytes
    pub zero_copy: bool,
    /// Outcome of the decision
    pub reason: ViewReason,
    /// `align_of::<T>()`
    pub required_alignment: usize,
    /// Address of the source bytes
    pub address: usize,
    /// Length of the source bytes
    pub byte_size: usize,
}

impl ViewInfo {
    pub(crate) fn new(reason: ViewReason, required_alignment: usize, address: usize, byte_size: usize) -> Self {
        ViewInfo {
            zero_copy: reason == ViewReason::Ok,
            reason,
            required_alignment,
            address,
            byte_size,
        }
    }
}
