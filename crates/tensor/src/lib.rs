//! Typed views over Zera tensors
//!
//! Numeric payloads are viewed in place when the bytes are suitably
//! aligned and copied into aligned storage when they are not. Each view
//! reports which path was taken through [`ViewInfo`].
//!
//! ## Examples
//!
//! ```
//! use zera_tensor::{write_tensor, TensorLayout, TensorView};
//! use zera_wire::{Reader, Writer};
//!
//! let mut w = Writer::new();
//! write_tensor(&mut w, &[2, 2], &[1.0f64, 2.0, 3.0, 4.0], TensorLayout::Array).unwrap();
//! let buf = w.finish().unwrap();
//!
//! let r = Reader::new(&buf).unwrap();
//! let t = TensorView::<f64>::from_view(&r).unwrap();
//! assert_eq!(t.shape(), &[2, 2]);
//! assert_eq!(t.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aligned;
pub mod tensor;
pub mod view_info;

pub use aligned::{align_slice, AlignedSlice, BlobSource};
pub use tensor::{
    checked_element_count, is_tensor, tensor_code_name, tensor_shape, write_tensor, TensorLayout,
    TensorView, DATA_KEY, DTYPE_KEY, SHAPE_KEY,
};
pub use view_info::{ViewInfo, ViewReason};
