//! Convenient imports for Zera.
//!
//! ```
//! use zera::prelude::*;
//!
//! let buf = encode(&Value::from("hello"))?;
//! assert_eq!(Reader::new(&buf)?.as_str()?, "hello");
//! # Ok::<(), zera::Error>(())
//! ```

// Entry points
pub use crate::{decode, encode};
pub use zera_wire::{Reader, View, Writer};

// Error handling
pub use crate::error::{Error, Result};

// Core types
pub use zera_core::{DType, ReaderOptions, WriterOptions, ZBuffer};
pub use zera_wire::Value;

// Tensors
pub use zera_tensor::{write_tensor, TensorLayout, TensorView};
