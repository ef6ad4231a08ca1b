//! Owned values
//!
//! [`Value`] is a fully materialized copy of a Zera tree, for equality
//! checks, debugging and building payloads from data that already exists in
//! memory. Readers never need it; it is produced on request by
//! [`View::to_value`] and consumed by [`Writer::value`].
//!
//! ## Equality
//!
//! - Different variants are never equal: `Int(1) != UInt(1) != Float(1.0)`
//! - `String` and `Bytes` are distinct
//! - Floats compare with IEEE-754 semantics (`NaN != NaN`)
//! - Objects compare entry by entry, in order, duplicates included
//! - A rank-1 `u8` typed array is a blob on the wire, so
//!   `TypedArray { dtype: U8, shape: [n] }` reads back as `Bytes`

use crate::reader::{Reader, View};
use crate::writer::Writer;
use serde::{Deserialize, Serialize};
use zera_core::{DType, DecodeError, DecodeResult, EncodeResult, ValueRef, DEFAULT_MAX_DEPTH};

/// Owned Zera value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null
    Null,

    /// Boolean
    Bool(bool),

    /// Signed 64-bit integer (I64 tag)
    Int(i64),

    /// Unsigned 64-bit integer (U64 tag)
    UInt(u64),

    /// IEEE-754 double
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Byte blob (rank-1 u8 typed array)
    Bytes(Vec<u8>),

    /// Typed array of any other element type or rank
    TypedArray {
        /// Element type
        dtype: DType,
        /// Dimensions
        shape: Vec<u64>,
        /// Little-endian element bytes
        data: Vec<u8>,
    },

    /// Ordered sequence
    Array(Vec<Value>),

    /// Entries in encoded order; keys may repeat
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Type name, as used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int64",
            Value::UInt(_) => "uint64",
            Value::Float(_) => "float64",
            Value::String(_) => "string",
            Value::Bytes(_) => "blob",
            Value::TypedArray { .. } => "typed array",
            Value::Array(_) => "array",
            Value::Object(_) => "map",
        }
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as array slice
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// First entry named `key`, if this is an object
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl<'a> View<'a> {
    /// Materialize this value and everything below it
    pub fn to_value(&self) -> DecodeResult<Value> {
        self.to_value_bounded(DEFAULT_MAX_DEPTH)
    }

    /// Materialize with an explicit container nesting limit
    pub fn to_value_bounded(&self, max_depth: usize) -> DecodeResult<Value> {
        materialize(self, 0, max_depth)
    }
}

impl<'a> Reader<'a> {
    /// Materialize the root, nesting bounded by the reader options
    pub fn to_value(&self) -> DecodeResult<Value> {
        self.root().to_value_bounded(self.options().max_depth)
    }
}

fn materialize(view: &View<'_>, depth: usize, max_depth: usize) -> DecodeResult<Value> {
    Ok(match view.value_ref() {
        ValueRef::Null => Value::Null,
        ValueRef::Bool(v) => Value::Bool(v),
        ValueRef::I64(v) => Value::Int(v),
        ValueRef::U64(v) => Value::UInt(v),
        ValueRef::F64(v) => Value::Float(v),
        ValueRef::String(_) => Value::String(view.as_str()?.to_string()),
        ValueRef::TypedArray { .. } if view.is_blob() => Value::Bytes(view.as_blob()?.to_vec()),
        ValueRef::TypedArray { .. } => {
            let arr = view.as_typed_array()?;
            Value::TypedArray {
                dtype: arr.dtype,
                shape: arr.shape.to_vec(),
                data: arr.bytes.to_vec(),
            }
        }
        ValueRef::Array { .. } => {
            if depth >= max_depth {
                return Err(DecodeError::DepthLimitExceeded(max_depth));
            }
            let mut items = Vec::with_capacity(view.array_len()?);
            for item in view.iter()? {
                items.push(materialize(&item?, depth + 1, max_depth)?);
            }
            Value::Array(items)
        }
        ValueRef::Object { .. } => {
            if depth >= max_depth {
                return Err(DecodeError::DepthLimitExceeded(max_depth));
            }
            let mut entries = Vec::new();
            for (key, entry) in view.keys()?.zip(view.entries()?) {
                let (_, value) = entry?;
                entries.push((key?.to_string(), materialize(&value, depth + 1, max_depth)?));
            }
            Value::Object(entries)
        }
    })
}

impl Writer {
    /// Encode an owned value tree
    pub fn value(&mut self, value: &Value) -> EncodeResult<()> {
        match value {
            Value::Null => self.null(),
            Value::Bool(v) => self.boolean(*v),
            Value::Int(v) => self.int64(*v),
            Value::UInt(v) => self.uint64(*v),
            Value::Float(v) => self.double(*v),
            Value::String(s) => self.string(s),
            Value::Bytes(b) => self.binary(b),
            Value::TypedArray { dtype, shape, data } => self.typed_array_raw(*dtype, shape, data),
            Value::Array(items) => {
                self.begin_array(items.len())?;
                for item in items {
                    self.value(item)?;
                }
                self.end_array()
            }
            Value::Object(entries) => {
                self.begin_map(entries.len())?;
                for (k, v) in entries {
                    self.key(k)?;
                    self.value(v)?;
                }
                self.end_map()
            }
        }
    }
}
