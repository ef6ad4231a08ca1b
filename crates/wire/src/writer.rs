//! Single-pass builder
//!
//! The writer keeps two growing regions (envelope and arena) and a stack of
//! open containers. Each container collects its entries in a local payload
//! and is spliced into the envelope once, when it is closed; the reference
//! to it is then delivered to the parent (or becomes the root).
//!
//! | Frame | Accepts | Transition |
//! |-------|---------|------------|
//! | `Array` | any value | append 16 bytes, `count += 1` |
//! | `Object(AwaitingKey)` | `key()` | reserve a slot, go to `AwaitingValue` |
//! | `Object(AwaitingValue)` | any value | patch the slot, go to `AwaitingKey` |
//!
//! Anything else is an [`EncodeError`].

use tracing::trace;
use zera_core::le;
use zera_core::{
    align_up, check_alignment, DType, Element, EncodeError, EncodeResult, Header, StringRef, ValueRef,
    WriterOptions, ZBuffer, ARENA_BASE_ALIGN, ENTRY_HEADER_SIZE, HEADER_SIZE, INLINE_MAX,
    RANK_MAX, VALUE_REF_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MapState {
    AwaitingKey,
    /// Payload offset of the reserved 16-byte value slot
    AwaitingValue { slot: usize },
}

#[derive(Debug)]
enum Frame {
    Array { payload: Vec<u8>, count: u32 },
    Object { payload: Vec<u8>, count: u32, state: MapState },
}

impl Frame {
    fn kind(&self) -> &'static str {
        match self {
            Frame::Array { .. } => "array",
            Frame::Object { .. } => "map",
        }
    }
}

/// Zera buffer builder
///
/// ```
/// use zera_wire::{Reader, Writer};
///
/// let mut w = Writer::new();
/// w.begin_map(2).unwrap();
/// w.key("name").unwrap();
/// w.string("zera").unwrap();
/// w.key("n").unwrap();
/// w.int64(3).unwrap();
/// w.end_map().unwrap();
/// let buf = w.finish().unwrap();
///
/// let r = Reader::new(&buf).unwrap();
/// assert_eq!(r.get("name").unwrap().as_str().unwrap(), "zera");
/// assert_eq!(r.get("n").unwrap().as_i64().unwrap(), 3);
/// ```
#[derive(Debug)]
pub struct Writer {
    options: WriterOptions,
    env: Vec<u8>,
    arena: Vec<u8>,
    stack: Vec<Frame>,
    root_ofs: Option<u32>,
}

impl Writer {
    /// Writer with default options
    pub fn new() -> Self {
        Self::build(WriterOptions::default())
    }

    /// Writer with validated options
    pub fn with_options(options: WriterOptions) -> EncodeResult<Self> {
        options.validate()?;
        Ok(Self::build(options))
    }

    fn build(options: WriterOptions) -> Self {
        Writer {
            env: Vec::with_capacity(options.envelope_capacity),
            arena: Vec::with_capacity(options.arena_capacity),
            options,
            stack: Vec::new(),
            root_ofs: None,
        }
    }

    /// Options in effect
    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Strings up to `threshold` bytes are stored inline from now on
    pub fn set_inline_string_threshold(&mut self, threshold: usize) -> EncodeResult<()> {
        if threshold > INLINE_MAX {
            return Err(EncodeError::InvalidOption(format!(
                "inline string threshold {} exceeds {}",
                threshold, INLINE_MAX
            )));
        }
        self.options.inline_string_max = threshold;
        Ok(())
    }

    /// Number of open containers
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// True once a root value has been written
    pub fn has_root(&self) -> bool {
        self.root_ofs.is_some()
    }

    /// Write a null
    pub fn null(&mut self) -> EncodeResult<()> {
        self.scalar(ValueRef::Null)
    }

    /// Write a boolean
    pub fn boolean(&mut self, v: bool) -> EncodeResult<()> {
        self.scalar(ValueRef::Bool(v))
    }

    /// Write a signed integer
    pub fn int64(&mut self, v: i64) -> EncodeResult<()> {
        self.scalar(ValueRef::I64(v))
    }

    /// Write an unsigned integer
    pub fn uint64(&mut self, v: u64) -> EncodeResult<()> {
        self.scalar(ValueRef::U64(v))
    }

    /// Write a float, bit-exact
    pub fn double(&mut self, v: f64) -> EncodeResult<()> {
        self.scalar(ValueRef::F64(v))
    }

    /// Write a string, inline when it fits the threshold
    pub fn string(&mut self, s: &str) -> EncodeResult<()> {
        self.check_slot()?;
        let bytes = s.as_bytes();
        if bytes.len() <= self.options.inline_string_max.min(INLINE_MAX) {
            if let Some(inline) = StringRef::inline(bytes) {
                return self.deliver(ValueRef::String(inline));
            }
        }
        let len = fit_u32("string", bytes.len())?;
        let offset = self.arena_alloc(bytes, 1)?;
        self.deliver(ValueRef::String(StringRef::Arena { offset, len }))
    }

    /// Write a byte blob, aligned to the configured blob alignment
    pub fn binary(&mut self, bytes: &[u8]) -> EncodeResult<()> {
        let align = self.options.blob_alignment;
        self.binary_aligned(bytes, align)
    }

    /// Write a byte blob with an explicit arena alignment
    ///
    /// `align` must be a power of two no larger than 4096.
    pub fn binary_aligned(&mut self, bytes: &[u8], align: usize) -> EncodeResult<()> {
        check_alignment("blob alignment", align)?;
        let dim = bytes.len() as u64;
        self.typed_array_at(DType::U8, &[dim], bytes, align)
    }

    /// Write a typed array of `T` with the given shape
    ///
    /// `data.len()` must equal the product of `shape`.
    pub fn typed_array<T: Element>(&mut self, shape: &[u64], data: &[T]) -> EncodeResult<()> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        self.typed_array_raw(T::DTYPE, shape, bytes)
    }

    /// Write a typed array from raw little-endian element bytes
    pub fn typed_array_raw(&mut self, dtype: DType, shape: &[u64], bytes: &[u8]) -> EncodeResult<()> {
        let align = dtype.alignment().max(self.options.blob_alignment);
        self.typed_array_at(dtype, shape, bytes, align)
    }

    fn typed_array_at(
        &mut self,
        dtype: DType,
        shape: &[u64],
        bytes: &[u8],
        align: usize,
    ) -> EncodeResult<()> {
        self.check_slot()?;
        if shape.len() > RANK_MAX {
            return Err(EncodeError::ShapeMismatch(format!(
                "rank {} exceeds {}",
                shape.len(),
                RANK_MAX
            )));
        }
        let expected = shape
            .iter()
            .try_fold(dtype.size() as u64, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| EncodeError::ShapeMismatch(format!("shape {:?} overflows", shape)))?;
        if expected != bytes.len() as u64 {
            return Err(EncodeError::ShapeMismatch(format!(
                "shape {:?} of {} needs {} bytes, got {}",
                shape,
                dtype.name(),
                expected,
                bytes.len()
            )));
        }
        let byte_len = fit_u32("typed array", bytes.len())?;
        let offset = self.arena_alloc(bytes, align.max(1))?;

        let mut shape_payload = Vec::with_capacity(4 + 8 * shape.len());
        le::put_u32(&mut shape_payload, shape.len() as u32);
        for &d in shape {
            le::put_u64(&mut shape_payload, d);
        }
        let shape_ofs = self.append_env(&shape_payload)?;

        self.deliver(ValueRef::TypedArray {
            dtype: dtype.code(),
            offset,
            byte_len,
            shape: shape_ofs,
        })
    }

    /// Open an array; `hint` is the expected element count
    pub fn begin_array(&mut self, hint: usize) -> EncodeResult<()> {
        self.check_slot()?;
        let mut payload = Vec::with_capacity(4 + VALUE_REF_SIZE * hint);
        le::put_u32(&mut payload, 0);
        self.stack.push(Frame::Array { payload, count: 0 });
        Ok(())
    }

    /// Close the innermost array
    pub fn end_array(&mut self) -> EncodeResult<()> {
        let (mut payload, count) = match self.stack.pop() {
            Some(Frame::Array { payload, count }) => (payload, count),
            other => {
                let err = EncodeError::MismatchedEnd {
                    called: "end_array",
                    open: other.as_ref().map_or("nothing", Frame::kind),
                };
                self.stack.extend(other);
                return Err(err);
            }
        };
        le::patch_u32(&mut payload, 0, count);
        let at = self.append_env(&payload)?;
        self.deliver(ValueRef::Array { payload: at })
    }

    /// Open a map; `hint` is the expected entry count
    pub fn begin_map(&mut self, hint: usize) -> EncodeResult<()> {
        self.check_slot()?;
        let mut payload = Vec::with_capacity(4 + (ENTRY_HEADER_SIZE + 8 + VALUE_REF_SIZE) * hint);
        le::put_u32(&mut payload, 0);
        self.stack.push(Frame::Object {
            payload,
            count: 0,
            state: MapState::AwaitingKey,
        });
        Ok(())
    }

    /// Write the key of the next map entry
    pub fn key(&mut self, k: &str) -> EncodeResult<()> {
        let (payload, count, state) = match self.stack.last_mut() {
            Some(Frame::Object {
                payload,
                count,
                state,
            }) => (payload, count, state),
            _ => return Err(EncodeError::KeyWithoutMap),
        };
        if *state != MapState::AwaitingKey {
            return Err(EncodeError::DuplicatePendingKey);
        }
        let key_len = u16::try_from(k.len()).map_err(|_| EncodeError::TooLarge {
            what: "key",
            size: k.len(),
        })?;
        *count = count.checked_add(1).ok_or(EncodeError::TooLarge {
            what: "map entry count",
            size: u32::MAX as usize + 1,
        })?;
        le::put_u16(payload, key_len);
        le::put_u16(payload, 0);
        payload.extend_from_slice(k.as_bytes());
        let slot = payload.len();
        payload.resize(slot + VALUE_REF_SIZE, 0);
        *state = MapState::AwaitingValue { slot };
        Ok(())
    }

    /// Close the innermost map
    pub fn end_map(&mut self) -> EncodeResult<()> {
        let (mut payload, count) = match self.stack.pop() {
            Some(Frame::Object {
                payload,
                count,
                state: MapState::AwaitingKey,
            }) => (payload, count),
            other => {
                let err = match &other {
                    Some(Frame::Object { .. }) => EncodeError::DanglingKey,
                    _ => EncodeError::MismatchedEnd {
                        called: "end_map",
                        open: other.as_ref().map_or("nothing", Frame::kind),
                    },
                };
                self.stack.extend(other);
                return Err(err);
            }
        };
        le::patch_u32(&mut payload, 0, count);
        let at = self.append_env(&payload)?;
        self.deliver(ValueRef::Object { payload: at })
    }

    /// Assemble `[header][envelope][padding][arena]`
    ///
    /// A writer that never received a value produces a null root.
    pub fn finish(mut self) -> EncodeResult<ZBuffer> {
        if !self.stack.is_empty() {
            return Err(EncodeError::UnterminatedContainer {
                depth: self.stack.len(),
            });
        }
        let root_ofs = match self.root_ofs {
            Some(ofs) => ofs,
            None => self.append_env(&ValueRef::Null.encode())?,
        };

        let env_size = fit_u32("envelope", self.env.len())?;
        fit_u32("arena", self.arena.len())?;
        let arena_ofs = align_up(HEADER_SIZE + self.env.len(), ARENA_BASE_ALIGN);
        let arena_ofs_u32 = fit_u32("arena offset", arena_ofs)?;
        let total = arena_ofs
            .checked_add(self.arena.len())
            .ok_or(EncodeError::TooLarge {
                what: "buffer",
                size: usize::MAX,
            })?;

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&Header::new(root_ofs, env_size, arena_ofs_u32).encode());
        out.extend_from_slice(&self.env);
        out.resize(arena_ofs, 0);
        out.extend_from_slice(&self.arena);

        trace!(
            env_size = self.env.len(),
            arena_len = self.arena.len(),
            arena_ofs,
            total = out.len(),
            "zera buffer finished"
        );
        Ok(ZBuffer::from_vec(out))
    }

    fn scalar(&mut self, vr: ValueRef) -> EncodeResult<()> {
        self.check_slot()?;
        self.deliver(vr)
    }

    /// Fail before any side effect if the current context cannot take a value
    fn check_slot(&self) -> EncodeResult<()> {
        match self.stack.last() {
            None if self.root_ofs.is_some() => Err(EncodeError::MultipleRoots),
            None | Some(Frame::Array { .. }) => Ok(()),
            Some(Frame::Object { state, .. }) => match state {
                MapState::AwaitingValue { .. } => Ok(()),
                MapState::AwaitingKey => Err(EncodeError::ValueWithoutKey),
            },
        }
    }

    fn deliver(&mut self, vr: ValueRef) -> EncodeResult<()> {
        let raw = vr.encode();
        match self.stack.last_mut() {
            None => {
                if self.root_ofs.is_some() {
                    return Err(EncodeError::MultipleRoots);
                }
                self.root_ofs = Some(self.append_env(&raw)?);
                Ok(())
            }
            Some(Frame::Array { payload, count }) => {
                *count = count.checked_add(1).ok_or(EncodeError::TooLarge {
                    what: "array element count",
                    size: u32::MAX as usize + 1,
                })?;
                payload.extend_from_slice(&raw);
                Ok(())
            }
            Some(Frame::Object { payload, state, .. }) => match *state {
                MapState::AwaitingValue { slot } => {
                    payload[slot..slot + VALUE_REF_SIZE].copy_from_slice(&raw);
                    *state = MapState::AwaitingKey;
                    Ok(())
                }
                MapState::AwaitingKey => Err(EncodeError::ValueWithoutKey),
            },
        }
    }

    fn append_env(&mut self, bytes: &[u8]) -> EncodeResult<u32> {
        let at = fit_u32("envelope offset", self.env.len())?;
        fit_u32("envelope", self.env.len() + bytes.len())?;
        self.env.extend_from_slice(bytes);
        Ok(at)
    }

    /// Copy `bytes` into the arena at the next multiple of `align`
    fn arena_alloc(&mut self, bytes: &[u8], align: usize) -> EncodeResult<u32> {
        let start = align_up(self.arena.len(), align);
        let at = fit_u32("arena offset", start)?;
        fit_u32("arena", start + bytes.len())?;
        self.arena.resize(start, 0);
        self.arena.extend_from_slice(bytes);
        Ok(at)
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

fn fit_u32(what: &'static str, size: usize) -> EncodeResult<u32> {
    u32::try_from(size).map_err(|_| EncodeError::TooLarge { what, size })
}
