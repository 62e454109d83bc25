//! CBOR encoder.
//!
//! Builds a head-encoding helper once and reuses it for every major type;
//! array/map/bstr-wrap heads are never written at `open_*` time, only
//! recorded as a position — `close_*` computes the final count and inserts
//! the minimal head there via [`OutStream::insert`], shifting the
//! already-written body to the right. This sidesteps the "reserve a worst
//! case placeholder, then maybe shrink it" dance entirely: there is nothing
//! to shrink because nothing was written in the first place.

use crate::buf::{ByteView, MutByteView};
use crate::config::DEFAULT_MAX_NESTING_DEPTH;
use crate::error::{CborError, CborResult};
use crate::float::shrink_double_as_smallest;
use crate::nest::{ContainerType, EncodeLevel, EncodeNestingStack};
use crate::ostream::OutStream;

const MAJOR_UINT: u8 = 0;
const MAJOR_NEGINT: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;
const MAJOR_SIMPLE_FLOAT: u8 = 7;

const SIMPLE_FALSE: u8 = 20;
const SIMPLE_TRUE: u8 = 21;
const SIMPLE_NULL: u8 = 22;
const SIMPLE_UNDEF: u8 = 23;
const AI_FLOAT: u8 = 25;
const AI_SINGLE: u8 = 26;
const AI_DOUBLE: u8 = 27;

const TAG_DATE_EPOCH: u64 = 1;

/// Minimal big-endian CBOR head encoding of `(major, n)`. Returns the
/// encoded bytes and their length (1, 2, 3, 5, or 9).
fn encode_head(major: u8, n: u64) -> ([u8; 9], usize) {
    let mut buf = [0u8; 9];
    let prefix = major << 5;
    if n < 24 {
        buf[0] = prefix | (n as u8);
        (buf, 1)
    } else if n <= 0xFF {
        buf[0] = prefix | 24;
        buf[1] = n as u8;
        (buf, 2)
    } else if n <= 0xFFFF {
        buf[0] = prefix | 25;
        buf[1..3].copy_from_slice(&(n as u16).to_be_bytes());
        (buf, 3)
    } else if n <= 0xFFFF_FFFF {
        buf[0] = prefix | 26;
        buf[1..5].copy_from_slice(&(n as u32).to_be_bytes());
        (buf, 5)
    } else {
        buf[0] = prefix | 27;
        buf[1..9].copy_from_slice(&n.to_be_bytes());
        (buf, 9)
    }
}

/// Builds a CBOR-encoded item stream into a caller-supplied buffer, or in
/// size-only mode to learn the byte count a real encode would produce.
pub struct Encoder<'a> {
    out: OutStream<'a>,
    nesting: EncodeNestingStack,
}

impl<'a> Encoder<'a> {
    pub fn new(storage: &'a mut [u8]) -> Self {
        Encoder {
            out: OutStream::init(MutByteView::Borrowed(storage)),
            nesting: EncodeNestingStack::new(DEFAULT_MAX_NESTING_DEPTH),
        }
    }

    pub fn new_size_only(capacity: usize) -> Self {
        Encoder {
            out: OutStream::init_size_only(capacity),
            nesting: EncodeNestingStack::new(DEFAULT_MAX_NESTING_DEPTH),
        }
    }

    /// Override the default nesting-depth limit (must not exceed
    /// [`crate::config::MAX_NESTING_DEPTH_HARD_LIMIT`]).
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.nesting = EncodeNestingStack::new(depth);
        self
    }

    pub fn error(&self) -> Option<CborError> {
        self.out.error()
    }

    /// Bytes that would still fit in the remaining capacity.
    pub fn room_left(&self) -> usize {
        self.out.room_left()
    }

    fn bump_item_count(&mut self) {
        if let Some(level) = self.nesting.top_mut() {
            level.item_count += 1;
        }
    }

    fn emit_head(&mut self, major: u8, n: u64) {
        let (buf, len) = encode_head(major, n);
        self.out.append(&buf[..len]);
    }

    // ── scalar adds ──────────────────────────────────────────────────────

    pub fn add_uint64(&mut self, v: u64) {
        self.emit_head(MAJOR_UINT, v);
        self.bump_item_count();
    }

    pub fn add_int64(&mut self, v: i64) {
        if v >= 0 {
            self.add_uint64(v as u64);
        } else {
            let n: u64 = (-(v as i128) - 1) as u64;
            self.emit_head(MAJOR_NEGINT, n);
            self.bump_item_count();
        }
    }

    pub fn add_bytes(&mut self, data: &[u8]) {
        self.emit_head(MAJOR_BYTES, data.len() as u64);
        self.out.append(data);
        self.bump_item_count();
    }

    pub fn add_text(&mut self, data: &[u8]) {
        self.emit_head(MAJOR_TEXT, data.len() as u64);
        self.out.append(data);
        self.bump_item_count();
    }

    pub fn add_float(&mut self, v: f32) {
        self.out.append(&[(MAJOR_SIMPLE_FLOAT << 5) | AI_FLOAT]);
        self.out.append_float(v);
        self.bump_item_count();
    }

    pub fn add_double(&mut self, v: f64) {
        self.out.append(&[(MAJOR_SIMPLE_FLOAT << 5) | AI_DOUBLE]);
        self.out.append_double(v);
        self.bump_item_count();
    }

    /// Encode `v` using the shortest lossless IEEE-754 width (half, single,
    /// or double), falling back to `add_double` when `v` cannot be narrowed.
    pub fn add_double_as_smallest(&mut self, v: f64, allow_nan_payload: bool) {
        match shrink_double_as_smallest(v, allow_nan_payload) {
            crate::float::SmallestFloat::Half(bits) => {
                self.out.append(&[(MAJOR_SIMPLE_FLOAT << 5) | 25]);
                self.out.append_u16(bits);
                self.bump_item_count();
            }
            crate::float::SmallestFloat::Single(bits) => {
                self.out.append(&[(MAJOR_SIMPLE_FLOAT << 5) | AI_SINGLE]);
                self.out.append_u32(bits);
                self.bump_item_count();
            }
            crate::float::SmallestFloat::Double(bits) => {
                self.out.append(&[(MAJOR_SIMPLE_FLOAT << 5) | AI_DOUBLE]);
                self.out.append_u64(bits);
                self.bump_item_count();
            }
        }
    }

    pub fn add_bool(&mut self, v: bool) {
        let simple = if v { SIMPLE_TRUE } else { SIMPLE_FALSE };
        self.out.append(&[(MAJOR_SIMPLE_FLOAT << 5) | simple]);
        self.bump_item_count();
    }

    pub fn add_null(&mut self) {
        self.out.append(&[(MAJOR_SIMPLE_FLOAT << 5) | SIMPLE_NULL]);
        self.bump_item_count();
    }

    pub fn add_undef(&mut self) {
        self.out.append(&[(MAJOR_SIMPLE_FLOAT << 5) | SIMPLE_UNDEF]);
        self.bump_item_count();
    }

    /// Encode a simple value. Legal ranges are 20..=23 (use the dedicated
    /// `add_bool`/`add_null`/`add_undef` instead) and 32..=255; anything
    /// else is `InvalidSimpleValue`.
    pub fn add_simple(&mut self, v: u8) -> CborResult<()> {
        if self.error().is_some() {
            return Err(self.error().unwrap());
        }
        match v {
            20..=23 => {
                self.out.append(&[(MAJOR_SIMPLE_FLOAT << 5) | v]);
            }
            32..=255 => {
                self.out.append(&[(MAJOR_SIMPLE_FLOAT << 5) | 24, v]);
            }
            _ => {
                self.out.set_error(CborError::InvalidSimpleValue);
                return Err(CborError::InvalidSimpleValue);
            }
        }
        self.bump_item_count();
        Ok(())
    }

    pub fn add_tag(&mut self, tag: u64) {
        self.emit_head(MAJOR_TAG, tag);
        // Tags accumulate ahead of the next value item and do not
        // themselves count toward the enclosing container's item count.
    }

    /// Encode an epoch-based date (tag 1) from a whole-second count.
    pub fn add_date_epoch_i64(&mut self, seconds: i64) {
        self.add_tag(TAG_DATE_EPOCH);
        self.add_int64(seconds);
    }

    /// Encode an epoch-based date (tag 1) with a fractional second.
    pub fn add_date_epoch_f64(&mut self, seconds: f64) {
        self.add_tag(TAG_DATE_EPOCH);
        self.add_double(seconds);
    }

    /// Append already-encoded CBOR bytes verbatim, counted as one item.
    pub fn add_encoded(&mut self, bytes: &[u8]) {
        self.out.append(bytes);
        self.bump_item_count();
    }

    // ── containers ───────────────────────────────────────────────────────

    fn open(&mut self, container_type: ContainerType) -> CborResult<()> {
        if let Some(e) = self.error() {
            return Err(e);
        }
        let level = EncodeLevel {
            byte_offset_of_head: self.out.get_end_position(),
            item_count: 0,
            container_type,
        };
        match self.nesting.push(level) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.out.set_error(e);
                Err(e)
            }
        }
    }

    pub fn open_array(&mut self) -> CborResult<()> {
        self.open(ContainerType::Array)
    }

    pub fn open_map(&mut self) -> CborResult<()> {
        self.open(ContainerType::Map)
    }

    pub fn open_bstr_wrap(&mut self) -> CborResult<()> {
        self.open(ContainerType::ByteString)
    }

    fn close(&mut self, expected: ContainerType) -> CborResult<EncodeLevel> {
        if let Some(e) = self.error() {
            return Err(e);
        }
        let level = match self.nesting.pop() {
            Ok(l) => l,
            Err(e) => {
                self.out.set_error(e);
                return Err(e);
            }
        };
        if level.container_type != expected {
            self.out.set_error(CborError::CloseOpenMismatch);
            return Err(CborError::CloseOpenMismatch);
        }
        let major = match expected {
            ContainerType::Array => MAJOR_ARRAY,
            ContainerType::Map => MAJOR_MAP,
            ContainerType::ByteString => MAJOR_BYTES,
        };
        let count: u64 = match expected {
            ContainerType::Map => (level.item_count / 2) as u64,
            ContainerType::Array => level.item_count as u64,
            // A byte-string wrap's head carries the wrapped region's byte
            // length, not the number of items written inside it — those
            // items have already been written verbatim with no framing of
            // their own, so the body's length is just how far the cursor
            // has moved since the wrap was opened.
            ContainerType::ByteString => {
                (self.out.get_end_position() - level.byte_offset_of_head) as u64
            }
        };
        let (head, head_len) = encode_head(major, count);
        self.out.insert(&head[..head_len], level.byte_offset_of_head);
        if self.error().is_none() {
            self.bump_item_count();
        }
        Ok(level)
    }

    pub fn close_array(&mut self) -> CborResult<()> {
        self.close(ContainerType::Array).map(|_| ())
    }

    pub fn close_map(&mut self) -> CborResult<()> {
        self.close(ContainerType::Map).map(|_| ())
    }

    /// Close a byte-string wrap and return the encoded wrapped region
    /// (header included), or `None` in size-only mode or on error.
    pub fn close_bstr_wrap(&mut self) -> CborResult<ByteView<'_>> {
        let level = self.close(ContainerType::ByteString)?;
        let start = level.byte_offset_of_head;
        let end = self.out.get_end_position();
        match self.out.out() {
            ByteView::Null => Ok(ByteView::Null),
            ByteView::Borrowed(all) => Ok(ByteView::Borrowed(&all[start..end])),
        }
    }

    /// Insert raw, already-encoded bytes at an arbitrary byte offset —
    /// the primitive a COSE-style signing layer needs to splice a signature
    /// into an already-built structure without re-encoding it from scratch.
    pub fn insert_at_position(&mut self, bytes: &[u8], pos: usize) -> CborResult<()> {
        if let Some(e) = self.error() {
            return Err(e);
        }
        self.out.insert(bytes, pos);
        self.error().map_or(Ok(()), Err)
    }

    /// Finish encoding. Fails with `OpenContainerAtFinish` if any
    /// `open_*` is unmatched.
    pub fn finish(&mut self) -> CborResult<ByteView<'_>> {
        if let Some(e) = self.error() {
            return Err(e);
        }
        if !self.nesting.is_empty() {
            self.out.set_error(CborError::OpenContainerAtFinish);
            return Err(CborError::OpenContainerAtFinish);
        }
        Ok(self.out.out())
    }

    /// Total encoded length so far, valid in both real and size-only mode —
    /// the size-only counterpart to `finish()`'s view.
    pub fn size(&self) -> usize {
        self.out.len()
    }
}
