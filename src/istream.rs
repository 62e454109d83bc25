//! InputStream: a read cursor over a borrowed byte slice.
//!
//! A read cursor over a borrowed byte slice with sticky error semantics,
//! mirroring `OutStream`'s shape but read-only and without insert/append.

use crate::buf::ByteView;
use crate::error::CborError;

const MAGIC: u32 = 0x51424953; // "QBIS" — InStream-specific sentinel.

pub struct InStream<'a> {
    data: &'a [u8],
    cursor: usize,
    error: Option<CborError>,
    magic: u32,
}

impl<'a> InStream<'a> {
    pub fn init(data: &'a [u8]) -> Self {
        InStream {
            data,
            cursor: 0,
            error: None,
            magic: MAGIC,
        }
    }

    pub fn error(&self) -> Option<CborError> {
        if self.magic != MAGIC {
            Some(CborError::UninitializedContext)
        } else {
            self.error
        }
    }

    pub(crate) fn set_error(&mut self, e: CborError) {
        if self.error.is_none() {
            self.error = Some(e);
        }
    }

    pub fn tell(&self) -> usize {
        self.cursor
    }

    /// Move the cursor to an absolute offset. Does **not** clear a
    /// previously set sticky error — once a stream has gone bad, jumping the
    /// cursor around cannot un-corrupt whatever state the caller built on
    /// top of it.
    pub fn seek(&mut self, pos: usize) {
        if self.magic != MAGIC {
            self.error = Some(CborError::UninitializedContext);
            return;
        }
        if pos > self.data.len() {
            self.error = Some(CborError::HitEnd);
            return;
        }
        self.cursor = pos;
    }

    pub fn bytes_unconsumed(&self) -> usize {
        self.data.len().saturating_sub(self.cursor)
    }

    pub fn bytes_available(&self, n: usize) -> bool {
        self.error().is_none() && n <= self.bytes_unconsumed()
    }

    /// Read `n` bytes and advance the cursor. Sets `HitEnd` and returns
    /// `None` if fewer than `n` bytes remain or an error is already sticky.
    pub fn get_bytes(&mut self, n: usize) -> Option<ByteView<'a>> {
        if self.magic != MAGIC {
            self.error = Some(CborError::UninitializedContext);
            return None;
        }
        if self.error.is_some() {
            return None;
        }
        if n > self.bytes_unconsumed() {
            self.error = Some(CborError::HitEnd);
            return None;
        }
        let start = self.cursor;
        self.cursor += n;
        Some(ByteView::Borrowed(&self.data[start..self.cursor]))
    }

    pub fn get_byte(&mut self) -> Option<u8> {
        self.get_bytes(1).and_then(|v| v.as_slice().map(|b| b[0]))
    }

    pub fn get_u16(&mut self) -> Option<u16> {
        self.get_bytes(2)
            .and_then(|v| v.as_slice().map(|b| u16::from_be_bytes([b[0], b[1]])))
    }

    pub fn get_u32(&mut self) -> Option<u32> {
        self.get_bytes(4).and_then(|v| {
            v.as_slice()
                .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        })
    }

    pub fn get_u64(&mut self) -> Option<u64> {
        self.get_bytes(8).and_then(|v| {
            v.as_slice().map(|b| {
                u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
            })
        })
    }

    pub fn get_float(&mut self) -> Option<f32> {
        self.get_u32().map(f32::from_bits)
    }

    pub fn get_double(&mut self) -> Option<f64> {
        self.get_u64().map(f64::from_bits)
    }
}
