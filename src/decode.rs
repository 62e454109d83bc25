//! CBOR decoder.
//!
//! `get_next` is a state machine driven entirely by `DecodeNestingStack`:
//! definite-length containers close themselves when their count reaches
//! zero, indefinite-length containers close when a break code is peeked,
//! and neither ever needs the caller to call a matching `close_*` — closes
//! are implicit, surfaced only through `Item::next_nesting_level` dropping
//! below `Item::nesting_level`.

use crate::config::DEFAULT_MAX_NESTING_DEPTH;
use crate::error::{CborError, CborResult};
use crate::istream::InStream;
use crate::item::{tag_bits, ContainerCount, EpochDate, Item, ItemKind, ItemLabel, ItemValue};
use crate::nest::{ContainerType, DecodeLevel, DecodeNestingStack, RemainingItems};
use crate::pool::{allocate_or_err, StringPool};

const MAJOR_UINT: u8 = 0;
const MAJOR_NEGINT: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;
const MAJOR_SIMPLE_FLOAT: u8 = 7;

const AI_INDEFINITE: u8 = 31;
const AI_BREAK: u8 = 31; // same wire value as indefinite, disambiguated by major (7) and context
const SIMPLE_FALSE: u8 = 20;
const SIMPLE_TRUE: u8 = 21;
const SIMPLE_NULL: u8 = 22;
const SIMPLE_UNDEF: u8 = 23;
const AI_HALF: u8 = 25;
const AI_SINGLE: u8 = 26;
const AI_DOUBLE: u8 = 27;

const TAG_DATE_EPOCH: u64 = 1;

/// How a `Decoder` treats labels of items found inside an open map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapLabelPolicy {
    /// Integer, byte-string, or text-string labels are all accepted and
    /// attached to the following value's `Item::label`.
    Normal,
    /// Only byte-string or text-string labels are accepted; an integer
    /// label is reported as `BadMapLabelType`.
    MapStringsOnly,
    /// Maps are decoded exactly like arrays of `2 * count` raw items, with
    /// no label attached to anything — the caller sees keys and values
    /// interleaved as plain sibling items.
    MapAsArray,
}

/// Reads a sequence of top-level CBOR data items out of a borrowed byte
/// slice (CBOR Sequences, RFC 8742, fall out naturally: calling `get_next`
/// repeatedly after the first top-level item completes reads the next one).
pub struct Decoder<'a> {
    instream: InStream<'a>,
    nesting: DecodeNestingStack,
    pool: Option<&'a dyn StringPool>,
    label_policy: MapLabelPolicy,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Decoder {
            instream: InStream::init(data),
            nesting: DecodeNestingStack::new(DEFAULT_MAX_NESTING_DEPTH),
            pool: None,
            label_policy: MapLabelPolicy::Normal,
        }
    }

    pub fn with_string_pool(mut self, pool: &'a dyn StringPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn with_map_label_policy(mut self, policy: MapLabelPolicy) -> Self {
        self.label_policy = policy;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.nesting = DecodeNestingStack::new(depth);
        self
    }

    pub fn error(&self) -> Option<CborError> {
        self.instream.error()
    }

    pub fn nesting_depth(&self) -> usize {
        self.nesting.depth()
    }

    fn fail(&mut self, e: CborError) -> CborError {
        self.instream.set_error(e);
        e
    }

    // ── raw head reading ─────────────────────────────────────────────────

    /// Reads one head (major, additional-info, resolved argument), with no
    /// tag interpretation.
    fn read_raw_head(&mut self) -> CborResult<(u8, u8, u64)> {
        let first = self
            .instream
            .get_byte()
            .ok_or_else(|| self.fail(CborError::HitEnd))?;
        let major = first >> 5;
        let ai = first & 0x1F;
        let arg = match ai {
            0..=23 => ai as u64,
            24 => self
                .instream
                .get_byte()
                .ok_or_else(|| self.fail(CborError::HitEnd))? as u64,
            25 => self
                .instream
                .get_u16()
                .ok_or_else(|| self.fail(CborError::HitEnd))? as u64,
            26 => self
                .instream
                .get_u32()
                .ok_or_else(|| self.fail(CborError::HitEnd))? as u64,
            27 => self
                .instream
                .get_u64()
                .ok_or_else(|| self.fail(CborError::HitEnd))?,
            28..=30 => return Err(self.fail(CborError::InvalidCborStructure)),
            31 => {
                if !matches!(major, MAJOR_BYTES | MAJOR_TEXT | MAJOR_ARRAY | MAJOR_MAP | MAJOR_SIMPLE_FLOAT) {
                    return Err(self.fail(CborError::InvalidCborStructure));
                }
                0
            }
            _ => unreachable!("additional info is masked to 5 bits"),
        };
        Ok((major, ai, arg))
    }

    /// Reads one head, draining and accumulating any tags stacked ahead of
    /// it. The self-describe-CBOR tag (55799) is silently dropped.
    fn read_head_draining_tags(&mut self) -> CborResult<(u8, u8, u64, u16, Option<u64>)> {
        let mut bits = 0u16;
        let mut last_large = None;
        loop {
            let (major, ai, arg) = self.read_raw_head()?;
            if major == MAJOR_TAG {
                if arg != tag_bits::SELF_DESCRIBE_CBOR_TAG {
                    match tag_bits::bit_for_tag(arg) {
                        Some(bit) => bits |= bit,
                        None => last_large = Some(arg),
                    }
                }
                continue;
            }
            return Ok((major, ai, arg, bits, last_large));
        }
    }

    fn peek_is_break(&mut self) -> bool {
        if self.instream.bytes_unconsumed() == 0 {
            return false;
        }
        let pos = self.instream.tell();
        let byte = match self.instream.get_byte() {
            Some(b) => b,
            None => return false,
        };
        self.instream.seek(pos);
        byte == (MAJOR_SIMPLE_FLOAT << 5) | AI_BREAK
    }

    fn consume_break(&mut self) -> CborResult<()> {
        let b = self
            .instream
            .get_byte()
            .ok_or_else(|| self.fail(CborError::HitEnd))?;
        debug_assert_eq!(b, (MAJOR_SIMPLE_FLOAT << 5) | AI_BREAK);
        Ok(())
    }

    /// Pops every level that has finished (definite count reached zero, or
    /// an indefinite level whose break code is next). Closing never itself
    /// produces an `Item` — completion is visible only via
    /// `Item::next_nesting_level`.
    fn close_exhausted_levels(&mut self) -> CborResult<()> {
        loop {
            let should_close = match self.nesting.top() {
                None => false,
                Some(level) => match level.remaining {
                    RemainingItems::Definite(0) => true,
                    RemainingItems::Definite(_) => false,
                    RemainingItems::Indefinite => self.peek_is_break(),
                },
            };
            if !should_close {
                return Ok(());
            }
            if matches!(self.nesting.top(), Some(l) if l.remaining == RemainingItems::Indefinite) {
                self.consume_break()?;
            }
            self.nesting.pop().map_err(|e| self.fail(e))?;
        }
    }

    fn decrement_parent(&mut self, nesting_level: u8) {
        if nesting_level == 0 {
            return;
        }
        if let Some(level) = self.nesting.get_mut((nesting_level - 1) as usize) {
            if let RemainingItems::Definite(n) = &mut level.remaining {
                *n = n.saturating_sub(1);
            }
        }
    }

    // ── labels ───────────────────────────────────────────────────────────

    fn maybe_read_label(&mut self) -> CborResult<Option<ItemLabel<'a>>> {
        let in_labeled_map = matches!(
            self.nesting.top(),
            Some(l) if l.container_type == ContainerType::Map
        ) && self.label_policy != MapLabelPolicy::MapAsArray;
        if !in_labeled_map {
            return Ok(None);
        }
        let (major, _ai, arg, _bits, _large) = self.read_head_draining_tags()?;
        match major {
            MAJOR_UINT if self.label_policy == MapLabelPolicy::Normal => {
                Ok(Some(ItemLabel::Uint64(arg)))
            }
            MAJOR_NEGINT if self.label_policy == MapLabelPolicy::Normal => {
                if arg > i64::MAX as u64 {
                    return Err(self.fail(CborError::IntegerOverflow));
                }
                Ok(Some(ItemLabel::Int64(-1 - arg as i64)))
            }
            MAJOR_BYTES if self.label_policy == MapLabelPolicy::Normal => {
                let bytes = self
                    .instream
                    .get_bytes(arg as usize)
                    .ok_or_else(|| self.fail(CborError::HitEnd))?;
                Ok(Some(ItemLabel::Bytes(bytes.as_slice().unwrap())))
            }
            MAJOR_TEXT => {
                let bytes = self
                    .instream
                    .get_bytes(arg as usize)
                    .ok_or_else(|| self.fail(CborError::HitEnd))?;
                Ok(Some(ItemLabel::Text(bytes.as_slice().unwrap())))
            }
            _ => Err(self.fail(CborError::BadMapLabelType)),
        }
    }

    // ── indefinite-length string reassembly ─────────────────────────────

    fn reassemble_indefinite_string(&mut self, major: u8) -> CborResult<&'a [u8]> {
        let resume_pos = self.instream.tell();
        let mut total = 0usize;
        loop {
            if self.peek_is_break_for_string() {
                self.consume_break()?;
                break;
            }
            let (chunk_major, ai, arg) = self.read_raw_head()?;
            if chunk_major != major || ai == AI_INDEFINITE {
                return Err(self.fail(CborError::IndefiniteStringSegmentMismatch));
            }
            let chunk_len = arg as usize;
            self.instream
                .get_bytes(chunk_len)
                .ok_or_else(|| self.fail(CborError::HitEnd))?;
            total = total
                .checked_add(chunk_len)
                .ok_or_else(|| self.fail(CborError::ContainerTooLong))?;
        }

        self.instream.seek(resume_pos);
        let dest = allocate_or_err(self.pool, total).map_err(|e| self.fail(e))?;
        let mut off = 0usize;
        loop {
            if self.peek_is_break_for_string() {
                self.consume_break()?;
                break;
            }
            let (_chunk_major, _ai, arg) = self.read_raw_head()?;
            let chunk_len = arg as usize;
            let chunk = self
                .instream
                .get_bytes(chunk_len)
                .ok_or_else(|| self.fail(CborError::HitEnd))?;
            dest[off..off + chunk_len].copy_from_slice(chunk.as_slice().unwrap());
            off += chunk_len;
        }
        Ok(&*dest)
    }

    fn peek_is_break_for_string(&mut self) -> bool {
        self.peek_is_break()
    }

    // ── the main state machine ──────────────────────────────────────────

    /// Decode one item, or `Ok(None)` once every open container has closed
    /// and no bytes remain — a clean end of stream rather than an error.
    pub fn get_next(&mut self) -> CborResult<Option<Item<'a>>> {
        if let Some(e) = self.error() {
            return Err(e);
        }
        self.close_exhausted_levels()?;
        if self.nesting.is_empty() && self.instream.bytes_unconsumed() == 0 {
            return Ok(None);
        }

        let nesting_level = self.nesting.depth() as u8;
        let label = self.maybe_read_label()?;
        let mut item = self.read_value_item(nesting_level, label)?;
        self.decrement_parent(nesting_level);
        self.close_exhausted_levels()?;
        item.next_nesting_level = self.nesting.depth() as u8;
        Ok(Some(item))
    }

    fn read_value_item(
        &mut self,
        nesting_level: u8,
        label: Option<ItemLabel<'a>>,
    ) -> CborResult<Item<'a>> {
        let (major, ai, arg, tag_bits_val, last_large_tag) = self.read_head_draining_tags()?;
        let mut item = Item::blank();
        item.label = label;
        item.nesting_level = nesting_level;
        item.tag_bits = tag_bits_val;
        item.last_large_tag = last_large_tag;

        match major {
            MAJOR_UINT => {
                if (tag_bits_val & tag_bits::DATE_EPOCH) != 0 {
                    item.kind = ItemKind::DateEpoch;
                    item.value = ItemValue::Date(EpochDate {
                        seconds: i64::try_from(arg).map_err(|_| self.fail(CborError::DateOverflow))?,
                        fraction: 0.0,
                    });
                } else {
                    item.kind = ItemKind::Uint64;
                    item.value = ItemValue::Uint64(arg);
                }
            }
            MAJOR_NEGINT => {
                if arg > i64::MAX as u64 {
                    return Err(self.fail(CborError::IntegerOverflow));
                }
                let v = -1 - arg as i64;
                if (tag_bits_val & tag_bits::DATE_EPOCH) != 0 {
                    item.kind = ItemKind::DateEpoch;
                    item.value = ItemValue::Date(EpochDate {
                        seconds: v,
                        fraction: 0.0,
                    });
                } else {
                    item.kind = ItemKind::Int64;
                    item.value = ItemValue::Int64(v);
                }
            }
            MAJOR_BYTES => {
                let bytes = if ai == AI_INDEFINITE {
                    item.allocated_data = true;
                    self.reassemble_indefinite_string(MAJOR_BYTES)?
                } else {
                    self.instream
                        .get_bytes(arg as usize)
                        .ok_or_else(|| self.fail(CborError::HitEnd))?
                        .as_slice()
                        .unwrap()
                };
                item.kind = if (tag_bits_val & tag_bits::POS_BIGNUM) != 0 {
                    ItemKind::PosBigNum
                } else if (tag_bits_val & tag_bits::NEG_BIGNUM) != 0 {
                    ItemKind::NegBigNum
                } else {
                    ItemKind::ByteString
                };
                item.value = ItemValue::Bytes(bytes);
            }
            MAJOR_TEXT => {
                let bytes = if ai == AI_INDEFINITE {
                    item.allocated_data = true;
                    self.reassemble_indefinite_string(MAJOR_TEXT)?
                } else {
                    self.instream
                        .get_bytes(arg as usize)
                        .ok_or_else(|| self.fail(CborError::HitEnd))?
                        .as_slice()
                        .unwrap()
                };
                item.kind = if (tag_bits_val & tag_bits::DATE_STRING) != 0 {
                    ItemKind::DateString
                } else {
                    ItemKind::TextString
                };
                item.value = ItemValue::Text(crate::item::str_or_bytes::StrOrBytes(bytes));
            }
            MAJOR_ARRAY => {
                let count = if ai == AI_INDEFINITE {
                    ContainerCount::Indefinite
                } else {
                    ContainerCount::Definite(arg)
                };
                item.kind = ItemKind::Array;
                item.value = ItemValue::Count(count);
                self.push_level(
                    ContainerType::Array,
                    match count {
                        ContainerCount::Definite(n) => RemainingItems::Definite(n),
                        ContainerCount::Indefinite => RemainingItems::Indefinite,
                    },
                )?;
                return Ok(item);
            }
            MAJOR_MAP => {
                let count = if ai == AI_INDEFINITE {
                    ContainerCount::Indefinite
                } else {
                    ContainerCount::Definite(arg)
                };
                item.kind = ItemKind::Map;
                item.value = ItemValue::Count(count);
                let remaining = match (count, self.label_policy) {
                    (ContainerCount::Definite(n), MapLabelPolicy::MapAsArray) => {
                        let doubled = n
                            .checked_mul(2)
                            .ok_or_else(|| self.fail(CborError::ContainerTooLong))?;
                        RemainingItems::Definite(doubled)
                    }
                    (ContainerCount::Definite(n), _) => RemainingItems::Definite(n),
                    (ContainerCount::Indefinite, _) => RemainingItems::Indefinite,
                };
                self.push_level(ContainerType::Map, remaining)?;
                return Ok(item);
            }
            MAJOR_TAG => unreachable!("tags are drained by read_head_draining_tags"),
            MAJOR_SIMPLE_FLOAT => {
                item = self.read_simple_or_float(ai, arg, item)?;
            }
            _ => unreachable!("major type is masked to 3 bits"),
        }
        Ok(item)
    }

    fn push_level(&mut self, container_type: ContainerType, remaining: RemainingItems) -> CborResult<()> {
        self.nesting
            .push(DecodeLevel {
                remaining,
                container_type,
            })
            .map_err(|e| self.fail(e))
    }

    fn read_simple_or_float(&mut self, ai: u8, arg: u64, mut item: Item<'a>) -> CborResult<Item<'a>> {
        match ai {
            SIMPLE_FALSE => {
                item.kind = ItemKind::False;
            }
            SIMPLE_TRUE => {
                item.kind = ItemKind::True;
            }
            SIMPLE_NULL => {
                item.kind = ItemKind::Null;
            }
            SIMPLE_UNDEF => {
                item.kind = ItemKind::Undef;
            }
            24 => {
                // arg already holds the one extra byte (simple value 32..=255);
                // values 0..=31 here are reserved/non-canonical encodings.
                if !(32..=255).contains(&arg) {
                    return Err(self.fail(CborError::InvalidSimpleValue));
                }
                item.kind = ItemKind::UnknownSimple;
                item.value = ItemValue::Simple(arg as u8);
            }
            0..=19 => {
                item.kind = ItemKind::UnknownSimple;
                item.value = ItemValue::Simple(ai);
            }
            AI_HALF => {
                let bits = arg as u16;
                let as_f64 = crate::float::half_bits_to_f64(bits);
                if (item.tag_bits & tag_bits::DATE_EPOCH) != 0 {
                    item.kind = ItemKind::DateEpoch;
                    item.value = ItemValue::Date(
                        epoch_from_f64(as_f64).ok_or_else(|| self.fail(CborError::DateOverflow))?,
                    );
                } else {
                    item.kind = ItemKind::Double;
                    item.value = ItemValue::Double(as_f64);
                }
            }
            AI_SINGLE => {
                let bits = arg as u32;
                let v = crate::buf::bits_to_f32(bits);
                if (item.tag_bits & tag_bits::DATE_EPOCH) != 0 {
                    item.kind = ItemKind::DateEpoch;
                    item.value = ItemValue::Date(
                        epoch_from_f64(v as f64).ok_or_else(|| self.fail(CborError::DateOverflow))?,
                    );
                } else {
                    item.kind = ItemKind::Float;
                    item.value = ItemValue::Float(v);
                }
            }
            AI_DOUBLE => {
                let v = crate::buf::bits_to_f64(arg);
                if (item.tag_bits & tag_bits::DATE_EPOCH) != 0 {
                    item.kind = ItemKind::DateEpoch;
                    item.value = ItemValue::Date(
                        epoch_from_f64(v).ok_or_else(|| self.fail(CborError::DateOverflow))?,
                    );
                } else {
                    item.kind = ItemKind::Double;
                    item.value = ItemValue::Double(v);
                }
            }
            AI_BREAK => return Err(self.fail(CborError::BadBreak)),
            _ => unreachable!("additional info is masked to 5 bits, and 28..=30 is rejected by read_raw_head"),
        }
        Ok(item)
    }

    /// Ends decoding. Fails with `ExtraTrailingBytes` if anything remains
    /// unconsumed, or `OpenContainerAtFinish` if a container never closed.
    pub fn finish(&mut self) -> CborResult<()> {
        if let Some(e) = self.error() {
            return Err(e);
        }
        if !self.nesting.is_empty() {
            return Err(self.fail(CborError::OpenContainerAtFinish));
        }
        if self.instream.bytes_unconsumed() != 0 {
            return Err(self.fail(CborError::ExtraTrailingBytes));
        }
        Ok(())
    }
}

/// Split a DateEpoch floating payload into whole seconds (truncated toward
/// zero) and the remaining fraction, or `None` if `v` is NaN/infinite or its
/// integral part does not fit `i64` (outside ±2^63 seconds).
///
/// Decomposes `v`'s IEEE-754 bit pattern directly rather than calling
/// `trunc`/`fract` — those are `<math.h>`-backed `std` calls, unavailable to
/// the no-FPU targets this crate is meant to support.
fn epoch_from_f64(v: f64) -> Option<EpochDate> {
    let bits = crate::buf::f64_to_bits(v);
    let sign_negative = (bits >> 63) & 1 == 1;
    let biased_exp = (bits >> 52) & 0x7FF;
    let mantissa = bits & ((1u64 << 52) - 1);

    let seconds = if biased_exp == 0x7FF {
        return None; // NaN or infinite
    } else if biased_exp == 0 {
        0 // zero or subnormal: |v| < 1
    } else {
        let true_exp = biased_exp as i64 - 1023;
        if true_exp < 0 {
            0 // |v| < 1
        } else {
            let significand = mantissa | (1u64 << 52);
            let magnitude: u128 = if true_exp as u32 >= 52 {
                let shift = true_exp as u32 - 52;
                if shift >= 128 {
                    return None;
                }
                (significand as u128) << shift
            } else {
                let shift = 52 - true_exp as u32;
                (significand as u128) >> shift
            };
            if !sign_negative {
                if magnitude > i64::MAX as u128 {
                    return None;
                }
                magnitude as i64
            } else if magnitude == i64::MAX as u128 + 1 {
                i64::MIN
            } else if magnitude > i64::MAX as u128 {
                return None;
            } else {
                -(magnitude as i64)
            }
        }
    };
    Some(EpochDate {
        seconds,
        fraction: v - seconds as f64,
    })
}

impl<'a> Iterator for Decoder<'a> {
    type Item = CborResult<Item<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.get_next() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
