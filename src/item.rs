//! The decoded `Item` type and its constituent enums, plus the well-known
//! tag-bit assignment used by `Item::tag_bits`.

/// The kind of CBOR value a decoded [`Item`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Int64,
    Uint64,
    ByteString,
    TextString,
    Array,
    Map,
    Float,
    Double,
    PosBigNum,
    NegBigNum,
    DateString,
    DateEpoch,
    UnknownSimple,
    False,
    True,
    Null,
    Undef,
}

/// Element/pair count of an array or map header, or "indefinite" when the
/// container is terminated by a break code instead of a length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerCount {
    Definite(u64),
    Indefinite,
}

/// A decoded epoch-based date (tag 1) payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochDate {
    pub seconds: i64,
    /// Sub-second fraction, 0.0 when the original payload was an integer.
    pub fraction: f64,
}

/// The payload carried by a decoded [`Item`], tagged by `ItemKind`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemValue<'a> {
    Int64(i64),
    Uint64(u64),
    Bytes(&'a [u8]),
    Text(str_or_bytes::StrOrBytes<'a>),
    Count(ContainerCount),
    Float(f32),
    Double(f64),
    Date(EpochDate),
    Simple(u8),
    None,
}

/// A CBOR text-string item is not validated as UTF-8 by the decoder (left to
/// the caller); this thin wrapper carries the raw bytes while documenting
/// that intent instead of forcing an allocation-free `Result<&str, _>` at
/// decode time.
pub mod str_or_bytes {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StrOrBytes<'a>(pub &'a [u8]);

    impl<'a> StrOrBytes<'a> {
        pub fn as_bytes(&self) -> &'a [u8] {
            self.0
        }

        /// Validate and return the UTF-8 text, if valid.
        pub fn as_str(&self) -> Option<&'a str> {
            core::str::from_utf8(self.0).ok()
        }
    }
}

/// A map item's label, present only when the item was read from inside an
/// open map. Modeled as a proper sum type rather than a sentinel value
/// standing in for "no integer label", so every `i64`/`u64` value is a legal
/// label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemLabel<'a> {
    Int64(i64),
    Uint64(u64),
    Text(&'a [u8]),
    Bytes(&'a [u8]),
}

/// A fully decoded CBOR data item, as returned by one call to
/// `Decoder::get_next`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item<'a> {
    pub kind: ItemKind,
    pub value: ItemValue<'a>,
    /// Present only when this item was read from inside an open map.
    pub label: Option<ItemLabel<'a>>,
    /// Depth at which this item was read (0-based).
    pub nesting_level: u8,
    /// Depth after this item was consumed; less than `nesting_level` when
    /// one or more containers closed as part of this call.
    pub next_nesting_level: u8,
    /// Bitmask of well-known tag numbers < 63 seen stacked before this item.
    /// See [`tag_bits`] for the bit assignment.
    pub tag_bits: u16,
    /// The most recently seen tag number ≥ 63 stacked before this item, if
    /// any. Only the last one is remembered; stacking more than one large
    /// tag ahead of a single item is rare enough in practice that this crate
    /// does not keep a full list.
    pub last_large_tag: Option<u64>,
    /// Set when this item's string data was materialized by the string
    /// pool (segments of an indefinite-length string were coalesced).
    pub allocated_data: bool,
    /// Set when this item's label was materialized by the string pool.
    pub allocated_label: bool,
}

impl<'a> Item<'a> {
    pub(crate) fn blank() -> Self {
        Item {
            kind: ItemKind::Null,
            value: ItemValue::None,
            label: None,
            nesting_level: 0,
            next_nesting_level: 0,
            tag_bits: 0,
            last_large_tag: None,
            allocated_data: false,
            allocated_label: false,
        }
    }
}

/// Well-known tag numbers (< 63) and their assigned bit in `Item::tag_bits`.
///
/// One bit per well-known tag is tracked rather than a list, since at most
/// one of each can stack ahead of a single item in practice and callers
/// usually only care "was tag X present". Large tag numbers (≥ 63) don't fit
/// this scheme and are tracked instead via `Item::last_large_tag`.
pub mod tag_bits {
    pub const DATE_STRING: u16 = 1 << 0; // tag 0
    pub const DATE_EPOCH: u16 = 1 << 1; // tag 1
    pub const POS_BIGNUM: u16 = 1 << 2; // tag 2
    pub const NEG_BIGNUM: u16 = 1 << 3; // tag 3
    pub const FRACTION: u16 = 1 << 4; // tag 4 (decimal fraction)
    pub const BIGFLOAT: u16 = 1 << 5; // tag 5
    pub const B64URL_HINT: u16 = 1 << 6; // tag 21
    pub const B64_HINT: u16 = 1 << 7; // tag 22
    pub const B16_HINT: u16 = 1 << 8; // tag 23
    pub const EMBEDDED_CBOR: u16 = 1 << 9; // tag 24
    pub const URI: u16 = 1 << 10; // tag 32
    pub const B64URL_STRING: u16 = 1 << 11; // tag 33
    pub const B64_STRING: u16 = 1 << 12; // tag 34
    pub const REGEX: u16 = 1 << 13; // tag 35
    pub const MIME: u16 = 1 << 14; // tag 36
    pub const BINARY_UUID: u16 = 1 << 15; // tag 37

    /// Tag 55799 (self-describe-CBOR) is well-known but carries no semantic
    /// payload interpretation, so it is intentionally *not* assigned a bit:
    /// the decoder silently drains and ignores it rather than surfacing it
    /// to the caller, matching RFC 8949 §3.4.6's guidance that decoders may
    /// ignore this tag entirely.
    pub const SELF_DESCRIBE_CBOR_TAG: u64 = 55799;

    /// Maps a well-known small tag number to its bit, or `None` if the tag
    /// number has no assigned bit (including tag 55799, by design above).
    pub fn bit_for_tag(tag: u64) -> Option<u16> {
        match tag {
            0 => Some(DATE_STRING),
            1 => Some(DATE_EPOCH),
            2 => Some(POS_BIGNUM),
            3 => Some(NEG_BIGNUM),
            4 => Some(FRACTION),
            5 => Some(BIGFLOAT),
            21 => Some(B64URL_HINT),
            22 => Some(B64_HINT),
            23 => Some(B16_HINT),
            24 => Some(EMBEDDED_CBOR),
            32 => Some(URI),
            33 => Some(B64URL_STRING),
            34 => Some(B64_STRING),
            35 => Some(REGEX),
            36 => Some(MIME),
            37 => Some(BINARY_UUID),
            _ => None,
        }
    }
}
