//! Shared error taxonomy for the encoder and decoder.
//!
//! A plain `enum`, no `thiserror`, with a caller-facing stable name string
//! and hand-written `Display` + `std::error::Error` impls.

use core::fmt;

/// Every error this crate can surface, from either the encoder or the
/// decoder. Errors are sticky on their owning context (see
/// [`crate::ostream::OutStream`] and [`crate::istream::InStream`]): once set,
/// further mutating calls are no-ops and the first observable surface is
/// `finish`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CborError {
    /// The output buffer is too small to hold the requested write.
    BufferTooSmall,
    /// An `open_*` call would exceed the nesting stack's capacity.
    NestingTooDeep,
    /// A `close_*` call was made with no open level (depth already 0).
    TooManyCloses,
    /// A `close_*` call's expected major type did not match the open level's.
    CloseOpenMismatch,
    /// `add_simple` was called with a value outside the permitted ranges.
    InvalidSimpleValue,
    /// A context's magic sentinel did not match; it was never initialized
    /// (or its memory was corrupted / reused incorrectly).
    UninitializedContext,
    /// A read needed more bytes than remain in the input.
    HitEnd,
    /// The input encodes a construct this decoder does not support.
    UnsupportedConstruct,
    /// An array or map header claimed more elements than can be represented.
    ContainerTooLong,
    /// A decoded integer does not fit the target representation
    /// (e.g. a negative-int head whose magnitude is ≥ 2^63).
    IntegerOverflow,
    /// A map label's type is not permitted by the active decode mode.
    BadMapLabelType,
    /// `finish` was called while a container was still open.
    OpenContainerAtFinish,
    /// A DateEpoch tag's payload is outside ±2^63 seconds.
    DateOverflow,
    /// The input is not well-formed CBOR at the byte level.
    InvalidCborStructure,
    /// A tag (major type 6) appeared where a value was required, or too
    /// many large tag numbers stacked ahead of one item.
    BadOptionalTag,
    /// `finish` succeeded in parsing but bytes remained unconsumed.
    ExtraTrailingBytes,
    /// An indefinite-length string's segment did not match the head's major
    /// type, or a non-string item appeared before the closing break.
    IndefiniteStringSegmentMismatch,
    /// An indefinite-length string was encountered but no string pool was
    /// configured on the decoder.
    NoStringAllocator,
    /// The configured string pool's `allocate` call failed.
    StringAllocatorFailed,
    /// A break code (0xFF) appeared outside an indefinite-length container.
    BadBreak,
}

impl CborError {
    /// Stable, caller-facing identifier for this error, independent of the
    /// `Debug` derive's output (which is free to change across refactors of
    /// variant order or discriminant values).
    pub const fn name(&self) -> &'static str {
        match self {
            CborError::BufferTooSmall => "BufferTooSmall",
            CborError::NestingTooDeep => "NestingTooDeep",
            CborError::TooManyCloses => "TooManyCloses",
            CborError::CloseOpenMismatch => "CloseOpenMismatch",
            CborError::InvalidSimpleValue => "InvalidSimpleValue",
            CborError::UninitializedContext => "UninitializedContext",
            CborError::HitEnd => "HitEnd",
            CborError::UnsupportedConstruct => "UnsupportedConstruct",
            CborError::ContainerTooLong => "ContainerTooLong",
            CborError::IntegerOverflow => "IntegerOverflow",
            CborError::BadMapLabelType => "BadMapLabelType",
            CborError::OpenContainerAtFinish => "OpenContainerAtFinish",
            CborError::DateOverflow => "DateOverflow",
            CborError::InvalidCborStructure => "InvalidCborStructure",
            CborError::BadOptionalTag => "BadOptionalTag",
            CborError::ExtraTrailingBytes => "ExtraTrailingBytes",
            CborError::IndefiniteStringSegmentMismatch => "IndefiniteStringSegmentMismatch",
            CborError::NoStringAllocator => "NoStringAllocator",
            CborError::StringAllocatorFailed => "StringAllocatorFailed",
            CborError::BadBreak => "BadBreak",
        }
    }
}

impl fmt::Display for CborError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CborError {}

/// Convenience alias used throughout the crate.
pub type CborResult<T> = Result<T, CborError>;
