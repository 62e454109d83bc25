//! qcbor — a self-contained CBOR (RFC 8949 / 7049) encoder and decoder.
//!
//! This crate is the codec core only: a streaming encoder, a preorder
//! streaming decoder, the nesting tracker shared by both, an IEEE-754
//! half/single/double minimizer, and the safe input/output buffer
//! primitives the codec is built on. No heap allocation on the hot path
//! (the pluggable [`pool::StringPool`] is the one escape hatch, used only
//! to reassemble indefinite-length strings), no internal synchronization,
//! and no general-purpose CBOR DOM — decoding is strictly preorder
//! streaming via [`decode::Decoder::get_next`].
//!
//! The COSE signing layer, cryptographic adapters, and any CLI/test-runner
//! harness are deliberately out of scope; this crate exposes only the
//! encoder/decoder contracts those layers would consume.
//!
//! The codec core (buffers, streams, nesting tracker, float minimizer,
//! encoder, decoder, and the bump-pointer [`pool::MemPool`]) builds with the
//! default `std` feature turned off, for targets that have no allocator.
//! [`debug`] and the heap-backed [`pool::MallocStringPool`] require the
//! `std` feature (on by default).

#![cfg_attr(not(feature = "std"), no_std)]

pub mod buf;
pub mod config;
#[cfg(feature = "std")]
pub mod debug;
pub mod decode;
pub mod encode;
pub mod error;
pub mod float;
pub mod istream;
pub mod item;
pub mod nest;
pub mod ostream;
pub mod pool;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level convenience re-exports for the most common entry points.
// ─────────────────────────────────────────────────────────────────────────────

/// Shared error taxonomy for both the encoder and the decoder.
pub use error::{CborError, CborResult};

/// Streaming CBOR encoder. See [`encode::Encoder`] for the full operation set.
pub use encode::Encoder;

/// Preorder streaming CBOR decoder. See [`decode::Decoder`] for the full
/// operation set, and [`decode::MapLabelPolicy`] for the three map-label
/// decode modes.
pub use decode::{Decoder, MapLabelPolicy};

/// The decoded value returned from one `Decoder::get_next` call.
pub use item::{ContainerCount, EpochDate, Item, ItemKind, ItemLabel, ItemValue};

/// Byte-view sum types ("SafeBuf"): `Null` is distinguishable from a
/// present-but-empty slice.
pub use buf::{ByteView, MutByteView};

/// The pluggable string-pool trait, plus the bundled bump-pointer
/// implementation (`no_std`-friendly) and the heap-backed one (requires the
/// `std` feature).
pub use pool::{MemPool, StringPool};
#[cfg(feature = "std")]
pub use pool::MallocStringPool;
