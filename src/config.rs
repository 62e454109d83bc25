//! Compile-time configuration constants.
//!
//! Plain `pub const` tunables rather than a runtime configuration object,
//! each owned by the module that uses it.

/// Default nesting-stack capacity (arrays/maps/bstr-wraps open at once).
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 10;

/// Hard upper bound on nesting depth, independent of the capacity a caller
/// requests at `init` time. Exceeding this is always `NestingTooDeep`,
/// never a panic.
pub const MAX_NESTING_DEPTH_HARD_LIMIT: usize = 255;

/// Number of well-known tag numbers (< 63) tracked as individual bits in
/// `Item::tag_bits`. See [`crate::item::tag_bits`] for the bit assignment.
pub const NUM_WELL_KNOWN_TAG_BITS: u32 = 16;

/// Tag numbers at or above this value are "large tags": only the most
/// recently seen one is remembered (`Item::last_large_tag`), per the
/// source-compatible tag-accumulation behavior this crate preserves.
pub const LARGE_TAG_THRESHOLD: u64 = 63;

/// Minimum number of bookkeeping bytes a [`crate::pool::MemPool`] arena
/// reserves for itself before any string data can be carved out of it.
/// Mirrors the "~nine machine-pointer-sized fields" overhead the mem-pool
/// design note calls for.
pub const MEM_POOL_OVERHEAD_WORDS: usize = 9;
