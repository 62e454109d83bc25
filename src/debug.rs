//! Preorder pretty-printer for diagnostics.
//!
//! Std-only, `alloc`-using, and deliberately kept out of the allocation-free
//! core: walks a [`crate::decode::Decoder`] to completion and renders an
//! indented tree of `kind(value)` lines, one per item, with container
//! headers shown as `Array(n)` / `Map(n)` / `Array(indefinite)` etc. Used by
//! the test suite to produce readable output when a fuzz-found input
//! decodes to something unexpected; not used anywhere on the encode or
//! decode hot path.

use std::string::String;
use std::vec::Vec;

use crate::decode::Decoder;
use crate::error::CborResult;
use crate::item::{ContainerCount, Item, ItemKind, ItemValue};

/// Decode every item in `data` and render it as an indented tree, one line
/// per item. Returns the first error encountered, with whatever was
/// successfully rendered so far included in the error's companion string
/// (the caller decides whether to print a partial tree on failure).
pub fn decode_to_debug_string(data: &[u8]) -> Result<String, (String, crate::CborError)> {
    let mut dec = Decoder::new(data);
    let mut out = String::new();
    loop {
        match dec.get_next() {
            Ok(Some(item)) => render_line(&mut out, &item),
            Ok(None) => return Ok(out),
            Err(e) => return Err((out, e)),
        }
    }
}

/// Same traversal, collecting every yielded [`Item`] instead of rendering
/// text — a convenience for tests that want to assert on the sequence
/// shape directly rather than scrape a debug string.
pub fn decode_all<'a>(data: &'a [u8]) -> CborResult<Vec<Item<'a>>> {
    let mut dec = Decoder::new(data);
    let mut items = Vec::new();
    while let Some(item) = dec.get_next()? {
        items.push(item);
    }
    dec.finish()?;
    Ok(items)
}

fn render_line(out: &mut String, item: &Item<'_>) {
    let indent = "  ".repeat(item.nesting_level as usize);
    out.push_str(&indent);
    if let Some(label) = &item.label {
        out.push_str(&format!("{label:?}: "));
    }
    match (&item.kind, &item.value) {
        (ItemKind::Array, ItemValue::Count(ContainerCount::Definite(n))) => {
            out.push_str(&format!("Array({n})\n"))
        }
        (ItemKind::Array, ItemValue::Count(ContainerCount::Indefinite)) => {
            out.push_str("Array(indefinite)\n")
        }
        (ItemKind::Map, ItemValue::Count(ContainerCount::Definite(n))) => {
            out.push_str(&format!("Map({n})\n"))
        }
        (ItemKind::Map, ItemValue::Count(ContainerCount::Indefinite)) => {
            out.push_str("Map(indefinite)\n")
        }
        (kind, value) => out.push_str(&format!("{kind:?}({value:?})\n")),
    }
}
