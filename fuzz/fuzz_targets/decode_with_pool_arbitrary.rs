#![no_main]
use libfuzzer_sys::fuzz_target;
use qcbor::{Decoder, MallocStringPool};

// Same hostile-input sweep as `decode_arbitrary`, but with a string pool
// configured so indefinite-length string segments get a chance to exercise
// `reassemble_indefinite_string` and the pool's own allocation bookkeeping
// instead of always bailing out on `NoStringAllocator`.
fuzz_target!(|data: &[u8]| {
    let pool = MallocStringPool::new();
    let mut dec = Decoder::new(data).with_string_pool(&pool);
    loop {
        match dec.get_next() {
            Ok(Some(_item)) => continue,
            Ok(None) => break,
            Err(_e) => return,
        }
    }
    let _ = dec.finish();
});
