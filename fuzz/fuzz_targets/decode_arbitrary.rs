#![no_main]
use libfuzzer_sys::fuzz_target;
use qcbor::Decoder;

// Hostile-input bound: for any byte string of length L, no sequence of
// get_next/finish calls may read past offset L, and nothing may panic no
// matter how the major types, lengths, and nesting are arranged.
fuzz_target!(|data: &[u8]| {
    let mut dec = Decoder::new(data);
    loop {
        match dec.get_next() {
            Ok(Some(_item)) => continue,
            Ok(None) => break,
            Err(_e) => return,
        }
    }
    let _ = dec.finish();
});
