#![no_main]

use libfuzzer_sys::fuzz_target;
use quire_core::DETECTION_ORDER;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Counting arbitrary bytes may fail but must never panic, whichever
    // recognizer the detector would have picked.
    for kind in DETECTION_ORDER {
        let mut source = Cursor::new(data.to_vec());
        let _ = kind.count(&mut source);
    }
});
