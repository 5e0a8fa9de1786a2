#![no_main]

use libfuzzer_sys::fuzz_target;
use quire_core::{SampleBlock, DETECTION_ORDER};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let mut source = Cursor::new(data.to_vec());
    if let Ok(sample) = SampleBlock::read_from(&mut source) {
        for kind in DETECTION_ORDER {
            let _ = kind.matches(&sample);
        }
    }
});
