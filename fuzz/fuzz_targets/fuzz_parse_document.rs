#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Malformed XML must come back as an error, never a panic
    let _ = libocx::Document::from_reader(data);
});
