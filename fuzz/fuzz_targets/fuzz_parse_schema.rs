#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(xsd) = std::str::from_utf8(data) {
        let mut diagnostics = libocx::Diagnostics::new();
        let _ = libocx::SchemaDictionary::from_str(xsd, &mut diagnostics);
    }
});
