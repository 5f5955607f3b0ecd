#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Whatever parses must either lower or report an error.
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = mjc::compile_to_ir(s);
    }
});
